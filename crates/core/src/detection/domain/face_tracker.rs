use crate::shared::face_box::FaceBox;

use super::tracked_face::TrackedFace;

/// Greedy nearest-centroid face matcher.
///
/// Association is one-to-one: a previous face claimed by one detection
/// leaves the candidate pool for the rest of the tick, so toggle state can
/// never be duplicated onto two boxes. Unmatched previous faces are dropped
/// immediately — a momentarily missed detection is a disappearance, not an
/// occlusion.
pub struct FaceTracker {
    next_id: u32,
}

impl FaceTracker {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Builds the new tick's faces from raw detections and the previous
    /// tick's faces.
    ///
    /// Each detection, in input order, claims the nearest unclaimed previous
    /// face (ties broken by the previous collection's order) when their
    /// centers are closer than the detection's match radius
    /// (1.5 x its larger side). A match inherits id and toggle; anything
    /// else becomes a new face with the mosaic enabled.
    pub fn track(&mut self, detections: &[FaceBox], previous: &[TrackedFace]) -> Vec<TrackedFace> {
        let mut claimed = vec![false; previous.len()];
        let mut faces = Vec::with_capacity(detections.len());

        for det in detections {
            let mut nearest: Option<(usize, f64)> = None;
            for (i, prev) in previous.iter().enumerate() {
                if claimed[i] {
                    continue;
                }
                let dist = det.center_distance(&prev.face_box);
                if nearest.map_or(true, |(_, best)| dist < best) {
                    nearest = Some((i, dist));
                }
            }

            match nearest {
                Some((i, dist)) if dist < det.match_radius() => {
                    claimed[i] = true;
                    faces.push(TrackedFace {
                        id: previous[i].id,
                        face_box: *det,
                        mosaic_enabled: previous[i].mosaic_enabled,
                    });
                }
                _ => {
                    faces.push(TrackedFace::new(self.next_id, *det));
                    self.next_id += 1;
                }
            }
        }

        faces
    }
}

impl Default for FaceTracker {
    fn default() -> Self {
        Self::new()
    }
}
