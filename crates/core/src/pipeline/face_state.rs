use crate::detection::domain::face_tracker::FaceTracker;
use crate::detection::domain::tracked_face::TrackedFace;
use crate::interaction::hit_test;
use crate::shared::face_box::FaceBox;

/// The pipeline-owned tracked-face state for the current tick.
///
/// Owns the tracker (and with it the id counter) and the ordered face set,
/// replaced wholesale on every `advance`. Box and toggle live in one
/// `TrackedFace`, so there is exactly one toggle per current detection by
/// construction.
pub struct FaceState {
    tracker: FaceTracker,
    faces: Vec<TrackedFace>,
}

impl FaceState {
    pub fn new() -> Self {
        Self {
            tracker: FaceTracker::new(),
            faces: Vec::new(),
        }
    }

    /// Replaces the face set from this tick's detections, carrying id and
    /// toggle over matched faces.
    pub fn advance(&mut self, detections: &[FaceBox]) {
        self.faces = self.tracker.track(detections, &self.faces);
    }

    /// Flips the toggle of every face containing the buffer-space point.
    pub fn toggle_at(&mut self, x: f64, y: f64) -> usize {
        hit_test::toggle_faces_at(&mut self.faces, x, y)
    }

    pub fn faces(&self) -> &[TrackedFace] {
        &self.faces
    }

    /// Boxes to composite this tick: every face whose mosaic is enabled.
    pub fn mosaic_targets(&self) -> Vec<FaceBox> {
        self.faces
            .iter()
            .filter(|f| f.mosaic_enabled)
            .map(|f| f.face_box)
            .collect()
    }
}

impl Default for FaceState {
    fn default() -> Self {
        Self::new()
    }
}
