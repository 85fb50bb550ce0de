use super::constants::MATCH_RADIUS_FACTOR;

/// An axis-aligned face bounding box in source-frame pixel coordinates.
///
/// Produced fresh by the detector each cycle and never mutated; tracking
/// identity lives on `TrackedFace`, not here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Half-open containment test: the left/top edges are inside, the
    /// right/bottom edges are not.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && px < (self.x + self.width) as f64
            && py >= self.y as f64
            && py < (self.y + self.height) as f64
    }

    /// Maximum center distance at which a previous face still counts as
    /// this detection, scaled by the detection's larger side.
    pub fn match_radius(&self) -> f64 {
        MATCH_RADIUS_FACTOR * self.width.max(self.height) as f64
    }

    pub fn center_distance(&self, other: &FaceBox) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection with a `frame_width` x `frame_height` frame, or `None`
    /// when the box lies entirely outside it.
    pub fn clamped(&self, frame_width: u32, frame_height: u32) -> Option<FaceBox> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = (self.x + self.width).min(frame_width as i32);
        let y1 = (self.y + self.height).min(frame_height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(FaceBox::new(x0, y0, x1 - x0, y1 - y0))
    }
}
