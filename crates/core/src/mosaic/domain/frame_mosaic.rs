use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Domain interface for compositing a mosaic over face regions of a frame.
///
/// Implementations modify the frame in place (`&mut Frame`) to avoid
/// allocation; callers pass only the boxes whose mosaic toggle is on.
pub trait FrameMosaic: Send {
    fn apply(&self, frame: &mut Frame, faces: &[FaceBox])
        -> Result<(), Box<dyn std::error::Error>>;
}
