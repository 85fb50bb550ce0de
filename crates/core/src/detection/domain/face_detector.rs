use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Port to the external face detector collaborator.
///
/// Implementations return one fresh `FaceBox` per face found in the frame,
/// in a stable order, with no identity attached; identity is the tracker's
/// job. Implementations may be stateful, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>>;
}
