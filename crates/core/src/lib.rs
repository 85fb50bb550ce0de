//! Face mosaic core: per-face identity tracking and pixelated compositing
//! for videos and still images. Detection is delegated to an external
//! collaborator behind the [`detection::domain::face_detector::FaceDetector`]
//! port.

pub mod detection;
pub mod interaction;
pub mod mosaic;
pub mod pipeline;
pub mod shared;
pub mod video;
