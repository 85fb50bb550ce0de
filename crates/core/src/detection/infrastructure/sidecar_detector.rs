use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Adapts externally produced detections to the [`FaceDetector`] port.
///
/// The detector model itself runs out of process; its output is consumed
/// here as a JSON sidecar file:
///
/// ```json
/// {"frames": [[{"x": 100, "y": 80, "width": 52, "height": 50}], []]}
/// ```
///
/// One inner array per frame, in decode order. The whole file is parsed and
/// validated up front — a sidecar that fails to load aborts initialization
/// before the pipeline starts. Frames past the end of the list yield no
/// detections.
#[derive(Debug)]
pub struct SidecarDetector {
    frames: Vec<Vec<FaceBox>>,
}

#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("failed to read detection sidecar: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse detection sidecar: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("frame {frame} has a box with non-positive size ({width}x{height})")]
    InvalidBox {
        frame: usize,
        width: i32,
        height: i32,
    },
}

#[derive(Deserialize)]
struct SidecarFile {
    frames: Vec<Vec<SidecarBox>>,
}

#[derive(Deserialize)]
struct SidecarBox {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl SidecarDetector {
    pub fn from_path(path: &Path) -> Result<Self, SidecarError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, SidecarError> {
        let parsed: SidecarFile = serde_json::from_str(text)?;

        let mut frames = Vec::with_capacity(parsed.frames.len());
        for (index, boxes) in parsed.frames.into_iter().enumerate() {
            let mut converted = Vec::with_capacity(boxes.len());
            for b in boxes {
                if b.width <= 0 || b.height <= 0 {
                    return Err(SidecarError::InvalidBox {
                        frame: index,
                        width: b.width,
                        height: b.height,
                    });
                }
                converted.push(FaceBox::new(b.x, b.y, b.width, b.height));
            }
            frames.push(converted);
        }

        Ok(Self { frames })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl FaceDetector for SidecarDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        Ok(self
            .frames
            .get(frame.index())
            .cloned()
            .unwrap_or_default())
    }
}
