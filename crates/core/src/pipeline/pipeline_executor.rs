use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::detection::domain::face_detector::FaceDetector;
use crate::interaction::click_event::ClickEvent;
use crate::interaction::view_transform::ViewTransform;
use crate::mosaic::domain::frame_mosaic::FrameMosaic;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// What to do when a frame's detection call fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionFailurePolicy {
    /// Keep the previous tick's faces for this frame, warn, and continue.
    SkipFrame,
    /// Stop the run with the detector's error.
    Abort,
}

/// Configuration for a pipeline execution run.
pub struct PipelineConfig {
    /// Display-to-buffer mapping applied to incoming clicks.
    pub view: ViewTransform,
    /// Out-of-band click source; `None` disables interaction.
    pub clicks: Option<crossbeam_channel::Receiver<ClickEvent>>,
    pub failure_policy: DetectionFailurePolicy,
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            view: ViewTransform::identity(),
            clicks: None,
            failure_policy: DetectionFailurePolicy::SkipFrame,
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Abstracts how the decode → detect → track → composite → write loop is
/// executed.
///
/// This is a port (application-layer interface); infrastructure provides
/// the concrete executor.
pub trait PipelineExecutor: Send {
    fn execute(
        &self,
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        detector: Box<dyn FaceDetector>,
        mosaic: Box<dyn FrameMosaic>,
        metadata: &VideoMetadata,
        output_path: &Path,
        config: PipelineConfig,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
