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

use super::pipeline_executor::{DetectionFailurePolicy, PipelineConfig, PipelineExecutor};

/// Orchestrates the full video mosaic pipeline.
///
/// Wires domain components together and delegates execution to a
/// `PipelineExecutor`. Single-use: `execute` consumes the owned components,
/// so calling it twice fails.
pub struct MosaicVideoUseCase {
    reader: Option<Box<dyn VideoReader>>,
    writer: Option<Box<dyn VideoWriter>>,
    detector: Option<Box<dyn FaceDetector>>,
    mosaic: Option<Box<dyn FrameMosaic>>,
    executor: Box<dyn PipelineExecutor>,
    view: ViewTransform,
    clicks: Option<crossbeam_channel::Receiver<ClickEvent>>,
    failure_policy: DetectionFailurePolicy,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl MosaicVideoUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        detector: Box<dyn FaceDetector>,
        mosaic: Box<dyn FrameMosaic>,
        executor: Box<dyn PipelineExecutor>,
        view: ViewTransform,
        clicks: Option<crossbeam_channel::Receiver<ClickEvent>>,
        failure_policy: DetectionFailurePolicy,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
            detector: Some(detector),
            mosaic: Some(mosaic),
            executor,
            view,
            clicks,
            failure_policy,
            on_progress,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(
        &mut self,
        metadata: &VideoMetadata,
        output_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let config = PipelineConfig {
            view: self.view,
            clicks: self.clicks.take(),
            failure_policy: self.failure_policy,
            on_progress: self.on_progress.take(),
            cancelled: self.cancelled.clone(),
        };

        self.executor.execute(
            self.reader.take().ok_or("Pipeline already executed")?,
            self.writer.take().ok_or("Pipeline already executed")?,
            self.detector.take().ok_or("Pipeline already executed")?,
            self.mosaic.take().ok_or("Pipeline already executed")?,
            metadata,
            output_path,
            config,
        )
    }
}
