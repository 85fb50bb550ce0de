use std::cell::RefCell;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Instant;

use crate::detection::domain::face_detector::FaceDetector;
use crate::interaction::click_event::ClickEvent;
use crate::mosaic::domain::frame_mosaic::FrameMosaic;
use crate::pipeline::face_state::FaceState;
use crate::pipeline::pipeline_executor::{
    DetectionFailurePolicy, PipelineConfig, PipelineExecutor,
};
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// Single-threaded, frame-driven executor.
///
/// One iteration per presented frame: decode → detect → track → apply
/// clicks → composite → write. Detection must finish before that frame's
/// compositing starts, and the next frame is not touched until the current
/// one is written. Cancellation is re-checked at the top of each iteration;
/// an in-flight detection cannot be aborted, its result is simply not acted
/// upon once the flag is seen.
///
/// Toggle state is mutated only here, between pipeline steps, so the face
/// state needs no locking: clicks cross threads through the channel, not
/// through shared memory.
pub struct SequentialPipelineExecutor {
    logger: RefCell<Box<dyn PipelineLogger>>,
}

impl SequentialPipelineExecutor {
    pub fn new() -> Self {
        Self {
            logger: RefCell::new(Box::new(NullPipelineLogger)),
        }
    }

    pub fn with_logger(logger: Box<dyn PipelineLogger>) -> Self {
        Self {
            logger: RefCell::new(logger),
        }
    }
}

impl Default for SequentialPipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineExecutor for SequentialPipelineExecutor {
    fn execute(
        &self,
        mut reader: Box<dyn VideoReader>,
        mut writer: Box<dyn VideoWriter>,
        mut detector: Box<dyn FaceDetector>,
        mosaic: Box<dyn FrameMosaic>,
        metadata: &VideoMetadata,
        output_path: &Path,
        config: PipelineConfig,
    ) -> Result<(), Box<dyn std::error::Error>> {
        writer.open(output_path, metadata)?;

        let mut logger = self.logger.borrow_mut();
        let total_frames = metadata.total_frames;
        let mut state = FaceState::new();
        let mut pending_clicks: Vec<ClickEvent> = Vec::new();
        let mut frames_done = 0usize;

        let mut run = || -> Result<(), Box<dyn std::error::Error>> {
            for frame_result in reader.frames() {
                if config.cancelled.load(Ordering::Relaxed) {
                    logger.info("Cancelled; stopping before next frame");
                    break;
                }

                let mut frame = frame_result?;
                let index = frame.index();

                let started = Instant::now();
                match detector.detect(&frame) {
                    Ok(detections) => state.advance(&detections),
                    Err(e) => match config.failure_policy {
                        DetectionFailurePolicy::SkipFrame => {
                            log::warn!(
                                "Detection failed on frame {index}: {e}; keeping previous faces"
                            );
                        }
                        DetectionFailurePolicy::Abort => return Err(e),
                    },
                }
                logger.timing("detect", started.elapsed().as_secs_f64() * 1000.0);

                drain_clicks(&config, &mut pending_clicks);
                apply_due_clicks(&config, &mut pending_clicks, &mut state, index);

                let started = Instant::now();
                mosaic.apply(&mut frame, &state.mosaic_targets())?;
                logger.timing("mosaic", started.elapsed().as_secs_f64() * 1000.0);

                let started = Instant::now();
                writer.write(&frame)?;
                logger.timing("write", started.elapsed().as_secs_f64() * 1000.0);

                frames_done += 1;
                logger.progress(frames_done, total_frames);

                if let Some(ref callback) = config.on_progress {
                    if !callback(frames_done, total_frames) {
                        return Err("Cancelled".into());
                    }
                }
            }
            Ok(())
        };

        let result = run();
        reader.close();
        let close_result = writer.close();
        logger.summary();

        // First error wins; a close failure still surfaces on success.
        result.and(close_result)
    }
}

fn drain_clicks(config: &PipelineConfig, pending: &mut Vec<ClickEvent>) {
    if let Some(ref rx) = config.clicks {
        while let Ok(click) = rx.try_recv() {
            pending.push(click);
        }
    }
}

/// Applies every pending click scheduled for this frame or earlier; later
/// clicks stay queued for their frame.
fn apply_due_clicks(
    config: &PipelineConfig,
    pending: &mut Vec<ClickEvent>,
    state: &mut FaceState,
    index: usize,
) {
    let mut kept = Vec::with_capacity(pending.len());
    for click in pending.drain(..) {
        if click.frame <= index {
            let (bx, by) = config.view.to_buffer(click.x, click.y);
            let flipped = state.toggle_at(bx, by);
            log::debug!(
                "Click at display ({}, {}) -> buffer ({bx:.1}, {by:.1}) toggled {flipped} face(s)",
                click.x,
                click.y
            );
        } else {
            kept.push(click);
        }
    }
    *pending = kept;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::view_transform::ViewTransform;
    use crate::shared::face_box::FaceBox;
    use crate::shared::frame::Frame;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubReader {
        frames: Vec<Frame>,
        closed: Arc<Mutex<bool>>,
    }

    impl StubReader {
        fn new(frames: Vec<Frame>) -> Self {
            Self {
                frames,
                closed: Arc::new(Mutex::new(false)),
            }
        }
    }

    impl VideoReader for StubReader {
        fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(metadata(self.frames.len()))
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            Box::new(self.frames.drain(..).map(Ok))
        }

        fn close(&mut self) {
            *self.closed.lock().unwrap() = true;
        }
    }

    struct StubWriter {
        written: Arc<Mutex<Vec<Frame>>>,
        closed: Arc<Mutex<bool>>,
    }

    impl StubWriter {
        fn new() -> Self {
            Self {
                written: Arc::new(Mutex::new(Vec::new())),
                closed: Arc::new(Mutex::new(false)),
            }
        }
    }

    impl VideoWriter for StubWriter {
        fn open(
            &mut self,
            _path: &Path,
            _metadata: &VideoMetadata,
        ) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }

        fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.written.lock().unwrap().push(frame.clone());
            Ok(())
        }

        fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }
    }

    /// Same detections every frame, with optional injected failures.
    struct StubDetector {
        boxes: Vec<FaceBox>,
        fail_on: Option<usize>,
    }

    impl FaceDetector for StubDetector {
        fn detect(
            &mut self,
            frame: &Frame,
        ) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
            if self.fail_on == Some(frame.index()) {
                return Err("detector error".into());
            }
            Ok(self.boxes.clone())
        }
    }

    /// Records which boxes were composited per frame.
    #[allow(clippy::type_complexity)]
    struct RecordingMosaic {
        calls: Arc<Mutex<Vec<(usize, Vec<FaceBox>)>>>,
    }

    impl RecordingMosaic {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl FrameMosaic for RecordingMosaic {
        fn apply(
            &self,
            frame: &mut Frame,
            faces: &[FaceBox],
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.calls
                .lock()
                .unwrap()
                .push((frame.index(), faces.to_vec()));
            Ok(())
        }
    }

    // --- Helpers ---

    fn make_frame(index: usize) -> Frame {
        Frame::new(vec![128; 64 * 64 * 3], 64, 64, 3, index)
    }

    fn make_frames(count: usize) -> Vec<Frame> {
        (0..count).map(make_frame).collect()
    }

    fn metadata(total: usize) -> VideoMetadata {
        VideoMetadata {
            width: 64,
            height: 64,
            fps: 30.0,
            total_frames: total,
            codec: String::new(),
            source_path: None,
        }
    }

    fn detector_with(boxes: Vec<FaceBox>) -> Box<dyn FaceDetector> {
        Box::new(StubDetector {
            boxes,
            fail_on: None,
        })
    }

    fn out_path() -> &'static Path {
        Path::new("/tmp/out.mp4")
    }

    // --- Tests ---

    #[test]
    fn test_processes_all_frames_in_order() {
        let writer = StubWriter::new();
        let written = writer.written.clone();

        SequentialPipelineExecutor::new()
            .execute(
                Box::new(StubReader::new(make_frames(5))),
                Box::new(writer),
                detector_with(vec![]),
                Box::new(RecordingMosaic::new()),
                &metadata(5),
                out_path(),
                PipelineConfig::default(),
            )
            .unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 5);
        for (i, frame) in written.iter().enumerate() {
            assert_eq!(frame.index(), i);
        }
    }

    #[test]
    fn test_detected_faces_are_composited() {
        let mosaic = RecordingMosaic::new();
        let calls = mosaic.calls.clone();

        SequentialPipelineExecutor::new()
            .execute(
                Box::new(StubReader::new(make_frames(2))),
                Box::new(StubWriter::new()),
                detector_with(vec![FaceBox::new(10, 10, 20, 20)]),
                Box::new(mosaic),
                &metadata(2),
                out_path(),
                PipelineConfig::default(),
            )
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, vec![FaceBox::new(10, 10, 20, 20)]);
    }

    #[test]
    fn test_click_disables_mosaic_from_its_frame_on() {
        let mosaic = RecordingMosaic::new();
        let calls = mosaic.calls.clone();

        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(ClickEvent::new(1, 15.0, 15.0)).unwrap();
        drop(tx);

        let config = PipelineConfig {
            clicks: Some(rx),
            ..PipelineConfig::default()
        };

        SequentialPipelineExecutor::new()
            .execute(
                Box::new(StubReader::new(make_frames(3))),
                Box::new(StubWriter::new()),
                detector_with(vec![FaceBox::new(10, 10, 20, 20)]),
                Box::new(mosaic),
                &metadata(3),
                out_path(),
                config,
            )
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].1.len(), 1, "frame 0 composites before the click");
        assert!(calls[1].1.is_empty(), "click lands at frame 1");
        assert!(calls[2].1.is_empty(), "toggle persists across tracking");
    }

    #[test]
    fn test_click_scaled_through_view_transform() {
        let mosaic = RecordingMosaic::new();
        let calls = mosaic.calls.clone();

        // Display is half the buffer size: display (8, 8) -> buffer (16, 16).
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(ClickEvent::immediate(8.0, 8.0)).unwrap();
        drop(tx);

        let config = PipelineConfig {
            view: ViewTransform::new((32, 32), (64, 64)),
            clicks: Some(rx),
            ..PipelineConfig::default()
        };

        SequentialPipelineExecutor::new()
            .execute(
                Box::new(StubReader::new(make_frames(1))),
                Box::new(StubWriter::new()),
                detector_with(vec![FaceBox::new(10, 10, 20, 20)]),
                Box::new(mosaic),
                &metadata(1),
                out_path(),
                config,
            )
            .unwrap();

        let calls = calls.lock().unwrap();
        assert!(calls[0].1.is_empty(), "scaled click lands inside the box");
    }

    #[test]
    fn test_click_outside_every_box_changes_nothing() {
        let mosaic = RecordingMosaic::new();
        let calls = mosaic.calls.clone();

        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(ClickEvent::immediate(60.0, 60.0)).unwrap();
        drop(tx);

        let config = PipelineConfig {
            clicks: Some(rx),
            ..PipelineConfig::default()
        };

        SequentialPipelineExecutor::new()
            .execute(
                Box::new(StubReader::new(make_frames(1))),
                Box::new(StubWriter::new()),
                detector_with(vec![FaceBox::new(10, 10, 20, 20)]),
                Box::new(mosaic),
                &metadata(1),
                out_path(),
                config,
            )
            .unwrap();

        assert_eq!(calls.lock().unwrap()[0].1.len(), 1);
    }

    #[test]
    fn test_skip_policy_keeps_faces_across_failed_frame() {
        let mosaic = RecordingMosaic::new();
        let calls = mosaic.calls.clone();

        SequentialPipelineExecutor::new()
            .execute(
                Box::new(StubReader::new(make_frames(3))),
                Box::new(StubWriter::new()),
                Box::new(StubDetector {
                    boxes: vec![FaceBox::new(10, 10, 20, 20)],
                    fail_on: Some(1),
                }),
                Box::new(mosaic),
                &metadata(3),
                out_path(),
                PipelineConfig::default(),
            )
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 3, "failing frame is still composited and written");
        assert_eq!(calls[1].1.len(), 1, "previous faces carried over the failure");
        assert_eq!(calls[2].1.len(), 1);
    }

    #[test]
    fn test_abort_policy_surfaces_detector_error() {
        let writer = StubWriter::new();
        let writer_closed = writer.closed.clone();

        let config = PipelineConfig {
            failure_policy: DetectionFailurePolicy::Abort,
            ..PipelineConfig::default()
        };

        let result = SequentialPipelineExecutor::new().execute(
            Box::new(StubReader::new(make_frames(3))),
            Box::new(writer),
            Box::new(StubDetector {
                boxes: vec![],
                fail_on: Some(1),
            }),
            Box::new(RecordingMosaic::new()),
            &metadata(3),
            out_path(),
            config,
        );

        assert!(result.is_err());
        assert!(*writer_closed.lock().unwrap(), "writer closed on abort");
    }

    #[test]
    fn test_cancellation_checked_at_top_of_iteration() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let writer = StubWriter::new();
        let written = writer.written.clone();

        let cancel_after = cancelled.clone();
        let config = PipelineConfig {
            cancelled,
            on_progress: Some(Box::new(move |current, _total| {
                if current >= 2 {
                    cancel_after.store(true, Ordering::Relaxed);
                }
                true
            })),
            ..PipelineConfig::default()
        };

        SequentialPipelineExecutor::new()
            .execute(
                Box::new(StubReader::new(make_frames(10))),
                Box::new(writer),
                detector_with(vec![]),
                Box::new(RecordingMosaic::new()),
                &metadata(10),
                out_path(),
                config,
            )
            .unwrap();

        assert_eq!(written.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_progress_callback_false_cancels_with_error() {
        let config = PipelineConfig {
            on_progress: Some(Box::new(|current, _| current < 3)),
            ..PipelineConfig::default()
        };

        let result = SequentialPipelineExecutor::new().execute(
            Box::new(StubReader::new(make_frames(10))),
            Box::new(StubWriter::new()),
            detector_with(vec![]),
            Box::new(RecordingMosaic::new()),
            &metadata(10),
            out_path(),
            config,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_closes_reader_and_writer() {
        let reader = StubReader::new(make_frames(2));
        let reader_closed = reader.closed.clone();
        let writer = StubWriter::new();
        let writer_closed = writer.closed.clone();

        SequentialPipelineExecutor::new()
            .execute(
                Box::new(reader),
                Box::new(writer),
                detector_with(vec![]),
                Box::new(RecordingMosaic::new()),
                &metadata(2),
                out_path(),
                PipelineConfig::default(),
            )
            .unwrap();

        assert!(*reader_closed.lock().unwrap());
        assert!(*writer_closed.lock().unwrap());
    }

    #[test]
    fn test_empty_video() {
        let writer = StubWriter::new();
        let written = writer.written.clone();

        SequentialPipelineExecutor::new()
            .execute(
                Box::new(StubReader::new(vec![])),
                Box::new(writer),
                detector_with(vec![]),
                Box::new(RecordingMosaic::new()),
                &metadata(0),
                out_path(),
                PipelineConfig::default(),
            )
            .unwrap();

        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_new_face_after_loss_defaults_back_on() {
        // Face present on frame 0, absent on frame 1, back on frame 2:
        // the frame-0 click must not survive the disappearance.
        struct VanishingDetector;

        impl FaceDetector for VanishingDetector {
            fn detect(
                &mut self,
                frame: &Frame,
            ) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
                Ok(if frame.index() == 1 {
                    vec![]
                } else {
                    vec![FaceBox::new(10, 10, 20, 20)]
                })
            }
        }

        let mosaic = RecordingMosaic::new();
        let calls = mosaic.calls.clone();

        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(ClickEvent::immediate(15.0, 15.0)).unwrap();
        drop(tx);

        let config = PipelineConfig {
            clicks: Some(rx),
            ..PipelineConfig::default()
        };

        SequentialPipelineExecutor::new()
            .execute(
                Box::new(StubReader::new(make_frames(3))),
                Box::new(StubWriter::new()),
                Box::new(VanishingDetector),
                Box::new(mosaic),
                &metadata(3),
                out_path(),
                config,
            )
            .unwrap();

        let calls = calls.lock().unwrap();
        assert!(calls[0].1.is_empty(), "click disables mosaic on frame 0");
        assert!(calls[1].1.is_empty(), "no faces on frame 1");
        assert_eq!(calls[2].1.len(), 1, "reappeared face is mosaic-on again");
    }
}
