use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::tracked_face::TrackedFace;
use crate::interaction::click_event::ClickEvent;
use crate::interaction::view_transform::ViewTransform;
use crate::mosaic::domain::frame_mosaic::FrameMosaic;
use crate::pipeline::face_state::FaceState;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

/// Single-image pipeline: read → detect once → seed faces (mosaic on) →
/// apply clicks → composite → write.
///
/// There is no tracking loop; the face set is computed once at load time.
/// Applying the clicks before the single composite is what makes toggle
/// feedback immediate on static content. Detection failure is fatal here —
/// there is no next frame to skip to.
pub struct MosaicImageUseCase {
    reader: Box<dyn VideoReader>,
    image_writer: Box<dyn ImageWriter>,
    detector: Box<dyn FaceDetector>,
    mosaic: Box<dyn FrameMosaic>,
    view: ViewTransform,
    clicks: Vec<ClickEvent>,
}

impl MosaicImageUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        image_writer: Box<dyn ImageWriter>,
        detector: Box<dyn FaceDetector>,
        mosaic: Box<dyn FrameMosaic>,
        view: ViewTransform,
        clicks: Vec<ClickEvent>,
    ) -> Self {
        Self {
            reader,
            image_writer,
            detector,
            mosaic,
            view,
            clicks,
        }
    }

    /// Runs the one-shot pipeline and returns the final face set so callers
    /// can report each face's id and toggle outcome.
    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<Vec<TrackedFace>, Box<dyn std::error::Error>> {
        let _metadata = self.reader.open(input_path)?;

        let mut frame = self.reader.frames().next().ok_or("No frames in image")??;
        self.reader.close();

        let detections = self.detector.detect(&frame)?;
        let mut state = FaceState::new();
        state.advance(&detections);

        for click in &self.clicks {
            let (bx, by) = self.view.to_buffer(click.x, click.y);
            state.toggle_at(bx, by);
        }

        self.mosaic.apply(&mut frame, &state.mosaic_targets())?;
        self.image_writer.write(output_path, &frame)?;

        Ok(state.faces().to_vec())
    }
}
