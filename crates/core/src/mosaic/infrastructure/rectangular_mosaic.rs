use std::cell::RefCell;

use crate::mosaic::domain::frame_mosaic::FrameMosaic;
use crate::mosaic::domain::pixelator::Pixelator;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

use super::roi::{extract_roi, write_roi_back, RoiRect};

/// Composites the pixelated region back over the full face rectangle.
///
/// Still-image output keeps the hard rectangular edge; the elliptical soft
/// mask is a video-mode treatment.
pub struct RectangularMosaic {
    pixelator: Box<dyn Pixelator>,
    roi_buf: RefCell<Vec<u8>>,
}

impl RectangularMosaic {
    pub fn new(pixelator: Box<dyn Pixelator>) -> Self {
        Self {
            pixelator,
            roi_buf: RefCell::new(Vec::new()),
        }
    }
}

impl FrameMosaic for RectangularMosaic {
    fn apply(
        &self,
        frame: &mut Frame,
        faces: &[FaceBox],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let fw = frame.width() as usize;
        let channels = frame.channels() as usize;

        for face in faces {
            let Some(clamped) = face.clamped(frame.width(), frame.height()) else {
                continue;
            };
            let rect = RoiRect::from_clamped(&clamped);

            let mut roi = self.roi_buf.borrow_mut();
            extract_roi(frame.data(), fw, channels, rect, &mut roi);
            self.pixelator.pixelate(&mut roi, rect.w, rect.h, channels);
            write_roi_back(frame.data_mut(), &roi, fw, channels, rect);
        }

        Ok(())
    }
}
