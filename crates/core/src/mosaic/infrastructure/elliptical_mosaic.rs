use std::cell::RefCell;

use crate::mosaic::domain::frame_mosaic::FrameMosaic;
use crate::mosaic::domain::pixelator::Pixelator;
use crate::shared::constants::ELLIPSE_WIDTH_RATIO;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

use super::roi::{extract_roi, RoiRect};

/// Composites the pixelated face region back into the frame through an
/// elliptical mask, so the mosaic has no hard rectangular edge.
///
/// Semi-axes are 0.8x the box half-width and the full box half-height,
/// centered on the *unclamped* box — a face sliding off the frame edge
/// keeps its ellipse geometry instead of having it collapse inward.
/// Masking is per pixel, so no clip state can leak into later draws.
pub struct EllipticalMosaic {
    pixelator: Box<dyn Pixelator>,
    roi_buf: RefCell<Vec<u8>>,
}

impl EllipticalMosaic {
    pub fn new(pixelator: Box<dyn Pixelator>) -> Self {
        Self {
            pixelator,
            roi_buf: RefCell::new(Vec::new()),
        }
    }
}

impl FrameMosaic for EllipticalMosaic {
    fn apply(
        &self,
        frame: &mut Frame,
        faces: &[FaceBox],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let fw = frame.width() as usize;
        let fh = frame.height();
        let channels = frame.channels() as usize;

        for face in faces {
            let Some(clamped) = face.clamped(frame.width(), fh) else {
                continue;
            };
            let rect = RoiRect::from_clamped(&clamped);

            let mut roi = self.roi_buf.borrow_mut();
            extract_roi(frame.data(), fw, channels, rect, &mut roi);
            self.pixelator.pixelate(&mut roi, rect.w, rect.h, channels);

            composite_ellipse(frame.data_mut(), &roi, fw, channels, rect, face, &clamped);
        }

        Ok(())
    }
}

/// Writes pixelated pixels back only where they fall inside the ellipse.
fn composite_ellipse(
    data: &mut [u8],
    roi: &[u8],
    frame_width: usize,
    channels: usize,
    rect: RoiRect,
    face: &FaceBox,
    clamped: &FaceBox,
) {
    let semi_a = ELLIPSE_WIDTH_RATIO * face.width as f64 / 2.0;
    let semi_b = face.height as f64 / 2.0;
    if semi_a <= 0.0 || semi_b <= 0.0 {
        return;
    }

    // Ellipse center relative to the clamped ROI origin; offset keeps the
    // geometry anchored to the unclamped box at frame edges.
    let (fcx, fcy) = face.center();
    let ecx = fcx - clamped.x as f64;
    let ecy = fcy - clamped.y as f64;

    let inv_a_sq = 1.0 / (semi_a * semi_a);
    let inv_b_sq = 1.0 / (semi_b * semi_b);

    for row in 0..rect.h {
        for col in 0..rect.w {
            let dx = col as f64 + 0.5 - ecx;
            let dy = row as f64 + 0.5 - ecy;

            if dx * dx * inv_a_sq + dy * dy * inv_b_sq <= 1.0 {
                let dst = ((rect.y + row) * frame_width + (rect.x + col)) * channels;
                let src = (row * rect.w + col) * channels;
                data[dst..dst + channels].copy_from_slice(&roi[src..src + channels]);
            }
        }
    }
}
