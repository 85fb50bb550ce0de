use crate::mosaic::domain::frame_mosaic::FrameMosaic;
use crate::mosaic::domain::pixelator::Pixelator;

use super::block_average::BlockAveragePixelator;
use super::elliptical_mosaic::EllipticalMosaic;
use super::rectangular_mosaic::RectangularMosaic;
use super::shrink_expand::ShrinkExpandPixelator;

/// Mask shape of the composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MosaicShape {
    Elliptical,
    Rectangular,
}

/// Pixelation strategy selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelationStyle {
    /// Downsample/upsample; cheap, video default.
    ShrinkExpand,
    /// Flat cell grid; image default.
    BlockAverage,
}

/// Builds the compositor/pixelator combination for a run and logs the
/// selection.
pub fn create_mosaic(
    shape: MosaicShape,
    style: PixelationStyle,
    block_size: usize,
    shrink_factor: f64,
) -> Box<dyn FrameMosaic> {
    log::info!(
        "Using {:?} mosaic with {:?} pixelation (block_size={}, shrink_factor={})",
        shape,
        style,
        block_size,
        shrink_factor
    );

    let pixelator: Box<dyn Pixelator> = match style {
        PixelationStyle::ShrinkExpand => Box::new(ShrinkExpandPixelator::new(shrink_factor)),
        PixelationStyle::BlockAverage => Box::new(BlockAveragePixelator::new(block_size)),
    };

    match shape {
        MosaicShape::Elliptical => Box::new(EllipticalMosaic::new(pixelator)),
        MosaicShape::Rectangular => Box::new(RectangularMosaic::new(pixelator)),
    }
}
