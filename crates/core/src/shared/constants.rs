/// Cell size for block-average pixelation, in pixels.
pub const DEFAULT_BLOCK_SIZE: usize = 15;

/// Downscale factor for shrink/expand pixelation (0 < factor < 1).
pub const DEFAULT_SHRINK_FACTOR: f64 = 0.1;

/// A detection matches a previous face when their centers are closer than
/// `MATCH_RADIUS_FACTOR * max(width, height)` of the detection.
pub const MATCH_RADIUS_FACTOR: f64 = 1.5;

/// Horizontal shrink of the elliptical mosaic mask relative to the face box.
/// The vertical semi-axis uses the full box half-height.
pub const ELLIPSE_WIDTH_RATIO: f64 = 0.8;

/// Encoding rate for the recording sink when the source rate is unknown.
pub const RECORDING_FPS: f64 = 30.0;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
