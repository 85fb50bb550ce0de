/// Pixelation strategy: turns a face region into a blocky, low-detail
/// version of itself.
///
/// Operates in place on an ROI buffer the compositor has already copied out
/// of the frame, so a strategy can never touch pixels outside the rectangle
/// or mutate the source frame.
pub trait Pixelator: Send {
    fn pixelate(&self, roi: &mut [u8], width: usize, height: usize, channels: usize);
}
