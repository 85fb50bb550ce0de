use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Reads frames from a video or image source.
///
/// Implementations own the container/codec details; the pipeline sees only
/// `Frame` and `VideoMetadata`. Metadata (intrinsic width/height) must be
/// available from `open` before the first frame is requested, so output
/// buffers can be sized up front.
pub trait VideoReader: Send {
    /// Opens a media file and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in decode order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the reader.
    fn close(&mut self);
}
