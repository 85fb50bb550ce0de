use crate::shared::face_box::FaceBox;

/// A face carried across frames with its user-controlled mosaic toggle.
///
/// `id` is assigned once at creation and survives matching, so clicks and
/// CLI output can refer to a face independently of its position in the
/// per-tick collection. A face that disappears and comes back gets a new
/// id — there is no re-identification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackedFace {
    pub id: u32,
    pub face_box: FaceBox,
    pub mosaic_enabled: bool,
}

impl TrackedFace {
    /// A freshly detected face: mosaic on by default (privacy-safe).
    pub fn new(id: u32, face_box: FaceBox) -> Self {
        Self {
            id,
            face_box,
            mosaic_enabled: true,
        }
    }
}
