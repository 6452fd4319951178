use crate::errors::AppResult;
use crate::models::BoundingBox;
use crate::stream::frame::Frame;

/// Frame → face rectangles.
///
/// Implementations may be stateful (e.g. replaying a recording), hence
/// `&mut self`. An empty vector means no face in this frame.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> AppResult<Vec<BoundingBox>>;
}
