pub mod clock;
pub mod frame;
pub mod frame_source;
pub mod mjpeg;

pub use clock::{Clock, FixedRateClock, Stamp, SystemClock};
pub use frame::Frame;
pub use frame_source::{FrameSource, MjpegFrameSource};
pub use mjpeg::MjpegSplitter;
