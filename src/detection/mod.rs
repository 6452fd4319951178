pub mod face_detector;
pub mod trace_detector;

pub use face_detector::FaceDetector;
pub use trace_detector::TraceDetector;
