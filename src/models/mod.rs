pub mod attendance_record;
pub mod bounding_box;
pub mod person;
pub mod status;
pub mod transition;

pub use attendance_record::{AttendanceRecord, AttendanceRecordView};
pub use bounding_box::BoundingBox;
pub use person::Person;
pub use status::AttendanceStatus;
pub use transition::Transition;
