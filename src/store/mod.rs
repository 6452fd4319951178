pub mod attendance_store;

pub use attendance_store::{AttendanceStore, RecordOutcome};
