use super::status::AttendanceStatus;
use chrono::NaiveDateTime;
use serde::Serialize;

/// A change of debounced presence, stamped with the frame time that caused it.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Transition {
    pub at: NaiveDateTime,
    pub status: AttendanceStatus,
}

impl Transition {
    pub fn new(at: NaiveDateTime, status: AttendanceStatus) -> Self {
        Self { at, status }
    }
}
