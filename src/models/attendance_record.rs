use super::status::AttendanceStatus;
use crate::utils::time::{fmt_date, fmt_hms};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One row per (person, date).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: i64,
    pub person_id: i64,
    pub person_name: String,
    pub date: NaiveDate,                 // ⇔ attendance.date (TEXT "YYYY-MM-DD")
    pub time_in: NaiveDateTime,          // ⇔ attendance.time_in (TEXT ISO8601)
    pub time_out: Option<NaiveDateTime>, // ⇔ attendance.time_out (NULL until first update)
    pub status: AttendanceStatus,        // ⇔ attendance.status ('PRESENT' | 'ABSENT')
    pub image_path: Option<String>,      // ⇔ attendance.image_path
}

/// Wire shape served to the query API.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttendanceRecordView {
    pub id: i64,
    pub person_id: i64,
    pub person_name: String,
    pub date: String,
    pub time_in: String,
    pub time_out: Option<String>,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn to_view(&self) -> AttendanceRecordView {
        AttendanceRecordView {
            id: self.id,
            person_id: self.person_id,
            person_name: self.person_name.clone(),
            date: fmt_date(&self.date),
            time_in: fmt_hms(&self.time_in),
            time_out: self.time_out.as_ref().map(fmt_hms),
            status: self.status,
        }
    }
}
