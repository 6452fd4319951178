pub mod attendance_report;

pub use attendance_report::{AttendanceReport, ErrorReport, ReportResponse};
