use crate::archive::list_images;
use crate::errors::AppResult;
use crate::models::{AttendanceRecordView, AttendanceStatus};
use crate::store::AttendanceStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

/// Payload of the attendance query endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttendanceReport {
    pub attendance: Vec<AttendanceRecordView>,
    pub face_images: Vec<String>,
    pub current_status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorReport {
    pub error: String,
}

/// Either a report (possibly empty) or a storage fault with its message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReportResponse {
    Ok(AttendanceReport),
    Err(ErrorReport),
}

impl AttendanceReport {
    pub fn build(
        store: &AttendanceStore,
        faces_dir: &Path,
        image_ext: &str,
        date: NaiveDate,
    ) -> AppResult<Self> {
        let attendance = store
            .list_records_for_date(date)?
            .iter()
            .map(|r| r.to_view())
            .collect();
        let current_status = store.current_status(date)?;
        let face_images = list_images(faces_dir, image_ext)?;

        Ok(Self {
            attendance,
            face_images,
            current_status,
        })
    }
}

impl ReportResponse {
    pub fn from_result(result: AppResult<AttendanceReport>) -> Self {
        match result {
            Ok(r) => ReportResponse::Ok(r),
            Err(e) => ReportResponse::Err(ErrorReport {
                error: e.to_string(),
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ReportResponse::Err(_))
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
