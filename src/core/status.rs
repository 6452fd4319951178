use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::report::{AttendanceReport, ReportResponse};
use crate::store::AttendanceStore;
use crate::utils::colors::{RESET, color_for_status};
use crate::utils::table::Table;
use crate::utils::time::fmt_date;
use chrono::NaiveDate;

pub struct StatusLogic;

impl StatusLogic {
    /// Tabular view of one day's records.
    pub fn list(store: &AttendanceStore, date: NaiveDate) -> AppResult<()> {
        let records = store.list_records_for_date(date)?;

        if records.is_empty() {
            println!("⚠️  No attendance recorded for {}", fmt_date(&date));
            return Ok(());
        }

        let mut table = Table::new(&["ID", "PERSON", "DATE", "IN", "OUT", "STATUS", "IMAGE"]);
        for r in &records {
            let v = r.to_view();
            table.add_row(vec![
                v.id.to_string(),
                v.person_name,
                v.date,
                v.time_in,
                v.time_out.unwrap_or_else(|| "--:--:--".into()),
                v.status.to_string(),
                r.image_path.clone().unwrap_or_else(|| "-".into()),
            ]);
        }

        println!("📅 Attendance for {}\n", fmt_date(&date));
        print!("{}", table.render());
        Ok(())
    }

    /// One-line summary, or the full report as JSON.
    ///
    /// A storage fault is still printed in JSON mode (`{"error": ...}`)
    /// before being returned.
    pub fn status(
        store: &AttendanceStore,
        cfg: &Config,
        date: NaiveDate,
        json: bool,
    ) -> AppResult<()> {
        let result = AttendanceReport::build(store, &cfg.faces_path(), &cfg.image_ext, date);

        if json {
            let resp = ReportResponse::from_result(result);
            println!("{}", resp.to_json()?);
            return match resp {
                ReportResponse::Err(e) => Err(AppError::StoreUnavailable(e.error)),
                ReportResponse::Ok(_) => Ok(()),
            };
        }

        let report = result?;
        let color = color_for_status(report.current_status);
        println!(
            "📍 {}: {}{}{} ({} record(s), {} face image(s))",
            fmt_date(&date),
            color,
            report.current_status,
            RESET,
            report.attendance.len(),
            report.face_images.len()
        );
        Ok(())
    }
}
