use crate::errors::AppResult;
use crate::models::Transition;
use crate::utils::time::{fmt_date, fmt_hms};
use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only, one text file per day: `attendance_<YYYY-MM-DD>.txt`.
/// Audit trail only; nothing reads it back.
pub struct EventLog {
    dir: PathBuf,
}

impl EventLog {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn file_for(&self, date: &NaiveDate) -> PathBuf {
        self.dir.join(format!("attendance_{}.txt", fmt_date(date)))
    }

    pub fn format_line(person: &str, tr: &Transition) -> String {
        format!(
            "{} - Date: {}, Time: {}, Status: {}",
            person,
            fmt_date(&tr.at.date()),
            fmt_hms(&tr.at),
            tr.status
        )
    }

    /// Append one line for `tr` and return the file written.
    pub fn append(&self, person: &str, tr: &Transition) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.file_for(&tr.at.date());

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", Self::format_line(person, tr))?;

        Ok(path)
    }
}
