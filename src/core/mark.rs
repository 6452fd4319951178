use crate::config::Config;
use crate::errors::AppResult;
use crate::eventlog::EventLog;
use crate::models::{AttendanceStatus, Transition};
use crate::store::{AttendanceStore, RecordOutcome};
use crate::ui::messages::{info, presence, warning};
use crate::utils::time::{fmt_hms, fmt_ts};

pub struct MarkLogic;

impl MarkLogic {
    /// Write a transition by hand, the same way the tracker would:
    /// store row first, then the day's text log.
    pub fn apply(
        store: &AttendanceStore,
        cfg: &Config,
        person: &str,
        tr: Transition,
    ) -> AppResult<RecordOutcome> {
        let outcome = store.record_transition(person, tr.at, tr.status, None)?;

        if !outcome.is_write() {
            info(format!(
                "Record #{} already reflects {} at {}, nothing to do.",
                outcome.record_id(),
                tr.status,
                fmt_ts(&tr.at)
            ));
            return Ok(outcome);
        }

        let day_log = EventLog::new(&cfg.logs_path());
        if let Err(e) = day_log.append(person, &tr) {
            warning(format!("Day log not updated: {}", e));
        }

        if let Err(e) = store.audit(
            "mark",
            person,
            &format!("{} at {} (record #{})", tr.status, fmt_ts(&tr.at), outcome.record_id()),
        ) {
            warning(format!("Failed to write internal log: {}", e));
        }

        presence(person, tr.status, &fmt_hms(&tr.at));
        Ok(outcome)
    }

    pub fn parse_status(s: &str) -> AppResult<AttendanceStatus> {
        s.parse()
    }
}
