//! Time utilities: timestamp storage format, API formats, CLI parsing.

use crate::errors::{AppError, AppResult};
use crate::utils::date::today;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::time::Duration;

/// Storage format for `time_in` / `time_out` (local wall time, sub-second kept).
pub const TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const HMS_FORMAT: &str = "%H:%M:%S";

pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

pub fn parse_ts(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

pub fn fmt_date(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

pub fn fmt_hms(ts: &NaiveDateTime) -> String {
    ts.format(HMS_FORMAT).to_string()
}

/// Parse a user-supplied instant.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]`, the ISO `T` separator, or a bare
/// `HH:MM[:SS]` which is taken as today.
pub fn parse_cli_datetime(s: &str) -> AppResult<NaiveDateTime> {
    let s = s.trim();
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in ["%H:%M:%S", "%H:%M"] {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Ok(today().and_time(t));
        }
    }
    Err(AppError::InvalidTime(s.to_string()))
}

/// Seconds (as configured) → duration. Negative, NaN or huge values are rejected.
pub fn secs_to_duration(secs: f64) -> AppResult<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| AppError::Config(format!("{} is not a usable number of seconds: {}", secs, e)))
}
