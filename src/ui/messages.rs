use crate::models::AttendanceStatus;
use std::fmt;

/// ANSI colors
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

/// Icons
const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";
const ICON_IN: &str = "🟢";
const ICON_OUT: &str = "🔴";

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", FG_BLUE, BOLD, ICON_INFO, RESET, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", FG_GREEN, BOLD, ICON_OK, RESET, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", FG_YELLOW, BOLD, ICON_WARN, RESET, msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}{}{} {}{}", FG_RED, BOLD, ICON_ERR, RESET, msg);
}

/// `🟢 Person 1 is now PRESENT at 09:00:00`
pub fn presence(person: &str, status: AttendanceStatus, hms: &str) {
    let (icon, color) = match status {
        AttendanceStatus::Present => (ICON_IN, FG_GREEN),
        AttendanceStatus::Absent => (ICON_OUT, FG_RED),
    };
    println!(
        "{} {} is now {}{}{}{} at {}",
        icon, person, color, BOLD, status, RESET, hms
    );
}
