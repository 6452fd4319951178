//! Unified application error type.
//! Every module (db, store, archive, pipeline, cli) returns AppError so the
//! ingestion loop can tell transient faults from fatal ones in one place.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Attendance store unavailable: {0}")]
    StoreUnavailable(String),

    // ---------------------------
    // Frames & detection
    // ---------------------------
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Undecodable frame #{index}: {reason}")]
    Frame { index: usize, reason: String },

    #[error("Frame clock error: {0}")]
    Clock(String),

    #[error("Face detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("Detection trace error: {0}")]
    Trace(#[from] csv::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid attendance status: {0}")]
    InvalidStatus(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("Failed to save configuration: {0}")]
    ConfigSave(String),

    // ---------------------------
    // Serialization
    // ---------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Storage or file-write failures: the ingestion loop logs them and keeps going.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::Io(_) | AppError::Db(_) | AppError::Image(_) | AppError::StoreUnavailable(_)
        )
    }

    /// Faults that must stop the process before ingestion starts.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::DetectorUnavailable(_)
                | AppError::Config(_)
                | AppError::ConfigLoad(_)
                | AppError::Migration(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
