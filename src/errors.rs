//! Unified application error type.
//! All modules (db, core, cli, export) return AppError so that every failure
//! reaches the command layer as one typed reason with a printable message.

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

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ---------------------------
    // Ledger errors
    // ---------------------------
    #[error("Unknown firefighter: {0}")]
    UnknownFirefighter(String),

    #[error("Firefighter {0} is already clocked in")]
    AlreadyClockedIn(String),

    #[error("No open clock-in found for firefighter {0}")]
    NoOpenEntry(String),

    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    #[error("Time log entry not found: {0}")]
    EntryNotFound(i64),

    // ---------------------------
    // Directory errors
    // ---------------------------
    #[error("Firefighter number {0} is already registered")]
    DuplicateFirefighter(String),

    #[error("Unknown activity category: {0}")]
    UnknownCategory(String),

    #[error("Activity category already exists: {0}")]
    DuplicateCategory(String),

    #[error("Activity category '{0}' is used by {1} time log entries")]
    CategoryInUse(String, i64),

    #[error("Invalid activity category: {0}")]
    InvalidCategory(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),
}

pub type AppResult<T> = Result<T, AppError>;
