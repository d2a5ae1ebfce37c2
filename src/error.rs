use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{RateClass, Season};

#[derive(Error, Debug)]
pub enum RateError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}:{line}: invalid date '{value}' in column '{column}' (expected {format})", .path.display())]
    InvalidDate { path: PathBuf, line: u64, column: &'static str, value: String, format: &'static str },

    #[error("{}:{line}: non-numeric value '{value}' in column '{column}'", .path.display())]
    InvalidNumber { path: PathBuf, line: u64, column: &'static str, value: String },

    #[error("{}:{line}: unknown rate class '{value}'", .path.display())]
    UnknownClass { path: PathBuf, line: u64, value: String },

    #[error("{}:{line}: unknown season '{value}'", .path.display())]
    UnknownSeason { path: PathBuf, line: u64, value: String },

    #[error("{}:{line}: rate is out of range", .path.display())]
    RateOverflow { path: PathBuf, line: u64 },

    #[error("{class} {season} on {effective_date}: total rate is out of range")]
    TotalOverflow { class: RateClass, season: Season, effective_date: NaiveDate },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render the report")]
    Render(#[from] std::fmt::Error),
}

pub type RateResult<T> = Result<T, RateError>;
