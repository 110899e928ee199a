use thiserror::Error;

use crate::domain::DatasetKind;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("{dataset} dataset, line {line}: {message}")]
    Parse {
        dataset: DatasetKind,
        line: usize,
        message: String,
    },

    #[error("{dataset} dataset, line {line}: year {year} outside analysis range {min}-{max}")]
    YearOutOfRange {
        dataset: DatasetKind,
        line: usize,
        year: i32,
        min: i32,
        max: i32,
    },

    #[error("insufficient data for {what}: need at least {needed} points, got {got}")]
    InsufficientData {
        what: String,
        needed: usize,
        got: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
