//! Crate-wide error type

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum KursError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid price '{0}'")]
    InvalidPrice(String),

    #[error("Record {timestamp} has no quote for '{pair}'")]
    MissingInstrument { timestamp: String, pair: String },

    #[error("Malformed record {}: {reason}", .path.display())]
    MalformedRecord { path: PathBuf, reason: String },

    #[error("Cannot derive a timestamp from '{0}'")]
    BadTimestamp(String),

    #[error("Refusing to overwrite existing record {}", .0.display())]
    RecordExists(PathBuf),

    #[error("Page error: {0}")]
    Page(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, KursError>;
