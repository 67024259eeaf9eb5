//! Record file names: `YYYY_MM_DD__HH_MM_SS.json`

use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::{KursError, Result};

pub const FILE_TIMESTAMP_FORMAT: &str = "%Y_%m_%d__%H_%M_%S";
pub const RECORD_EXTENSION: &str = "json";

pub fn file_name(timestamp: &NaiveDateTime) -> String {
    format!("{}.{}", timestamp.format(FILE_TIMESTAMP_FORMAT), RECORD_EXTENSION)
}

pub fn is_record_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION)
}

/// Timestamp encoded in a record's file name
pub fn parse_file_name(path: &Path) -> Result<NaiveDateTime> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| KursError::BadTimestamp(path.display().to_string()))?;

    NaiveDateTime::parse_from_str(stem, FILE_TIMESTAMP_FORMAT)
        .map_err(|_| KursError::BadTimestamp(path.display().to_string()))
}
