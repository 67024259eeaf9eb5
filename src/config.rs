//! Runtime configuration, read from the environment (and `.env`)

use std::path::PathBuf;

use crate::api::kurs::KursClient;
use crate::error::{KursError, Result};
use crate::models::InstrumentSet;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CHART_WIDTH: u32 = 1800;
pub const DEFAULT_CHART_HEIGHT: u32 = 460;

#[derive(Debug, Clone)]
pub struct Config {
    /// Rates page to scrape (`KURS_URL`)
    pub url: String,
    /// Archive root (`KURS_DATA_DIR`)
    pub data_dir: PathBuf,
    /// Tracked instruments (`KURS_INSTRUMENTS`, `id=pair,...`)
    pub instruments: InstrumentSet,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let instruments = match lookup("KURS_INSTRUMENTS") {
            Some(value) => value.parse()?,
            None => InstrumentSet::default(),
        };

        Ok(Self {
            url: lookup("KURS_URL").unwrap_or_else(|| KursClient::DEFAULT_URL.to_string()),
            data_dir: lookup("KURS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            instruments,
            chart_width: parse_dimension(&lookup, "KURS_CHART_WIDTH", DEFAULT_CHART_WIDTH)?,
            chart_height: parse_dimension(&lookup, "KURS_CHART_HEIGHT", DEFAULT_CHART_HEIGHT)?,
        })
    }
}

fn parse_dimension<F>(lookup: &F, key: &str, default: u32) -> Result<u32>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => match value.trim().parse::<u32>() {
            Ok(pixels) if pixels > 0 => Ok(pixels),
            _ => Err(KursError::Config(format!(
                "{} must be a positive number of pixels, got '{}'",
                key, value
            ))),
        },
    }
}
