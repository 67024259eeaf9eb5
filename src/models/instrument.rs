//! Tracked instruments

use std::str::FromStr;

use crate::error::KursError;

/// A tracked currency: short id used in file names and charts, plus the
/// pair label it is published under on the rates page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub id: String,
    pub label: String,
}

impl Instrument {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_lowercase(),
        }
    }
}

/// Ordered, non-empty set of instruments with unique ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentSet(Vec<Instrument>);

impl InstrumentSet {
    pub fn new(instruments: Vec<Instrument>) -> Result<Self, KursError> {
        if instruments.is_empty() {
            return Err(KursError::Config("at least one instrument is required".to_string()));
        }
        for (i, instrument) in instruments.iter().enumerate() {
            if instrument.id.is_empty() || instrument.label.is_empty() {
                return Err(KursError::Config(format!(
                    "instrument #{} needs both an id and a pair label",
                    i + 1
                )));
            }
            if instruments[..i].iter().any(|other| other.id == instrument.id) {
                return Err(KursError::Config(format!(
                    "instrument '{}' is listed twice",
                    instrument.id
                )));
            }
        }
        Ok(Self(instruments))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Default for InstrumentSet {
    fn default() -> Self {
        Self(vec![
            Instrument::new("usd", "usd/uah"),
            Instrument::new("euro", "eur/uah"),
        ])
    }
}

/// Parses `id=pair,id=pair`, e.g. `usd=usd/uah,euro=eur/uah`
impl FromStr for InstrumentSet {
    type Err = KursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let instruments = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .split_once('=')
                    .map(|(id, label)| Instrument::new(id.trim(), label.trim()))
                    .ok_or_else(|| {
                        KursError::Config(format!("expected id=pair, got '{}'", entry))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        InstrumentSet::new(instruments)
    }
}
