//! Snapshot records as collected from the rates page and kept in the archive

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::instrument::Instrument;
use super::price::Price;
use crate::error::{KursError, Result};

/// Buy/sell pair as published by the exchange office
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "they_buy")]
    pub buy: Price,
    #[serde(rename = "they_sell")]
    pub sell: Price,
}

/// One instrument's quote at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub instrument: String,
    pub buy: Price,
    pub sell: Price,
}

/// On-disk shape: everything sits under the heading of the page's rates table
#[derive(Serialize, Deserialize)]
struct ArchiveBody {
    #[serde(rename = "Индикативный курс")]
    rates: BTreeMap<String, Quote>,
}

/// Everything collected in one run: the time the page says the rates were
/// updated plus a quote per currency pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub timestamp: NaiveDateTime,
    pub quotes: BTreeMap<String, Quote>,
}

impl SnapshotRecord {
    pub fn new(timestamp: NaiveDateTime, quotes: BTreeMap<String, Quote>) -> Self {
        let quotes = quotes
            .into_iter()
            .map(|(pair, quote)| (pair.to_lowercase(), quote))
            .collect();
        Self { timestamp, quotes }
    }

    /// Quote for `instrument` in this record
    pub fn observation(&self, instrument: &Instrument) -> Result<Observation> {
        let quote = self
            .quotes
            .get(&instrument.label)
            .ok_or_else(|| KursError::MissingInstrument {
                timestamp: self.timestamp.to_string(),
                pair: instrument.label.clone(),
            })?;

        Ok(Observation {
            timestamp: self.timestamp,
            instrument: instrument.id.clone(),
            buy: quote.buy,
            sell: quote.sell,
        })
    }

    /// True when both records carry the same quotes, whatever their timestamps
    pub fn same_quotes(&self, other: &SnapshotRecord) -> bool {
        self.quotes == other.quotes
    }

    /// Archive body: four-space indented JSON with sorted keys
    pub fn to_json(&self) -> Result<String> {
        let body = ArchiveBody {
            rates: self.quotes.clone(),
        };
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        body.serialize(&mut serializer)?;
        String::from_utf8(out)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
    }

    /// Parse an archive body; the timestamp comes from wherever the body was stored
    pub fn from_json(timestamp: NaiveDateTime, text: &str) -> Result<Self> {
        let body: ArchiveBody = serde_json::from_str(text)?;
        Ok(Self::new(timestamp, body.rates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    const SAMPLE: &str = r#"{
    "Индикативный курс": {
        "eur/uah": {
            "they_buy": "3050",
            "they_sell": "3075"
        },
        "rub/uah": {
            "they_buy": "0.416",
            "they_sell": "0.424"
        },
        "usd/uah": {
            "they_buy": "2700",
            "they_sell": "2720"
        }
    }
}"#;

    #[test]
    fn test_body_round_trips_in_archive_format() {
        let record = SnapshotRecord::from_json(ts(9), SAMPLE).unwrap();
        assert_eq!(record.quotes.len(), 3);
        assert_eq!(record.to_json().unwrap(), SAMPLE);
    }

    #[test]
    fn test_observation_for_tracked_pair() {
        let record = SnapshotRecord::from_json(ts(9), SAMPLE).unwrap();
        let usd = record.observation(&Instrument::new("usd", "usd/uah")).unwrap();
        assert_eq!(usd.instrument, "usd");
        assert_eq!(usd.buy, Price::whole(2700));
        assert_eq!(usd.sell, Price::whole(2720));
    }

    #[test]
    fn test_missing_pair_is_an_error() {
        let record = SnapshotRecord::from_json(ts(9), SAMPLE).unwrap();
        let err = record
            .observation(&Instrument::new("gbp", "gbp/uah"))
            .unwrap_err();
        assert!(matches!(err, KursError::MissingInstrument { .. }));
    }

    #[test]
    fn test_legacy_capitalised_pairs_are_normalised() {
        let legacy = r#"{"Индикативный курс": {"Доллар/Гривна": {"they_buy": 2635, "they_sell": "2655"}}}"#;
        let record = SnapshotRecord::from_json(ts(9), legacy).unwrap();
        let usd = record
            .observation(&Instrument::new("usd", "Доллар/Гривна"))
            .unwrap();
        assert_eq!(usd.buy, Price::whole(2635));
    }

    #[test]
    fn test_non_numeric_quote_is_rejected() {
        let broken = r#"{"Индикативный курс": {"usd/uah": {"they_buy": "n/a", "they_sell": "2655"}}}"#;
        assert!(SnapshotRecord::from_json(ts(9), broken).is_err());
    }
}
