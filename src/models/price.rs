//! Canonical price representation
//!
//! Quotes arrive as text in a few shapes (`2635`, `0.447`, `1,182`). Every
//! quote is parsed once into a fixed-point integer so that equality and
//! ordering never depend on how the value was written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::KursError;

/// Minor units per whole price unit (three fractional digits)
pub const PRICE_SCALE: i64 = 1000;

const MAX_FRACTION_DIGITS: usize = 3;

/// A non-negative quote in fixed-point minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    /// Value as a float, for plotting only
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }
}

#[cfg(test)]
impl Price {
    /// Price of a whole number of units, e.g. `Price::whole(2635)`
    pub const fn whole(units: i64) -> Self {
        Price(units * PRICE_SCALE)
    }

    pub const fn from_minor(minor: i64) -> Self {
        Price(minor)
    }

    pub fn minor(self) -> i64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = KursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KursError::InvalidPrice(s.to_string());
        let text = s.trim().replace(',', ".");

        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (text.as_str(), None),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut minor: i64 = whole
            .parse::<i64>()
            .ok()
            .and_then(|w| w.checked_mul(PRICE_SCALE))
            .ok_or_else(invalid)?;

        if let Some(fraction) = fraction {
            if fraction.is_empty()
                || fraction.len() > MAX_FRACTION_DIGITS
                || !fraction.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(invalid());
            }
            let padded = format!("{:0<width$}", fraction, width = MAX_FRACTION_DIGITS);
            let fraction_minor: i64 = padded.parse().map_err(|_| invalid())?;
            minor = minor.checked_add(fraction_minor).ok_or_else(invalid)?;
        }

        Ok(Price(minor))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / PRICE_SCALE;
        let fraction = self.0 % PRICE_SCALE;
        if fraction == 0 {
            write!(f, "{}", whole)
        } else {
            let digits = format!("{:03}", fraction);
            write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPrice {
            Text(String),
            Units(u64),
        }

        match RawPrice::deserialize(deserializer)? {
            RawPrice::Text(text) => text.parse().map_err(serde::de::Error::custom),
            RawPrice::Units(units) => i64::try_from(units)
                .ok()
                .and_then(|u| u.checked_mul(PRICE_SCALE))
                .map(Price)
                .ok_or_else(|| serde::de::Error::custom(format!("price {} out of range", units))),
        }
    }
}
