//! Extraction of rates from the exchange office's HTML page
//!
//! The page renders a grid whose rows read `<pair> <buy> <sell>`, e.g.
//! `EUR/UAH 3050 3075`, next to a `retail-exchange` block holding the time
//! the rates were last updated.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::error::{KursError, Result};
use crate::models::{Price, Quote};

const UPDATED_AT_FORMAT: &str = "%d.%m.%Y - %H:%M";
const RATES_BLOCK_CLASS: &str = "left-table";

lazy_static! {
    static ref TABLE: Regex = Regex::new(r"(?is)<table[^>]*>(.*?)</table>").unwrap();
    static ref ROW: Regex = Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref RETAIL_BLOCK: Regex = Regex::new(
        r#"(?is)class\s*=\s*["'][^"']*retail-exchange[^"']*["'][^>]*>(.*?)</div>"#
    )
    .unwrap();
    static ref BOLD: Regex = Regex::new(r"(?is)<b(?:\s[^>]*)?>(.*?)</b>").unwrap();
}

/// Visible text of an HTML fragment with whitespace collapsed
fn text_of(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, " ");
    let decoded = stripped.replace("&nbsp;", " ").replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// When the page says the rates were last updated
pub fn parse_updated_at(html: &str) -> Option<NaiveDateTime> {
    let block = RETAIL_BLOCK.captures(html)?.get(1)?.as_str();
    let raw = text_of(BOLD.captures(block)?.get(1)?.as_str());
    let value = raw.rsplit(": ").next().unwrap_or(&raw).trim();

    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, UPDATED_AT_FORMAT) {
        return Some(timestamp);
    }

    // Some layouts prefix the date with a weekday and drop the dash
    let tokens: Vec<&str> = value.split(' ').collect();
    if tokens.len() < 2 {
        return None;
    }
    let joined = tokens[tokens.len() - 2..].join(" - ");
    NaiveDateTime::parse_from_str(&joined, UPDATED_AT_FORMAT).ok()
}

/// Text of each row of the rates grid
fn rate_rows(html: &str) -> Result<Vec<String>> {
    let scope = html
        .find(RATES_BLOCK_CLASS)
        .map_or(html, |start| &html[start..]);

    let table = TABLE
        .captures(scope)
        .and_then(|c| c.get(1))
        .ok_or_else(|| KursError::Page("rates table not found".to_string()))?;

    Ok(ROW
        .captures_iter(table.as_str())
        .filter_map(|row| row.get(1).map(|m| text_of(m.as_str())))
        .filter(|text| !text.is_empty())
        .collect())
}

/// Quotes against the hryvnia, keyed by lowercased pair label
pub fn parse_rates(html: &str) -> Result<BTreeMap<String, Quote>> {
    let mut quotes = BTreeMap::new();

    for row in rate_rows(html)? {
        let row = row.to_lowercase();
        if !(row.contains("гривна") || row.contains("uah")) {
            continue;
        }
        let tokens: Vec<&str> = row.split(' ').collect();
        let [pair, buy, sell] = tokens[..] else {
            continue;
        };

        match (buy.parse::<Price>(), sell.parse::<Price>()) {
            (Ok(buy), Ok(sell)) => {
                quotes.insert(pair.to_string(), Quote { buy, sell });
            }
            _ => warn!("Skipping row with unreadable quotes: '{}'", row),
        }
    }

    if quotes.is_empty() {
        return Err(KursError::Page("no hryvnia quotes on the page".to_string()));
    }

    Ok(quotes)
}
