use crate::models::SnapshotRecord;

/// Decide whether a freshly collected snapshot is worth archiving.
///
/// Only the quotes are compared; a repeat of the last archived quotes under a
/// newer timestamp is suppressed. An empty partition always accepts.
pub fn should_persist(candidate: &SnapshotRecord, last_persisted: Option<&SnapshotRecord>) -> bool {
    match last_persisted {
        Some(last) => !candidate.same_quotes(last),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Price, Quote};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::BTreeMap;

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(hour: u32, usd: (&str, &str), eur: (&str, &str)) -> SnapshotRecord {
        let mut quotes = BTreeMap::new();
        quotes.insert(
            "usd/uah".to_string(),
            Quote { buy: usd.0.parse().unwrap(), sell: usd.1.parse().unwrap() },
        );
        quotes.insert(
            "eur/uah".to_string(),
            Quote { buy: eur.0.parse().unwrap(), sell: eur.1.parse().unwrap() },
        );
        SnapshotRecord::new(ts(hour), quotes)
    }

    #[test]
    fn test_empty_partition_accepts() {
        let candidate = record(9, ("2700", "2720"), ("3050", "3075"));
        assert!(should_persist(&candidate, None));
    }

    #[test]
    fn test_identical_snapshot_is_suppressed() {
        let candidate = record(9, ("2700", "2720"), ("3050", "3075"));
        assert!(!should_persist(&candidate, Some(&candidate)));
    }

    #[test]
    fn test_timestamp_is_ignored() {
        let last = record(9, ("2700", "2720"), ("3050", "3075"));
        let candidate = record(10, ("2700", "2720"), ("3050", "3075"));
        assert!(!should_persist(&candidate, Some(&last)));
    }

    #[test]
    fn test_differently_written_numbers_are_duplicates() {
        let last = record(9, ("2700", "2720"), ("3050", "3075"));
        let candidate = record(10, ("2700.0", "2720,000"), ("3050", "3075"));
        assert!(!should_persist(&candidate, Some(&last)));
    }

    #[test]
    fn test_any_changed_quote_is_persisted() {
        let last = record(9, ("2700", "2720"), ("3050", "3075"));
        let changed = [
            record(10, ("2701", "2720"), ("3050", "3075")),
            record(10, ("2700", "2721"), ("3050", "3075")),
            record(10, ("2700", "2720"), ("3051", "3075")),
            record(10, ("2700", "2720"), ("3050", "3074")),
        ];
        for candidate in &changed {
            assert!(should_persist(candidate, Some(&last)));
        }
    }

    #[test]
    fn test_added_pair_is_persisted() {
        let last = record(9, ("2700", "2720"), ("3050", "3075"));
        let mut candidate = last.clone();
        candidate.quotes.insert(
            "pln/uah".to_string(),
            Quote { buy: Price::whole(700), sell: Price::whole(720) },
        );
        assert!(should_persist(&candidate, Some(&last)));
    }
}
