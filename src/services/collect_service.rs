use std::path::PathBuf;

use chrono::{Local, NaiveDateTime, Timelike};
use tracing::{info, warn};

use crate::api::kurs::{page, KursClient};
use crate::archive::{Archive, Partition};
use crate::error::Result;
use crate::models::SnapshotRecord;
use crate::services::dedup_service::should_persist;

/// What happened to a collected snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectOutcome {
    Written(PathBuf),
    /// Same quotes as the last archived record of the partition
    Duplicate,
    /// New quotes, but writing was disabled
    DryRun,
}

#[derive(Debug)]
pub struct CollectResult {
    pub record: SnapshotRecord,
    pub outcome: CollectOutcome,
}

/// Build a snapshot from the rates page.
/// `now` stands in for the update time when the page does not state one.
pub fn snapshot_from_page(html: &str, now: NaiveDateTime) -> Result<SnapshotRecord> {
    let timestamp = match page::parse_updated_at(html) {
        Some(timestamp) => timestamp,
        None => {
            warn!("Failed to get 'updated_at' from the web page, using current time {}", now);
            now
        }
    };
    info!("Currency rates updated at {}", timestamp);

    let quotes = page::parse_rates(html)?;
    Ok(SnapshotRecord::new(timestamp, quotes))
}

/// Archive `record` unless it repeats the partition's latest record
pub fn archive_snapshot(archive: &Archive, record: &SnapshotRecord, dry_run: bool) -> Result<CollectOutcome> {
    let partition = Partition::of(&record.timestamp);
    let last = archive.last_record(&partition)?;

    if !should_persist(record, last.as_ref()) {
        info!("SKIP writing: data is the same as in the previous file of {}", partition);
        return Ok(CollectOutcome::Duplicate);
    }

    if dry_run {
        info!("SKIP writing: dry run");
        return Ok(CollectOutcome::DryRun);
    }

    // The page may correct its quotes without moving the update time
    let path = match last {
        Some(last) if last.timestamp == record.timestamp => {
            info!("Quotes changed within {}, replacing the stored record", record.timestamp);
            archive.replace(record)?
        }
        _ => archive.write(record)?,
    };
    info!("Wrote collected data to {}", path.display());
    Ok(CollectOutcome::Written(path))
}

/// Download, parse and archive one snapshot
pub async fn collect(client: &KursClient, archive: &Archive, dry_run: bool) -> Result<CollectResult> {
    info!("Downloading web page {}...", client.url());
    let html = client.fetch_page().await?;

    let now = Local::now().naive_local();
    let now = now.with_nanosecond(0).unwrap_or(now);

    let record = snapshot_from_page(&html, now)?;
    let outcome = archive_snapshot(archive, &record, dry_run)?;

    Ok(CollectResult { record, outcome })
}
