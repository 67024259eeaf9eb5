//! On-disk archive of collected snapshots
//!
//! Layout: `<root>/year_YYYY/month_MM/YYYY_MM_DD__HH_MM_SS.json`, one file
//! per accepted snapshot. A file is only ever rewritten when the page
//! republishes different quotes under the same update time.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{KursError, Result};
use crate::models::SnapshotRecord;

pub mod partition;
pub mod record_file;

pub use partition::{Partition, PartitionFilter};

pub struct Archive {
    root: PathBuf,
}

impl Archive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Partitions present on disk that pass `filter`, oldest first
    pub fn partitions(&self, filter: &PartitionFilter) -> Result<Vec<Partition>> {
        let mut found = Vec::new();

        for year_entry in read_dir_if_exists(&self.root)? {
            let Some(year) = partition::parse_year_dir(&year_entry.file_name().to_string_lossy()) else {
                continue;
            };
            if !year_entry.file_type()?.is_dir() {
                continue;
            }
            for month_entry in read_dir_if_exists(&year_entry.path())? {
                let Some(month) = partition::parse_month_dir(&month_entry.file_name().to_string_lossy()) else {
                    continue;
                };
                let candidate = Partition::new(year, month);
                if month_entry.file_type()?.is_dir() && filter.matches(&candidate) {
                    found.push(candidate);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    /// Record files of a partition ordered by the timestamp in their names
    fn record_paths(&self, partition: &Partition) -> Result<Vec<(NaiveDateTime, PathBuf)>> {
        let mut paths = Vec::new();

        for entry in read_dir_if_exists(&partition.dir(&self.root))? {
            let path = entry.path();
            if !record_file::is_record_file(&path) {
                continue;
            }
            let timestamp = record_file::parse_file_name(&path)?;
            paths.push((timestamp, path));
        }

        paths.sort();
        Ok(paths)
    }

    /// All records of a partition in chronological order
    pub fn load_partition(&self, partition: &Partition) -> Result<Vec<SnapshotRecord>> {
        let records = self
            .record_paths(partition)?
            .into_iter()
            .map(|(timestamp, path)| read_record(&path, timestamp))
            .collect::<Result<Vec<_>>>()?;

        debug!("Loaded {} records from partition {}", records.len(), partition);
        Ok(records)
    }

    /// Most recent record of a partition, if it has any
    pub fn last_record(&self, partition: &Partition) -> Result<Option<SnapshotRecord>> {
        match self.record_paths(partition)?.pop() {
            Some((timestamp, path)) => read_record(&path, timestamp).map(Some),
            None => Ok(None),
        }
    }

    /// Where `record` lives (or would live) in the archive
    pub fn record_path(&self, record: &SnapshotRecord) -> PathBuf {
        Partition::of(&record.timestamp)
            .dir(&self.root)
            .join(record_file::file_name(&record.timestamp))
    }

    /// Persist `record`, creating partition directories as needed.
    /// Fails with [`KursError::RecordExists`] if its file is already there.
    pub fn write(&self, record: &SnapshotRecord) -> Result<PathBuf> {
        self.store(record, false)
    }

    /// Persist `record` over whatever is stored under the same timestamp
    pub fn replace(&self, record: &SnapshotRecord) -> Result<PathBuf> {
        self.store(record, true)
    }

    fn store(&self, record: &SnapshotRecord, overwrite: bool) -> Result<PathBuf> {
        let path = self.record_path(record);
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                debug!("Creating '{}' dir...", dir.display());
                fs::create_dir_all(dir)?;
            }
        }

        let body = record.to_json()?;
        let mut options = fs::OpenOptions::new();
        if overwrite {
            options.write(true).create(true).truncate(true);
        } else {
            options.write(true).create_new(true);
        }

        let mut file = match options.open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(KursError::RecordExists(path));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(body.as_bytes())?;

        Ok(path)
    }
}

fn read_dir_if_exists(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    match fs::read_dir(dir) {
        Ok(entries) => Ok(entries.collect::<std::io::Result<Vec<_>>>()?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

fn read_record(path: &Path, timestamp: NaiveDateTime) -> Result<SnapshotRecord> {
    let text = fs::read_to_string(path)?;
    SnapshotRecord::from_json(timestamp, &text).map_err(|e| KursError::MalformedRecord {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
