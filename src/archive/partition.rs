use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref YEAR_DIR: Regex = Regex::new(r"^year_(20[0-9]{2})$").unwrap();
    static ref MONTH_DIR: Regex = Regex::new(r"^month_(0[1-9]|1[0-2])$").unwrap();
}

/// One year/month slice of the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Partition {
    pub year: i32,
    pub month: u32,
}

impl Partition {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self::new(timestamp.year(), timestamp.month())
    }

    pub fn year_dir_name(&self) -> String {
        format!("year_{}", self.year)
    }

    pub fn month_dir_name(&self) -> String {
        format!("month_{:02}", self.month)
    }

    /// `year_YYYY/month_MM` below `root`
    pub fn dir(&self, root: &Path) -> PathBuf {
        root.join(self.year_dir_name()).join(self.month_dir_name())
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Year of a `year_YYYY` directory name
pub fn parse_year_dir(name: &str) -> Option<i32> {
    YEAR_DIR.captures(name)?.get(1)?.as_str().parse().ok()
}

/// Month of a `month_MM` directory name
pub fn parse_month_dir(name: &str) -> Option<u32> {
    MONTH_DIR.captures(name)?.get(1)?.as_str().parse().ok()
}

/// Restricts which partitions get processed; `None` matches everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl PartitionFilter {
    pub fn matches(&self, partition: &Partition) -> bool {
        self.year.map_or(true, |y| y == partition.year)
            && self.month.map_or(true, |m| m == partition.month)
    }

    /// The single partition this filter names, if it names exactly one
    pub fn exact(&self) -> Option<Partition> {
        match (self.year, self.month) {
            (Some(year), Some(month)) => Some(Partition::new(year, month)),
            _ => None,
        }
    }
}
