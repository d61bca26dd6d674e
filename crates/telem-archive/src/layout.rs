//! Partition path derivation
//!
//! Layout: `{root}/{raw|stats}/{location}/{feed}/{yyyy}/{mm}/{dd}.parquet`
//! with zero-padded month and day. Both writes and reads derive paths here,
//! always from the data's canonical timestamp, never from wall-clock now.

use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};

pub const PARTITION_EXT: &str = "parquet";

/// Top-level split between raw windows and computed statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Raw,
    Stats,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Raw => "raw",
            Category::Stats => "stats",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Category::Raw),
            "stats" => Ok(Category::Stats),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Partition selector for reads: a whole year, one month, or a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Year(i32),
    Month(i32, u32),
    Day(i32, u32, u32),
}

impl Selector {
    /// Path of the selected prefix (or file, for a day) below the feed dir.
    pub fn relative_path(&self) -> PathBuf {
        match *self {
            Selector::Year(y) => PathBuf::from(format!("{y:04}")),
            Selector::Month(y, m) => [format!("{y:04}"), format!("{m:02}")].iter().collect(),
            Selector::Day(y, m, d) => [
                format!("{y:04}"),
                format!("{m:02}"),
                format!("{d:02}.{PARTITION_EXT}"),
            ]
            .iter()
            .collect(),
        }
    }

    /// A day selects exactly one file; year and month select a prefix.
    pub fn is_single_file(&self) -> bool {
        matches!(self, Selector::Day(..))
    }
}

/// Directory holding all partitions of one (category, location, feed).
pub fn feed_dir(root: &Path, category: Category, location: &str, feed: &str) -> PathBuf {
    root.join(category.as_str()).join(location).join(feed)
}

/// Full path of one day's partition file.
pub fn partition_file(
    root: &Path,
    category: Category,
    location: &str,
    feed: &str,
    date: NaiveDate,
) -> PathBuf {
    feed_dir(root, category, location, feed)
        .join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{:02}.{PARTITION_EXT}", date.day()))
}
