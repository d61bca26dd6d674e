//! Partitioned columnar archive
//!
//! Raw windows and statistics records persist as parquet files under
//! `{root}/{raw|stats}/{location}/{feed}/{year}/{month}/{day}.parquet`.
//! The directory hierarchy is the only catalog; reads select partitions by
//! walking it. Timestamps are stored as UTC instants.

pub mod layout;
pub mod reader;
pub mod writer;

pub use layout::*;
pub use writer::*;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("partition not found: {path}")]
    NotFound { path: PathBuf },

    #[error("partition contains no rows: {path}")]
    EmptyPartition { path: PathBuf },

    #[error("malformed partition file {path}: {detail}")]
    Malformed { path: PathBuf, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
