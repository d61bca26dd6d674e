//! Source adapters for feed readings
//!
//! This crate normalizes raw readings from either the remote feed service
//! or an exported CSV file into ascending [`telem_core::TimePoint`]
//! sequences in a caller-specified time zone.

pub mod feed;
pub mod file;
pub mod normalize;

pub use feed::*;
pub use file::*;
pub use normalize::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed {what}: {input}")]
    Parse { what: &'static str, input: String },

    #[error("feed service error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credentials error: {0}")]
    Credentials(String),
}

pub type IngestResult<T> = Result<T, IngestError>;

/// One reading as the upstream source hands it over, before normalization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawReading {
    pub id: String,
    pub value: String,
    #[serde(default)]
    pub feed_id: Option<i64>,
    pub created_at: String,
}

/// Boundary to the remote feed service
///
/// Implementations may return readings in any order; normalization restores
/// chronological order downstream. Retry policy, if any, lives behind this
/// trait, not in the pipeline.
#[async_trait::async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, feed: &str, max_points: Option<u32>) -> IngestResult<Vec<RawReading>>;
}
