//! Core data types and statistics kernel for home telemetry
//!
//! This crate provides the time-series table, windowing, and descriptive
//! statistics used by the collection pipeline. It performs no I/O.

pub mod stats;
pub mod table;
pub mod types;

pub use stats::*;
pub use table::*;
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no points to build a table from")]
    EmptyInput,

    #[error("time window contains no numeric rows")]
    EmptyWindow,
}

pub type CoreResult<T> = Result<T, CoreError>;
