//! Core data types for sensor feed readings

use chrono::{DateTime, FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};

/// A feed value after normalization
///
/// Most feeds carry numeric readings, but status feeds (e.g. a day/night
/// indicator) publish plain strings and are retained verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PointValue {
    Number(f64),
    Text(String),
}

impl PointValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PointValue::Number(v) => Some(*v),
            PointValue::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, PointValue::Text(_))
    }
}

/// One normalized reading from a feed
///
/// Adapters emit these in chronological ascending order, timestamps already
/// converted to the caller's time zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimePoint {
    pub timestamp: DateTime<FixedOffset>,
    pub value: PointValue,
}

impl TimePoint {
    pub fn new(timestamp: DateTime<FixedOffset>, value: PointValue) -> Self {
        Self { timestamp, value }
    }
}

/// Inclusive time range used to slice a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub begin: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub day_bound: bool,
}

impl TimeWindow {
    pub fn new(begin: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self {
            begin,
            end,
            day_bound: false,
        }
    }

    pub fn day_bound(begin: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self {
            begin,
            end,
            day_bound: true,
        }
    }

    /// Lower bound after day-bound truncation
    pub fn effective_begin(&self) -> DateTime<FixedOffset> {
        if self.day_bound {
            truncate_to_midnight(self.begin)
        } else {
            self.begin
        }
    }

    /// Upper bound after day-bound truncation
    pub fn effective_end(&self) -> DateTime<FixedOffset> {
        if self.day_bound {
            truncate_to_midnight(self.end)
        } else {
            self.end
        }
    }

    /// Canonical timestamp for the window, used to label the output day
    /// and derive the partition path.
    pub fn canonical(&self) -> DateTime<FixedOffset> {
        self.effective_begin()
    }
}

/// Drop the time-of-day portion of a timestamp.
///
/// Fixed offsets have no DST gaps, so midnight always exists.
fn truncate_to_midnight(ts: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    ts.with_time(NaiveTime::MIN).single().unwrap_or(ts)
}
