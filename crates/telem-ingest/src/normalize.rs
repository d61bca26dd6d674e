//! Shared raw-record normalization
//!
//! Both adapters (remote feed and CSV file) funnel through [`normalize`],
//! which owns time-zone conversion, numeric coercion, and ordering.

use crate::{IngestError, IngestResult, RawReading};
use chrono::DateTime;
use chrono_tz::Tz;
use telem_core::{PointValue, TimePoint};

/// Convert raw readings into ascending [`TimePoint`]s in the given zone.
///
/// Timestamps must be ISO-8601; a value that fails numeric parsing is kept
/// as text (status feeds publish strings like `"night"`). The output is
/// stably sorted by timestamp, so it is non-decreasing regardless of the
/// order the source produced.
pub fn normalize(readings: &[RawReading], timezone: &str) -> IngestResult<Vec<TimePoint>> {
    let zone: Tz = timezone.parse().map_err(|_| IngestError::Parse {
        what: "time zone",
        input: timezone.to_string(),
    })?;

    let mut points = Vec::with_capacity(readings.len());
    for reading in readings {
        let parsed =
            DateTime::parse_from_rfc3339(&reading.created_at).map_err(|_| IngestError::Parse {
                what: "timestamp",
                input: reading.created_at.clone(),
            })?;
        let timestamp = parsed.with_timezone(&zone).fixed_offset();

        let value = match reading.value.parse::<f64>() {
            Ok(v) => PointValue::Number(v),
            Err(_) => PointValue::Text(reading.value.clone()),
        };

        points.push(TimePoint::new(timestamp, value));
    }

    // Stable sort: equal timestamps keep source order, so last-write-wins
    // downstream still reflects the order the source emitted.
    points.sort_by_key(|p| p.timestamp);
    Ok(points)
}
