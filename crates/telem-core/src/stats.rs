//! Descriptive statistics over a windowed slice

use crate::table::TableSlice;
use crate::{CoreError, CoreResult};
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Summary statistics for one feed over one window
///
/// Computed once per (feed, window), serialized to the stats partition,
/// then discarded. `std` and `var` use the sample (N-1) denominator and
/// are absent below two numeric samples.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsRecord {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std: Option<f64>,
    pub var: Option<f64>,
    pub time_of_min: DateTime<Utc>,
    pub time_of_max: DateTime<Utc>,
    pub day: u32,
}

impl TableSlice {
    /// Compute statistics over the slice's value column.
    ///
    /// `bounds` restricts the computation to a narrower sub-range of the
    /// already-windowed rows (e.g. daylight-only statistics within a day
    /// window). Text values are skipped; a range with no numeric rows
    /// fails with [`CoreError::EmptyWindow`].
    ///
    /// `time_of_min`/`time_of_max` record the earliest timestamp achieving
    /// the extreme value.
    pub fn statistics(
        &self,
        bounds: Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)>,
    ) -> CoreResult<StatsRecord> {
        let rows: Vec<(DateTime<FixedOffset>, f64)> = self
            .rows
            .iter()
            .filter(|(ts, _)| match bounds {
                Some((begin, end)) => *ts >= begin && *ts <= end,
                None => true,
            })
            .filter_map(|(ts, value)| value.as_f64().map(|v| (*ts, v)))
            .collect();

        if rows.is_empty() {
            return Err(CoreError::EmptyWindow);
        }

        let (mut time_of_min, mut min) = rows[0];
        let (mut time_of_max, mut max) = rows[0];
        let mut sum = rows[0].1;
        for &(ts, v) in &rows[1..] {
            // Strict comparisons keep the first occurrence on ties.
            if v < min {
                min = v;
                time_of_min = ts;
            }
            if v > max {
                max = v;
                time_of_max = ts;
            }
            sum += v;
        }

        let n = rows.len();
        let mean = sum / n as f64;

        let mut sorted: Vec<f64> = rows.iter().map(|(_, v)| *v).collect();
        sorted.sort_by(f64::total_cmp);
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        let var = if n > 1 {
            let sq_dev: f64 = rows.iter().map(|(_, v)| (v - mean).powi(2)).sum();
            Some(sq_dev / (n - 1) as f64)
        } else {
            None
        };
        let std = var.map(f64::sqrt);

        Ok(StatsRecord {
            min,
            max,
            mean,
            median,
            std,
            var,
            time_of_min: time_of_min.with_timezone(&Utc),
            time_of_max: time_of_max.with_timezone(&Utc),
            day: self.canonical.day(),
        })
    }
}
