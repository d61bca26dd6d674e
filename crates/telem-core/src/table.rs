//! Time-indexed value table and window slicing

use crate::types::{PointValue, TimePoint, TimeWindow};
use crate::{CoreError, CoreResult};
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;

/// Ordered mapping from timestamp to a single named value column
///
/// Built once per aggregation run. The index is sorted and unique by
/// construction; a duplicate timestamp replaces the earlier point
/// (last write wins in input order).
#[derive(Debug, Clone)]
pub struct TimeSeriesTable {
    column: String,
    points: BTreeMap<DateTime<FixedOffset>, PointValue>,
}

impl TimeSeriesTable {
    /// Build a table from normalized points under the given column (feed) name.
    pub fn build(points: Vec<TimePoint>, column: impl Into<String>) -> CoreResult<Self> {
        if points.is_empty() {
            return Err(CoreError::EmptyInput);
        }

        let mut index = BTreeMap::new();
        for point in points {
            index.insert(point.timestamp, point.value);
        }

        Ok(Self {
            column: column.into(),
            points: index,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<FixedOffset>, &PointValue)> {
        self.points.iter()
    }

    /// Slice the table to `[effective_begin, effective_end]` inclusive.
    ///
    /// The source table is untouched; the slice owns copies of the rows, so
    /// repeated windowing over one build is fine.
    pub fn window(&self, window: &TimeWindow) -> TableSlice {
        let begin = window.effective_begin();
        let end = window.effective_end();

        // BTreeMap::range panics on an inverted range; it selects nothing.
        let rows = if begin <= end {
            self.points
                .range(begin..=end)
                .map(|(ts, value)| (*ts, value.clone()))
                .collect()
        } else {
            Vec::new()
        };

        TableSlice {
            column: self.column.clone(),
            canonical: window.canonical(),
            rows,
        }
    }
}

/// A windowed view of a [`TimeSeriesTable`]
///
/// Carries the canonical timestamp of the window it was cut from, which
/// labels the output day and drives partition path derivation.
#[derive(Debug, Clone)]
pub struct TableSlice {
    pub(crate) column: String,
    pub(crate) canonical: DateTime<FixedOffset>,
    pub(crate) rows: Vec<(DateTime<FixedOffset>, PointValue)>,
}

impl TableSlice {
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn canonical(&self) -> DateTime<FixedOffset> {
        self.canonical
    }

    pub fn rows(&self) -> &[(DateTime<FixedOffset>, PointValue)] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when every row holds a numeric value.
    pub fn is_numeric(&self) -> bool {
        self.rows.iter().all(|(_, v)| !v.is_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(d: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, d, h, m, 0)
            .unwrap()
    }

    fn number(d: u32, h: u32, m: u32, v: f64) -> TimePoint {
        TimePoint::new(ts(d, h, m), PointValue::Number(v))
    }

    #[test]
    fn test_build_empty_fails() {
        let result = TimeSeriesTable::build(Vec::new(), "temperature");
        assert!(matches!(result, Err(CoreError::EmptyInput)));
    }

    #[test]
    fn test_build_sorts_and_indexes() {
        let points = vec![
            number(5, 12, 0, 20.0),
            number(5, 8, 0, 10.0),
            number(5, 16, 0, 30.0),
        ];
        let table = TimeSeriesTable::build(points, "temperature").unwrap();
        assert_eq!(table.len(), 3);

        let stamps: Vec<_> = table.iter().map(|(ts, _)| *ts).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_duplicate_timestamp_last_write_wins() {
        let points = vec![number(5, 8, 0, 10.0), number(5, 8, 0, 11.0)];
        let table = TimeSeriesTable::build(points, "temperature").unwrap();
        assert_eq!(table.len(), 1);

        let (_, value) = table.iter().next().unwrap();
        assert_eq!(value.as_f64(), Some(11.0));
    }

    #[test]
    fn test_window_is_inclusive() {
        let table = TimeSeriesTable::build(
            vec![
                number(5, 8, 0, 10.0),
                number(5, 12, 0, 20.0),
                number(5, 16, 0, 30.0),
            ],
            "temperature",
        )
        .unwrap();

        let slice = table.window(&TimeWindow::new(ts(5, 8, 0), ts(5, 12, 0)));
        assert_eq!(slice.len(), 2);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let table = TimeSeriesTable::build(
            vec![number(5, 8, 0, 10.0), number(5, 12, 0, 20.0)],
            "temperature",
        )
        .unwrap();

        let slice = table.window(&TimeWindow::new(ts(5, 12, 0), ts(5, 9, 0)));
        assert!(slice.is_empty());
        assert!(matches!(slice.statistics(None), Err(CoreError::EmptyWindow)));
    }

    #[test]
    fn test_window_does_not_mutate_table() {
        let table = TimeSeriesTable::build(vec![number(5, 8, 0, 10.0)], "temperature").unwrap();
        let _ = table.window(&TimeWindow::new(ts(5, 9, 0), ts(5, 10, 0)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_day_bound_window_covers_full_days() {
        let table = TimeSeriesTable::build(
            vec![
                number(5, 0, 30, 1.0),
                number(5, 23, 30, 2.0),
                number(6, 0, 0, 3.0),
                number(6, 8, 0, 4.0),
            ],
            "temperature",
        )
        .unwrap();

        // begin=03-05T14:30, end=03-06T09:00 truncate to [03-05T00:00, 03-06T00:00]
        let slice = table.window(&TimeWindow::day_bound(ts(5, 14, 30), ts(6, 9, 0)));
        assert_eq!(slice.len(), 3);
        assert_eq!(slice.canonical(), ts(5, 0, 0));
    }

    #[test]
    fn test_numeric_detection() {
        let mixed = TimeSeriesTable::build(
            vec![
                number(5, 8, 0, 1.0),
                TimePoint::new(ts(5, 9, 0), PointValue::Text("night".into())),
            ],
            "notifier",
        )
        .unwrap();
        let slice = mixed.window(&TimeWindow::new(ts(5, 0, 0), ts(6, 0, 0)));
        assert!(!slice.is_numeric());
    }
}
