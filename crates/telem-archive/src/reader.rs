//! Selector-based partition reads, the inverse of the persister

use crate::layout::{feed_dir, Category, Selector, PARTITION_EXT};
use crate::writer::TIMESTAMP_COLUMN;
use crate::{Archive, ArchiveError, ArchiveResult};
use arrow::array::{Array, Float64Array, Int32Array, StringArray, TimestampMillisecondArray};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, TimeZone, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};
use telem_core::{PointValue, StatsRecord, TimePoint, TimeSeriesTable};
use tracing::debug;
use walkdir::WalkDir;

impl Archive {
    /// Load raw partitions into one in-memory table.
    ///
    /// A day selector reads exactly one file; month and year selectors
    /// logically concatenate every file beneath the prefix in
    /// chronological order. The column name comes from the files.
    pub fn read_raw(
        &self,
        location: &str,
        feed: &str,
        selector: &Selector,
    ) -> ArchiveResult<TimeSeriesTable> {
        let files = self.partition_files(Category::Raw, location, feed, selector)?;

        let mut column = feed.to_string();
        let mut points = Vec::new();
        for path in &files {
            for batch in read_batches(path)? {
                if batch.num_columns() < 2 {
                    return Err(ArchiveError::Malformed {
                        path: path.clone(),
                        detail: "expected timestamp and value columns".into(),
                    });
                }
                column = batch.schema().field(1).name().clone();

                let stamps =
                    column_as::<TimestampMillisecondArray>(&batch, TIMESTAMP_COLUMN, path)?;
                let floats = batch.column(1).as_any().downcast_ref::<Float64Array>();
                let strings = batch.column(1).as_any().downcast_ref::<StringArray>();

                for row in 0..batch.num_rows() {
                    let timestamp = millis_to_utc(stamps.value(row), path)?;
                    let value = if let Some(values) = floats {
                        PointValue::Number(values.value(row))
                    } else if let Some(values) = strings {
                        PointValue::Text(values.value(row).to_string())
                    } else {
                        return Err(ArchiveError::Malformed {
                            path: path.clone(),
                            detail: format!("unsupported value column type: {column}"),
                        });
                    };
                    points.push(TimePoint::new(timestamp.fixed_offset(), value));
                }
            }
        }

        debug!(location, feed, rows = points.len(), "loaded raw partitions");
        TimeSeriesTable::build(points, column).map_err(|_| ArchiveError::EmptyPartition {
            path: files[0].clone(),
        })
    }

    /// Load statistics partitions, one record per archived day.
    pub fn read_stats(
        &self,
        location: &str,
        feed: &str,
        selector: &Selector,
    ) -> ArchiveResult<Vec<StatsRecord>> {
        let files = self.partition_files(Category::Stats, location, feed, selector)?;

        let mut records = Vec::new();
        for path in &files {
            for batch in read_batches(path)? {
                let min = column_as::<Float64Array>(&batch, "min", path)?;
                let max = column_as::<Float64Array>(&batch, "max", path)?;
                let mean = column_as::<Float64Array>(&batch, "mean", path)?;
                let median = column_as::<Float64Array>(&batch, "median", path)?;
                let std = column_as::<Float64Array>(&batch, "std", path)?;
                let var = column_as::<Float64Array>(&batch, "var", path)?;
                let time_of_min =
                    column_as::<TimestampMillisecondArray>(&batch, "time_of_min", path)?;
                let time_of_max =
                    column_as::<TimestampMillisecondArray>(&batch, "time_of_max", path)?;
                let day = column_as::<Int32Array>(&batch, "day", path)?;

                for row in 0..batch.num_rows() {
                    records.push(StatsRecord {
                        min: min.value(row),
                        max: max.value(row),
                        mean: mean.value(row),
                        median: median.value(row),
                        std: optional_value(std, row),
                        var: optional_value(var, row),
                        time_of_min: millis_to_utc(time_of_min.value(row), path)?,
                        time_of_max: millis_to_utc(time_of_max.value(row), path)?,
                        day: day.value(row) as u32,
                    });
                }
            }
        }

        debug!(location, feed, count = records.len(), "loaded stats partitions");
        Ok(records)
    }

    /// Resolve a selector to the partition files beneath it.
    fn partition_files(
        &self,
        category: Category,
        location: &str,
        feed: &str,
        selector: &Selector,
    ) -> ArchiveResult<Vec<PathBuf>> {
        let base = feed_dir(self.root(), category, location, feed).join(selector.relative_path());
        if !base.exists() {
            return Err(ArchiveError::NotFound { path: base });
        }

        if selector.is_single_file() {
            return Ok(vec![base]);
        }

        // Zero-padded names make lexicographic order chronological.
        let mut files = Vec::new();
        for entry in WalkDir::new(&base).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(PARTITION_EXT) {
                files.push(path.to_path_buf());
            }
        }

        if files.is_empty() {
            return Err(ArchiveError::NotFound { path: base });
        }
        Ok(files)
    }
}

fn read_batches(path: &Path) -> ArchiveResult<Vec<RecordBatch>> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(batches)
}

fn column_as<'a, T: Array + 'static>(
    batch: &'a RecordBatch,
    name: &str,
    path: &Path,
) -> ArchiveResult<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|col| col.as_any().downcast_ref::<T>())
        .ok_or_else(|| ArchiveError::Malformed {
            path: path.to_path_buf(),
            detail: format!("missing or mistyped column `{name}`"),
        })
}

fn optional_value(array: &Float64Array, row: usize) -> Option<f64> {
    if array.is_null(row) {
        None
    } else {
        Some(array.value(row))
    }
}

fn millis_to_utc(millis: i64, path: &Path) -> ArchiveResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| ArchiveError::Malformed {
            path: path.to_path_buf(),
            detail: format!("timestamp {millis} out of range"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use telem_core::TimeWindow;

    fn ts(d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, d, h, 0, 0)
            .unwrap()
    }

    fn day_slice(d: u32, values: &[(u32, f64)]) -> telem_core::TableSlice {
        let points = values
            .iter()
            .map(|&(h, v)| TimePoint::new(ts(d, h), PointValue::Number(v)))
            .collect();
        let table = TimeSeriesTable::build(points, "temperature").unwrap();
        table.window(&TimeWindow::day_bound(ts(d, 12), ts(d + 1, 2)))
    }

    #[test]
    fn test_raw_day_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path());
        archive
            .save_raw("backyard", "temperature", &day_slice(5, &[(8, 10.0), (16, 30.0)]))
            .unwrap();

        let table = archive
            .read_raw("backyard", "temperature", &Selector::Day(2024, 3, 5))
            .unwrap();
        assert_eq!(table.column(), "temperature");
        assert_eq!(table.len(), 2);

        let values: Vec<_> = table.iter().map(|(_, v)| v.as_f64().unwrap()).collect();
        assert_eq!(values, vec![10.0, 30.0]);
    }

    #[test]
    fn test_month_read_concatenates_days() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path());
        archive
            .save_raw("backyard", "temperature", &day_slice(6, &[(9, 21.0)]))
            .unwrap();
        archive
            .save_raw("backyard", "temperature", &day_slice(5, &[(9, 20.0)]))
            .unwrap();

        let table = archive
            .read_raw("backyard", "temperature", &Selector::Month(2024, 3))
            .unwrap();
        assert_eq!(table.len(), 2);

        let stamps: Vec<_> = table.iter().map(|(ts, _)| *ts).collect();
        assert!(stamps[0] < stamps[1]);

        let year = archive
            .read_raw("backyard", "temperature", &Selector::Year(2024))
            .unwrap();
        assert_eq!(year.len(), 2);
    }

    #[test]
    fn test_stats_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path());

        let slice = day_slice(5, &[(8, 10.0), (12, 20.0), (16, 30.0)]);
        let record = slice.statistics(None).unwrap();
        let date = slice.canonical().date_naive();
        archive.save_stats("backyard", "temperature", date, &record).unwrap();

        let loaded = archive
            .read_stats("backyard", "temperature", &Selector::Day(2024, 3, 5))
            .unwrap();
        assert_eq!(loaded, vec![record]);
    }

    #[test]
    fn test_stats_round_trip_null_spread() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path());

        let slice = day_slice(5, &[(8, 10.0)]);
        let record = slice.statistics(None).unwrap();
        archive
            .save_stats("backyard", "temperature", slice.canonical().date_naive(), &record)
            .unwrap();

        let loaded = archive
            .read_stats("backyard", "temperature", &Selector::Day(2024, 3, 5))
            .unwrap();
        assert_eq!(loaded[0].std, None);
        assert_eq!(loaded[0].var, None);
    }

    #[test]
    fn test_text_raw_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path());

        let points = vec![
            TimePoint::new(ts(5, 6), PointValue::Text("night".into())),
            TimePoint::new(ts(5, 12), PointValue::Text("day".into())),
        ];
        let table = TimeSeriesTable::build(points, "notifier").unwrap();
        let slice = table.window(&TimeWindow::new(ts(5, 0), ts(5, 23)));
        archive.save_raw("den", "notifier", &slice).unwrap();

        let loaded = archive
            .read_raw("den", "notifier", &Selector::Day(2024, 3, 5))
            .unwrap();
        let (_, first) = loaded.iter().next().unwrap();
        assert_eq!(*first, PointValue::Text("night".into()));
    }

    #[test]
    fn test_missing_partition_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path());

        let result = archive.read_raw("backyard", "temperature", &Selector::Day(2024, 3, 5));
        assert!(matches!(result, Err(ArchiveError::NotFound { .. })));

        let result = archive.read_stats("backyard", "temperature", &Selector::Year(2024));
        assert!(matches!(result, Err(ArchiveError::NotFound { .. })));
    }
}
