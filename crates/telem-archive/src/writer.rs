//! Parquet persister for raw windows and statistics records

use crate::layout::{partition_file, Category};
use crate::ArchiveResult;
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use telem_core::{PointValue, StatsRecord, TableSlice};
use tracing::info;

pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Handle on the partitioned archive rooted at one directory
#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the raw value column of a windowed slice.
    ///
    /// The target day derives from the slice's canonical timestamp. An
    /// existing file is overwritten; each day's file is the full
    /// authoritative copy for that day.
    pub fn save_raw(&self, location: &str, feed: &str, slice: &TableSlice) -> ArchiveResult<PathBuf> {
        let date = slice.canonical().date_naive();
        let path = partition_file(&self.root, Category::Raw, location, feed, date);

        let timestamps: Vec<i64> = slice
            .rows()
            .iter()
            .map(|(ts, _)| ts.timestamp_millis())
            .collect();
        let ts_array = TimestampMillisecondArray::from(timestamps).with_timezone("UTC");

        // Numeric series persist as Float64; a series holding any text
        // value (status feeds) persists whole as strings.
        let (value_field, value_array): (Field, ArrayRef) = if slice.is_numeric() {
            let values: Vec<Option<f64>> =
                slice.rows().iter().map(|(_, v)| v.as_f64()).collect();
            (
                Field::new(slice.column(), DataType::Float64, true),
                Arc::new(Float64Array::from(values)),
            )
        } else {
            let values: Vec<String> = slice
                .rows()
                .iter()
                .map(|(_, v)| match v {
                    PointValue::Number(n) => n.to_string(),
                    PointValue::Text(s) => s.clone(),
                })
                .collect();
            (
                Field::new(slice.column(), DataType::Utf8, true),
                Arc::new(StringArray::from(values)),
            )
        };

        let schema = Arc::new(Schema::new(vec![timestamp_field(), value_field]));
        let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(ts_array), value_array])?;
        write_partition(&path, schema, &batch)?;

        info!(location, feed, path = %path.display(), rows = slice.len(), "saved raw window");
        Ok(path)
    }

    /// Write a statistics record as a single-row file at the stats path.
    pub fn save_stats(
        &self,
        location: &str,
        feed: &str,
        date: chrono::NaiveDate,
        record: &StatsRecord,
    ) -> ArchiveResult<PathBuf> {
        let path = partition_file(&self.root, Category::Stats, location, feed, date);

        let schema = Arc::new(stats_schema());
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Float64Array::from(vec![record.min])),
            Arc::new(Float64Array::from(vec![record.max])),
            Arc::new(Float64Array::from(vec![record.mean])),
            Arc::new(Float64Array::from(vec![record.median])),
            Arc::new(Float64Array::from(vec![record.std])),
            Arc::new(Float64Array::from(vec![record.var])),
            Arc::new(
                TimestampMillisecondArray::from(vec![record.time_of_min.timestamp_millis()])
                    .with_timezone("UTC"),
            ),
            Arc::new(
                TimestampMillisecondArray::from(vec![record.time_of_max.timestamp_millis()])
                    .with_timezone("UTC"),
            ),
            Arc::new(Int32Array::from(vec![record.day as i32])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns)?;
        write_partition(&path, schema, &batch)?;

        info!(location, feed, path = %path.display(), "saved statistics");
        Ok(path)
    }
}

fn timestamp_field() -> Field {
    Field::new(
        TIMESTAMP_COLUMN,
        DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
        false,
    )
}

pub(crate) fn stats_schema() -> Schema {
    let ts_type = DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()));
    Schema::new(vec![
        Field::new("min", DataType::Float64, false),
        Field::new("max", DataType::Float64, false),
        Field::new("mean", DataType::Float64, false),
        Field::new("median", DataType::Float64, false),
        Field::new("std", DataType::Float64, true),
        Field::new("var", DataType::Float64, true),
        Field::new("time_of_min", ts_type.clone(), false),
        Field::new("time_of_max", ts_type, false),
        Field::new("day", DataType::Int32, false),
    ])
}

fn write_partition(path: &Path, schema: SchemaRef, batch: &RecordBatch) -> ArchiveResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // File::create truncates: overwrite semantics, no append or merge.
    let file = fs::File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}
