//! Exported-CSV file adapter

use crate::{normalize, IngestError, IngestResult, RawReading};
use std::path::{Path, PathBuf};
use telem_core::TimePoint;

/// Reader for raw feed exports
///
/// Rows carry `(id, value, feed_id, created_at)` with no header. The
/// `created_at` field arrives as a space-separated date/time with a
/// trailing zone suffix (`2024-03-05 14:30:00 UTC`) and is rejoined into
/// ISO-8601 before normalization.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all rows into raw readings.
    pub fn read(&self) -> IngestResult<Vec<RawReading>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;

        let mut readings = Vec::new();
        for record in reader.records() {
            let record = record?;
            let field = |idx: usize| -> IngestResult<&str> {
                record.get(idx).ok_or_else(|| IngestError::Parse {
                    what: "csv row",
                    input: record.iter().collect::<Vec<_>>().join(","),
                })
            };

            readings.push(RawReading {
                id: field(0)?.to_string(),
                value: field(1)?.to_string(),
                feed_id: field(2)?.parse().ok(),
                created_at: rejoin_timestamp(field(3)?)?,
            });
        }

        Ok(readings)
    }

    /// Read and normalize in one step.
    pub fn read_points(&self, timezone: &str) -> IngestResult<Vec<TimePoint>> {
        let readings = self.read()?;
        normalize(&readings, timezone)
    }
}

/// `"2024-03-05 14:30:00 UTC"` -> `"2024-03-05T14:30:00Z"`
fn rejoin_timestamp(raw: &str) -> IngestResult<String> {
    let mut parts = raw.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(date), Some(time)) => Ok(format!("{date}T{time}Z")),
        _ => Err(IngestError::Parse {
            what: "timestamp",
            input: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_rejoin_timestamp() {
        assert_eq!(
            rejoin_timestamp("2024-03-05 14:30:00 UTC").unwrap(),
            "2024-03-05T14:30:00Z"
        );
        assert!(rejoin_timestamp("2024-03-05").is_err());
    }

    #[test]
    fn test_read_exported_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Temperature-export.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "0F9A,21.5,2857349,2024-03-05 08:00:00 UTC").unwrap();
        writeln!(file, "0F9B,22.0,2857349,2024-03-05 08:05:00 UTC").unwrap();

        let readings = CsvSource::new(&path).read().unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].created_at, "2024-03-05T08:00:00Z");
        assert_eq!(readings[0].feed_id, Some(2857349));

        let points = CsvSource::new(&path).read_points("UTC").unwrap();
        assert_eq!(points[1].value.as_f64(), Some(22.0));
    }
}
