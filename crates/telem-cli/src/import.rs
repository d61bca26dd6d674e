//! One-day import of an exported CSV file into the raw archive

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use clap::Args;
use std::path::{Path, PathBuf};
use telem_archive::Archive;
use telem_core::{TimeSeriesTable, TimeWindow};
use telem_ingest::CsvSource;
use tracing::info;

#[derive(Args)]
pub struct ImportArgs {
    /// File containing the exported raw data
    pub raw_file: PathBuf,

    /// Root directory for archived output
    pub output_root: PathBuf,

    /// Location the data belongs to, lowercase
    pub location: String,

    /// IANA time zone for the data
    pub timezone: String,

    /// Day to import, YYYY-MM-DD
    pub date: NaiveDate,
}

pub fn run(args: ImportArgs) -> Result<()> {
    let feed = feed_from_stem(&args.raw_file)?;

    let points = CsvSource::new(&args.raw_file)
        .read_points(&args.timezone)
        .context("failed to read raw file")?;
    let table = TimeSeriesTable::build(points, feed.clone())?;

    let zone: Tz = args
        .timezone
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown time zone: {}", args.timezone))?;
    let begin = zone
        .from_local_datetime(&args.date.and_time(NaiveTime::MIN))
        .single()
        .context("local midnight is ambiguous in this zone")?
        .fixed_offset();
    let window = TimeWindow::new(begin, begin + Duration::days(1));

    let slice = table.window(&window);
    let archive = Archive::new(&args.output_root);
    let path = archive.save_raw(&args.location, &feed, &slice)?;

    info!(path = %path.display(), rows = slice.len(), "imported raw day");
    Ok(())
}

/// `Temperature_Out-20240305.csv` -> feed `temperature-out`
fn feed_from_stem(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("raw file has no usable name")?;
    let base = stem.split('-').next().unwrap_or(stem);
    Ok(base.to_lowercase().replace('_', "-"))
}
