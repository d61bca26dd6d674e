//! Nightly batch collection over every configured (location, feed) pair

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use chrono_tz::Tz;
use clap::Args;
use std::path::PathBuf;
use telem_archive::Archive;
use telem_config::{FeedSettings, LocationConfig};
use telem_core::{TimeSeriesTable, TimeWindow};
use telem_ingest::{fetch_points, Credentials, FeedClient, HttpFeedClient};
use tracing::{debug, error, info};

#[derive(Args)]
pub struct CollectArgs {
    /// Root directory for archived output
    pub output_root: PathBuf,

    /// IANA time zone for the data
    #[arg(long, default_value = "UTC")]
    pub timezone: String,

    /// Truncate the collection window to day bounds
    #[arg(long)]
    pub day_bound: bool,

    /// Collect a single location instead of every configured one
    #[arg(long)]
    pub location: Option<String>,

    /// Maximum points to request per feed
    #[arg(long, default_value_t = 350)]
    pub max_points: u32,

    /// Feed settings file (defaults to TELEM_FEEDS, then feeds.toml)
    #[arg(long)]
    pub feeds: Option<PathBuf>,

    /// Credentials file (defaults to ~/.auth/telemetry.toml)
    #[arg(long)]
    pub credentials: Option<PathBuf>,
}

pub async fn run(args: CollectArgs) -> Result<()> {
    let settings = match &args.feeds {
        Some(path) => FeedSettings::load(path),
        None => FeedSettings::load_default(),
    }
    .context("failed to load feed settings")?;
    let credentials =
        Credentials::load(args.credentials.as_deref()).context("failed to load credentials")?;
    let client = HttpFeedClient::new(credentials);
    let archive = Archive::new(&args.output_root);

    let zone: Tz = args
        .timezone
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown time zone: {}", args.timezone))?;
    let now = Utc::now().with_timezone(&zone).fixed_offset();
    let yesterday = now - Duration::days(1);
    let window = TimeWindow {
        begin: yesterday,
        end: now,
        day_bound: args.day_bound,
    };

    let locations: Vec<String> = match &args.location {
        Some(name) => vec![name.clone()],
        None => settings
            .location_names()
            .into_iter()
            .map(String::from)
            .collect(),
    };

    // Best-effort batch: one bad feed must not sink the night's run.
    for location in &locations {
        let Some(config) = settings.location(location) else {
            error!(location, "location not in feed settings");
            continue;
        };

        for feed in &config.feeds {
            if let Err(e) = collect_feed(&client, &archive, &args, location, config, feed, &window).await
            {
                error!(location, feed, error = %e, "feed collection failed, continuing");
            }

            let delay = config.delay_seconds();
            if delay > 0 {
                tokio::time::sleep(std::time::Duration::from_secs(delay)).await;
            }
        }
    }

    Ok(())
}

async fn collect_feed(
    client: &dyn FeedClient,
    archive: &Archive,
    args: &CollectArgs,
    location: &str,
    config: &LocationConfig,
    feed: &str,
    window: &TimeWindow,
) -> Result<()> {
    info!(location, feed, "processing feed");

    let feed_key = format!("{location}.{feed}");
    let points = fetch_points(client, &feed_key, Some(args.max_points), &args.timezone).await?;
    let table = TimeSeriesTable::build(points, feed)?;
    let slice = table.window(window);

    // Archive the raw window first: status feeds carry text values whose
    // statistics are undefined, but their raw data is still worth keeping.
    archive.save_raw(location, feed, &slice)?;

    let bounds = match config.bounds_companion(feed) {
        Some(companion) => {
            resolve_bounds(client, args, location, companion, window).await?
        }
        None => None,
    };

    let stats = slice.statistics(bounds)?;
    archive.save_stats(location, feed, slice.canonical().date_naive(), &stats)?;
    Ok(())
}

/// Clip statistics to the companion feed's active range.
///
/// The companion's first and last in-window timestamps become the
/// statistics sub-range; an empty companion leaves statistics unclipped.
async fn resolve_bounds(
    client: &dyn FeedClient,
    args: &CollectArgs,
    location: &str,
    companion: &str,
    window: &TimeWindow,
) -> Result<Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)>> {
    let feed_key = format!("{location}.{companion}");
    let points = fetch_points(client, &feed_key, Some(args.max_points), &args.timezone).await?;

    let begin = window.effective_begin();
    let end = window.effective_end();
    let in_window: Vec<_> = points
        .iter()
        .map(|p| p.timestamp)
        .filter(|ts| *ts >= begin && *ts <= end)
        .collect();

    match (in_window.first(), in_window.last()) {
        (Some(&first), Some(&last)) => Ok(Some((first, last))),
        _ => {
            debug!(location, companion, "no companion readings in window, statistics unclipped");
            Ok(None)
        }
    }
}
