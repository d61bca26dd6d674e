//! telem - home sensor telemetry pipeline
//!
//! Pulls feed readings from the hosted service or exported CSV files,
//! computes daily summary statistics, and archives raw windows plus
//! statistics into a partitioned parquet hierarchy.

mod collect;
mod import;
mod show;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "telem", about = "Home sensor telemetry collection pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch configured feeds, compute daily statistics, archive both
    Collect(collect::CollectArgs),
    /// Import one day of exported CSV data into the raw archive
    Import(import::ImportArgs),
    /// Print archived partitions
    Show(show::ShowArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    telem_obs::init("telem");

    let cli = Cli::parse();
    match cli.command {
        Command::Collect(args) => collect::run(args).await,
        Command::Import(args) => import::run(args),
        Command::Show(args) => show::run(args),
    }
}
