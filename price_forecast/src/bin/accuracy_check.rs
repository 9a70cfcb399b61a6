//! Score a reconciled forecast export
//!
//! Reads a CSV with `Actual Price` and `Predicted Price` columns, drops rows
//! without an actual and prints MAE, RMSE and MAPE.

use anyhow::{Context, Result};
use clap::Parser;
use price_forecast::{score_pairs, DataLoader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "accuracy_check", about = "Score actual vs predicted prices")]
struct Args {
    /// CSV file with Actual Price and Predicted Price columns
    #[arg(default_value = "data.csv")]
    path: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let pairs = DataLoader::accuracy_pairs_from_csv(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    tracing::info!(rows = pairs.len(), path = %args.path.display(), "scoring");

    let summary = score_pairs(pairs);
    if summary.is_empty() {
        tracing::warn!("no rows with an actual price");
    }

    println!("{}", summary);
    Ok(())
}
