//! Market data sources
//!
//! The [`MarketDataSource`] trait abstracts over where daily bars come from so
//! the pipeline can run against Yahoo Finance, a directory of CSV exports, or
//! an in-memory fixture in tests.

use crate::data::{DailyBar, DataLoader};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod yahoo;

pub use yahoo::YahooSource;

/// Provider of daily OHLCV bars
pub trait MarketDataSource {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Fetch daily bars for `symbol` with `start <= date <= end`, oldest first
    ///
    /// An unknown symbol or an empty range is [`ForecastError::NoData`].
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>>;
}

/// Source selection as it appears in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// Yahoo Finance chart API
    #[default]
    Yahoo,
    /// `<dir>/<SYMBOL>.csv` files
    Csv { dir: PathBuf },
}

impl SourceKind {
    /// Build the configured source
    pub fn build(&self) -> Result<Box<dyn MarketDataSource>> {
        Ok(match self {
            SourceKind::Yahoo => Box::new(YahooSource::new()?),
            SourceKind::Csv { dir } => Box::new(CsvSource::new(dir.clone())),
        })
    }
}

/// Offline source reading one CSV export per symbol
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    /// Create a source over `dir`
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }
}

impl MarketDataSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(ForecastError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let data = DataLoader::from_csv(&path)?;
        let mut bars: Vec<DailyBar> = data
            .bars()?
            .into_iter()
            .filter(|bar| bar.date >= start && bar.date <= end)
            .collect();
        bars.sort_by_key(|bar| bar.date);

        if bars.is_empty() {
            return Err(ForecastError::NoData {
                symbol: symbol.to_string(),
            });
        }

        tracing::debug!(symbol, rows = bars.len(), path = %path.display(), "loaded bars from csv");
        Ok(bars)
    }
}
