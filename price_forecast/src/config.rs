//! Dashboard configuration
//!
//! One config drives every dashboard variant: the ticker list, whether a
//! login is required, horizon bounds, history length, the display window and
//! the forecasting model. Loaded from TOML; missing keys take the defaults
//! below.

use crate::error::{ForecastError, Result};
use crate::models::{interval_z, ModelKind, DEFAULT_INTERVAL_WIDTH};
use crate::source::SourceKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A selectable company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerEntry {
    /// Display name
    pub name: String,
    /// Exchange symbol
    pub symbol: String,
}

impl TickerEntry {
    /// Create an entry
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// Brokerage link shown under a forecast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLink {
    pub name: String,
    pub url: String,
}

/// Configuration for the forecasting dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dashboard title
    pub title: String,
    /// Companies the user can pick from
    pub tickers: Vec<TickerEntry>,
    /// Whether the dashboard sits behind a login
    pub require_auth: bool,
    /// Horizon preselected for a new session
    pub default_horizon_days: u32,
    pub min_horizon_days: u32,
    pub max_horizon_days: u32,
    /// Years of history fetched before the as-of date
    pub history_years: u32,
    /// First date shown in the reconciled table
    pub window_start: NaiveDate,
    /// Rows in the future-only preview
    pub preview_rows: usize,
    /// Rows of raw data shown
    pub raw_tail_rows: usize,
    /// Prediction interval coverage
    pub interval_width: f64,
    pub model: ModelKind,
    pub source: SourceKind,
    /// SQLite file holding registered users
    pub credentials_path: PathBuf,
    pub trade_links: Vec<TradeLink>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Stock Price Prediction Application".to_string(),
            tickers: vec![
                TickerEntry::new("Apple", "AAPL"),
                TickerEntry::new("Microsoft", "MSFT"),
                TickerEntry::new("Google", "GOOGL"),
                TickerEntry::new("Amazon", "AMZN"),
                TickerEntry::new("Tesla", "TSLA"),
                TickerEntry::new("Reliance", "RELIANCE.NS"),
                TickerEntry::new("Tata Motors", "TATAMOTORS.NS"),
                TickerEntry::new("Zomato", "ZOMATO.NS"),
                TickerEntry::new("Bajaj Finance", "BAJFINANCE.NS"),
            ],
            require_auth: false,
            default_horizon_days: 120,
            min_horizon_days: 30,
            max_horizon_days: 365,
            history_years: 5,
            window_start: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default(),
            preview_rows: 10,
            raw_tail_rows: 5,
            interval_width: DEFAULT_INTERVAL_WIDTH,
            model: ModelKind::default(),
            source: SourceKind::default(),
            credentials_path: PathBuf::from("users.db"),
            trade_links: vec![
                TradeLink {
                    name: "Robinhood".to_string(),
                    url: "https://robinhood.com".to_string(),
                },
                TradeLink {
                    name: "E*TRADE".to_string(),
                    url: "https://us.etrade.com".to_string(),
                },
                TradeLink {
                    name: "Zerodha".to_string(),
                    url: "https://zerodha.com".to_string(),
                },
            ],
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: DashboardConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check the config for contradictions
    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(ForecastError::ConfigError(
                "At least one ticker must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for ticker in &self.tickers {
            if ticker.symbol.trim().is_empty() {
                return Err(ForecastError::ConfigError(format!(
                    "Ticker '{}' has an empty symbol",
                    ticker.name
                )));
            }
            if !seen.insert(ticker.symbol.to_uppercase()) {
                return Err(ForecastError::ConfigError(format!(
                    "Ticker symbol '{}' is listed twice",
                    ticker.symbol
                )));
            }
        }

        if self.min_horizon_days == 0
            || self.min_horizon_days > self.default_horizon_days
            || self.default_horizon_days > self.max_horizon_days
        {
            return Err(ForecastError::ConfigError(format!(
                "Horizon bounds must satisfy 0 < min ({}) <= default ({}) <= max ({})",
                self.min_horizon_days, self.default_horizon_days, self.max_horizon_days
            )));
        }

        if self.history_years == 0 {
            return Err(ForecastError::ConfigError(
                "history_years must be positive".to_string(),
            ));
        }

        interval_z(self.interval_width)
            .map_err(|e| ForecastError::ConfigError(e.to_string()))?;
        self.model
            .validate()
            .map_err(|e| ForecastError::ConfigError(e.to_string()))?;

        Ok(())
    }

    /// Look up a configured ticker by symbol, case-insensitively
    pub fn ticker(&self, symbol: &str) -> Option<&TickerEntry> {
        self.tickers
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol.trim()))
    }

    /// Check a requested horizon against the configured bounds
    pub fn check_horizon(&self, horizon_days: u32) -> Result<()> {
        if horizon_days < self.min_horizon_days || horizon_days > self.max_horizon_days {
            return Err(ForecastError::InvalidParameter(format!(
                "Prediction period must be between {} and {} days, got {}",
                self.min_horizon_days, self.max_horizon_days, horizon_days
            )));
        }
        Ok(())
    }
}
