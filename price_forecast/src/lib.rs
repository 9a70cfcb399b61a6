//! # Price Forecast
//!
//! Daily stock price forecasting and accuracy scoring.
//!
//! ## Features
//!
//! - Daily bar loading from Yahoo Finance or CSV exports
//! - Forecasting models (additive trend + seasonality, Exponential Smoothing, Moving Average)
//! - Reconciliation of predictions against observed closes
//! - MAE, RMSE and MAPE scoring
//! - TOML dashboard configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use price_forecast::config::DashboardConfig;
//! use price_forecast::pipeline::{ForecastPipeline, ForecastRequest};
//!
//! # fn main() -> price_forecast::Result<()> {
//! let pipeline = ForecastPipeline::from_config(DashboardConfig::default())?;
//! let as_of = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
//!
//! let report = pipeline.run(&ForecastRequest::new("AAPL", 120, as_of))?;
//! println!("{}", report.score);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod reconcile;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{DashboardConfig, TickerEntry, TradeLink};
pub use crate::data::{DailyBar, DataLoader, TimeSeriesData};
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::{score, score_pairs, ScoreSummary};
pub use crate::models::{
    ForecastComponents, ForecastModel, ForecastResult, ModelKind, PredictionRecord,
    SeasonalEffect, TrainedForecastModel,
};
pub use crate::pipeline::{ForecastPipeline, ForecastReport, ForecastRequest};
pub use crate::reconcile::{reconcile, ObservationRecord, ReconciledRow};
pub use crate::source::{CsvSource, MarketDataSource, SourceKind, YahooSource};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
