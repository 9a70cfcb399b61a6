//! Fetch, fit, predict, reconcile and score in one synchronous run

use crate::config::DashboardConfig;
use crate::data::{DailyBar, TimeSeriesData};
use crate::error::{ForecastError, Result};
use crate::metrics::{score, ScoreSummary};
use crate::models::{ForecastComponents, PredictionRecord};
use crate::reconcile::{future_predictions, reconcile, ReconciledRow};
use crate::source::MarketDataSource;
use crate::utils::years_before;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

/// A user's selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    /// Ticker symbol
    pub symbol: String,
    /// Days to forecast past the last observation
    pub horizon_days: u32,
    /// "Today"; history ends here and the preview starts after it
    pub as_of: NaiveDate,
}

impl ForecastRequest {
    pub fn new(symbol: &str, horizon_days: u32, as_of: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_string(),
            horizon_days,
            as_of,
        }
    }
}

/// Everything a forecast screen shows
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub symbol: String,
    /// Company display name
    pub company: String,
    pub model_name: String,
    pub horizon_days: u32,
    pub as_of: NaiveDate,
    /// Last few raw bars
    pub recent_bars: Vec<DailyBar>,
    /// Training span plus horizon
    pub predictions: Vec<PredictionRecord>,
    /// Actual vs predicted from the display window on
    pub reconciled: Vec<ReconciledRow>,
    /// First predictions after `as_of`
    pub future_preview: Vec<PredictionRecord>,
    /// Accuracy over reconciled rows with actuals
    pub score: ScoreSummary,
    /// Fitted trend and seasonality, when the model has them
    pub components: Option<ForecastComponents>,
}

/// The forecasting pipeline for one dashboard config
pub struct ForecastPipeline {
    config: DashboardConfig,
    source: Box<dyn MarketDataSource>,
}

impl std::fmt::Debug for ForecastPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastPipeline")
            .field("config", &self.config)
            .field("source", &self.source.name())
            .finish()
    }
}

impl ForecastPipeline {
    /// Create a pipeline over a validated config
    pub fn new(config: DashboardConfig, source: Box<dyn MarketDataSource>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, source })
    }

    /// Create a pipeline with the source named in the config
    pub fn from_config(config: DashboardConfig) -> Result<Self> {
        let source = config.source.build()?;
        Self::new(config, source)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Run the whole pipeline for one selection
    pub fn run(&self, request: &ForecastRequest) -> Result<ForecastReport> {
        let ticker = self
            .config
            .ticker(&request.symbol)
            .ok_or_else(|| ForecastError::UnsupportedTicker(request.symbol.clone()))?;
        self.config.check_horizon(request.horizon_days)?;

        let start = years_before(request.as_of, self.config.history_years)?;
        info!(
            symbol = %ticker.symbol,
            source = self.source.name(),
            %start,
            end = %request.as_of,
            "fetching history"
        );

        let bars = self
            .source
            .fetch(&ticker.symbol, start, request.as_of)
            .map_err(|e| {
                warn!(symbol = %ticker.symbol, error = %e, "fetch failed");
                e
            })?;
        if bars.is_empty() {
            return Err(ForecastError::NoData {
                symbol: ticker.symbol.clone(),
            });
        }

        let data = TimeSeriesData::from_bars(&bars)?;
        let series = data.training_series()?;
        debug!(rows = series.len(), "training series validated");

        let model = self.config.model.fit(&series, self.config.interval_width)?;
        let forecast = model.forecast(request.horizon_days as usize)?;
        info!(
            model = model.name(),
            predictions = forecast.len(),
            horizon = forecast.horizon(),
            "forecast ready"
        );

        let observations = data.observations()?;
        let predictions = forecast.into_records();
        let reconciled = reconcile(&observations, &predictions, self.config.window_start)?;
        let score = score(&reconciled);
        if score.is_empty() {
            debug!("no actuals inside the display window");
        } else {
            info!(
                mae = score.mae,
                rmse = score.rmse,
                mape = score.mape,
                rows = score.count,
                "reconciled forecast scored"
            );
        }

        Ok(ForecastReport {
            symbol: ticker.symbol.clone(),
            company: ticker.name.clone(),
            model_name: model.name().to_string(),
            horizon_days: request.horizon_days,
            as_of: request.as_of,
            recent_bars: data.tail(self.config.raw_tail_rows)?,
            future_preview: future_predictions(
                &predictions,
                request.as_of,
                self.config.preview_rows,
            ),
            predictions,
            reconciled,
            score,
            components: model.components(),
        })
    }
}
