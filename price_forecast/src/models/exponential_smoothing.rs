//! Exponential smoothing models for time series forecasting

use crate::error::{ForecastError, Result};
use crate::models::{
    count_beyond, interval_z, level_predictions, residual_std, ForecastModel, ForecastResult,
    TrainedForecastModel, DEFAULT_INTERVAL_WIDTH,
};
use chrono::NaiveDate;

/// Simple exponential smoothing model
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Smoothing parameter
    alpha: f64,
    /// Prediction interval coverage
    interval_width: f64,
}

/// Trained exponential smoothing model
#[derive(Debug, Clone)]
pub struct TrainedExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Smoothing parameter
    alpha: f64,
    /// Training dates
    dates: Vec<NaiveDate>,
    /// First observed value
    first_value: f64,
    /// Level after each observation
    levels: Vec<f64>,
    /// Std of one-step-ahead residuals
    sigma: f64,
    /// Normal quantile for the interval
    z: f64,
}

impl ExponentialSmoothing {
    /// Create a new exponential smoothing model
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Alpha must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Exponential Smoothing (alpha={})", alpha),
            alpha,
            interval_width: DEFAULT_INTERVAL_WIDTH,
        })
    }

    /// Set the prediction interval coverage
    pub fn with_interval_width(mut self, width: f64) -> Result<Self> {
        interval_z(width)?;
        self.interval_width = width;
        Ok(self)
    }
}

impl ForecastModel for ExponentialSmoothing {
    type Trained = TrainedExponentialSmoothing;

    fn train(&self, series: &[(NaiveDate, f64)]) -> Result<Self::Trained> {
        if series.len() < 2 {
            return Err(ForecastError::InsufficientData(
                "Exponential smoothing needs at least 2 observations".to_string(),
            ));
        }

        let (dates, prices): (Vec<NaiveDate>, Vec<f64>) = series.iter().copied().unzip();

        // Initialize level with first observation
        let mut levels = Vec::with_capacity(prices.len());
        let mut level = prices[0];
        levels.push(level);

        for &value in &prices[1..] {
            level = self.alpha * value + (1.0 - self.alpha) * level;
            levels.push(level);
        }

        // One-step-ahead fits for points 1.. are the previous levels
        let sigma = residual_std(&prices[1..], &levels[..levels.len() - 1]);

        Ok(TrainedExponentialSmoothing {
            name: self.name.clone(),
            alpha: self.alpha,
            dates,
            first_value: prices[0],
            levels,
            sigma,
            z: interval_z(self.interval_width)?,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedExponentialSmoothing {
    /// Smoothing parameter
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Level after the last observation; the flat forecast value
    pub fn level(&self) -> f64 {
        self.levels.last().copied().unwrap_or(self.first_value)
    }
}

impl TrainedForecastModel for TrainedExponentialSmoothing {
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastResult> {
        let records = level_predictions(
            &self.dates,
            self.first_value,
            &self.levels,
            self.sigma,
            self.z,
            dates,
        );
        ForecastResult::new(records, count_beyond(&self.dates, dates), &self.name)
    }

    fn history_dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    fn name(&self) -> &str {
        &self.name
    }
}
