//! Moving average model for time series forecasting

use crate::error::{ForecastError, Result};
use crate::models::{
    count_beyond, interval_z, level_predictions, residual_std, ForecastModel, ForecastResult,
    TrainedForecastModel, DEFAULT_INTERVAL_WIDTH,
};
use chrono::NaiveDate;

/// Simple Moving Average model
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    /// Name of the model
    name: String,
    /// Window size
    window: usize,
    /// Prediction interval coverage
    interval_width: f64,
}

/// Trained Simple Moving Average model
#[derive(Debug, Clone)]
pub struct TrainedSimpleMovingAverage {
    name: String,
    window: usize,
    dates: Vec<NaiveDate>,
    first_value: f64,
    /// Trailing average ending at each observation
    averages: Vec<f64>,
    sigma: f64,
    z: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average model
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Simple Moving Average (window={})", window),
            window,
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

impl ForecastModel for SimpleMovingAverage {
    type Trained = TrainedSimpleMovingAverage;

    fn train(&self, series: &[(NaiveDate, f64)]) -> Result<Self::Trained> {
        let needed = self.window.max(2);
        if series.len() < needed {
            return Err(ForecastError::InsufficientData(format!(
                "Insufficient data for SMA. Need at least {} observations.",
                needed
            )));
        }

        let (dates, prices): (Vec<NaiveDate>, Vec<f64>) = series.iter().copied().unzip();

        // Expanding mean until the window fills, trailing mean after
        let mut averages = Vec::with_capacity(prices.len());
        let mut running = 0.0;
        for i in 0..prices.len() {
            running += prices[i];
            if i >= self.window {
                running -= prices[i - self.window];
            }
            let count = (i + 1).min(self.window);
            averages.push(running / count as f64);
        }

        let sigma = residual_std(&prices[1..], &averages[..averages.len() - 1]);

        Ok(TrainedSimpleMovingAverage {
            name: self.name.clone(),
            window: self.window,
            dates,
            first_value: prices[0],
            averages,
            sigma,
            z: interval_z(self.interval_width)?,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSimpleMovingAverage {
    /// Window size
    pub fn window(&self) -> usize {
        self.window
    }

    /// Average over the last `window` observations
    pub fn last_average(&self) -> f64 {
        self.averages.last().copied().unwrap_or(self.first_value)
    }
}

impl TrainedForecastModel for TrainedSimpleMovingAverage {
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastResult> {
        let records = level_predictions(
            &self.dates,
            self.first_value,
            &self.averages,
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
