//! Forecasting models for daily price series
//!
//! Every model follows the same two-step shape: an untrained
//! [`ForecastModel`] holds parameters and is trained on a `(date, close)`
//! series, producing a [`TrainedForecastModel`] that can predict any set of
//! dates. [`TrainedForecastModel::forecast`] predicts the training dates plus
//! `horizon` consecutive calendar days after the last one.

use crate::error::{ForecastError, Result};
use crate::utils::make_future_dates;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt::Debug;

/// Default coverage of the prediction interval
pub const DEFAULT_INTERVAL_WIDTH: f64 = 0.8;

/// Predicted value for one date with its interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Predicted date
    pub date: NaiveDate,
    /// Point prediction
    pub predicted_value: f64,
    /// Lower interval bound
    pub lower_bound: f64,
    /// Upper interval bound
    pub upper_bound: f64,
}

/// Forecast result containing predicted records in date order
#[derive(Debug, Clone)]
pub struct ForecastResult {
    records: Vec<PredictionRecord>,
    /// Number of records past the end of the training data
    horizon: usize,
    model_name: String,
}

impl ForecastResult {
    /// Create a new forecast result
    ///
    /// Dates must be strictly ascending, values finite, and every record must
    /// satisfy `lower <= predicted <= upper`.
    pub fn new(records: Vec<PredictionRecord>, horizon: usize, model_name: &str) -> Result<Self> {
        if horizon > records.len() {
            return Err(ForecastError::ValidationError(format!(
                "Horizon ({}) exceeds number of records ({})",
                horizon,
                records.len()
            )));
        }

        if let Some(pair) = records.windows(2).find(|pair| pair[0].date >= pair[1].date) {
            return Err(if pair[0].date == pair[1].date {
                ForecastError::DuplicateDate(pair[0].date)
            } else {
                ForecastError::ValidationError(format!(
                    "Prediction dates out of order: {} before {}",
                    pair[0].date, pair[1].date
                ))
            });
        }

        for record in &records {
            let finite = record.predicted_value.is_finite()
                && record.lower_bound.is_finite()
                && record.upper_bound.is_finite();
            if !finite {
                return Err(ForecastError::ForecastingError(format!(
                    "Non-finite prediction for {}",
                    record.date
                )));
            }
            if record.lower_bound > record.predicted_value
                || record.predicted_value > record.upper_bound
            {
                return Err(ForecastError::ForecastingError(format!(
                    "Prediction for {} lies outside its interval",
                    record.date
                )));
            }
        }

        Ok(Self {
            records,
            horizon,
            model_name: model_name.to_string(),
        })
    }

    /// Get the predicted records
    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    /// Consume the result, keeping the records
    pub fn into_records(self) -> Vec<PredictionRecord> {
        self.records
    }

    /// Get the point predictions
    pub fn values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.predicted_value).collect()
    }

    /// Get the prediction intervals as `(lower, upper)`
    pub fn intervals(&self) -> Vec<(f64, f64)> {
        self.records
            .iter()
            .map(|r| (r.lower_bound, r.upper_bound))
            .collect()
    }

    /// Get the predicted dates
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// Number of records past the training data
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Name of the model that produced the forecast
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Number of predicted records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Named seasonal effect in price units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalEffect {
    /// Weekday or month name
    pub label: String,
    pub effect: f64,
}

/// Fitted components of a decomposable model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastComponents {
    /// Trend value on the first training date
    pub trend_start: f64,
    /// Trend change per calendar day
    pub trend_per_day: f64,
    /// Weekday effects, Monday first; empty when not fitted
    pub weekly: Vec<SeasonalEffect>,
    /// Month effects, January first; empty when not fitted
    pub yearly: Vec<SeasonalEffect>,
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Predict values for arbitrary dates
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastResult>;

    /// Dates the model was trained on, ascending
    fn history_dates(&self) -> &[NaiveDate];

    /// Name of the model
    fn name(&self) -> &str;

    /// Trend and seasonal components, for models that have them
    fn components(&self) -> Option<ForecastComponents> {
        None
    }

    /// Predict the training span plus `horizon` calendar days after it
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        let dates = make_future_dates(self.history_dates(), horizon)?;
        self.predict(&dates)
    }
}

/// Forecast model that can be trained on a `(date, close)` series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model; the series must be sorted ascending without gaps in values
    fn train(&self, series: &[(NaiveDate, f64)]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Model selection as it appears in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    /// Trend plus weekly and yearly seasonality
    #[default]
    Additive,
    /// Simple exponential smoothing
    ExponentialSmoothing { alpha: f64 },
    /// Trailing simple moving average
    MovingAverage { window: usize },
}

impl ModelKind {
    /// Check the model parameters without training
    pub fn validate(&self) -> Result<()> {
        match self {
            ModelKind::Additive => Ok(()),
            ModelKind::ExponentialSmoothing { alpha } => {
                ExponentialSmoothing::new(*alpha).map(|_| ())
            }
            ModelKind::MovingAverage { window } => SimpleMovingAverage::new(*window).map(|_| ()),
        }
    }

    /// Build and train the selected model
    pub fn fit(
        &self,
        series: &[(NaiveDate, f64)],
        interval_width: f64,
    ) -> Result<Box<dyn TrainedForecastModel>> {
        let trained: Box<dyn TrainedForecastModel> = match self {
            ModelKind::Additive => Box::new(
                AdditiveModel::new()
                    .with_interval_width(interval_width)?
                    .train(series)?,
            ),
            ModelKind::ExponentialSmoothing { alpha } => Box::new(
                ExponentialSmoothing::new(*alpha)?
                    .with_interval_width(interval_width)?
                    .train(series)?,
            ),
            ModelKind::MovingAverage { window } => Box::new(
                SimpleMovingAverage::new(*window)?
                    .with_interval_width(interval_width)?
                    .train(series)?,
            ),
        };
        Ok(trained)
    }
}

/// Two-sided normal quantile for an interval covering `width` of the mass
pub(crate) fn interval_z(width: f64) -> Result<f64> {
    if !(width > 0.0 && width < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Interval width must be between 0 and 1, got {}",
            width
        )));
    }

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::ForecastingError(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + width / 2.0))
}

/// Sample standard deviation of `actual - fitted`
pub(crate) fn residual_std(actual: &[f64], fitted: &[f64]) -> f64 {
    let n = actual.len().min(fitted.len());
    if n < 2 {
        return 0.0;
    }

    let residuals: Vec<f64> = actual.iter().zip(fitted).map(|(a, f)| a - f).collect();
    let mean = residuals.iter().sum::<f64>() / n as f64;
    let variance = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Predictions for a level model
///
/// `levels[i]` is the level after observing point `i` of `history`. A date is
/// predicted with the latest level strictly before it, so training dates get
/// one-step-ahead fits and future dates a flat line. The interval widens with
/// the square root of the number of days past the training data.
pub(crate) fn level_predictions(
    history: &[NaiveDate],
    first_value: f64,
    levels: &[f64],
    sigma: f64,
    z: f64,
    dates: &[NaiveDate],
) -> Vec<PredictionRecord> {
    let last = history.last().copied();

    dates
        .iter()
        .map(|&date| {
            let seen = history.partition_point(|h| *h < date);
            let predicted_value = if seen == 0 {
                first_value
            } else {
                levels[seen - 1]
            };

            let steps = match last {
                Some(last) if date > last => (date - last).num_days() as f64,
                _ => 1.0,
            };
            let margin = z * sigma * steps.sqrt();

            PredictionRecord {
                date,
                predicted_value,
                lower_bound: predicted_value - margin,
                upper_bound: predicted_value + margin,
            }
        })
        .collect()
}

/// Number of dates strictly after the last training date
pub(crate) fn count_beyond(history: &[NaiveDate], dates: &[NaiveDate]) -> usize {
    match history.last() {
        Some(last) => dates.iter().filter(|d| *d > last).count(),
        None => dates.len(),
    }
}

pub mod additive;
pub mod exponential_smoothing;
pub mod moving_average;

pub use additive::{AdditiveModel, TrainedAdditiveModel};
pub use exponential_smoothing::{ExponentialSmoothing, TrainedExponentialSmoothing};
pub use moving_average::{SimpleMovingAverage, TrainedSimpleMovingAverage};
