//! Additive trend and seasonality model
//!
//! `y(t) = trend(t) + weekly(weekday) + yearly(month) + noise`
//!
//! The trend is an ordinary least squares line over days since the first
//! observation. Weekly and yearly terms are centered mean residuals per
//! weekday and per calendar month; the yearly term is only estimated once
//! the history spans two years, otherwise it is zero. Intervals come from the
//! spread of the in-sample residuals.

use crate::error::{ForecastError, Result};
use crate::models::{
    count_beyond, interval_z, residual_std, ForecastComponents, ForecastModel, ForecastResult,
    PredictionRecord, SeasonalEffect, TrainedForecastModel, DEFAULT_INTERVAL_WIDTH,
};
use chrono::{Datelike, NaiveDate, Weekday};

const MIN_DAYS_FOR_YEARLY: i64 = 730;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Additive regression model
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    name: String,
    interval_width: f64,
    weekly: bool,
    yearly: bool,
}

/// Trained additive regression model
#[derive(Debug, Clone)]
pub struct TrainedAdditiveModel {
    name: String,
    dates: Vec<NaiveDate>,
    origin: NaiveDate,
    slope: f64,
    intercept: f64,
    /// Indexed by `weekday().num_days_from_monday()`
    weekly_effects: [f64; 7],
    /// Indexed by `month0()`
    yearly_effects: [f64; 12],
    weekly_fitted: bool,
    yearly_fitted: bool,
    sigma: f64,
    z: f64,
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self::new()
    }
}

impl AdditiveModel {
    /// Create an additive model with weekly and yearly seasonality enabled
    pub fn new() -> Self {
        Self {
            name: "Additive (trend + seasonality)".to_string(),
            interval_width: DEFAULT_INTERVAL_WIDTH,
            weekly: true,
            yearly: true,
        }
    }

    /// Set the prediction interval coverage
    pub fn with_interval_width(mut self, width: f64) -> Result<Self> {
        interval_z(width)?;
        self.interval_width = width;
        Ok(self)
    }

    /// Enable or disable the weekly component
    pub fn with_weekly(mut self, enabled: bool) -> Self {
        self.weekly = enabled;
        self
    }

    /// Enable or disable the yearly component
    pub fn with_yearly(mut self, enabled: bool) -> Self {
        self.yearly = enabled;
        self
    }
}

/// Least squares line through `(x, y)`; returns `(slope, intercept)`
fn linear_trend(xs: &[f64], ys: &[f64]) -> Result<(f64, f64)> {
    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean) * (x - x_mean);
    }

    if denominator.abs() < 1e-10 {
        return Err(ForecastError::ForecastingError(
            "Cannot calculate trend: dates are too similar".to_string(),
        ));
    }

    let slope = numerator / denominator;
    Ok((slope, y_mean - slope * x_mean))
}

/// Mean residual per bucket, centered over the buckets that were observed
fn seasonal_effects<const N: usize>(buckets: &[usize], residuals: &[f64]) -> [f64; N] {
    let mut sums = [0.0; N];
    let mut counts = [0usize; N];
    for (&bucket, &r) in buckets.iter().zip(residuals) {
        sums[bucket] += r;
        counts[bucket] += 1;
    }

    let mut effects = [0.0; N];
    let mut observed = 0;
    let mut total = 0.0;
    for i in 0..N {
        if counts[i] > 0 {
            effects[i] = sums[i] / counts[i] as f64;
            total += effects[i];
            observed += 1;
        }
    }

    if observed > 0 {
        let center = total / observed as f64;
        for i in 0..N {
            if counts[i] > 0 {
                effects[i] -= center;
            }
        }
    }

    effects
}

impl ForecastModel for AdditiveModel {
    type Trained = TrainedAdditiveModel;

    fn train(&self, series: &[(NaiveDate, f64)]) -> Result<Self::Trained> {
        if series.len() < 2 {
            return Err(ForecastError::InsufficientData(
                "Additive model needs at least 2 observations".to_string(),
            ));
        }

        let (dates, prices): (Vec<NaiveDate>, Vec<f64>) = series.iter().copied().unzip();
        let origin = dates[0];
        let xs: Vec<f64> = dates
            .iter()
            .map(|d| (*d - origin).num_days() as f64)
            .collect();

        let (slope, intercept) = linear_trend(&xs, &prices)?;
        let mut residuals: Vec<f64> = xs
            .iter()
            .zip(&prices)
            .map(|(x, y)| y - (slope * x + intercept))
            .collect();

        let weekly_effects = if self.weekly {
            let weekdays: Vec<usize> = dates
                .iter()
                .map(|d| d.weekday().num_days_from_monday() as usize)
                .collect();
            let effects = seasonal_effects::<7>(&weekdays, &residuals);
            for (r, w) in residuals.iter_mut().zip(&weekdays) {
                *r -= effects[*w];
            }
            effects
        } else {
            [0.0; 7]
        };

        let span = (dates[dates.len() - 1] - origin).num_days();
        let yearly_fitted = self.yearly && span >= MIN_DAYS_FOR_YEARLY;
        let yearly_effects = if yearly_fitted {
            let months: Vec<usize> = dates.iter().map(|d| d.month0() as usize).collect();
            let effects = seasonal_effects::<12>(&months, &residuals);
            for (r, m) in residuals.iter_mut().zip(&months) {
                *r -= effects[*m];
            }
            effects
        } else {
            [0.0; 12]
        };

        let zeros = vec![0.0; residuals.len()];
        let sigma = residual_std(&residuals, &zeros);

        tracing::debug!(slope, intercept, sigma, "additive model trained");

        Ok(TrainedAdditiveModel {
            name: self.name.clone(),
            dates,
            origin,
            slope,
            intercept,
            weekly_effects,
            yearly_effects,
            weekly_fitted: self.weekly,
            yearly_fitted,
            sigma,
            z: interval_z(self.interval_width)?,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedAdditiveModel {
    /// Trend slope in price units per day
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Weekday effects, Monday first
    pub fn weekly_effects(&self) -> &[f64; 7] {
        &self.weekly_effects
    }

    /// Month effects, January first
    pub fn yearly_effects(&self) -> &[f64; 12] {
        &self.yearly_effects
    }

    fn value_at(&self, date: NaiveDate) -> f64 {
        let x = (date - self.origin).num_days() as f64;
        self.slope * x
            + self.intercept
            + self.weekly_effects[date.weekday().num_days_from_monday() as usize]
            + self.yearly_effects[date.month0() as usize]
    }
}

impl TrainedForecastModel for TrainedAdditiveModel {
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastResult> {
        let margin = self.z * self.sigma;
        let records = dates
            .iter()
            .map(|&date| {
                let predicted_value = self.value_at(date);
                PredictionRecord {
                    date,
                    predicted_value,
                    lower_bound: predicted_value - margin,
                    upper_bound: predicted_value + margin,
                }
            })
            .collect();

        ForecastResult::new(records, count_beyond(&self.dates, dates), &self.name)
    }

    fn history_dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn components(&self) -> Option<ForecastComponents> {
        let weekly = if self.weekly_fitted {
            WEEKDAYS
                .iter()
                .zip(&self.weekly_effects)
                .map(|(day, &effect)| SeasonalEffect {
                    label: day.to_string(),
                    effect,
                })
                .collect()
        } else {
            Vec::new()
        };

        let yearly = if self.yearly_fitted {
            MONTHS
                .iter()
                .zip(&self.yearly_effects)
                .map(|(month, &effect)| SeasonalEffect {
                    label: month.to_string(),
                    effect,
                })
                .collect()
        } else {
            Vec::new()
        };

        Some(ForecastComponents {
            trend_start: self.intercept,
            trend_per_day: self.slope,
            weekly,
            yearly,
        })
    }
}
