//! Metrics for evaluating forecast accuracy

use crate::reconcile::ReconciledRow;
use serde::{Deserialize, Serialize};

/// Accuracy of predictions against observed values
///
/// Every field is NaN when there was nothing to score; `mape` is also NaN
/// when every actual was zero. A NaN never turns into 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Rows scored for MAE and RMSE
    pub count: usize,
    /// Rows scored for MAPE (non-zero actuals)
    pub mape_count: usize,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, in percent
    pub mape: f64,
}

impl ScoreSummary {
    /// True when no row had an actual value
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl std::fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mean Absolute Error (MAE): {:.2}", self.mae)?;
        writeln!(f, "Root Mean Squared Error (RMSE): {:.2}", self.rmse)?;
        write!(f, "Mean Absolute Percentage Error (MAPE): {:.2}%", self.mape)
    }
}

/// Score reconciled rows; rows without an actual value are skipped
pub fn score(rows: &[ReconciledRow]) -> ScoreSummary {
    score_pairs(
        rows.iter()
            .filter_map(|row| row.actual_value.map(|a| (a, row.predicted_value))),
    )
}

/// Score `(actual, predicted)` pairs
///
/// Rows with a zero actual count toward MAE and RMSE but are left out of
/// MAPE, which would otherwise divide by zero.
pub fn score_pairs<I>(pairs: I) -> ScoreSummary
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut count = 0usize;
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut mape_count = 0usize;
    let mut pct_sum = 0.0;

    for (actual, predicted) in pairs {
        let error = actual - predicted;
        count += 1;
        abs_sum += error.abs();
        sq_sum += error * error;

        if actual != 0.0 {
            mape_count += 1;
            pct_sum += (error / actual).abs();
        }
    }

    let mean = |sum: f64, n: usize| if n == 0 { f64::NAN } else { sum / n as f64 };

    ScoreSummary {
        count,
        mape_count,
        mae: mean(abs_sum, count),
        rmse: mean(sq_sum, count).sqrt(),
        mape: mean(pct_sum, mape_count) * 100.0,
    }
}

/// Mean absolute error; NaN for empty or mismatched input
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    score_pairs(actual.iter().copied().zip(predicted.iter().copied())).mae
}

/// Mean squared error; NaN for empty or mismatched input
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let rmse = root_mean_squared_error(actual, predicted);
    rmse * rmse
}

/// Root mean squared error; NaN for empty or mismatched input
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    score_pairs(actual.iter().copied().zip(predicted.iter().copied())).rmse
}

/// Mean absolute percentage error in percent, skipping zero actuals
///
/// NaN for empty or mismatched input, or when every actual is zero.
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    score_pairs(actual.iter().copied().zip(predicted.iter().copied())).mape
}
