//! Joining predictions with observed prices
//!
//! Predictions drive the join: every predicted date inside the display window
//! produces exactly one row, with the observed close attached when one exists
//! for that date. Observations without a prediction are dropped.

use crate::data::{ACTUAL_PRICE_COLUMN, DATE_FORMAT, PREDICTED_PRICE_COLUMN};
use crate::error::{ForecastError, Result};
use crate::models::PredictionRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Write;

/// Observed value for a calendar date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// Observation date
    pub date: NaiveDate,
    /// Observed close, absent for gaps and future dates
    pub actual_value: Option<f64>,
}

/// Prediction joined with the observation for the same date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    /// Row date
    pub date: NaiveDate,
    /// Observed close, if any
    pub actual_value: Option<f64>,
    /// Predicted close
    pub predicted_value: f64,
}

impl ReconciledRow {
    /// `actual - predicted`, when an actual exists
    pub fn error(&self) -> Option<f64> {
        self.actual_value.map(|a| a - self.predicted_value)
    }

    /// Absolute error as a percentage of the actual; `None` for a zero actual
    pub fn percentage_error(&self) -> Option<f64> {
        self.actual_value
            .filter(|a| *a != 0.0)
            .map(|a| ((a - self.predicted_value) / a).abs() * 100.0)
    }
}

/// Left join of observations onto predictions, restricted to `date >= window_start`
///
/// Output is ascending by date. Duplicate dates in either input are rejected.
pub fn reconcile(
    observations: &[ObservationRecord],
    predictions: &[PredictionRecord],
    window_start: NaiveDate,
) -> Result<Vec<ReconciledRow>> {
    let mut actuals: HashMap<NaiveDate, Option<f64>> = HashMap::with_capacity(observations.len());
    for observation in observations {
        if actuals
            .insert(observation.date, observation.actual_value)
            .is_some()
        {
            return Err(ForecastError::DuplicateDate(observation.date));
        }
    }

    let mut predicted_dates: HashSet<NaiveDate> = HashSet::with_capacity(predictions.len());
    for prediction in predictions {
        if !predicted_dates.insert(prediction.date) {
            return Err(ForecastError::DuplicateDate(prediction.date));
        }
    }

    let mut rows: Vec<ReconciledRow> = predictions
        .iter()
        .filter(|p| p.date >= window_start)
        .map(|p| ReconciledRow {
            date: p.date,
            actual_value: actuals
                .get(&p.date)
                .copied()
                .flatten()
                .filter(|v| v.is_finite()),
            predicted_value: p.predicted_value,
        })
        .collect();

    rows.sort_by_key(|row| row.date);

    Ok(rows)
}

/// Predictions strictly after `after`, at most `limit` of them
pub fn future_predictions(
    predictions: &[PredictionRecord],
    after: NaiveDate,
    limit: usize,
) -> Vec<PredictionRecord> {
    predictions
        .iter()
        .filter(|p| p.date > after)
        .take(limit)
        .copied()
        .collect()
}

#[derive(Serialize)]
struct ReconciledCsvRow<'a> {
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Actual Price")]
    actual: Option<f64>,
    #[serde(rename = "Predicted Price")]
    predicted: f64,
}

/// Write rows as `Date,Actual Price,Predicted Price`
///
/// Missing actuals are written as empty cells, which the accuracy loader
/// treats as rows to drop.
pub fn write_reconciled_csv<W: Write>(rows: &[ReconciledRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for row in rows {
        let date = row.date.format(DATE_FORMAT).to_string();
        csv_writer.serialize(ReconciledCsvRow {
            date: &date,
            actual: row.actual_value,
            predicted: row.predicted_value,
        })?;
    }

    if rows.is_empty() {
        csv_writer.write_record(["Date", ACTUAL_PRICE_COLUMN, PREDICTED_PRICE_COLUMN])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(actual: Option<f64>, predicted: f64) -> ReconciledRow {
        ReconciledRow {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            actual_value: actual,
            predicted_value: predicted,
        }
    }

    #[test]
    fn test_row_error() {
        assert_eq!(row(Some(10.0), 12.0).error(), Some(-2.0));
        assert_eq!(row(None, 12.0).error(), None);
    }

    #[test]
    fn test_row_percentage_error_guards_zero() {
        assert_eq!(row(Some(10.0), 12.0).percentage_error(), Some(20.0));
        assert_eq!(row(Some(0.0), 1.0).percentage_error(), None);
        assert_eq!(row(None, 1.0).percentage_error(), None);
    }

    #[test]
    fn test_write_empty_keeps_header() {
        let mut buffer = Vec::new();
        write_reconciled_csv(&[], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.trim(), "Date,Actual Price,Predicted Price");
    }
}
