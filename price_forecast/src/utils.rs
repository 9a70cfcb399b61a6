//! Utility functions for the price_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Days, Months, NaiveDate};

/// Training dates followed by `horizon` consecutive calendar days
///
/// This is the date frame a trained model predicts over: every history date
/// once, then one row per day after the last history date, weekends included.
pub fn make_future_dates(history: &[NaiveDate], horizon: usize) -> Result<Vec<NaiveDate>> {
    let last = history.last().copied().ok_or_else(|| {
        ForecastError::DataError("Cannot extend an empty date history".to_string())
    })?;

    let mut dates = Vec::with_capacity(history.len() + horizon);
    dates.extend_from_slice(history);

    for step in 1..=horizon as u64 {
        let next = last.checked_add_days(Days::new(step)).ok_or_else(|| {
            ForecastError::ValidationError(format!("Horizon of {} days overflows the calendar", horizon))
        })?;
        dates.push(next);
    }

    Ok(dates)
}

/// The date `years` calendar years before `date`
///
/// February 29th maps to February 28th in non-leap years.
pub fn years_before(date: NaiveDate, years: u32) -> Result<NaiveDate> {
    date.checked_sub_months(Months::new(years * 12))
        .ok_or_else(|| ForecastError::ValidationError(format!("Cannot go back {} years", years)))
}
