//! Time series data handling for forecasting

use crate::error::{ForecastError, Result};
use crate::reconcile::ObservationRecord;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Date format used for every date column read or written by this crate
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column holding observed prices in accuracy files
pub const ACTUAL_PRICE_COLUMN: &str = "Actual Price";
/// Column holding predicted prices in accuracy files
pub const PREDICTED_PRICE_COLUMN: &str = "Predicted Price";

const DATE_COLUMN: &str = "date";
const OPEN_COLUMN: &str = "open";
const HIGH_COLUMN: &str = "high";
const LOW_COLUMN: &str = "low";
const CLOSE_COLUMN: &str = "close";
const VOLUME_COLUMN: &str = "volume";

/// One trading day of OHLCV data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Trading date
    pub date: NaiveDate,
    /// Open price (NaN when the provider had none)
    pub open: f64,
    /// High price (NaN when the provider had none)
    pub high: f64,
    /// Low price (NaN when the provider had none)
    pub low: f64,
    /// Close price, absent when the provider returned a gap
    pub close: Option<f64>,
    /// Traded volume
    pub volume: u64,
}

/// Time series data structure for forecasting
///
/// Holds daily bars in a polars `DataFrame` with normalized column names
/// (`date`, `open`, `high`, `low`, `close`, `volume`), whatever the source
/// called them.
#[derive(Debug, Clone)]
pub struct TimeSeriesData {
    df: DataFrame,
}

/// Data loader for time series and accuracy files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load daily bars from a CSV file
    ///
    /// Column names are matched case-insensitively, so both `date,close` and
    /// `Date,Open,High,Low,Close,Adj Close,Volume` exports work.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<TimeSeriesData> {
        let df = read_csv(path)?;
        Self::from_dataframe(df)
    }

    /// Create time series data from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<TimeSeriesData> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let time_column = Self::detect_time_column(&names)?;
        let close_column = Self::detect_close_column(&names)?;
        let open_column = Self::find_column(&names, "open");
        let high_column = Self::find_column(&names, "high");
        let low_column = Self::find_column(&names, "low");
        let volume_column = Self::detect_volume_column(&names);

        let dates = column_as_strings(&df, &time_column)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value
                    .as_deref()
                    .and_then(parse_date)
                    .ok_or_else(|| {
                        ForecastError::DataError(format!(
                            "Invalid date in column '{}' at row {}",
                            time_column, row
                        ))
                    })
            })
            .collect::<Result<Vec<NaiveDate>>>()?;

        let height = dates.len();
        let optional_prices = |column: &Option<String>| -> Result<Vec<f64>> {
            match column {
                Some(name) => Ok(column_as_f64(&df, name)?
                    .into_iter()
                    .map(|v| v.unwrap_or(f64::NAN))
                    .collect()),
                None => Ok(vec![f64::NAN; height]),
            }
        };

        let opens = optional_prices(&open_column)?;
        let highs = optional_prices(&high_column)?;
        let lows = optional_prices(&low_column)?;
        let closes = column_as_f64(&df, &close_column)?;
        let volumes: Vec<u64> = match &volume_column {
            Some(name) => column_as_f64(&df, name)?
                .into_iter()
                .map(|v| v.filter(|v| *v > 0.0).map_or(0, |v| v as u64))
                .collect(),
            None => vec![0; height],
        };

        let bars: Vec<DailyBar> = (0..height)
            .map(|i| DailyBar {
                date: dates[i],
                open: opens[i],
                high: highs[i],
                low: lows[i],
                close: closes[i],
                volume: volumes[i],
            })
            .collect();

        TimeSeriesData::from_bars(&bars)
    }

    /// Read `(actual, predicted)` pairs from an accuracy file
    ///
    /// Rows whose actual price is missing or non-numeric are dropped, the
    /// way a forecast table has no actuals for future dates. A missing
    /// predicted price on a row that has an actual is an error.
    pub fn accuracy_pairs_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<(f64, f64)>> {
        let df = read_csv(path)?;
        let actual = column_as_f64(&df, ACTUAL_PRICE_COLUMN)?;
        let predicted = column_as_f64(&df, PREDICTED_PRICE_COLUMN)?;

        let mut pairs = Vec::with_capacity(actual.len());
        let mut missing_predictions = 0;
        for (a, p) in actual.into_iter().zip(predicted) {
            let Some(a) = a.filter(|v| v.is_finite()) else {
                continue;
            };
            match p.filter(|v| v.is_finite()) {
                Some(p) => pairs.push((a, p)),
                None => missing_predictions += 1,
            }
        }

        if missing_predictions > 0 {
            return Err(ForecastError::MissingValues {
                column: PREDICTED_PRICE_COLUMN.to_string(),
                count: missing_predictions,
            });
        }

        Ok(pairs)
    }

    /// Detect the time column
    fn detect_time_column(names: &[String]) -> Result<String> {
        names
            .iter()
            .find(|name| {
                let lower = name.to_lowercase();
                lower.contains("date") || lower.contains("time") || lower == "ds"
            })
            .cloned()
            .ok_or_else(|| ForecastError::DataError("No time column found in data".to_string()))
    }

    /// Detect the close column, preferring an exact `close` over `adj close`
    fn detect_close_column(names: &[String]) -> Result<String> {
        let lower: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();

        let exact = lower.iter().position(|n| n == "close" || n == "y");
        let contains = || {
            lower
                .iter()
                .position(|n| n.contains("close") && !n.contains("adj"))
        };
        let price = || lower.iter().position(|n| n.contains("price"));

        exact
            .or_else(contains)
            .or_else(price)
            .map(|idx| names[idx].clone())
            .ok_or_else(|| ForecastError::DataError("No close price column found in data".to_string()))
    }

    /// Detect the volume column
    fn detect_volume_column(names: &[String]) -> Option<String> {
        names
            .iter()
            .find(|name| {
                let lower = name.to_lowercase();
                lower.contains("volume") || lower == "vol"
            })
            .cloned()
    }

    fn find_column(names: &[String], needle: &str) -> Option<String> {
        names
            .iter()
            .find(|name| name.to_lowercase() == needle)
            .cloned()
    }
}

impl TimeSeriesData {
    /// Create time series data from daily bars
    pub fn from_bars(bars: &[DailyBar]) -> Result<Self> {
        let dates: Vec<String> = bars
            .iter()
            .map(|b| b.date.format(DATE_FORMAT).to_string())
            .collect();
        let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let closes: Vec<Option<f64>> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();

        let df = df!(
            DATE_COLUMN => dates,
            OPEN_COLUMN => opens,
            HIGH_COLUMN => highs,
            LOW_COLUMN => lows,
            CLOSE_COLUMN => closes,
            VOLUME_COLUMN => volumes
        )?;

        Ok(Self { df })
    }

    /// Create a close-only series from dates and values (for testing)
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::ValidationError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }

        let bars: Vec<DailyBar> = dates
            .into_iter()
            .zip(values)
            .map(|(date, close)| DailyBar {
                date,
                open: close,
                high: close,
                low: close,
                close: Some(close),
                volume: 0,
            })
            .collect();

        Self::from_bars(&bars)
    }

    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Check if the time series is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Get the length of the time series
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Get the dates in stored order
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        column_as_strings(&self.df, DATE_COLUMN)?
            .into_iter()
            .map(|value| {
                value
                    .as_deref()
                    .and_then(parse_date)
                    .ok_or_else(|| ForecastError::DataError("Invalid stored date".to_string()))
            })
            .collect()
    }

    /// Get the close prices, `None` where missing
    pub fn close_prices(&self) -> Result<Vec<Option<f64>>> {
        column_as_f64(&self.df, CLOSE_COLUMN)
    }

    /// Rebuild the daily bars
    pub fn bars(&self) -> Result<Vec<DailyBar>> {
        let dates = self.dates()?;
        let opens = column_as_f64(&self.df, OPEN_COLUMN)?;
        let highs = column_as_f64(&self.df, HIGH_COLUMN)?;
        let lows = column_as_f64(&self.df, LOW_COLUMN)?;
        let closes = self.close_prices()?;
        let volumes = column_as_f64(&self.df, VOLUME_COLUMN)?;

        Ok((0..dates.len())
            .map(|i| DailyBar {
                date: dates[i],
                open: opens[i].unwrap_or(f64::NAN),
                high: highs[i].unwrap_or(f64::NAN),
                low: lows[i].unwrap_or(f64::NAN),
                close: closes[i],
                volume: volumes[i].map_or(0, |v| v as u64),
            })
            .collect())
    }

    /// The last `n` bars, oldest first
    pub fn tail(&self, n: usize) -> Result<Vec<DailyBar>> {
        let bars = self.bars()?;
        let start = bars.len().saturating_sub(n);
        Ok(bars[start..].to_vec())
    }

    /// Observed closes keyed by date, for reconciliation
    pub fn observations(&self) -> Result<Vec<ObservationRecord>> {
        let dates = self.dates()?;
        let closes = self.close_prices()?;

        Ok(dates
            .into_iter()
            .zip(closes)
            .map(|(date, close)| ObservationRecord {
                date,
                actual_value: close.filter(|v| v.is_finite()),
            })
            .collect())
    }

    /// Training table for a forecast model: `(date, close)` sorted ascending
    ///
    /// Fails if any close is missing or non-numeric, if a date repeats, or if
    /// there is nothing to train on.
    pub fn training_series(&self) -> Result<Vec<(NaiveDate, f64)>> {
        if self.is_empty() {
            return Err(ForecastError::DataError(
                "Empty time series data".to_string(),
            ));
        }

        let dates = self.dates()?;
        let closes = self.close_prices()?;

        let missing = closes
            .iter()
            .filter(|v| !v.is_some_and(|x| x.is_finite()))
            .count();
        if missing > 0 {
            return Err(ForecastError::MissingValues {
                column: "Close".to_string(),
                count: missing,
            });
        }

        let mut series: Vec<(NaiveDate, f64)> = dates
            .into_iter()
            .zip(closes.into_iter().flatten())
            .collect();
        series.sort_by_key(|(date, _)| *date);

        if let Some(pair) = series.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(ForecastError::DuplicateDate(pair[0].0));
        }

        Ok(series)
    }
}

/// Parse a `YYYY-MM-DD` date, ignoring any trailing time component
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .into_reader_with_file_handle(file)
        .finish()?;
    Ok(df)
}

/// Column coerced to f64; unparseable cells become `None`
fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| ForecastError::DataError(format!("Column '{}' not found", name)))?
        .cast(&DataType::Float64)?;
    let values = column.f64()?.into_iter().collect();
    Ok(values)
}

fn column_as_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| ForecastError::DataError(format!("Column '{}' not found", name)))?
        .cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_ignores_time_suffix() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(parse_date("2024-05-01"), Some(expected));
        assert_eq!(parse_date("2024-05-01 00:00:00+00:00"), Some(expected));
        assert_eq!(parse_date(" 2024-05-01 "), Some(expected));
        assert_eq!(parse_date("05/01/2024"), None);
    }

    #[test]
    fn test_detect_close_prefers_plain_close() {
        let names: Vec<String> = ["Date", "Adj Close", "Close", "Volume"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(DataLoader::detect_close_column(&names).unwrap(), "Close");
        assert_eq!(DataLoader::detect_time_column(&names).unwrap(), "Date");
        assert_eq!(
            DataLoader::detect_volume_column(&names),
            Some("Volume".to_string())
        );
    }

    #[test]
    fn test_detect_close_falls_back_to_price() {
        let names: Vec<String> = ["date", "price"].iter().map(|s| s.to_string()).collect();
        assert_eq!(DataLoader::detect_close_column(&names).unwrap(), "price");
    }
}
