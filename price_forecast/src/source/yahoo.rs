//! Yahoo Finance market data source.
//!
//! Fetches daily bars from Yahoo's v8 chart API with a blocking client.
//! Transport failures, rate limiting and server errors are retried with
//! exponential backoff; anything else fails the fetch immediately.

use super::MarketDataSource;
use crate::data::DailyBar;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance data source
pub struct YahooSource {
    client: reqwest::blocking::Client,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooSource {
    /// Create a source with a 30 second request timeout
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Point the source at another chart endpoint
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the number of retries after the first attempt
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            self.base_url, symbol, start_ts, end_ts
        )
    }

    fn fetch_with_retry(&self, symbol: &str, url: &str) -> Result<ChartResponse> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(symbol, attempt, ?delay, "retrying yahoo request");
                std::thread::sleep(delay);
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(ForecastError::NoData {
                            symbol: symbol.to_string(),
                        });
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
                    {
                        tracing::warn!(symbol, %status, "yahoo request failed");
                        last_error = Some(ForecastError::NetworkError(format!(
                            "HTTP {} for {}",
                            status, symbol
                        )));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(ForecastError::NetworkError(format!(
                            "HTTP {} for {}",
                            status, symbol
                        )));
                    }

                    return resp.json::<ChartResponse>().map_err(|e| {
                        ForecastError::DataError(format!(
                            "Failed to parse response for {}: {}",
                            symbol, e
                        ))
                    });
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    tracing::warn!(symbol, error = %e, "yahoo request failed");
                    last_error = Some(ForecastError::NetworkError(e.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ForecastError::NetworkError(format!("Request for {} failed", symbol))
        }))
    }
}

/// Convert a chart response into bars within `[start, end]`
fn parse_response(
    symbol: &str,
    resp: ChartResponse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyBar>> {
    let no_data = || ForecastError::NoData {
        symbol: symbol.to_string(),
    };

    let Some(results) = resp.chart.result else {
        return match resp.chart.error {
            Some(err) if err.code != "Not Found" => Err(ForecastError::DataError(format!(
                "{}: {}",
                err.code, err.description
            ))),
            _ => Err(no_data()),
        };
    };

    let data = results.into_iter().next().ok_or_else(no_data)?;
    let timestamps = data.timestamp.ok_or_else(no_data)?;
    let quote = data.indicators.quote.into_iter().next().ok_or_else(no_data)?;

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| ForecastError::DataError(format!("Invalid timestamp: {}", ts)))?;

        if date < start || date > end {
            continue;
        }

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        // Holidays come back with every field empty
        if open.is_none() && high.is_none() && low.is_none() && close.is_none() && volume.is_none()
        {
            continue;
        }

        bars.push(DailyBar {
            date,
            open: open.unwrap_or(f64::NAN),
            high: high.unwrap_or(f64::NAN),
            low: low.unwrap_or(f64::NAN),
            close,
            volume: volume.unwrap_or(0),
        });
    }

    if bars.is_empty() {
        return Err(no_data());
    }

    Ok(bars)
}

impl MarketDataSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>> {
        let url = self.chart_url(symbol, start, end);
        tracing::info!(symbol, %start, %end, "fetching daily bars from yahoo");

        let response = self.fetch_with_retry(symbol, &url)?;
        let bars = parse_response(symbol, response, start, end)?;

        tracing::info!(symbol, rows = bars.len(), "fetched daily bars");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_response_skips_holidays() {
        // 2024-05-01, 2024-05-02, 2024-05-03 at 13:30 UTC
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1714570200, 1714656600, 1714743000],
                    "indicators": {
                        "quote": [{
                            "open": [100.0, null, 102.0],
                            "high": [101.0, null, 103.0],
                            "low": [99.0, null, 101.0],
                            "close": [100.5, null, 102.5],
                            "volume": [1000, null, 1200]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        let bars = parse_response("AAPL", resp, ymd(2024, 1, 1), ymd(2024, 12, 31)).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, ymd(2024, 5, 1));
        assert_eq!(bars[1].close, Some(102.5));
        assert_eq!(bars[1].volume, 1200);
    }

    #[test]
    fn test_parse_response_not_found_is_no_data() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        let err = parse_response("NOPE", resp, ymd(2024, 1, 1), ymd(2024, 12, 31)).unwrap_err();
        assert!(err.is_no_data());
    }

    #[test]
    fn test_chart_url_covers_end_date() {
        let source = YahooSource::new().unwrap().with_base_url("http://localhost/chart/");
        let url = source.chart_url("MSFT", ymd(2024, 1, 1), ymd(2024, 1, 2));
        assert_eq!(
            url,
            "http://localhost/chart/MSFT?period1=1704067200&period2=1704240000&interval=1d"
        );
    }
}
