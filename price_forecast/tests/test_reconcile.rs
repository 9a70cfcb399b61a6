use chrono::{Days, NaiveDate};
use pretty_assertions::assert_eq;
use price_forecast::data::DataLoader;
use price_forecast::models::PredictionRecord;
use price_forecast::reconcile::{
    future_predictions, reconcile, write_reconciled_csv, ObservationRecord, ReconciledRow,
};
use price_forecast::ForecastError;
use std::collections::HashSet;
use std::io::Write;
use tempfile::NamedTempFile;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn prediction(date: NaiveDate, value: f64) -> PredictionRecord {
    PredictionRecord {
        date,
        predicted_value: value,
        lower_bound: value - 1.0,
        upper_bound: value + 1.0,
    }
}

fn observation(date: NaiveDate, value: f64) -> ObservationRecord {
    ObservationRecord {
        date,
        actual_value: Some(value),
    }
}

/// Weekday observations for April and May 2024, daily predictions through June
fn fixture() -> (Vec<ObservationRecord>, Vec<PredictionRecord>) {
    let start = ymd(2024, 4, 1);
    let observations = (0..61u64)
        .map(|i| start + Days::new(i))
        .filter(|d| {
            use chrono::Datelike;
            d.weekday().num_days_from_monday() < 5
        })
        .map(|d| observation(d, 100.0))
        .collect();
    let predictions = (0..91u64)
        .map(|i| prediction(start + Days::new(i), 101.0))
        .collect();
    (observations, predictions)
}

#[test]
fn test_every_prediction_in_window_appears_once() {
    let (observations, predictions) = fixture();
    let window_start = ymd(2024, 5, 1);

    let rows = reconcile(&observations, &predictions, window_start).unwrap();

    let expected: HashSet<NaiveDate> = predictions
        .iter()
        .map(|p| p.date)
        .filter(|d| *d >= window_start)
        .collect();
    let got: HashSet<NaiveDate> = rows.iter().map(|r| r.date).collect();

    assert_eq!(rows.len(), expected.len());
    assert_eq!(got, expected);
    assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(rows[0].date, window_start);
}

#[test]
fn test_actuals_attach_only_where_observed() {
    let (observations, predictions) = fixture();
    let rows = reconcile(&observations, &predictions, ymd(2024, 5, 1)).unwrap();

    // 2024-05-04 is a Saturday, 2024-06-03 is after the last observation
    let saturday = rows.iter().find(|r| r.date == ymd(2024, 5, 4)).unwrap();
    assert_eq!(saturday.actual_value, None);

    let future = rows.iter().find(|r| r.date == ymd(2024, 6, 3)).unwrap();
    assert_eq!(future.actual_value, None);

    let friday = rows.iter().find(|r| r.date == ymd(2024, 5, 3)).unwrap();
    assert_eq!(friday.actual_value, Some(100.0));
    assert_eq!(friday.predicted_value, 101.0);
}

#[test]
fn test_observations_without_prediction_are_dropped() {
    let observations = vec![
        observation(ymd(2024, 5, 1), 10.0),
        observation(ymd(2024, 5, 2), 11.0),
    ];
    let predictions = vec![prediction(ymd(2024, 5, 2), 12.0)];

    let rows = reconcile(&observations, &predictions, ymd(2024, 1, 1)).unwrap();
    assert_eq!(
        rows,
        vec![ReconciledRow {
            date: ymd(2024, 5, 2),
            actual_value: Some(11.0),
            predicted_value: 12.0,
        }]
    );
}

#[test]
fn test_window_after_all_predictions_is_empty() {
    let (observations, predictions) = fixture();
    let rows = reconcile(&observations, &predictions, ymd(2025, 1, 1)).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_reconcile_is_deterministic() {
    let (observations, mut predictions) = fixture();
    let first = reconcile(&observations, &predictions, ymd(2024, 5, 1)).unwrap();

    predictions.reverse();
    let second = reconcile(&observations, &predictions, ymd(2024, 5, 1)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_duplicate_observation_date_is_rejected() {
    let observations = vec![
        observation(ymd(2024, 5, 1), 10.0),
        observation(ymd(2024, 5, 1), 10.5),
    ];
    let predictions = vec![prediction(ymd(2024, 5, 1), 10.0)];

    let err = reconcile(&observations, &predictions, ymd(2024, 1, 1)).unwrap_err();
    assert!(matches!(err, ForecastError::DuplicateDate(d) if d == ymd(2024, 5, 1)));
}

#[test]
fn test_duplicate_prediction_date_is_rejected() {
    let predictions = vec![
        prediction(ymd(2024, 5, 1), 10.0),
        prediction(ymd(2024, 5, 1), 11.0),
    ];

    let err = reconcile(&[], &predictions, ymd(2024, 1, 1)).unwrap_err();
    assert!(matches!(err, ForecastError::DuplicateDate(_)));
}

#[test]
fn test_duplicate_prediction_before_window_is_rejected() {
    let predictions = vec![
        prediction(ymd(2024, 1, 1), 1.0),
        prediction(ymd(2024, 1, 1), 2.0),
        prediction(ymd(2024, 6, 1), 3.0),
    ];

    let err = reconcile(&[], &predictions, ymd(2024, 5, 1)).unwrap_err();
    assert!(matches!(err, ForecastError::DuplicateDate(d) if d == ymd(2024, 1, 1)));
}

#[test]
fn test_future_predictions_preview() {
    let (_, predictions) = fixture();
    let preview = future_predictions(&predictions, ymd(2024, 6, 25), 10);

    assert_eq!(preview.len(), 5);
    assert_eq!(preview[0].date, ymd(2024, 6, 26));

    let preview = future_predictions(&predictions, ymd(2024, 4, 1), 10);
    assert_eq!(preview.len(), 10);
    assert_eq!(preview[9].date, ymd(2024, 4, 11));
}

#[test]
fn test_export_feeds_accuracy_loader() {
    let rows = vec![
        ReconciledRow {
            date: ymd(2024, 5, 1),
            actual_value: Some(100.0),
            predicted_value: 110.0,
        },
        ReconciledRow {
            date: ymd(2024, 5, 2),
            actual_value: None,
            predicted_value: 111.0,
        },
        ReconciledRow {
            date: ymd(2024, 5, 3),
            actual_value: Some(200.0),
            predicted_value: 180.0,
        },
    ];

    let mut file = NamedTempFile::new().unwrap();
    write_reconciled_csv(&rows, &mut file).unwrap();
    file.flush().unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    assert!(text.starts_with("Date,Actual Price,Predicted Price\n2024-05-01,100.0,110.0\n"));
    assert!(text.contains("2024-05-02,,111.0"));

    let pairs = DataLoader::accuracy_pairs_from_csv(file.path()).unwrap();
    assert_eq!(pairs, vec![(100.0, 110.0), (200.0, 180.0)]);
}
