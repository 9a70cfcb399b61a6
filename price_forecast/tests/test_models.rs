use assert_approx_eq::assert_approx_eq;
use chrono::{Days, NaiveDate};
use price_forecast::models::{
    AdditiveModel, ExponentialSmoothing, ForecastModel, ForecastResult, ModelKind,
    PredictionRecord, SimpleMovingAverage, TrainedForecastModel,
};
use price_forecast::ForecastError;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn create_test_series() -> Vec<(NaiveDate, f64)> {
    let values = [100.0, 102.0, 104.0, 103.0, 105.0];
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (ymd(2023, 1, 1 + i as u32), *v))
        .collect()
}

fn daily_series(start: NaiveDate, days: u64, f: impl Fn(u64, NaiveDate) -> f64) -> Vec<(NaiveDate, f64)> {
    (0..days)
        .map(|i| {
            let date = start + Days::new(i);
            (date, f(i, date))
        })
        .collect()
}

#[test]
fn test_exponential_smoothing() {
    let series = create_test_series();
    let model = ExponentialSmoothing::new(0.7).unwrap();

    // Train the model
    let trained_model = model.train(&series).unwrap();
    assert_approx_eq!(trained_model.level(), 104.4198, 1e-9);

    // Forecast future values
    let forecast = trained_model.forecast(3).unwrap();

    assert_eq!(forecast.horizon(), 3);
    assert_eq!(forecast.len(), series.len() + 3);
    assert_eq!(forecast.dates().last().copied(), Some(ymd(2023, 1, 8)));

    // Future values are flat at the last level
    for value in &forecast.values()[series.len()..] {
        assert_approx_eq!(*value, 104.4198, 1e-9);
    }

    // One-step-ahead fits on the training dates
    let fitted = trained_model.predict(&[ymd(2023, 1, 2)]).unwrap();
    assert_approx_eq!(fitted.values()[0], 100.0, 1e-9);
}

#[test]
fn test_exponential_smoothing_interval_widens() {
    let trained = ExponentialSmoothing::new(0.5)
        .unwrap()
        .train(&create_test_series())
        .unwrap();
    let forecast = trained.forecast(4).unwrap();

    let widths: Vec<f64> = forecast.records()[5..]
        .iter()
        .map(|r| r.upper_bound - r.lower_bound)
        .collect();
    assert!(widths.windows(2).all(|w| w[1] > w[0]));

    for record in forecast.records() {
        assert!(record.lower_bound <= record.predicted_value);
        assert!(record.predicted_value <= record.upper_bound);
    }
}

#[test]
fn test_moving_average() {
    let series = create_test_series();
    let model = SimpleMovingAverage::new(3).unwrap();

    // Train the model
    let trained_model = model.train(&series).unwrap();
    assert_eq!(trained_model.window(), 3);
    assert_approx_eq!(trained_model.last_average(), 104.0, 1e-9);

    // Forecast future values
    let forecast = trained_model.forecast(2).unwrap();

    assert_eq!(forecast.horizon(), 2);
    for value in &forecast.values()[series.len()..] {
        assert_approx_eq!(*value, 104.0, 1e-9);
    }
}

#[test]
fn test_moving_average_needs_full_window() {
    let model = SimpleMovingAverage::new(10).unwrap();
    let err = model.train(&create_test_series()).unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData(_)));
}

#[test]
fn test_additive_recovers_linear_trend() {
    let series = daily_series(ymd(2024, 1, 1), 60, |i, _| 100.0 + 0.5 * i as f64);
    let trained = AdditiveModel::new().train(&series).unwrap();

    assert_approx_eq!(trained.slope(), 0.5, 1e-9);
    for effect in trained.weekly_effects() {
        assert_approx_eq!(*effect, 0.0, 1e-9);
    }
    assert!(trained.yearly_effects().iter().all(|e| *e == 0.0));

    let forecast = trained.forecast(10).unwrap();
    assert_eq!(forecast.len(), 70);
    let last = forecast.records().last().unwrap();
    assert_eq!(last.date, ymd(2024, 3, 10));
    assert_approx_eq!(last.predicted_value, 100.0 + 0.5 * 69.0, 1e-6);
}

#[test]
fn test_additive_weekly_seasonality() {
    // 2024-01-01 is a Monday; eight full weeks with a Monday bump
    let series = daily_series(ymd(2024, 1, 1), 56, |_, date| {
        use chrono::Datelike;
        if date.weekday() == chrono::Weekday::Mon {
            105.0
        } else {
            100.0
        }
    });
    let trained = AdditiveModel::new().train(&series).unwrap();

    let forecast = trained
        .predict(&[ymd(2024, 2, 26), ymd(2024, 2, 27)])
        .unwrap();
    let values = forecast.values();
    assert_approx_eq!(values[0] - values[1], 5.0, 1e-6);
    assert_eq!(forecast.horizon(), 2);
}

#[test]
fn test_additive_without_weekly_is_a_line() {
    let series = daily_series(ymd(2024, 1, 1), 56, |i, _| if i % 7 == 0 { 105.0 } else { 100.0 });
    let trained = AdditiveModel::new().with_weekly(false).train(&series).unwrap();

    assert!(trained.weekly_effects().iter().all(|e| *e == 0.0));
    let values = trained.forecast(1).unwrap().values();
    let n = values.len();
    assert_approx_eq!(values[n - 1] - values[n - 2], trained.slope(), 1e-9);
}

#[test]
fn test_additive_components() {
    // 2024-01-01 is a Monday; eight full weeks with a Monday bump
    let series = daily_series(ymd(2024, 1, 1), 56, |i, date| {
        use chrono::Datelike;
        let bump = if date.weekday() == chrono::Weekday::Mon { 7.0 } else { 0.0 };
        100.0 + 0.25 * i as f64 + bump
    });
    let trained = AdditiveModel::new().train(&series).unwrap();

    let components = trained.components().unwrap();
    // the bump skews the fitted line slightly
    assert_approx_eq!(components.trend_per_day, 0.25, 0.05);
    assert_eq!(components.weekly.len(), 7);
    assert_eq!(components.weekly[0].label, "Mon");
    assert_eq!(components.weekly[6].label, "Sun");
    // the Monday-Tuesday gap absorbs the slope error
    let monday_over_tuesday = components.weekly[0].effect - components.weekly[1].effect;
    assert_approx_eq!(monday_over_tuesday, 7.0 - 0.25 + components.trend_per_day, 1e-6);
    // under two years of history
    assert!(components.yearly.is_empty());
}

#[test]
fn test_additive_yearly_components_need_two_years() {
    let series = daily_series(ymd(2021, 1, 1), 800, |i, _| 50.0 + 0.01 * i as f64);
    let trained = AdditiveModel::new().with_weekly(false).train(&series).unwrap();

    let components = trained.components().unwrap();
    assert!(components.weekly.is_empty());
    let labels: Vec<&str> = components.yearly.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels.len(), 12);
    assert_eq!(labels[0], "Jan");
    assert_eq!(labels[11], "Dec");
}

#[test]
fn test_smoothing_models_have_no_components() {
    let series = create_test_series();

    let smoothing = ExponentialSmoothing::new(0.3).unwrap().train(&series).unwrap();
    assert!(smoothing.components().is_none());

    let average = SimpleMovingAverage::new(2).unwrap().train(&series).unwrap();
    assert!(average.components().is_none());
}

#[test]
fn test_model_kind_fit_dispatch() {
    let series = create_test_series();

    let trained = ModelKind::MovingAverage { window: 3 }
        .fit(&series, 0.9)
        .unwrap();
    assert_eq!(trained.name(), "Simple Moving Average (window=3)");

    let trained = ModelKind::default().fit(&series, 0.8).unwrap();
    assert_eq!(trained.history_dates().len(), series.len());

    assert!(ModelKind::ExponentialSmoothing { alpha: 0.3 }
        .fit(&series, 1.5)
        .is_err());
}

#[test]
fn test_forecast_result_validation() {
    let record = |d, v: f64| PredictionRecord {
        date: ymd(2024, 1, d),
        predicted_value: v,
        lower_bound: v - 1.0,
        upper_bound: v + 1.0,
    };

    let ok = ForecastResult::new(vec![record(1, 1.0), record(2, 2.0)], 1, "test").unwrap();
    assert_eq!(ok.model_name(), "test");
    assert_eq!(ok.intervals(), vec![(0.0, 2.0), (1.0, 3.0)]);

    let duplicate = ForecastResult::new(vec![record(1, 1.0), record(1, 2.0)], 0, "test");
    assert!(matches!(duplicate, Err(ForecastError::DuplicateDate(_))));

    let mut inverted = record(3, 3.0);
    inverted.lower_bound = 4.0;
    assert!(ForecastResult::new(vec![inverted], 0, "test").is_err());

    assert!(ForecastResult::new(vec![record(1, 1.0)], 2, "test").is_err());
}

#[test]
fn test_model_parameter_validation() {
    // Test invalid parameters
    assert!(ExponentialSmoothing::new(1.5).is_err());
    assert!(ExponentialSmoothing::new(0.0).is_err());
    assert!(ExponentialSmoothing::new(f64::NAN).is_err());
    assert!(SimpleMovingAverage::new(0).is_err());
    assert!(AdditiveModel::new().with_interval_width(0.0).is_err());

    let too_short = vec![(ymd(2024, 1, 1), 1.0)];
    assert!(AdditiveModel::new().train(&too_short).is_err());
}
