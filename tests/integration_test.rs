use chrono::{Duration, NaiveDate};
use forecast_sales::aggregate;
use forecast_sales::data::write_csv;
use forecast_sales::forecaster::SalesForecaster;
use forecast_sales::generator::SalesDataGenerator;
use forecast_sales::service::{ForecastRequest, ForecastingService, TrendPeriod};
use forecast_sales::{ForecastError, SalesData};
use tempfile::NamedTempFile;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn quarter_data() -> SalesData {
    let generator =
        SalesDataGenerator::new(date("2020-01-01"), date("2020-03-31"), 42).unwrap();
    SalesData::from_transactions(generator.generate().unwrap()).unwrap()
}

#[test]
fn test_full_forecast_workflow() {
    let data = quarter_data();

    // Every calendar day carries transactions, so the series has no gaps
    let series = aggregate::daily_series(data.transactions()).unwrap();
    assert_eq!(series.len(), 91);
    assert_eq!(series.first_date(), date("2020-01-01"));
    assert_eq!(series.last_date(), date("2020-03-31"));

    // Train with a 20-day holdout: 71 training days ending 2020-03-11
    let mut forecaster = SalesForecaster::new().with_holdout(20);
    forecaster.train(&series).unwrap();
    assert_eq!(forecaster.train_series().unwrap().last_date(), date("2020-03-11"));

    // 30 days ahead: exactly 30 dates starting the day after the last
    // training date, each with a non-negative point estimate
    let forecast = forecaster.forecast(30).unwrap();
    assert_eq!(forecast.len(), 30);

    let dates = forecast.dates();
    assert_eq!(dates[0], date("2020-03-12"));
    for pair in dates.windows(2) {
        assert_eq!(pair[1], pair[0] + Duration::days(1));
    }
    for point in forecast.points() {
        assert!(point.point_estimate >= 0.0);
        assert!(point.lower_bound <= point.point_estimate);
        assert!(point.point_estimate <= point.upper_bound);
    }

    // Held-out evaluation produces finite metrics
    let metrics = forecaster.evaluate().unwrap();
    assert!(metrics.mae.is_finite() && metrics.mae > 0.0);
    assert!(metrics.rmse >= metrics.mae - 1e-9);
    assert!(metrics.mape.is_some());
    assert!(metrics.r2.is_some());
}

#[test]
fn test_service_end_to_end() {
    let data = quarter_data();
    let expected_total = data.total_sales();
    let service = ForecastingService::from_data(data).unwrap();

    let stats = service.sales_stats();
    assert!((stats.total_sales - expected_total).abs() < 1e-6);
    assert_eq!(stats.date_range.start, date("2020-01-01"));
    assert_eq!(stats.date_range.end, date("2020-03-31"));

    let response = service
        .forecast(&ForecastRequest {
            periods: 30,
            category: None,
            region: None,
        })
        .unwrap();
    assert_eq!(response.dates.len(), 30);
    assert_eq!(response.predictions.len(), 30);
    for ((prediction, lower), upper) in response
        .predictions
        .iter()
        .zip(response.lower_bound.iter())
        .zip(response.upper_bound.iter())
    {
        assert!(*prediction >= 0.0);
        assert!(lower <= prediction && prediction <= upper);
    }
    assert!(response.metrics.mae > 0.0);
    assert!(response.metrics.total_forecast > 0.0);

    // Trend endpoints cover the three months and preserve totals
    let trends = service.trends(TrendPeriod::Monthly);
    assert_eq!(trends.periods, vec!["2020-01", "2020-02", "2020-03"]);
    let trend_total: f64 = trends.sales.iter().sum();
    assert!((trend_total - expected_total).abs() < 1e-6);

    let categories = service.categories();
    assert!(categories.contains(&"Coffee".to_string()));

    let insights = service.insights().unwrap();
    assert!(!insights.is_empty());
}

#[test]
fn test_filtered_forecast_retrains_independently() {
    let data = quarter_data();
    let service = ForecastingService::from_data(data).unwrap();

    let filtered = service
        .forecast(&ForecastRequest {
            periods: 10,
            category: Some("Coffee".to_string()),
            region: None,
        })
        .unwrap();
    assert_eq!(filtered.dates.len(), 10);

    let global = service
        .forecast(&ForecastRequest {
            periods: 10,
            category: None,
            region: None,
        })
        .unwrap();

    // The filtered model is trained on a subseries, never the aggregate
    assert!(filtered.metrics.total_forecast < global.metrics.total_forecast);

    // The request path without filters reuses the global model
    let direct = service.global_forecast(10).unwrap();
    assert_eq!(direct.dates(), global.dates);
}

#[test]
fn test_absent_category_is_empty_filter_error() {
    let data = quarter_data();
    let service = ForecastingService::from_data(data).unwrap();

    let result = service.forecast(&ForecastRequest {
        periods: 30,
        category: Some("Gold".to_string()),
        region: None,
    });
    assert!(matches!(result, Err(ForecastError::EmptyFilter(_))));

    let result = service.historical(None, None, Some("Gold"));
    assert!(matches!(result, Err(ForecastError::EmptyFilter(_))));
}

#[test]
fn test_service_from_csv() {
    let data = quarter_data();
    let expected_len = data.len();

    let file = NamedTempFile::new().unwrap();
    write_csv(data.transactions(), file.path()).unwrap();

    let service = ForecastingService::from_csv(file.path()).unwrap();
    assert_eq!(service.data().len(), expected_len);

    let historical = service
        .historical(Some(date("2020-02-01")), Some(date("2020-02-29")), None)
        .unwrap();
    assert_eq!(historical.dates.len(), 29);
}
