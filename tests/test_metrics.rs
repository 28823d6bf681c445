use assert_approx_eq::assert_approx_eq;
use forecast_sales::metrics::{
    evaluate_forecast, mean_absolute_error, mean_absolute_percentage_error, r_squared,
    root_mean_squared_error,
};
use forecast_sales::ForecastError;
use rstest::rstest;

#[test]
fn test_regression_metrics() {
    let actual = vec![10.0, 20.0, 30.0, 40.0, 50.0];
    let predicted = vec![12.0, 18.0, 33.0, 37.0, 52.0];

    let mae = mean_absolute_error(&actual, &predicted).unwrap();
    assert_approx_eq!(mae, 2.4, 1e-9);

    let rmse = root_mean_squared_error(&actual, &predicted).unwrap();
    assert_approx_eq!(rmse, 6.0_f64.sqrt(), 1e-9);

    let mape = mean_absolute_percentage_error(&actual, &predicted).unwrap();
    assert_approx_eq!(mape, 10.3, 1e-9);

    let r2 = r_squared(&actual, &predicted).unwrap();
    assert_approx_eq!(r2, 0.97, 1e-9);
}

#[test]
fn test_evaluate_forecast_summary() {
    let actual = vec![100.0, 110.0, 120.0];
    let predicted = vec![98.0, 112.0, 119.0];

    let metrics = evaluate_forecast(&actual, &predicted).unwrap();
    assert!(metrics.mae > 0.0);
    assert!(metrics.rmse >= metrics.mae);
    assert!(metrics.mape.is_some());
    assert!(metrics.r2.is_some());
}

#[test]
fn test_identical_constant_holdout() {
    // Constant actuals with a constant offset: every error is equal,
    // so RMSE equals MAE and R2 is undefined (zero total variance)
    let actual = vec![5.0, 5.0, 5.0, 5.0];
    let predicted = vec![7.0, 7.0, 7.0, 7.0];

    let metrics = evaluate_forecast(&actual, &predicted).unwrap();
    assert_approx_eq!(metrics.mae, 2.0, 1e-12);
    assert_approx_eq!(metrics.rmse, 2.0, 1e-12);
    assert_approx_eq!(metrics.mae, metrics.rmse, 1e-12);
    assert_eq!(metrics.r2, None);
}

#[rstest]
#[case(vec![0.0, 10.0], vec![5.0, 9.0], 10.0)]
#[case(vec![10.0, 20.0], vec![10.0, 20.0], 0.0)]
#[case(vec![10.0, 0.0, 20.0], vec![11.0, 7.0, 24.0], 15.0)]
fn test_mape_skips_zero_actuals(
    #[case] actual: Vec<f64>,
    #[case] predicted: Vec<f64>,
    #[case] expected: f64,
) {
    let mape = mean_absolute_percentage_error(&actual, &predicted).unwrap();
    assert_approx_eq!(mape, expected, 1e-9);
}

#[test]
fn test_mape_undefined_for_all_zero_actuals() {
    let actual = vec![0.0, 0.0];
    let predicted = vec![1.0, 2.0];

    let result = mean_absolute_percentage_error(&actual, &predicted);
    assert!(matches!(result, Err(ForecastError::DegenerateMetric(_))));

    // The summary folds the degenerate case into None instead of failing
    let metrics = evaluate_forecast(&actual, &predicted).unwrap();
    assert_eq!(metrics.mape, None);
}

#[test]
fn test_error_handling() {
    let empty: Vec<f64> = Vec::new();
    assert!(mean_absolute_error(&empty, &empty).is_err());

    let actual = vec![1.0, 2.0, 3.0];
    let predicted = vec![1.0, 2.0];
    assert!(root_mean_squared_error(&actual, &predicted).is_err());
    assert!(evaluate_forecast(&actual, &predicted).is_err());
}

#[test]
fn test_perfect_fit() {
    let actual = vec![3.0, 6.0, 9.0];
    let metrics = evaluate_forecast(&actual, &actual).unwrap();

    assert_approx_eq!(metrics.mae, 0.0, 1e-12);
    assert_approx_eq!(metrics.rmse, 0.0, 1e-12);
    assert_approx_eq!(metrics.r2.unwrap(), 1.0, 1e-12);
}
