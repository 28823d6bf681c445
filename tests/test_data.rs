use chrono::NaiveDate;
use forecast_sales::aggregate::{self, GroupBy};
use forecast_sales::data::{DataLoader, SalesData, SalesFilter, Transaction};
use forecast_sales::generator::SalesDataGenerator;
use forecast_sales::ForecastError;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn txn(id: i64, day: &str, region: &str, category: &str, segment: &str, total: f64) -> Transaction {
    Transaction {
        transaction_id: id,
        date: date(day),
        region: region.to_string(),
        product_category: category.to_string(),
        customer_segment: segment.to_string(),
        quantity: 1,
        unit_price: total,
        total_sales: total,
        currency: "ETB".to_string(),
    }
}

fn sample_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();

    writeln!(
        file,
        "transaction_id,date,region,product_category,customer_segment,quantity,unit_price,total_sales,currency"
    )
    .unwrap();
    writeln!(file, "1000,2023-01-01,Oromia,Coffee,Retail,2,500.0,1000.0,ETB").unwrap();
    writeln!(file, "1001,2023-01-01,Afar,Teff,Wholesale,4,300.0,1200.0,ETB").unwrap();
    writeln!(file, "1002,2023-01-03,Oromia,Coffee,Export,1,800.0,800.0,ETB").unwrap();

    file
}

#[test]
fn test_data_loader_from_csv() {
    let file = sample_csv();
    let data = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(data.len(), 3);
    assert!(!data.is_empty());

    let first = &data.transactions()[0];
    assert_eq!(first.transaction_id, 1000);
    assert_eq!(first.date, date("2023-01-01"));
    assert_eq!(first.region, "Oromia");
    assert_eq!(first.quantity, 2);
    assert!((first.total_sales - 1000.0).abs() < 1e-9);
}

#[test]
fn test_data_loader_missing_file() {
    let result = DataLoader::from_csv("/nonexistent/path.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_data_loader_missing_column() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "transaction_id,date").unwrap();
    writeln!(file, "1000,2023-01-01").unwrap();

    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_empty_table_rejected() {
    let result = SalesData::from_transactions(Vec::new());
    assert!(matches!(result, Err(ForecastError::DataNotLoaded)));
}

#[test]
fn test_filter_by_category_and_region() {
    let file = sample_csv();
    let data = DataLoader::from_csv(file.path()).unwrap();

    let coffee = data
        .filter(&SalesFilter {
            category: Some("Coffee".to_string()),
            ..SalesFilter::default()
        })
        .unwrap();
    assert_eq!(coffee.len(), 2);

    let afar = data
        .filter(&SalesFilter {
            region: Some("Afar".to_string()),
            ..SalesFilter::default()
        })
        .unwrap();
    assert_eq!(afar.len(), 1);

    let ranged = data
        .filter(&SalesFilter {
            start_date: Some(date("2023-01-02")),
            ..SalesFilter::default()
        })
        .unwrap();
    assert_eq!(ranged.len(), 1);
}

#[test]
fn test_empty_filter_is_an_error() {
    let file = sample_csv();
    let data = DataLoader::from_csv(file.path()).unwrap();

    let result = data.filter(&SalesFilter {
        category: Some("Gold".to_string()),
        ..SalesFilter::default()
    });

    assert!(matches!(result, Err(ForecastError::EmptyFilter(_))));
}

#[test]
fn test_daily_series_sums_per_day_and_omits_gaps() {
    let file = sample_csv();
    let data = DataLoader::from_csv(file.path()).unwrap();

    let series = aggregate::daily_series(data.transactions()).unwrap();

    // 2023-01-02 has no transactions and is omitted
    assert_eq!(series.len(), 2);
    assert_eq!(series.dates(), vec![date("2023-01-01"), date("2023-01-03")]);
    assert!((series.values()[0] - 2200.0).abs() < 1e-9);
    assert!((series.values()[1] - 800.0).abs() < 1e-9);
}

#[test]
fn test_aggregation_matches_direct_sum() {
    let generator =
        SalesDataGenerator::new(date("2021-05-01"), date("2021-07-31"), 11).unwrap();
    let transactions = generator.generate().unwrap();

    let series = aggregate::daily_series(&transactions).unwrap();
    let direct: f64 = transactions.iter().map(|t| t.total_sales).sum();

    assert!((series.total() - direct).abs() < 1e-6);
}

#[test]
fn test_daily_series_on_empty_input() {
    let result = aggregate::daily_series(&[]);
    assert!(matches!(result, Err(ForecastError::EmptyFilter(_))));
}

#[test]
fn test_monthly_totals_ordering() {
    let transactions = vec![
        txn(1, "2023-02-10", "Oromia", "Coffee", "Retail", 300.0),
        txn(2, "2023-01-05", "Oromia", "Coffee", "Retail", 100.0),
        txn(3, "2023-01-20", "Afar", "Teff", "Retail", 50.0),
    ];

    let monthly = aggregate::monthly_totals(&transactions);
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[0].0, "2023-01");
    assert!((monthly[0].1 - 150.0).abs() < 1e-9);
    assert_eq!(monthly[1].0, "2023-02");
    assert!((monthly[1].1 - 300.0).abs() < 1e-9);
}

#[test]
fn test_group_stats_sorted_descending() {
    let transactions = vec![
        txn(1, "2023-01-01", "Oromia", "Coffee", "Retail", 100.0),
        txn(2, "2023-01-02", "Afar", "Teff", "Retail", 900.0),
        txn(3, "2023-01-03", "Afar", "Teff", "Retail", 100.0),
        txn(4, "2023-01-04", "Amhara", "Spices", "Retail", 500.0),
    ];

    let stats = aggregate::group_stats(&transactions, GroupBy::Category);
    assert_eq!(stats[0].name, "Teff");
    assert!((stats[0].total_sales - 1000.0).abs() < 1e-9);
    assert_eq!(stats[0].num_transactions, 2);
    assert!((stats[0].avg_sales - 500.0).abs() < 1e-9);
    assert_eq!(stats[1].name, "Spices");
    assert_eq!(stats[2].name, "Coffee");
}

#[test]
fn test_split_holdout() {
    let points: Vec<(NaiveDate, f64)> = (0..10i64)
        .map(|i| (date("2023-01-01") + chrono::Duration::days(i), 100.0 + i as f64))
        .collect();
    let series = aggregate::DailySeries::from_points(points).unwrap();

    let (train, holdout) = series.split_holdout(3).unwrap();
    assert_eq!(train.len(), 7);
    assert_eq!(holdout.len(), 3);
    assert_eq!(holdout.first_date(), date("2023-01-08"));

    assert!(series.split_holdout(0).is_err());
    assert!(series.split_holdout(10).is_err());
}

#[test]
fn test_series_rejects_unordered_dates() {
    let points = vec![
        (date("2023-01-02"), 1.0),
        (date("2023-01-01"), 2.0),
    ];
    assert!(aggregate::DailySeries::from_points(points).is_err());
}
