use chrono::NaiveDate;
use forecast_sales::data::{write_csv, DataLoader};
use forecast_sales::generator::{SalesDataGenerator, PRODUCT_CATEGORIES, REGIONS};
use std::collections::BTreeMap;
use tempfile::NamedTempFile;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn generate_range(start: &str, end: &str, seed: u64) -> Vec<forecast_sales::Transaction> {
    SalesDataGenerator::new(date(start), date(end), seed)
        .unwrap()
        .generate()
        .unwrap()
}

#[test]
fn test_generator_is_deterministic() {
    let first = generate_range("2020-01-01", "2020-02-15", 42);
    let second = generate_range("2020-01-01", "2020-02-15", 42);

    assert_eq!(first, second);
}

#[test]
fn test_different_seeds_differ() {
    let first = generate_range("2020-01-01", "2020-01-31", 42);
    let second = generate_range("2020-01-01", "2020-01-31", 43);

    assert!(first != second);
}

#[test]
fn test_transaction_invariants() {
    let transactions = generate_range("2020-01-01", "2020-03-31", 42);

    let regions: Vec<&str> = REGIONS.to_vec();
    let categories: Vec<&str> = PRODUCT_CATEGORIES.iter().map(|(name, _)| *name).collect();

    for txn in &transactions {
        assert!(txn.quantity >= 1, "quantity must be at least 1");
        assert_eq!(txn.currency, "ETB");
        assert!(regions.contains(&txn.region.as_str()));
        assert!(categories.contains(&txn.product_category.as_str()));
        assert!(txn.date >= date("2020-01-01") && txn.date <= date("2020-03-31"));

        // total_sales tracks quantity * unit_price within rounding tolerance
        let reconstructed = txn.quantity as f64 * txn.unit_price;
        let tolerance = 0.006 * txn.quantity as f64 + 0.01;
        assert!(
            (txn.total_sales - reconstructed).abs() <= tolerance,
            "total {} vs quantity*unit_price {} exceeds tolerance",
            txn.total_sales,
            reconstructed
        );
    }
}

#[test]
fn test_every_day_has_five_to_twenty_transactions() {
    let transactions = generate_range("2020-01-01", "2020-03-31", 7);

    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for txn in &transactions {
        *counts.entry(txn.date).or_insert(0) += 1;
    }

    assert_eq!(counts.len(), 91, "every calendar day must be covered");
    for (day, count) in counts {
        assert!(
            (5..=20).contains(&count),
            "{} has {} transactions",
            day,
            count
        );
    }
}

#[test]
fn test_transaction_ids_are_sequential() {
    let transactions = generate_range("2020-01-01", "2020-01-10", 42);

    assert_eq!(transactions[0].transaction_id, 1000);
    let last = transactions.len() as i64 - 1;
    assert_eq!(transactions[transactions.len() - 1].transaction_id, 1000 + last);
}

#[test]
fn test_invalid_date_range_rejected() {
    let result = SalesDataGenerator::new(date("2020-02-01"), date("2020-01-01"), 42);
    assert!(result.is_err());
}

#[test]
fn test_csv_round_trip() {
    let transactions = generate_range("2020-01-01", "2020-01-31", 42);

    let file = NamedTempFile::new().unwrap();
    write_csv(&transactions, file.path()).unwrap();

    let loaded = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(loaded.len(), transactions.len());

    let original_total: f64 = transactions.iter().map(|t| t.total_sales).sum();
    assert!((loaded.total_sales() - original_total).abs() < 1e-6);

    let first = &loaded.transactions()[0];
    assert_eq!(first.transaction_id, transactions[0].transaction_id);
    assert_eq!(first.date, transactions[0].date);
    assert_eq!(first.region, transactions[0].region);
}
