//! Transaction table handling for sales forecasting

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// A single sales transaction. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub transaction_id: i64,
    /// Calendar day the sale occurred
    pub date: NaiveDate,
    /// Sales region
    pub region: String,
    /// Product category
    pub product_category: String,
    /// Customer segment
    pub customer_segment: String,
    /// Units sold
    pub quantity: i64,
    /// Price per unit in ETB
    pub unit_price: f64,
    /// Total transaction value in ETB
    pub total_sales: f64,
    /// Currency code (always "ETB")
    pub currency: String,
}

/// Optional filters applied to a transaction collection
#[derive(Debug, Clone, Default)]
pub struct SalesFilter {
    /// Keep transactions on or after this date
    pub start_date: Option<NaiveDate>,
    /// Keep transactions on or before this date
    pub end_date: Option<NaiveDate>,
    /// Keep transactions in this product category
    pub category: Option<String>,
    /// Keep transactions in this region
    pub region: Option<String>,
}

impl SalesFilter {
    fn matches(&self, txn: &Transaction) -> bool {
        if let Some(start) = self.start_date {
            if txn.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if txn.date > end {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &txn.product_category != category {
                return false;
            }
        }
        if let Some(region) = &self.region {
            if &txn.region != region {
                return false;
            }
        }
        true
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(start) = self.start_date {
            parts.push(format!("start_date={}", start));
        }
        if let Some(end) = self.end_date {
            parts.push(format!("end_date={}", end));
        }
        if let Some(category) = &self.category {
            parts.push(format!("category={}", category));
        }
        if let Some(region) = &self.region {
            parts.push(format!("region={}", region));
        }
        if parts.is_empty() {
            "no filters".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Owned collection of sales transactions
#[derive(Debug, Clone)]
pub struct SalesData {
    transactions: Vec<Transaction>,
}

/// Data loader for the transaction table
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load the transaction table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<SalesData> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Build a transaction collection from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<SalesData> {
        let ids = column_as_i64(&df, "transaction_id")?;
        let dates = column_as_dates(&df, "date")?;
        let regions = column_as_strings(&df, "region")?;
        let categories = column_as_strings(&df, "product_category")?;
        let segments = column_as_strings(&df, "customer_segment")?;
        let quantities = column_as_i64(&df, "quantity")?;
        let unit_prices = column_as_f64(&df, "unit_price")?;
        let totals = column_as_f64(&df, "total_sales")?;
        let currencies = column_as_strings(&df, "currency")?;

        let n = df.height();
        for (name, len) in [
            ("transaction_id", ids.len()),
            ("date", dates.len()),
            ("region", regions.len()),
            ("product_category", categories.len()),
            ("customer_segment", segments.len()),
            ("quantity", quantities.len()),
            ("unit_price", unit_prices.len()),
            ("total_sales", totals.len()),
            ("currency", currencies.len()),
        ] {
            if len != n {
                return Err(ForecastError::DataError(format!(
                    "Column '{}' has {} values, expected {}",
                    name, len, n
                )));
            }
        }

        let mut transactions = Vec::with_capacity(n);
        for i in 0..n {
            transactions.push(Transaction {
                transaction_id: ids[i],
                date: dates[i],
                region: regions[i].clone(),
                product_category: categories[i].clone(),
                customer_segment: segments[i].clone(),
                quantity: quantities[i],
                unit_price: unit_prices[i],
                total_sales: totals[i],
                currency: currencies[i].clone(),
            });
        }

        SalesData::from_transactions(transactions)
    }
}

impl SalesData {
    /// Create a collection from in-memory transactions.
    ///
    /// An empty table is a readiness failure, not a valid dataset.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Result<Self> {
        if transactions.is_empty() {
            return Err(ForecastError::DataNotLoaded);
        }

        Ok(Self { transactions })
    }

    /// Get the transactions
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Number of transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Apply filters, returning a new collection.
    ///
    /// An empty result is reported as [`ForecastError::EmptyFilter`],
    /// never as a silently empty collection.
    pub fn filter(&self, filter: &SalesFilter) -> Result<SalesData> {
        let matched: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|txn| filter.matches(txn))
            .cloned()
            .collect();

        if matched.is_empty() {
            return Err(ForecastError::EmptyFilter(filter.describe()));
        }

        Ok(SalesData {
            transactions: matched,
        })
    }

    /// Sum of total_sales over the whole table
    pub fn total_sales(&self) -> f64 {
        self.transactions.iter().map(|t| t.total_sales).sum()
    }

    /// Mean transaction value
    pub fn mean_transaction(&self) -> f64 {
        self.total_sales() / self.transactions.len() as f64
    }

    /// First transaction date in the table
    pub fn first_date(&self) -> NaiveDate {
        self.transactions
            .iter()
            .map(|t| t.date)
            .min()
            .unwrap_or_default()
    }

    /// Last transaction date in the table
    pub fn last_date(&self) -> NaiveDate {
        self.transactions
            .iter()
            .map(|t| t.date)
            .max()
            .unwrap_or_default()
    }

    /// Sorted unique product categories
    pub fn categories(&self) -> Vec<String> {
        unique_sorted(self.transactions.iter().map(|t| t.product_category.as_str()))
    }

    /// Sorted unique regions
    pub fn regions(&self) -> Vec<String> {
        unique_sorted(self.transactions.iter().map(|t| t.region.as_str()))
    }

    /// Sorted unique customer segments
    pub fn segments(&self) -> Vec<String> {
        unique_sorted(self.transactions.iter().map(|t| t.customer_segment.as_str()))
    }
}

/// Write a transaction collection to a CSV file, creating parent directories
pub fn write_csv<P: AsRef<Path>>(transactions: &[Transaction], path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for txn in transactions {
        writer.serialize(txn)?;
    }
    writer.flush()?;

    Ok(())
}

fn unique_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = values.map(|v| v.to_string()).collect();
    out.sort();
    out.dedup();
    out
}

/// Parse a date cell, accepting a plain date or a datetime prefix
fn parse_date(value: &str) -> Result<NaiveDate> {
    let date_part = value.split_whitespace().next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| ForecastError::DataError(format!("Invalid date '{}': {}", value, e)))
}

fn get_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map_err(|e| ForecastError::DataError(format!("Column '{}' not found: {}", name, e)))
}

fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let col = get_column(df, name)?;

    match col.dtype() {
        DataType::Float64 => Ok(col.f64()?.into_iter().flatten().collect()),
        DataType::Float32 => Ok(col.f32()?.into_iter().flatten().map(|v| v as f64).collect()),
        DataType::Int64 => Ok(col.i64()?.into_iter().flatten().map(|v| v as f64).collect()),
        DataType::Int32 => Ok(col.i32()?.into_iter().flatten().map(|v| v as f64).collect()),
        _ => Err(ForecastError::DataError(format!(
            "Column '{}' cannot be converted to f64",
            name
        ))),
    }
}

fn column_as_i64(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let col = get_column(df, name)?;

    match col.dtype() {
        DataType::Int64 => Ok(col.i64()?.into_iter().flatten().collect()),
        DataType::Int32 => Ok(col.i32()?.into_iter().flatten().map(|v| v as i64).collect()),
        DataType::UInt64 => Ok(col.u64()?.into_iter().flatten().map(|v| v as i64).collect()),
        DataType::UInt32 => Ok(col.u32()?.into_iter().flatten().map(|v| v as i64).collect()),
        _ => Err(ForecastError::DataError(format!(
            "Column '{}' cannot be converted to i64",
            name
        ))),
    }
}

fn column_as_strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let col = get_column(df, name)?;

    match col.dtype() {
        DataType::Utf8 => Ok(col
            .utf8()?
            .into_iter()
            .flatten()
            .map(|v| v.to_string())
            .collect()),
        _ => Err(ForecastError::DataError(format!(
            "Column '{}' is not a string column",
            name
        ))),
    }
}

fn column_as_dates(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
    let strings = column_as_strings(df, name)?;
    strings.iter().map(|s| parse_date(s)).collect()
}
