//! Grouping helpers turning the transaction table into time series and stats

use crate::data::Transaction;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Univariate daily time series of aggregate sales.
///
/// Entries are strictly increasing by date. Calendar days with no
/// transactions are omitted, matching the groupby that produces them.
#[derive(Debug, Clone)]
pub struct DailySeries {
    points: Vec<(NaiveDate, f64)>,
}

impl DailySeries {
    /// Create a series from (date, value) pairs.
    ///
    /// Pairs must be strictly increasing by date.
    pub fn from_points(points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::DataError(
                "Daily series is empty".to_string(),
            ));
        }
        for pair in points.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(ForecastError::DataError(format!(
                    "Series dates must be strictly increasing: {} then {}",
                    pair[0].0, pair[1].0
                )));
            }
        }

        Ok(Self { points })
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over (date, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = &(NaiveDate, f64)> {
        self.points.iter()
    }

    /// Observation dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|(d, _)| *d).collect()
    }

    /// Observation values in order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    /// First observation date
    pub fn first_date(&self) -> NaiveDate {
        self.points[0].0
    }

    /// Last observation date
    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].0
    }

    /// Sum of all observations
    pub fn total(&self) -> f64 {
        self.points.iter().map(|(_, v)| v).sum()
    }

    /// Mean observation value
    pub fn mean(&self) -> f64 {
        self.total() / self.points.len() as f64
    }

    /// Mean of the trailing `n` observations (all of them if shorter)
    pub fn trailing_mean(&self, n: usize) -> f64 {
        let start = self.points.len().saturating_sub(n);
        let tail = &self.points[start..];
        tail.iter().map(|(_, v)| v).sum::<f64>() / tail.len() as f64
    }

    /// Split off a trailing holdout of `holdout` observations.
    ///
    /// Returns (training series, holdout series).
    pub fn split_holdout(&self, holdout: usize) -> Result<(DailySeries, DailySeries)> {
        if holdout == 0 {
            return Err(ForecastError::InvalidParameter(
                "Holdout must be at least 1 day".to_string(),
            ));
        }
        if holdout >= self.points.len() {
            return Err(ForecastError::DataError(format!(
                "Holdout of {} days leaves no training data ({} observations)",
                holdout,
                self.points.len()
            )));
        }

        let split = self.points.len() - holdout;
        Ok((
            DailySeries {
                points: self.points[..split].to_vec(),
            },
            DailySeries {
                points: self.points[split..].to_vec(),
            },
        ))
    }
}

/// Per-group descriptive statistics
#[derive(Debug, Clone)]
pub struct GroupStats {
    /// Group label (category, region or segment name)
    pub name: String,
    /// Sum of total_sales
    pub total_sales: f64,
    /// Mean transaction value
    pub avg_sales: f64,
    /// Number of transactions
    pub num_transactions: usize,
}

/// Grouping key for descriptive statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    /// Group by product category
    Category,
    /// Group by region
    Region,
    /// Group by customer segment
    Segment,
}

/// Sum total_sales per calendar day.
///
/// An empty input is an explicit error, never a silently empty series.
pub fn daily_series(transactions: &[Transaction]) -> Result<DailySeries> {
    if transactions.is_empty() {
        return Err(ForecastError::EmptyFilter(
            "no transactions to aggregate".to_string(),
        ));
    }

    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for txn in transactions {
        *sums.entry(txn.date).or_insert(0.0) += txn.total_sales;
    }

    DailySeries::from_points(sums.into_iter().collect())
}

/// Sum total_sales per calendar month, labelled "YYYY-MM", in order
pub fn monthly_totals(transactions: &[Transaction]) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for txn in transactions {
        *sums
            .entry((txn.date.year(), txn.date.month()))
            .or_insert(0.0) += txn.total_sales;
    }

    sums.into_iter()
        .map(|((year, month), total)| (format!("{:04}-{:02}", year, month), total))
        .collect()
}

/// Sum total_sales per ISO week, labelled "YYYY-Www", in order
pub fn weekly_totals(transactions: &[Transaction]) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for txn in transactions {
        let week = txn.date.iso_week();
        *sums.entry((week.year(), week.week())).or_insert(0.0) += txn.total_sales;
    }

    sums.into_iter()
        .map(|((year, week), total)| (format!("{:04}-W{:02}", year, week), total))
        .collect()
}

/// Mean transaction value per calendar month-of-year (1..=12), months present only
pub fn month_of_year_means(transactions: &[Transaction]) -> Vec<(u32, f64)> {
    let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for txn in transactions {
        let entry = sums.entry(txn.date.month()).or_insert((0.0, 0));
        entry.0 += txn.total_sales;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(month, (total, count))| (month, total / count as f64))
        .collect()
}

/// Per-group sums/means/counts, sorted descending by total sales
pub fn group_stats(transactions: &[Transaction], key: GroupBy) -> Vec<GroupStats> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for txn in transactions {
        let name = match key {
            GroupBy::Category => txn.product_category.as_str(),
            GroupBy::Region => txn.region.as_str(),
            GroupBy::Segment => txn.customer_segment.as_str(),
        };
        let entry = sums.entry(name).or_insert((0.0, 0));
        entry.0 += txn.total_sales;
        entry.1 += 1;
    }

    let mut stats: Vec<GroupStats> = sums
        .into_iter()
        .map(|(name, (total, count))| GroupStats {
            name: name.to_string(),
            total_sales: total,
            avg_sales: total / count as f64,
            num_transactions: count,
        })
        .collect();

    // BTreeMap gives a stable name order; ties keep it after the sort
    stats.sort_by(|a, b| {
        b.total_sales
            .partial_cmp(&a.total_sales)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stats
}
