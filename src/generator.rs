//! Synthetic Ethiopian retail sales data generation

use crate::data::Transaction;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Ethiopian sales regions
pub const REGIONS: [&str; 8] = [
    "Addis Ababa",
    "Oromia",
    "Amhara",
    "Tigray",
    "SNNPR",
    "Somali",
    "Afar",
    "Dire Dawa",
];

/// Product categories with base transaction amounts in ETB
pub const PRODUCT_CATEGORIES: [(&str, f64); 10] = [
    ("Coffee", 5000.0),
    ("Teff", 3000.0),
    ("Electronics", 15000.0),
    ("Textiles", 8000.0),
    ("Spices", 2000.0),
    ("Livestock", 20000.0),
    ("Vegetables", 1500.0),
    ("Injera", 1000.0),
    ("Leather Goods", 12000.0),
    ("Cereals", 4000.0),
];

/// Customer segments
pub const CUSTOMER_SEGMENTS: [&str; 5] = ["Retail", "Wholesale", "Export", "B2B", "Direct Consumer"];

const ANNUAL_GROWTH: f64 = 0.10;
const NOISE_STDDEV: f64 = 0.15;
const MIN_TRANSACTION: f64 = 100.0;
const WEEKEND_DISCOUNT: f64 = 0.85;
const FIRST_TRANSACTION_ID: i64 = 1000;

/// Deterministic synthetic sales data generator.
///
/// The same (start, end, seed) arguments always produce an identical
/// transaction table: a single seeded random source is consumed in a
/// fixed order (per-day count, then region, product, segment and noise
/// for each transaction).
#[derive(Debug, Clone)]
pub struct SalesDataGenerator {
    start_date: NaiveDate,
    end_date: NaiveDate,
    seed: u64,
}

impl SalesDataGenerator {
    /// Create a generator for the given date range and seed
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, seed: u64) -> Result<Self> {
        if end_date < start_date {
            return Err(ForecastError::InvalidParameter(format!(
                "End date {} precedes start date {}",
                end_date, start_date
            )));
        }

        Ok(Self {
            start_date,
            end_date,
            seed,
        })
    }

    /// First day of the generated range
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day of the generated range
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Generate the transaction table, 5-20 transactions per calendar day
    pub fn generate(&self) -> Result<Vec<Transaction>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let noise = Normal::new(1.0, NOISE_STDDEV)
            .map_err(|e| ForecastError::MathError(format!("Noise distribution: {}", e)))?;

        let mut transactions = Vec::new();
        let mut transaction_id = FIRST_TRANSACTION_ID;

        let mut date = self.start_date;
        while date <= self.end_date {
            let days_from_start = (date - self.start_date).num_days();
            let num_transactions: u32 = rng.gen_range(5..=20);

            for _ in 0..num_transactions {
                let region = REGIONS[rng.gen_range(0..REGIONS.len())];
                let (product, base_amount) =
                    PRODUCT_CATEGORIES[rng.gen_range(0..PRODUCT_CATEGORIES.len())];
                let segment = CUSTOMER_SEGMENTS[rng.gen_range(0..CUSTOMER_SEGMENTS.len())];

                let mut amount = add_trend(base_amount, days_from_start);
                amount *= seasonal_factor(date);
                amount *= noise.sample(&mut rng);
                amount = amount.max(MIN_TRANSACTION);

                // Quantity derives from the pre-adjustment amount
                let unit_price = base_amount / 10.0;
                let mut quantity = ((amount / unit_price) as i64).max(1);

                amount *= match region {
                    "Addis Ababa" => 1.3,
                    "Oromia" => 1.1,
                    "Afar" => 0.7,
                    _ => 1.0,
                };

                match segment {
                    "Wholesale" => {
                        amount *= 1.5;
                        quantity *= 2;
                    }
                    "Export" => {
                        amount *= 2.0;
                        quantity *= 3;
                    }
                    _ => {}
                }

                transactions.push(Transaction {
                    transaction_id,
                    date,
                    region: region.to_string(),
                    product_category: product.to_string(),
                    customer_segment: segment.to_string(),
                    quantity,
                    unit_price: round2(amount / quantity as f64),
                    total_sales: round2(amount),
                    currency: "ETB".to_string(),
                });

                transaction_id += 1;
            }

            date = date + Duration::days(1);
        }

        Ok(transactions)
    }
}

/// Linear annual growth trend
fn add_trend(base_value: f64, days_from_start: i64) -> f64 {
    base_value * (1.0 + ANNUAL_GROWTH / 365.0 * days_from_start as f64)
}

/// Seasonal multiplier: sinusoidal month factor, holiday boosts, weekend discount
fn seasonal_factor(date: NaiveDate) -> f64 {
    let mut factor = 1.0 + 0.2 * (2.0 * PI * date.month() as f64 / 12.0).sin();

    let (month, day) = (date.month(), date.day());
    if month == 9 && (1..=15).contains(&day) {
        // Ethiopian New Year
        factor *= 1.5;
    } else if month == 1 && (7..=20).contains(&day) {
        // Timkat
        factor *= 1.4;
    } else if month == 9 && (27..=30).contains(&day) {
        // Meskel
        factor *= 1.3;
    } else if month == 12 {
        // Christmas season
        factor *= 1.6;
    }

    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        factor *= WEEKEND_DISCOUNT;
    }

    factor
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
