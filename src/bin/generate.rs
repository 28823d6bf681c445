//! Dataset generator CLI: writes the synthetic transaction table to CSV
//!
//! Usage: generate [OUTPUT_PATH] [START_DATE] [END_DATE] [SEED]

use chrono::NaiveDate;
use forecast_sales::data::{write_csv, SalesData};
use forecast_sales::generator::SalesDataGenerator;
use std::env;
use std::error::Error;

const DEFAULT_OUTPUT: &str = "data/ethiopia_sales_raw.csv";
const DEFAULT_START: &str = "2020-01-01";
const DEFAULT_END: &str = "2024-10-31";
const DEFAULT_SEED: u64 = 42;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    let output = args.get(1).map(String::as_str).unwrap_or(DEFAULT_OUTPUT);
    let start: NaiveDate = args.get(2).map(String::as_str).unwrap_or(DEFAULT_START).parse()?;
    let end: NaiveDate = args.get(3).map(String::as_str).unwrap_or(DEFAULT_END).parse()?;
    let seed: u64 = match args.get(4) {
        Some(raw) => raw.parse()?,
        None => DEFAULT_SEED,
    };

    println!("Generating Ethiopia sales data...");
    let generator = SalesDataGenerator::new(start, end, seed)?;
    let transactions = generator.generate()?;
    write_csv(&transactions, output)?;

    println!("Generated {} transactions", transactions.len());
    println!("Data saved to {}", output);

    let data = SalesData::from_transactions(transactions)?;
    println!();
    println!("{}", "=".repeat(60));
    println!("DATA GENERATION SUMMARY");
    println!("{}", "=".repeat(60));
    println!();
    println!("Total Transactions: {}", data.len());
    println!("Date Range: {} to {}", data.first_date(), data.last_date());
    println!("Total Sales: ETB {:.2}", data.total_sales());
    println!("Average Transaction: ETB {:.2}", data.mean_transaction());
    println!();
    println!("Regions: {}", data.regions().join(", "));
    println!("Product Categories: {}", data.categories().join(", "));
    println!("Customer Segments: {}", data.segments().join(", "));
    println!();
    println!("{}", "=".repeat(60));

    Ok(())
}
