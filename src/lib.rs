//! # Forecast Sales
//!
//! A Rust library for retail sales forecasting and business insight
//! generation over a synthetic Ethiopian sales dataset.
//!
//! ## Features
//!
//! - Deterministic synthetic transaction data (trend, seasonality, noise)
//! - Daily aggregation of a transaction table into a univariate series
//! - Seasonal decomposition forecasting with uncertainty bounds
//! - Held-out evaluation metrics (MAE, RMSE, MAPE, R²)
//! - Rule-based business insights with recommendations
//! - A REST service layer over the whole pipeline
//!
//! ## Quick Start
//!
//! ```no_run
//! use forecast_sales::aggregate;
//! use forecast_sales::error::Result;
//! use forecast_sales::forecaster::SalesForecaster;
//! use forecast_sales::generator::SalesDataGenerator;
//! use forecast_sales::insights::InsightEngine;
//! use forecast_sales::SalesData;
//!
//! fn main() -> Result<()> {
//!     // Generate a deterministic dataset
//!     let start = "2020-01-01".parse().expect("valid date");
//!     let end = "2024-10-31".parse().expect("valid date");
//!     let transactions = SalesDataGenerator::new(start, end, 42)?.generate()?;
//!     let data = SalesData::from_transactions(transactions)?;
//!
//!     // Aggregate to a daily series and train with a 90-day holdout
//!     let series = aggregate::daily_series(data.transactions())?;
//!     let mut forecaster = SalesForecaster::new().with_holdout(90);
//!     forecaster.train(&series)?;
//!
//!     // Forecast and evaluate
//!     let forecast = forecaster.forecast(90)?;
//!     let metrics = forecaster.evaluate()?;
//!     println!("{}", metrics);
//!
//!     // Generate business insights
//!     let insights = InsightEngine::new(&data).with_forecast(&forecast).generate();
//!     println!("{} insights", insights.len());
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod data;
pub mod error;
pub mod forecaster;
pub mod generator;
pub mod insights;
pub mod metrics;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use crate::aggregate::DailySeries;
pub use crate::data::{DataLoader, SalesData, SalesFilter, Transaction};
pub use crate::error::ForecastError;
pub use crate::forecaster::SalesForecaster;
pub use crate::generator::SalesDataGenerator;
pub use crate::insights::{Insight, InsightCategory, InsightEngine, Severity};
pub use crate::metrics::EvaluationMetrics;
pub use crate::models::{ForecastModel, ForecastPoint, ForecastResult, TrainedForecastModel};
pub use crate::service::ForecastingService;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
