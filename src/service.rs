//! Forecasting service: the immutable context behind the REST layer

use crate::aggregate::{self, DailySeries, GroupBy};
use crate::data::{DataLoader, SalesData, SalesFilter};
use crate::error::{ForecastError, Result};
use crate::insights::{Insight, InsightEngine};
use crate::metrics::{mean_absolute_error, mean_absolute_percentage_error};
use crate::models::seasonal::{SeasonalDecomposition, TrainedSeasonalModel};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

const DEFAULT_FORECAST_PERIODS: usize = 90;

/// Overall sales statistics
#[derive(Debug, Clone, Serialize)]
pub struct SalesStats {
    pub total_sales: f64,
    pub total_transactions: usize,
    pub avg_transaction: f64,
    pub date_range: DateRange,
}

/// Inclusive date range of the loaded table
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Forecast request parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastRequest {
    /// Days to forecast beyond the last training date
    #[serde(default = "default_periods")]
    pub periods: usize,
    /// Optional product category filter
    #[serde(default)]
    pub category: Option<String>,
    /// Optional region filter
    #[serde(default)]
    pub region: Option<String>,
}

fn default_periods() -> usize {
    DEFAULT_FORECAST_PERIODS
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            periods: DEFAULT_FORECAST_PERIODS,
            category: None,
            region: None,
        }
    }
}

/// Fit-quality and volume summary attached to a forecast response
#[derive(Debug, Clone, Serialize)]
pub struct ForecastMetricsSummary {
    pub mae: f64,
    pub mape: Option<f64>,
    pub total_forecast: f64,
    pub avg_daily: f64,
}

/// Forecast response in wire form
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResponse {
    pub dates: Vec<NaiveDate>,
    pub predictions: Vec<f64>,
    pub lower_bound: Vec<f64>,
    pub upper_bound: Vec<f64>,
    pub metrics: ForecastMetricsSummary,
}

/// Per-category statistics in wire form
#[derive(Debug, Clone, Serialize)]
pub struct ProductStats {
    pub product: String,
    pub total_sales: f64,
    pub avg_sales: f64,
    pub num_transactions: usize,
}

/// Per-region statistics in wire form
#[derive(Debug, Clone, Serialize)]
pub struct RegionStats {
    pub region: String,
    pub total_sales: f64,
    pub avg_sales: f64,
    pub num_transactions: usize,
}

/// Aggregation period for trend queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for TrendPeriod {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(TrendPeriod::Daily),
            "weekly" => Ok(TrendPeriod::Weekly),
            "monthly" => Ok(TrendPeriod::Monthly),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unsupported trend period: {}",
                other
            ))),
        }
    }
}

/// Period-keyed sales trend
#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    pub periods: Vec<String>,
    pub sales: Vec<f64>,
}

/// Daily sales history, optionally filtered
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalSeries {
    pub dates: Vec<NaiveDate>,
    pub sales: Vec<f64>,
}

/// Service readiness report
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub data_loaded: bool,
    pub model_trained: bool,
    pub total_transactions: usize,
}

/// Single-process forecasting service.
///
/// Constructed once at startup: loads the transaction table and trains
/// the global model, all-or-nothing. The instance is immutable
/// afterwards and safe to share by reference across request handlers.
/// Filtered forecasts construct and discard a private model instance.
#[derive(Debug)]
pub struct ForecastingService {
    data: SalesData,
    global_series: DailySeries,
    global_model: TrainedSeasonalModel,
}

impl ForecastingService {
    /// Load the transaction table from CSV and train the global model
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = DataLoader::from_csv(path)?;
        Self::from_data(data)
    }

    /// Build the service from an already-loaded table
    pub fn from_data(data: SalesData) -> Result<Self> {
        info!(transactions = data.len(), "transaction table loaded");

        let global_series = aggregate::daily_series(data.transactions())?;
        let global_model = SeasonalDecomposition::default().train(&global_series)?;
        info!(
            days = global_series.len(),
            model = global_model.name(),
            "global model trained"
        );

        Ok(Self {
            data,
            global_series,
            global_model,
        })
    }

    /// Readiness report; construction is all-or-nothing, so a live
    /// service is always loaded and trained
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy",
            data_loaded: true,
            model_trained: true,
            total_transactions: self.data.len(),
        }
    }

    /// Overall sales statistics
    pub fn sales_stats(&self) -> SalesStats {
        SalesStats {
            total_sales: self.data.total_sales(),
            total_transactions: self.data.len(),
            avg_transaction: self.data.mean_transaction(),
            date_range: DateRange {
                start: self.data.first_date(),
                end: self.data.last_date(),
            },
        }
    }

    /// Per-category statistics, sorted descending by total sales
    pub fn product_stats(&self) -> Vec<ProductStats> {
        aggregate::group_stats(self.data.transactions(), GroupBy::Category)
            .into_iter()
            .map(|s| ProductStats {
                product: s.name,
                total_sales: s.total_sales,
                avg_sales: s.avg_sales,
                num_transactions: s.num_transactions,
            })
            .collect()
    }

    /// Per-region statistics, sorted descending by total sales
    pub fn region_stats(&self) -> Vec<RegionStats> {
        aggregate::group_stats(self.data.transactions(), GroupBy::Region)
            .into_iter()
            .map(|s| RegionStats {
                region: s.name,
                total_sales: s.total_sales,
                avg_sales: s.avg_sales,
                num_transactions: s.num_transactions,
            })
            .collect()
    }

    /// Sorted list of product categories
    pub fn categories(&self) -> Vec<String> {
        self.data.categories()
    }

    /// Sales trend aggregated by the requested period
    pub fn trends(&self, period: TrendPeriod) -> TrendSeries {
        let (periods, sales) = match period {
            TrendPeriod::Daily => self
                .global_series
                .iter()
                .map(|(date, value)| (date.to_string(), *value))
                .unzip(),
            TrendPeriod::Weekly => aggregate::weekly_totals(self.data.transactions())
                .into_iter()
                .unzip(),
            TrendPeriod::Monthly => aggregate::monthly_totals(self.data.transactions())
                .into_iter()
                .unzip(),
        };

        TrendSeries { periods, sales }
    }

    /// Daily sales history with optional date-range and category filters
    pub fn historical(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        category: Option<&str>,
    ) -> Result<HistoricalSeries> {
        let filter = SalesFilter {
            start_date,
            end_date,
            category: category.map(|c| c.to_string()),
            region: None,
        };
        let filtered = self.data.filter(&filter)?;
        let series = aggregate::daily_series(filtered.transactions())?;

        Ok(HistoricalSeries {
            dates: series.dates(),
            sales: series.values(),
        })
    }

    /// Generate a forecast, retraining a private model when filters are
    /// present. The global model and filtered models are never shared.
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResponse> {
        let filtered;
        let (series, model) = if request.category.is_some() || request.region.is_some() {
            let filter = SalesFilter {
                category: request.category.clone(),
                region: request.region.clone(),
                ..SalesFilter::default()
            };
            let subset = self.data.filter(&filter)?;
            let series = aggregate::daily_series(subset.transactions())?;
            let model = SeasonalDecomposition::default().train(&series)?;
            info!(
                days = series.len(),
                category = request.category.as_deref().unwrap_or("-"),
                region = request.region.as_deref().unwrap_or("-"),
                "trained filtered model"
            );
            filtered = (series, model);
            (&filtered.0, &filtered.1)
        } else {
            (&self.global_series, &self.global_model)
        };

        let forecast = model.forecast(request.periods)?;

        // Fit-quality metrics against the in-sample curve
        let fitted = model.predict(&series.dates())?;
        let actual = series.values();
        let estimates = fitted.point_estimates();
        let mae = mean_absolute_error(&actual, &estimates)?;
        let mape = match mean_absolute_percentage_error(&actual, &estimates) {
            Ok(value) => Some(value),
            Err(ForecastError::DegenerateMetric(_)) => None,
            Err(err) => return Err(err),
        };

        Ok(ForecastResponse {
            dates: forecast.dates(),
            predictions: forecast.point_estimates(),
            lower_bound: forecast.lower_bounds(),
            upper_bound: forecast.upper_bounds(),
            metrics: ForecastMetricsSummary {
                mae,
                mape,
                total_forecast: forecast.total(),
                avg_daily: forecast.mean(),
            },
        })
    }

    /// Run the insight engine, including the forecast analysis against a
    /// default-horizon forecast from the global model
    pub fn insights(&self) -> Result<Vec<Insight>> {
        let forecast = self.global_model.forecast(DEFAULT_FORECAST_PERIODS)?;
        let insights = InsightEngine::new(&self.data)
            .with_forecast(&forecast)
            .generate();
        info!(count = insights.len(), "insights generated");

        Ok(insights)
    }

    /// The loaded transaction table
    pub fn data(&self) -> &SalesData {
        &self.data
    }

    /// The unfiltered daily series the global model was trained on
    pub fn global_series(&self) -> &DailySeries {
        &self.global_series
    }

    /// Unfiltered forecast from the global model
    pub fn global_forecast(&self, periods: usize) -> Result<ForecastResult> {
        self.global_model.forecast(periods)
    }
}
