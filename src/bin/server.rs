//! REST API serving forecasts, statistics and insights over HTTP
//!
//! Usage: server [DATA_CSV_PATH]
//!
//! Loads the transaction table and trains the global model at startup;
//! both are all-or-nothing. When the CSV is missing, a default synthetic
//! dataset is generated instead.

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use forecast_sales::error::ForecastError;
use forecast_sales::generator::SalesDataGenerator;
use forecast_sales::insights::Insight;
use forecast_sales::service::{
    ForecastRequest, ForecastResponse, ForecastingService, HealthStatus, HistoricalSeries,
    ProductStats, RegionStats, SalesStats, TrendPeriod, TrendSeries,
};
use forecast_sales::SalesData;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

const DEFAULT_DATA_PATH: &str = "data/ethiopia_sales_raw.csv";
const LISTEN_ADDR: &str = "0.0.0.0:8000";

struct AppError(ForecastError);

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            ForecastError::DataNotLoaded | ForecastError::ModelNotTrained => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ForecastError::EmptyFilter(_) | ForecastError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct TrendQuery {
    period: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoricalQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct CategoriesResponse {
    categories: Vec<String>,
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the sales forecasting API",
        "version": forecast_sales::VERSION,
        "endpoints": {
            "health": "/health",
            "stats": "/api/stats",
            "forecast": "/api/forecast",
            "insights": "/api/insights",
            "products": "/api/products",
            "regions": "/api/regions",
            "trends": "/api/trends",
            "categories": "/api/categories",
            "historical": "/api/historical"
        }
    }))
}

async fn health_handler(State(service): State<Arc<ForecastingService>>) -> Json<HealthStatus> {
    Json(service.health())
}

async fn stats_handler(State(service): State<Arc<ForecastingService>>) -> Json<SalesStats> {
    Json(service.sales_stats())
}

async fn forecast_handler(
    State(service): State<Arc<ForecastingService>>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<ForecastResponse>, AppError> {
    let response = service.forecast(&request)?;
    Ok(Json(response))
}

async fn insights_handler(
    State(service): State<Arc<ForecastingService>>,
) -> Result<Json<Vec<Insight>>, AppError> {
    Ok(Json(service.insights()?))
}

async fn products_handler(
    State(service): State<Arc<ForecastingService>>,
) -> Json<Vec<ProductStats>> {
    Json(service.product_stats())
}

async fn regions_handler(State(service): State<Arc<ForecastingService>>) -> Json<Vec<RegionStats>> {
    Json(service.region_stats())
}

async fn trends_handler(
    State(service): State<Arc<ForecastingService>>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<TrendSeries>, AppError> {
    let period: TrendPeriod = query.period.as_deref().unwrap_or("monthly").parse()?;
    Ok(Json(service.trends(period)))
}

async fn categories_handler(
    State(service): State<Arc<ForecastingService>>,
) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: service.categories(),
    })
}

async fn historical_handler(
    State(service): State<Arc<ForecastingService>>,
    Query(query): Query<HistoricalQuery>,
) -> Result<Json<HistoricalSeries>, AppError> {
    let series = service.historical(
        query.start_date,
        query.end_date,
        query.category.as_deref(),
    )?;
    Ok(Json(series))
}

fn build_service(data_path: &str) -> Result<ForecastingService, ForecastError> {
    if Path::new(data_path).exists() {
        info!(path = data_path, "loading transaction table");
        ForecastingService::from_csv(data_path)
    } else {
        warn!(
            path = data_path,
            "data file not found, generating default synthetic dataset"
        );
        let start = "2020-01-01"
            .parse()
            .map_err(|e| ForecastError::DataError(format!("Default start date: {}", e)))?;
        let end = "2024-10-31"
            .parse()
            .map_err(|e| ForecastError::DataError(format!("Default end date: {}", e)))?;
        let transactions = SalesDataGenerator::new(start, end, 42)?.generate()?;
        ForecastingService::from_data(SalesData::from_transactions(transactions)?)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let data_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
    let service = Arc::new(build_service(&data_path)?);

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/forecast", post(forecast_handler))
        .route("/api/insights", get(insights_handler))
        .route("/api/products", get(products_handler))
        .route("/api/regions", get(regions_handler))
        .route("/api/trends", get(trends_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/historical", get(historical_handler))
        .with_state(service);

    info!(addr = LISTEN_ADDR, "server starting");
    let listener = TcpListener::bind(LISTEN_ADDR).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
