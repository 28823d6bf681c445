//! Sales forecasting orchestration: holdout split, training and evaluation

use crate::aggregate::DailySeries;
use crate::error::{ForecastError, Result};
use crate::metrics::{evaluate_forecast, EvaluationMetrics};
use crate::models::seasonal::{SeasonalDecomposition, TrainedSeasonalModel};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use serde::Serialize;
use tracing::info;

const DEFAULT_HOLDOUT_DAYS: usize = 90;

/// Direction of the forecasted trend over the horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Last forecasted day exceeds the first
    Increasing,
    /// Last forecasted day is at or below the first
    Decreasing,
}

/// Summary statistics over a forecast horizon
#[derive(Debug, Clone, Serialize)]
pub struct ForecastSummary {
    /// Sum of point estimates over the horizon
    pub total_forecast: f64,
    /// Mean daily point estimate
    pub avg_daily: f64,
    /// Smallest daily point estimate
    pub min_daily: f64,
    /// Largest daily point estimate
    pub max_daily: f64,
    /// Trend direction over the horizon
    pub trend: TrendDirection,
}

/// Forecasting workflow over a daily sales series.
///
/// Holds the model configuration and, once trained, the fitted model
/// with its holdout window. Forecasting and evaluation both require a
/// trained model and fail with [`ForecastError::ModelNotTrained`]
/// beforehand.
#[derive(Debug)]
pub struct SalesForecaster {
    model: SeasonalDecomposition,
    holdout: usize,
    trained: Option<TrainedState>,
}

#[derive(Debug)]
struct TrainedState {
    model: TrainedSeasonalModel,
    train: DailySeries,
    holdout: DailySeries,
}

impl Default for SalesForecaster {
    fn default() -> Self {
        Self::new()
    }
}

impl SalesForecaster {
    /// Create a forecaster with the default model and a 90-day holdout
    pub fn new() -> Self {
        Self {
            model: SeasonalDecomposition::default(),
            holdout: DEFAULT_HOLDOUT_DAYS,
            trained: None,
        }
    }

    /// Override the trailing holdout reserved for evaluation
    pub fn with_holdout(mut self, holdout: usize) -> Self {
        self.holdout = holdout;
        self
    }

    /// Override the model configuration
    pub fn with_model(mut self, model: SeasonalDecomposition) -> Self {
        self.model = model;
        self
    }

    /// Check whether the model has been trained
    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }

    /// Split the series, reserving the trailing holdout, and fit the model
    /// on the leading observations
    pub fn train(&mut self, series: &DailySeries) -> Result<()> {
        let (train, holdout) = series.split_holdout(self.holdout)?;
        info!(
            train_days = train.len(),
            holdout_days = holdout.len(),
            "training forecasting model"
        );

        let model = self.model.train(&train)?;
        self.trained = Some(TrainedState {
            model,
            train,
            holdout,
        });

        Ok(())
    }

    /// Forecast `periods` days beyond the last training date
    pub fn forecast(&self, periods: usize) -> Result<ForecastResult> {
        let state = self.trained_state()?;
        state.model.forecast(periods)
    }

    /// In-sample fit curve over the training dates
    pub fn fitted(&self) -> Result<ForecastResult> {
        let state = self.trained_state()?;
        state.model.predict(&state.train.dates())
    }

    /// Score point estimates over the holdout window against the true
    /// held-out values
    pub fn evaluate(&self) -> Result<EvaluationMetrics> {
        let state = self.trained_state()?;
        let predicted = state.model.predict(&state.holdout.dates())?;
        let metrics = evaluate_forecast(&state.holdout.values(), &predicted.point_estimates())?;
        info!(mae = metrics.mae, rmse = metrics.rmse, "model evaluated on holdout");

        Ok(metrics)
    }

    /// Summary statistics for a forecast horizon
    pub fn summary(&self, forecast: &ForecastResult) -> ForecastSummary {
        let estimates = forecast.point_estimates();
        let min_daily = estimates.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_daily = estimates.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let trend = if estimates[estimates.len() - 1] > estimates[0] {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        ForecastSummary {
            total_forecast: forecast.total(),
            avg_daily: forecast.mean(),
            min_daily,
            max_daily,
            trend,
        }
    }

    /// The training portion of the prepared series
    pub fn train_series(&self) -> Result<&DailySeries> {
        Ok(&self.trained_state()?.train)
    }

    /// The held-out portion of the prepared series
    pub fn holdout_series(&self) -> Result<&DailySeries> {
        Ok(&self.trained_state()?.holdout)
    }

    fn trained_state(&self) -> Result<&TrainedState> {
        self.trained.as_ref().ok_or(ForecastError::ModelNotTrained)
    }
}
