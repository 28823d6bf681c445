//! Forecasting models for daily sales series

use crate::aggregate::DailySeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;

/// One forecasted day with its uncertainty band
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// Forecasted calendar day
    pub date: NaiveDate,
    /// Point estimate of aggregate sales
    pub point_estimate: f64,
    /// Lower uncertainty bound
    pub lower_bound: f64,
    /// Upper uncertainty bound
    pub upper_bound: f64,
}

/// Forecast result covering a contiguous horizon.
///
/// Construction enforces `lower_bound <= point_estimate <= upper_bound`
/// for every entry; a violation indicates a degenerate fit, not a valid
/// output. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct ForecastResult {
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Create a forecast result, validating the band invariant
    pub fn new(points: Vec<ForecastPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::ValidationError(
                "Forecast result has no points".to_string(),
            ));
        }

        for point in &points {
            if !(point.lower_bound <= point.point_estimate
                && point.point_estimate <= point.upper_bound)
            {
                return Err(ForecastError::ValidationError(format!(
                    "Degenerate band on {}: {} <= {} <= {} does not hold",
                    point.date, point.lower_bound, point.point_estimate, point.upper_bound
                )));
            }
        }

        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::ValidationError(format!(
                    "Forecast dates must be strictly increasing: {} then {}",
                    pair[0].date, pair[1].date
                )));
            }
        }

        Ok(Self { points })
    }

    /// Get the forecast points
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Number of forecasted days
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Forecasted dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Point estimates in order
    pub fn point_estimates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.point_estimate).collect()
    }

    /// Lower bounds in order
    pub fn lower_bounds(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.lower_bound).collect()
    }

    /// Upper bounds in order
    pub fn upper_bounds(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.upper_bound).collect()
    }

    /// Sum of point estimates
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.point_estimate).sum()
    }

    /// Mean point estimate
    pub fn mean(&self) -> f64 {
        self.total() / self.points.len() as f64
    }

    /// Mean of the trailing `n` point estimates (all of them if shorter)
    pub fn trailing_mean(&self, n: usize) -> f64 {
        let start = self.points.len().saturating_sub(n);
        let tail = &self.points[start..];
        tail.iter().map(|p| p.point_estimate).sum::<f64>() / tail.len() as f64
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Extend the fit `horizon` days beyond the last training date
    fn forecast(&self, horizon: usize) -> Result<ForecastResult>;

    /// Predict values for arbitrary dates (in-sample or held out)
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastResult>;

    /// Last date the model was trained on
    fn last_train_date(&self) -> NaiveDate;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a daily series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a daily series
    fn train(&self, series: &DailySeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod seasonal;
