//! Seasonal decomposition model: piecewise-linear trend plus Fourier
//! seasonality, fit in log space for multiplicative seasonal effects

use crate::aggregate::DailySeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastPoint, ForecastResult, TrainedForecastModel};
use chrono::{Duration, NaiveDate};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

const MIN_TRAIN_POINTS: usize = 14;
const MAX_CHANGEPOINTS: usize = 25;
const CHANGEPOINT_RANGE: f64 = 0.8;
const YEARLY_PERIOD: f64 = 365.25;
const WEEKLY_PERIOD: f64 = 7.0;
const MONTHLY_PERIOD: f64 = 30.5;
const YEARLY_ORDER: usize = 10;
const WEEKLY_ORDER: usize = 3;
const MONTHLY_ORDER: usize = 5;
const TREND_PENALTY: f64 = 1e-8;
const SEASONAL_PENALTY: f64 = 0.1;

const DEFAULT_CHANGEPOINT_PRIOR_SCALE: f64 = 0.05;
const DEFAULT_INTERVAL_WIDTH: f64 = 0.80;

/// Untrained seasonal decomposition model.
///
/// `changepoint_prior_scale` controls trend flexibility: higher values
/// permit more trend inflection and risk overfitting recent noise.
#[derive(Debug, Clone)]
pub struct SeasonalDecomposition {
    name: String,
    changepoint_prior_scale: f64,
    interval_width: f64,
}

impl SeasonalDecomposition {
    /// Create a model with explicit changepoint flexibility and interval width
    pub fn new(changepoint_prior_scale: f64, interval_width: f64) -> Result<Self> {
        if changepoint_prior_scale <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "changepoint_prior_scale must be positive".to_string(),
            ));
        }
        if interval_width <= 0.0 || interval_width >= 1.0 {
            return Err(ForecastError::InvalidParameter(
                "interval_width must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            name: model_name(changepoint_prior_scale),
            changepoint_prior_scale,
            interval_width,
        })
    }

    /// Trend flexibility parameter
    pub fn changepoint_prior_scale(&self) -> f64 {
        self.changepoint_prior_scale
    }

    /// Nominal coverage of the uncertainty band
    pub fn interval_width(&self) -> f64 {
        self.interval_width
    }
}

impl Default for SeasonalDecomposition {
    fn default() -> Self {
        Self {
            name: model_name(DEFAULT_CHANGEPOINT_PRIOR_SCALE),
            changepoint_prior_scale: DEFAULT_CHANGEPOINT_PRIOR_SCALE,
            interval_width: DEFAULT_INTERVAL_WIDTH,
        }
    }
}

fn model_name(changepoint_prior_scale: f64) -> String {
    format!(
        "Seasonal Decomposition (changepoint_prior_scale={})",
        changepoint_prior_scale
    )
}

/// Trained seasonal decomposition model
#[derive(Debug, Clone)]
pub struct TrainedSeasonalModel {
    name: String,
    start_date: NaiveDate,
    last_train_date: NaiveDate,
    basis: FeatureBasis,
    beta: Vec<f64>,
    sigma: f64,
    z: f64,
}

impl ForecastModel for SeasonalDecomposition {
    type Trained = TrainedSeasonalModel;

    fn train(&self, series: &DailySeries) -> Result<TrainedSeasonalModel> {
        let n = series.len();
        if n < MIN_TRAIN_POINTS {
            return Err(ForecastError::DataError(format!(
                "Training needs at least {} observations, got {}",
                MIN_TRAIN_POINTS, n
            )));
        }

        let values = series.values();
        if values.iter().any(|v| *v <= 0.0) {
            return Err(ForecastError::ValidationError(
                "Multiplicative seasonality requires strictly positive values".to_string(),
            ));
        }

        let start = series.first_date();
        let ts: Vec<f64> = series
            .dates()
            .iter()
            .map(|d| (*d - start).num_days() as f64)
            .collect();
        let span = ts[n - 1];

        // Potential changepoints sit evenly over the first 80% of the span
        let n_changepoints = MAX_CHANGEPOINTS.min(n / 4);
        let changepoints: Vec<f64> = (1..=n_changepoints)
            .map(|j| CHANGEPOINT_RANGE * span * j as f64 / (n_changepoints + 1) as f64)
            .collect();

        // Seasonal blocks activate only when the span can support them
        let mut blocks = Vec::new();
        if span >= YEARLY_PERIOD {
            blocks.push((YEARLY_PERIOD, YEARLY_ORDER));
        }
        if span >= 2.0 * WEEKLY_PERIOD {
            blocks.push((WEEKLY_PERIOD, WEEKLY_ORDER));
        }
        if span >= 2.0 * MONTHLY_PERIOD {
            blocks.push((MONTHLY_PERIOD, MONTHLY_ORDER));
        }

        let basis = FeatureBasis {
            span,
            changepoints,
            blocks,
        };

        let y: Vec<f64> = values.iter().map(|v| v.ln()).collect();
        let rows: Vec<Vec<f64>> = ts.iter().map(|&t| basis.features(t)).collect();
        let penalties = basis.penalties(1.0 / self.changepoint_prior_scale);
        let beta = ridge_regression(&rows, &y, &penalties)?;

        let sse: f64 = rows
            .iter()
            .zip(y.iter())
            .map(|(row, &yi)| {
                let residual = yi - dot(row, &beta);
                residual * residual
            })
            .sum();
        let sigma = (sse / n as f64).sqrt();

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::MathError(format!("Standard normal: {}", e)))?;
        let z = normal.inverse_cdf(0.5 + self.interval_width / 2.0);

        Ok(TrainedSeasonalModel {
            name: self.name.clone(),
            start_date: start,
            last_train_date: series.last_date(),
            basis,
            beta,
            sigma,
            z,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedSeasonalModel {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1 day".to_string(),
            ));
        }

        let dates: Vec<NaiveDate> = (1..=horizon as i64)
            .map(|offset| self.last_train_date + Duration::days(offset))
            .collect();

        self.predict(&dates)
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastResult> {
        if dates.is_empty() {
            return Err(ForecastError::ForecastingError(
                "No dates to predict".to_string(),
            ));
        }

        // Band is symmetric in log space, per multiplicative mode
        let margin = self.z * self.sigma;

        let points: Vec<ForecastPoint> = dates
            .iter()
            .map(|&date| {
                let t = (date - self.start_date).num_days() as f64;
                let log_estimate = dot(&self.basis.features(t), &self.beta);
                ForecastPoint {
                    date,
                    point_estimate: log_estimate.exp(),
                    lower_bound: (log_estimate - margin).exp(),
                    upper_bound: (log_estimate + margin).exp(),
                }
            })
            .collect();

        ForecastResult::new(points)
    }

    fn last_train_date(&self) -> NaiveDate {
        self.last_train_date
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSeasonalModel {
    /// Residual standard deviation in log space
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

/// Shared design-matrix layout for training and prediction
#[derive(Debug, Clone)]
struct FeatureBasis {
    span: f64,
    changepoints: Vec<f64>,
    blocks: Vec<(f64, usize)>,
}

impl FeatureBasis {
    fn features(&self, t: f64) -> Vec<f64> {
        let mut x = Vec::with_capacity(self.width());
        x.push(1.0);
        x.push(t / self.span);
        for &cp in &self.changepoints {
            x.push((t - cp).max(0.0) / self.span);
        }
        for &(period, order) in &self.blocks {
            for m in 1..=order {
                let angle = 2.0 * PI * m as f64 * t / period;
                x.push(angle.cos());
                x.push(angle.sin());
            }
        }
        x
    }

    fn width(&self) -> usize {
        2 + self.changepoints.len() + 2 * self.blocks.iter().map(|(_, order)| order).sum::<usize>()
    }

    fn penalties(&self, changepoint_penalty: f64) -> Vec<f64> {
        let mut penalties = Vec::with_capacity(self.width());
        penalties.push(TREND_PENALTY);
        penalties.push(TREND_PENALTY);
        penalties.extend(std::iter::repeat(changepoint_penalty).take(self.changepoints.len()));
        let seasonal_columns = self.width() - penalties.len();
        penalties.extend(std::iter::repeat(SEASONAL_PENALTY).take(seasonal_columns));
        penalties
    }
}

/// Solve the ridge-regularized least squares problem via normal equations
fn ridge_regression(rows: &[Vec<f64>], y: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    let p = penalties.len();
    let mut a = vec![vec![0.0; p]; p];
    let mut b = vec![0.0; p];

    for (row, &yi) in rows.iter().zip(y.iter()) {
        for i in 0..p {
            b[i] += row[i] * yi;
            for j in i..p {
                a[i][j] += row[i] * row[j];
            }
        }
    }

    for i in 0..p {
        a[i][i] += penalties[i];
        for j in 0..i {
            a[i][j] = a[j][i];
        }
    }

    solve_cholesky(a, b)
}

/// Solve A x = b for symmetric positive-definite A
fn solve_cholesky(mut a: Vec<Vec<f64>>, b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= a[i][k] * a[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return Err(ForecastError::MathError(
                        "Normal equations are not positive definite".to_string(),
                    ));
                }
                a[i][j] = sum.sqrt();
            } else {
                a[i][j] = sum / a[j][j];
            }
        }
    }

    // Forward solve L w = b
    let mut w = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= a[i][k] * w[k];
        }
        w[i] = sum / a[i][i];
    }

    // Back solve L^T x = w
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = w[i];
        for k in i + 1..n {
            sum -= a[k][i] * x[k];
        }
        x[i] = sum / a[i][i];
    }

    Ok(x)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cholesky_solves_known_system() {
        // [4 2; 2 3] x = [10, 8] has solution [1.75, 1.5]
        let a = vec![vec![4.0, 2.0], vec![2.0, 3.0]];
        let b = vec![10.0, 8.0];
        let x = solve_cholesky(a, b).unwrap();
        assert!((x[0] - 1.75).abs() < 1e-10);
        assert!((x[1] - 1.5).abs() < 1e-10);
    }

    #[test]
    fn cholesky_rejects_indefinite_matrix() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 1.0]];
        let b = vec![1.0, 1.0];
        assert!(solve_cholesky(a, b).is_err());
    }

    #[test]
    fn feature_width_matches_penalty_width() {
        let basis = FeatureBasis {
            span: 100.0,
            changepoints: vec![20.0, 40.0, 60.0],
            blocks: vec![(WEEKLY_PERIOD, WEEKLY_ORDER), (MONTHLY_PERIOD, MONTHLY_ORDER)],
        };
        assert_eq!(basis.features(12.0).len(), basis.width());
        assert_eq!(basis.penalties(20.0).len(), basis.width());
    }

    #[test]
    fn ridge_recovers_linear_trend() {
        // y = 2 + 0.5 x with a tiny ridge should come back almost exactly
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![1.0, i as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| 2.0 + 0.5 * i as f64).collect();
        let beta = ridge_regression(&rows, &y, &[1e-8, 1e-8]).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-4);
        assert!((beta[1] - 0.5).abs() < 1e-6);
    }
}
