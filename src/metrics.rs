//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};

/// Scalar evaluation summary computed against a held-out window.
///
/// MAPE is `None` when every actual value is zero; R² is `None` when the
/// actual series is constant. Both cases are degenerate, not failures of
/// the evaluation as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute percentage error, over nonzero actuals
    pub mape: Option<f64>,
    /// Coefficient of determination
    pub r2: Option<f64>,
}

impl std::fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Model Evaluation Metrics:")?;
        writeln!(f, "  MAE:  {:.4}", self.mae)?;
        writeln!(f, "  RMSE: {:.4}", self.rmse)?;
        match self.mape {
            Some(mape) => writeln!(f, "  MAPE: {:.4}%", mape)?,
            None => writeln!(f, "  MAPE: undefined")?,
        }
        match self.r2 {
            Some(r2) => writeln!(f, "  R2:   {:.4}", r2)?,
            None => writeln!(f, "  R2:   undefined")?,
        }
        Ok(())
    }
}

/// Evaluate point estimates against actual values.
///
/// Degenerate MAPE/R² cases are folded into `None` rather than failing
/// the whole evaluation.
pub fn evaluate_forecast(actual: &[f64], predicted: &[f64]) -> Result<EvaluationMetrics> {
    validate_lengths(actual, predicted)?;

    Ok(EvaluationMetrics {
        mae: mean_absolute_error(actual, predicted)?,
        rmse: root_mean_squared_error(actual, predicted)?,
        mape: allow_degenerate(mean_absolute_percentage_error(actual, predicted))?,
        r2: allow_degenerate(r_squared(actual, predicted))?,
    })
}

/// Mean absolute error
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_lengths(actual, predicted)?;

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();

    Ok(sum / actual.len() as f64)
}

/// Root mean squared error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_lengths(actual, predicted)?;

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    Ok((sum / actual.len() as f64).sqrt())
}

/// Mean absolute percentage error over nonzero actuals.
///
/// Zero actuals are skipped; when every actual is zero the metric is
/// undefined and reported as [`ForecastError::DegenerateMetric`].
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_lengths(actual, predicted)?;

    let mut sum = 0.0;
    let mut count = 0usize;
    for (a, p) in actual.iter().zip(predicted.iter()) {
        if *a != 0.0 {
            sum += ((a - p) / a).abs();
            count += 1;
        }
    }

    if count == 0 {
        return Err(ForecastError::DegenerateMetric(
            "MAPE is undefined when every actual value is zero".to_string(),
        ));
    }

    Ok(sum / count as f64 * 100.0)
}

/// Coefficient of determination, 1 - SS_res/SS_tot.
///
/// A constant actual series has zero total variance and is reported as
/// [`ForecastError::DegenerateMetric`].
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_lengths(actual, predicted)?;

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Err(ForecastError::DegenerateMetric(
            "R2 is undefined for a constant actual series".to_string(),
        ));
    }

    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    Ok(1.0 - ss_res / ss_tot)
}

fn allow_degenerate(result: Result<f64>) -> Result<Option<f64>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ForecastError::DegenerateMetric(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

fn validate_lengths(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(ForecastError::ValidationError(
            "Actual and predicted values must have the same non-zero length".to_string(),
        ));
    }
    Ok(())
}
