//! Predictions over a swept feature range

use super::Predictor;
use crate::category::Category;
use crate::error::{PipelineError, Result};
use crate::models::{FeatureName, FeatureVector};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of points in one sweep
const MAX_SWEEP_POINTS: usize = 10_000;

/// Inclusive range walked by one feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub feature: FeatureName,
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub value: f64,
    pub predicted_aqi: f64,
    /// `None` only when the prediction is NaN
    pub category: Option<Category>,
}

impl SweepRange {
    fn validate(&self) -> Result<usize> {
        if !self.start.is_finite() || !self.end.is_finite() || !self.step.is_finite() {
            return Err(PipelineError::InvalidInput(
                "sweep bounds must be finite".to_string(),
            ));
        }
        if self.step <= 0.0 {
            return Err(PipelineError::InvalidInput(format!(
                "sweep step {} must be positive",
                self.step
            )));
        }
        if self.end < self.start {
            return Err(PipelineError::InvalidInput(format!(
                "sweep end {} is below start {}",
                self.end, self.start
            )));
        }
        // Tolerate float drift on the final step
        let steps = ((self.end - self.start) / self.step + 1e-9).floor() as usize;
        if steps >= MAX_SWEEP_POINTS {
            return Err(PipelineError::InvalidInput(format!(
                "sweep would produce more than {} points",
                MAX_SWEEP_POINTS
            )));
        }
        Ok(steps + 1)
    }
}

/// Predict across `range`, holding the other features at `base`.
///
/// Each point is recomputed from the model; nothing is carried over between points.
pub fn sweep<P: Predictor + ?Sized>(
    model: &P,
    base: &FeatureVector,
    range: &SweepRange,
) -> Result<Vec<SweepPoint>> {
    let points = range.validate()?;
    Ok((0..points)
        .map(|i| {
            let value = range.start + i as f64 * range.step;
            let predicted_aqi = model.predict(&base.with(range.feature, value));
            SweepPoint {
                value,
                predicted_aqi,
                category: Category::from_aqi(predicted_aqi),
            }
        })
        .collect())
}
