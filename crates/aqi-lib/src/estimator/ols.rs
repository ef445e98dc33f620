//! Ordinary least squares over the three features plus an intercept
//!
//! The design matrix is solved with an SVD, so rank-deficient training sets
//! (e.g. a feature that never varies) still fit and yield the minimum-norm
//! solution.

use super::Predictor;
use crate::error::{PipelineError, Result};
use crate::models::{FeatureName, FeatureVector, LabeledSample};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Minimum number of samples (and distinct feature rows) required to fit
pub const MIN_SAMPLES: usize = 2;

/// Singular values below this are treated as zero
const SVD_EPSILON: f64 = 1e-10;

/// Fitted linear model. Immutable once built; refitting yields a new model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    feature_names: Vec<FeatureName>,
    coefficients: [f64; 3],
    intercept: f64,
    training_samples: usize,
    version: String,
}

impl LinearModel {
    pub fn feature_names(&self) -> &[FeatureName] {
        &self.feature_names
    }

    pub fn coefficients(&self) -> &[f64; 3] {
        &self.coefficients
    }

    pub fn coefficient(&self, feature: FeatureName) -> f64 {
        self.coefficients[feature as usize]
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn training_samples(&self) -> usize {
        self.training_samples
    }

    /// `intercept + Σ coefficient_i * feature_i`
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        self.coefficients
            .iter()
            .zip(features.to_array())
            .fold(self.intercept, |acc, (c, x)| acc + c * x)
    }

    /// Predict from named values; the names must match the trained features exactly
    pub fn predict_named<'a, I>(&self, pairs: I) -> Result<f64>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let features = FeatureVector::from_named(pairs).map_err(|e| match e {
            PipelineError::DimensionMismatch { found, .. } => PipelineError::DimensionMismatch {
                expected: self.feature_names.iter().map(|f| f.to_string()).collect(),
                found,
            },
            other => other,
        })?;
        Ok(self.predict(&features))
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        LinearModel::predict(self, features)
    }

    fn model_version(&self) -> &str {
        &self.version
    }
}

/// Fit an OLS model to the samples
pub fn fit(samples: &[LabeledSample]) -> Result<LinearModel> {
    let start = Instant::now();

    if samples.len() < MIN_SAMPLES {
        return Err(PipelineError::InsufficientData(format!(
            "{} samples, need at least {}",
            samples.len(),
            MIN_SAMPLES
        )));
    }

    if let Some(idx) = samples
        .iter()
        .position(|s| !s.features.is_finite() || !s.target.is_finite())
    {
        return Err(PipelineError::InvalidInput(format!(
            "sample {} contains a non-finite value",
            idx
        )));
    }

    let first = samples[0].features;
    if samples.iter().all(|s| s.features == first) {
        return Err(PipelineError::InsufficientData(
            "all samples share the same feature row".to_string(),
        ));
    }

    let n = samples.len();
    let design = DMatrix::from_fn(n, 4, |row, col| match col {
        0 => 1.0,
        c => samples[row].features.to_array()[c - 1],
    });
    let targets = DVector::from_iterator(n, samples.iter().map(|s| s.target));

    let solution = design
        .svd(true, true)
        .solve(&targets, SVD_EPSILON)
        .map_err(|e| PipelineError::InsufficientData(format!("least squares solve failed: {}", e)))?;

    let model = LinearModel {
        feature_names: FeatureName::ALL.to_vec(),
        coefficients: [solution[1], solution[2], solution[3]],
        intercept: solution[0],
        training_samples: n,
        version: format!("ols-{}", n),
    };

    debug!(
        samples = n,
        intercept = model.intercept,
        coefficients = ?model.coefficients,
        elapsed_us = start.elapsed().as_micros() as u64,
        "Fitted linear model"
    );
    Ok(model)
}

/// Predict the index for a feature vector
pub fn predict(model: &LinearModel, features: &FeatureVector) -> f64 {
    model.predict(features)
}
