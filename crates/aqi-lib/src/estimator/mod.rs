//! Linear estimation of the air-quality index

mod evaluation;
mod ols;
mod split;
mod sweep;

pub use evaluation::{evaluate, EvaluationReport};
pub use ols::{fit, predict, LinearModel, MIN_SAMPLES};
pub use split::{train_test_split, DEFAULT_TEST_FRACTION};
pub use sweep::{sweep, SweepPoint, SweepRange};

use crate::models::FeatureVector;

/// Trait for fitted models that map features to an index
pub trait Predictor {
    /// Estimate the index for a feature vector
    fn predict(&self, features: &FeatureVector) -> f64;

    /// Get current model version
    fn model_version(&self) -> &str;
}
