//! Train, evaluate and estimate
//!
//! The library keeps no model between calls. The caller owns a
//! [`ModelState`] and replaces it whenever fresh data is pulled.

use crate::category::Category;
use crate::error::{ErrorReport, Result};
use crate::estimator::{
    evaluate, fit, train_test_split, EvaluationReport, LinearModel, Predictor,
    DEFAULT_TEST_FRACTION,
};
use crate::live::{DefaultedFields, LiveReadingAdapter};
use crate::models::{FeatureVector, LabeledSample, Reading};
use crate::observability::PipelineMetrics;
use crate::source::FeatureSource;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Held-out split settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: 42,
        }
    }
}

/// A fitted model together with how it scored on held-out data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub model: LinearModel,
    pub evaluation: EvaluationReport,
    pub train_samples: usize,
    pub held_out_samples: usize,
}

/// Model state owned by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelState {
    Untrained { reason: ErrorReport },
    Trained(TrainedModel),
}

impl ModelState {
    /// Pull samples from `source` and train on them.
    ///
    /// Failures are captured as [`ModelState::Untrained`] rather than returned.
    pub fn from_source(source: &dyn FeatureSource, split: &SplitConfig) -> Self {
        Self::from_result(source.samples().and_then(|s| train_and_evaluate(&s, split)))
    }

    pub fn from_result(result: Result<TrainedModel>) -> Self {
        match result {
            Ok(trained) => ModelState::Trained(trained),
            Err(e) => ModelState::Untrained {
                reason: ErrorReport::from(&e),
            },
        }
    }

    pub fn trained(&self) -> Option<&TrainedModel> {
        match self {
            ModelState::Trained(t) => Some(t),
            ModelState::Untrained { .. } => None,
        }
    }

    pub fn model(&self) -> Option<&LinearModel> {
        self.trained().map(|t| &t.model)
    }
}

/// Split, fit on the training part and evaluate on the held-out part.
///
/// The held-out samples never influence the coefficients. Only a failed
/// fit counts towards `aqi_fit_failures_total`.
pub fn train_and_evaluate(samples: &[LabeledSample], split: &SplitConfig) -> Result<TrainedModel> {
    let start = Instant::now();
    let (train, held_out) = train_test_split(samples, split.test_fraction, split.seed)?;
    let model = fit(&train).map_err(|e| {
        PipelineMetrics::new().inc_fit_failures();
        e
    })?;
    let evaluation = evaluate(&model, &held_out);

    PipelineMetrics::new().observe_fit(start.elapsed().as_secs_f64(), evaluation.r_squared);
    debug!(
        train = train.len(),
        held_out = held_out.len(),
        r_squared = evaluation.r_squared,
        "Trained and evaluated model"
    );

    Ok(TrainedModel {
        model,
        evaluation,
        train_samples: train.len(),
        held_out_samples: held_out.len(),
    })
}

/// Model estimate for one feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub features: FeatureVector,
    pub predicted_aqi: f64,
    pub category: Option<Category>,
}

/// Predict and categorize a feature vector
pub fn estimate<P: Predictor + ?Sized>(model: &P, features: FeatureVector) -> Estimate {
    let predicted_aqi = model.predict(&features);
    PipelineMetrics::new().inc_predictions(1);
    Estimate {
        features,
        predicted_aqi,
        category: Category::from_aqi(predicted_aqi),
    }
}

/// Estimate for a live reading, alongside which features were defaulted
pub fn estimate_reading<P: Predictor + ?Sized>(
    model: &P,
    adapter: &LiveReadingAdapter,
    reading: &Reading,
) -> (Estimate, DefaultedFields) {
    let (features, defaulted) = adapter.to_features(reading);
    (estimate(model, features), defaulted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, PipelineError};
    use crate::source::{SyntheticSource, TabularSource};

    #[test]
    fn test_from_source_trains() {
        let state = ModelState::from_source(&SyntheticSource::new(1, 200), &SplitConfig::default());
        let trained = state.trained().expect("model should be trained");
        assert_eq!(trained.train_samples, 160);
        assert_eq!(trained.held_out_samples, 40);
        assert!(trained.evaluation.r_squared > 0.5);
    }

    #[test]
    fn test_missing_data_degrades_to_untrained() {
        let source = TabularSource::new("/nonexistent/a.csv", "/nonexistent/b.csv");
        let state = ModelState::from_source(&source, &SplitConfig::default());
        match state {
            ModelState::Untrained { reason } => assert_eq!(reason.code, ErrorKind::DataUnavailable),
            ModelState::Trained(_) => panic!("expected untrained state"),
        }
    }

    #[test]
    fn test_untrained_state_json() {
        let state = ModelState::from_result(Err(PipelineError::InsufficientData(
            "empty".to_string(),
        )));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "untrained");
        assert_eq!(json["reason"]["code"], "insufficient_data");
    }

    #[test]
    fn test_too_few_samples_is_untrained() {
        let state = ModelState::from_source(&SyntheticSource::new(1, 1), &SplitConfig::default());
        assert!(state.model().is_none());
    }

    #[test]
    fn test_retraining_builds_new_model() {
        let split = SplitConfig::default();
        let first = ModelState::from_source(&SyntheticSource::new(1, 100), &split);
        let second = ModelState::from_source(&SyntheticSource::new(2, 100), &split);
        assert_ne!(first.model(), second.model());
    }

    #[test]
    fn test_estimate_reading_recomputes() {
        let state = ModelState::from_source(&SyntheticSource::new(3, 300), &SplitConfig::default());
        let model = state.model().unwrap();
        let adapter = LiveReadingAdapter::default();
        let mut reading = Reading {
            city: "Delhi".to_string(),
            aqi: 180.0,
            temperature: Some(25.0),
            dominant_pollutant: None,
            observed_at: None,
        };
        let (cool, defaulted) = estimate_reading(model, &adapter, &reading);
        assert!(!defaulted.temperature);

        reading.temperature = Some(40.0);
        let (hot, _) = estimate_reading(model, &adapter, &reading);
        assert_ne!(cool.predicted_aqi, hot.predicted_aqi);
        assert_eq!(hot.category, Category::from_aqi(hot.predicted_aqi));
    }
}
