//! Fit-quality metrics over a held-out set

use super::Predictor;
use crate::models::LabeledSample;
use serde::{Deserialize, Serialize};

/// Error and explained variance of a model on held-out samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub mean_squared_error: f64,
    /// NaN when the held-out targets have zero variance
    pub r_squared: f64,
    pub samples: usize,
}

impl EvaluationReport {
    pub fn rmse(&self) -> f64 {
        self.mean_squared_error.sqrt()
    }
}

/// Compute MSE and R² of `model` over `held_out`.
///
/// Never fails: undefined metrics are reported as NaN.
pub fn evaluate<P: Predictor + ?Sized>(model: &P, held_out: &[LabeledSample]) -> EvaluationReport {
    if held_out.is_empty() {
        return EvaluationReport {
            mean_squared_error: f64::NAN,
            r_squared: f64::NAN,
            samples: 0,
        };
    }

    let n = held_out.len() as f64;
    let mean_actual = held_out.iter().map(|s| s.target).sum::<f64>() / n;

    let (ss_res, ss_tot) = held_out.iter().fold((0.0, 0.0), |(res, tot), s| {
        let residual = s.target - model.predict(&s.features);
        (
            res + residual * residual,
            tot + (s.target - mean_actual).powi(2),
        )
    });

    let r_squared = if ss_tot == 0.0 {
        f64::NAN
    } else {
        1.0 - ss_res / ss_tot
    };

    EvaluationReport {
        mean_squared_error: ss_res / n,
        r_squared,
        samples: held_out.len(),
    }
}
