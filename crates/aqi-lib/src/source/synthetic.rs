//! Synthetic sample generation
//!
//! Features are drawn from fixed distributions and the target is a fixed
//! linear combination of them plus Gaussian noise. The same seed always
//! produces the same samples.

use super::FeatureSource;
use crate::error::{PipelineError, Result};
use crate::models::{FeatureVector, LabeledSample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Allowed range for the target noise standard deviation
const NOISE_STD_RANGE: (f64, f64) = (5.0, 10.0);

/// Inclusive range of the integer-valued level features
const LEVEL_RANGE: (u32, u32) = (1, 10);

/// Distribution of the temperature feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemperatureDistribution {
    Normal { mean: f64, std_dev: f64 },
    Uniform { low: f64, high: f64 },
}

/// Parameters of the synthetic data generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticProfile {
    pub temperature: TemperatureDistribution,
    pub intercept: f64,
    pub temperature_weight: f64,
    pub traffic_weight: f64,
    pub industrial_weight: f64,
    /// Standard deviation of the target noise, within [5, 10]
    pub noise_std_dev: f64,
}

impl Default for SyntheticProfile {
    fn default() -> Self {
        Self {
            temperature: TemperatureDistribution::Normal {
                mean: 30.0,
                std_dev: 5.0,
            },
            intercept: 20.0,
            temperature_weight: 2.0,
            traffic_weight: 10.0,
            industrial_weight: 8.0,
            noise_std_dev: 10.0,
        }
    }
}

impl SyntheticProfile {
    /// Profile with temperature drawn from uniform(15, 45)
    pub fn uniform_temperature() -> Self {
        Self {
            temperature: TemperatureDistribution::Uniform {
                low: 15.0,
                high: 45.0,
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = NOISE_STD_RANGE;
        if !(lo..=hi).contains(&self.noise_std_dev) {
            return Err(PipelineError::InvalidInput(format!(
                "noise standard deviation {} outside [{}, {}]",
                self.noise_std_dev, lo, hi
            )));
        }
        match self.temperature {
            TemperatureDistribution::Normal { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
                    return Err(PipelineError::InvalidInput(format!(
                        "invalid temperature distribution normal({}, {})",
                        mean, std_dev
                    )));
                }
            }
            TemperatureDistribution::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low >= high {
                    return Err(PipelineError::InvalidInput(format!(
                        "invalid temperature distribution uniform({}, {})",
                        low, high
                    )));
                }
            }
        }
        Ok(())
    }

    /// Noise-free target for a feature vector
    pub fn expected_target(&self, features: &FeatureVector) -> f64 {
        self.intercept
            + self.temperature_weight * features.temperature
            + self.traffic_weight * features.traffic_level
            + self.industrial_weight * features.industrial_activity
    }
}

enum TemperatureSampler {
    Normal(Normal<f64>),
    Uniform(f64, f64),
}

impl TemperatureSampler {
    fn new(distribution: TemperatureDistribution) -> Result<Self> {
        match distribution {
            TemperatureDistribution::Normal { mean, std_dev } => Normal::new(mean, std_dev)
                .map(TemperatureSampler::Normal)
                .map_err(|e| PipelineError::InvalidInput(format!("temperature distribution: {}", e))),
            TemperatureDistribution::Uniform { low, high } => {
                Ok(TemperatureSampler::Uniform(low, high))
            }
        }
    }

    fn sample(&self, rng: &mut StdRng) -> f64 {
        match self {
            TemperatureSampler::Normal(normal) => normal.sample(rng),
            TemperatureSampler::Uniform(low, high) => rng.random_range(*low..*high),
        }
    }
}

/// Seeded synthetic sample source
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pub seed: u64,
    pub count: usize,
    pub profile: SyntheticProfile,
}

impl SyntheticSource {
    pub fn new(seed: u64, count: usize) -> Self {
        Self {
            seed,
            count,
            profile: SyntheticProfile::default(),
        }
    }

    pub fn with_profile(mut self, profile: SyntheticProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn generate(&self) -> Result<Vec<LabeledSample>> {
        self.profile.validate()?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let noise = Normal::new(0.0, self.profile.noise_std_dev)
            .map_err(|e| PipelineError::InvalidInput(format!("noise distribution: {}", e)))?;
        let temperature = TemperatureSampler::new(self.profile.temperature)?;

        let samples: Vec<LabeledSample> = (0..self.count)
            .map(|_| {
                let temperature = temperature.sample(&mut rng);
                let traffic_level = rng.random_range(LEVEL_RANGE.0..=LEVEL_RANGE.1) as f64;
                let industrial_activity = rng.random_range(LEVEL_RANGE.0..=LEVEL_RANGE.1) as f64;
                let features = FeatureVector::new(temperature, traffic_level, industrial_activity);
                let target = self.profile.expected_target(&features) + noise.sample(&mut rng);
                LabeledSample::new(features, target)
            })
            .collect();

        debug!(seed = self.seed, count = samples.len(), "Generated synthetic samples");
        Ok(samples)
    }
}

impl FeatureSource for SyntheticSource {
    fn samples(&self) -> Result<Vec<LabeledSample>> {
        self.generate()
    }

    fn describe(&self) -> String {
        format!("synthetic(seed={}, n={})", self.seed, self.count)
    }
}

/// Generate `n` samples with the default profile
pub fn generate(seed: u64, n: usize) -> Result<Vec<LabeledSample>> {
    SyntheticSource::new(seed, n).generate()
}
