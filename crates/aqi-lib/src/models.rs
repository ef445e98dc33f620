//! Core data models for the estimation pipeline

use crate::error::{PipelineError, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the features the estimator is trained on, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    Temperature,
    TrafficLevel,
    IndustrialActivity,
}

impl FeatureName {
    pub const ALL: [FeatureName; 3] = [
        FeatureName::Temperature,
        FeatureName::TrafficLevel,
        FeatureName::IndustrialActivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::Temperature => "temperature",
            FeatureName::TrafficLevel => "traffic_level",
            FeatureName::IndustrialActivity => "industrial_activity",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature vector consumed by fit and predict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub temperature: f64,
    pub traffic_level: f64,
    pub industrial_activity: f64,
}

impl FeatureVector {
    pub fn new(temperature: f64, traffic_level: f64, industrial_activity: f64) -> Self {
        Self {
            temperature,
            traffic_level,
            industrial_activity,
        }
    }

    /// Build a vector from named values.
    ///
    /// Exactly the three feature names must be supplied, each once.
    pub fn from_named<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut values: [Option<f64>; 3] = [None; 3];
        let mut supplied = Vec::new();
        let mut valid = true;

        for (name, value) in pairs {
            supplied.push(name.to_string());
            match FeatureName::parse(name) {
                Some(feature) => {
                    let slot = &mut values[feature as usize];
                    if slot.is_some() {
                        valid = false;
                    }
                    *slot = Some(value);
                }
                None => valid = false,
            }
        }

        match (valid, values) {
            (true, [Some(t), Some(tr), Some(ind)]) => Ok(Self::new(t, tr, ind)),
            _ => Err(PipelineError::DimensionMismatch {
                expected: FeatureName::ALL.iter().map(|f| f.to_string()).collect(),
                found: supplied,
            }),
        }
    }

    pub fn get(&self, feature: FeatureName) -> f64 {
        match feature {
            FeatureName::Temperature => self.temperature,
            FeatureName::TrafficLevel => self.traffic_level,
            FeatureName::IndustrialActivity => self.industrial_activity,
        }
    }

    /// Copy of this vector with one feature replaced
    pub fn with(mut self, feature: FeatureName, value: f64) -> Self {
        match feature {
            FeatureName::Temperature => self.temperature = value,
            FeatureName::TrafficLevel => self.traffic_level = value,
            FeatureName::IndustrialActivity => self.industrial_activity = value,
        }
        self
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.temperature, self.traffic_level, self.industrial_activity]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Feature vector paired with its observed index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub features: FeatureVector,
    pub target: f64,
}

impl LabeledSample {
    pub fn new(features: FeatureVector, target: f64) -> Self {
        Self { features, target }
    }
}

/// Pollutant reported as dominant for a reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pollutant {
    /// Upper-case pollutant code, e.g. `PM25`
    pub code: String,
    pub value: Option<f64>,
}

/// Live air-quality reading normalized from a provider payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub city: String,
    pub aqi: f64,
    pub temperature: Option<f64>,
    pub dominant_pollutant: Option<Pollutant>,
    pub observed_at: Option<DateTime<FixedOffset>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_named_any_order() {
        let v = FeatureVector::from_named([
            ("industrial_activity", 3.0),
            ("temperature", 28.0),
            ("traffic_level", 7.0),
        ])
        .unwrap();
        assert_eq!(v, FeatureVector::new(28.0, 7.0, 3.0));
    }

    #[test]
    fn test_from_named_missing_feature() {
        let err = FeatureVector::from_named([("temperature", 28.0), ("traffic_level", 7.0)])
            .unwrap_err();
        assert!(matches!(err, PipelineError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_from_named_unknown_or_duplicate() {
        let unknown = FeatureVector::from_named([
            ("temperature", 28.0),
            ("traffic_level", 7.0),
            ("industrial_activity", 3.0),
            ("humidity", 40.0),
        ]);
        assert!(matches!(unknown, Err(PipelineError::DimensionMismatch { .. })));

        let duplicate = FeatureVector::from_named([
            ("temperature", 28.0),
            ("temperature", 29.0),
            ("industrial_activity", 3.0),
        ]);
        assert!(matches!(duplicate, Err(PipelineError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_with_replaces_single_feature() {
        let v = FeatureVector::new(20.0, 5.0, 5.0).with(FeatureName::TrafficLevel, 9.0);
        assert_eq!(v.get(FeatureName::TrafficLevel), 9.0);
        assert_eq!(v.temperature, 20.0);
    }

    #[test]
    fn test_feature_name_round_trip() {
        for feature in FeatureName::ALL {
            assert_eq!(FeatureName::parse(feature.as_str()), Some(feature));
        }
        assert_eq!(FeatureName::parse("pm25"), None);
    }
}
