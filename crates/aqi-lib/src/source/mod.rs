//! Feature sources for training
//!
//! This module provides two ways of producing labeled samples:
//! - Synthetic generation from fixed distributions (used when no data is supplied)
//! - Loading and concatenating two CSV tables

mod synthetic;
mod tabular;

pub use synthetic::{generate, SyntheticProfile, SyntheticSource, TemperatureDistribution};
pub use tabular::{load, load_with, TabularOptions, TabularSource};

use crate::error::Result;
use crate::models::LabeledSample;

/// Trait for labeled sample producers
pub trait FeatureSource {
    /// Produce the training samples
    fn samples(&self) -> Result<Vec<LabeledSample>>;

    /// Short description used in logs and output
    fn describe(&self) -> String;
}
