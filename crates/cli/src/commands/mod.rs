//! CLI command implementations

pub mod estimate;
pub mod live;
pub mod model;

use aqi_lib::source::{FeatureSource, SyntheticSource, TabularOptions, TabularSource};
use aqi_lib::{ModelState, SplitConfig, StructuredLogger};
use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::Config;
use crate::output::print_warning;

/// Options controlling where training data comes from
#[derive(Args, Debug, Clone, Default)]
pub struct TrainingArgs {
    /// Two CSV files to train on; synthetic data is used when omitted
    #[arg(long = "data", num_args = 2, value_names = ["PATH_A", "PATH_B"])]
    pub data: Option<Vec<PathBuf>>,

    /// Target column in the CSV files
    #[arg(long)]
    pub target_column: Option<String>,

    /// CSV field delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Number of synthetic samples
    #[arg(long)]
    pub samples: Option<usize>,

    /// Seed for synthetic data and the held-out split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Share of samples held out for evaluation
    #[arg(long)]
    pub test_fraction: Option<f64>,
}

impl TrainingArgs {
    pub fn split(&self, config: &Config) -> SplitConfig {
        SplitConfig {
            test_fraction: self.test_fraction.unwrap_or(config.test_fraction),
            seed: self.seed.unwrap_or(config.seed),
        }
    }

    /// The CSV source when data files were given, else the synthetic one
    pub fn source(&self, config: &Config) -> Result<Box<dyn FeatureSource>> {
        match self.data.as_deref() {
            Some([a, b]) => {
                let mut options = TabularOptions::default().with_target(
                    self.target_column
                        .clone()
                        .unwrap_or_else(|| config.target_column.clone()),
                );
                if let Some(delimiter) = self.delimiter {
                    if !delimiter.is_ascii() {
                        bail!("Delimiter must be a single ASCII character");
                    }
                    options = options.with_delimiter(delimiter as u8);
                }
                Ok(Box::new(TabularSource::new(a, b).with_options(options)))
            }
            Some(other) => bail!("Expected two data files, got {}", other.len()),
            None => Ok(Box::new(SyntheticSource::new(
                self.seed.unwrap_or(config.seed),
                self.samples.unwrap_or(config.samples),
            ))),
        }
    }
}

/// Train a fresh model. Failures are reported and yield an untrained state.
pub fn train_model(args: &TrainingArgs, config: &Config, logger: &StructuredLogger) -> Result<ModelState> {
    let source = args.source(config)?;
    let state = ModelState::from_source(source.as_ref(), &args.split(config));

    match &state {
        ModelState::Trained(trained) => logger.log_model_trained(
            &source.describe(),
            aqi_lib::Predictor::model_version(&trained.model),
            trained.train_samples,
            trained.held_out_samples,
            trained.evaluation.mean_squared_error,
            trained.evaluation.r_squared,
        ),
        ModelState::Untrained { reason } => {
            logger.log_training_failed(&source.describe(), reason.code.as_str(), &reason.message);
        }
    }

    Ok(state)
}

/// Report an untrained state to the user
pub fn warn_untrained(state: &ModelState) {
    if let ModelState::Untrained { reason } = state {
        print_warning(&format!("No model available: {}", reason.message));
    }
}
