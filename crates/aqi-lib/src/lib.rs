//! Air-quality estimation library
//!
//! This crate provides the core functionality for:
//! - Producing labeled samples (synthetic or from CSV tables)
//! - Fitting an OLS model and predicting an air-quality index
//! - Evaluating a model on held-out samples
//! - Categorizing an index into a severity band
//! - Normalizing live provider readings

pub mod category;
pub mod error;
pub mod estimator;
pub mod live;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod source;

pub use category::{categorize, Category};
pub use error::{ErrorKind, ErrorReport, PipelineError, Result};
pub use estimator::{evaluate, fit, predict, EvaluationReport, LinearModel, Predictor};
pub use live::{LiveDefaults, LiveReadingAdapter};
pub use models::*;
pub use observability::{PipelineMetrics, StructuredLogger};
pub use pipeline::{ModelState, SplitConfig, TrainedModel};
