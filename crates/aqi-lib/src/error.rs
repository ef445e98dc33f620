//! Error taxonomy for the estimation pipeline
//!
//! Every failure is local to one pipeline step. Callers report the message
//! and keep running in a degraded state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("data source {} is unavailable: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    #[error("column `{column}` not found in {}", path.display())]
    SchemaMismatch { path: PathBuf, column: String },

    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    #[error("expected features [{}], got [{}]", expected.join(", "), found.join(", "))]
    DimensionMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("malformed provider payload: {0}")]
    MalformedPayload(String),

    #[error("provider reported an error: {message}")]
    ProviderError { message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::DataUnavailable { .. } => ErrorKind::DataUnavailable,
            PipelineError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            PipelineError::InsufficientData(_) => ErrorKind::InsufficientData,
            PipelineError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            PipelineError::MalformedPayload(_) => ErrorKind::MalformedPayload,
            PipelineError::ProviderError { .. } => ErrorKind::ProviderError,
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

/// Stable error codes for machine-readable output
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DataUnavailable,
    SchemaMismatch,
    InsufficientData,
    DimensionMismatch,
    MalformedPayload,
    ProviderError,
    InvalidInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::DataUnavailable => "data_unavailable",
            ErrorKind::SchemaMismatch => "schema_mismatch",
            ErrorKind::InsufficientData => "insufficient_data",
            ErrorKind::DimensionMismatch => "dimension_mismatch",
            ErrorKind::MalformedPayload => "malformed_payload",
            ErrorKind::ProviderError => "provider_error",
            ErrorKind::InvalidInput => "invalid_input",
        }
    }
}

/// Serializable form of a pipeline failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorKind,
    pub message: String,
}

impl From<&PipelineError> for ErrorReport {
    fn from(error: &PipelineError) -> Self {
        Self {
            code: error.kind(),
            message: error.to_string(),
        }
    }
}
