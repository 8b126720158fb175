//! Error types shared by the analysis pipeline and its plumbing.
//!
//! The three core kinds mirror the pipeline contract: a configuration the
//! pipeline cannot act on, an image it cannot analyse, and a broken internal
//! invariant. The remaining variants belong to file loading, configuration
//! files, report output and the batch worker pool.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DetectionError>;

#[derive(Error, Debug)]
pub enum DetectionError {
    /// A configuration value the pipeline cannot act on.
    #[error("Invalid configuration: {parameter} = {value} ({reason})")]
    InvalidConfig {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Zero-area image, unsupported channel layout or truncated buffer.
    #[error("Unsupported image: {reason}")]
    UnsupportedImage { reason: String },

    /// Internal contract broken between two pipeline stages.
    #[error("Invariant violated: {reason}")]
    InvariantViolation { reason: String },

    #[error("Failed to load image {}: {message}", .path.display())]
    ImageLoad {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to load configuration {}: {message}", .path.display())]
    ConfigLoad { path: PathBuf, message: String },

    #[error("Failed to write {}: {message}", .path.display())]
    Output { path: PathBuf, message: String },

    #[error("Worker pool error: {message}")]
    WorkerPool { message: String },
}

/// Coarse classification used by callers mapping failures onto transport
/// responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidConfig,
    UnsupportedImage,
    InvariantViolation,
    ImageLoad,
    ConfigLoad,
    Output,
    WorkerPool,
}

impl DetectionError {
    pub fn invalid_config(
        parameter: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_image(reason: impl Into<String>) -> Self {
        Self::UnsupportedImage {
            reason: reason.into(),
        }
    }

    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }

    /// Create an image load error carrying the underlying cause.
    pub fn image_load<E>(path: impl Into<PathBuf>, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoad {
            path: path.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Image rejected before decoding (extension or size limits).
    pub fn image_rejected(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ImageLoad {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectionError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            DetectionError::UnsupportedImage { .. } => ErrorKind::UnsupportedImage,
            DetectionError::InvariantViolation { .. } => ErrorKind::InvariantViolation,
            DetectionError::ImageLoad { .. } => ErrorKind::ImageLoad,
            DetectionError::ConfigLoad { .. } => ErrorKind::ConfigLoad,
            DetectionError::Output { .. } => ErrorKind::Output,
            DetectionError::WorkerPool { .. } => ErrorKind::WorkerPool,
        }
    }

    /// True when the failure signals a programming defect rather than bad
    /// input.
    pub fn is_defect(&self) -> bool {
        matches!(self, DetectionError::InvariantViolation { .. })
    }
}
