//! Error types for BrainJam

use thiserror::Error;

/// Core error type
///
/// Only configuration and shape problems surface as errors. Warm-up and
/// numeric degeneracy are handled in-band with neutral values.
#[derive(Error, Debug)]
pub enum BjError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Channel count mismatch for {modality}: expected {expected}, got {got}")]
    ChannelMismatch {
        modality: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type BjResult<T> = Result<T, BjError>;

impl BjError {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
