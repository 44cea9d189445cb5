//! Error types for the learned enrichment path

use thiserror::Error;

/// Learned model error types
///
/// None of these ever escape `respond` or `predict_response`; they are logged
/// and turned into the rule-only output at the call site.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model file not found
    #[error("Model not found: {path}")]
    ModelNotFound { path: String },

    /// Model loading failed
    #[error("Failed to load model: {reason}")]
    ModelLoadFailed { reason: String },

    /// Weight tensor has the wrong shape
    #[error("Invalid weight shape for {tensor}: expected {expected}, got {got}")]
    InvalidShape {
        tensor: String,
        expected: String,
        got: String,
    },

    /// Inference failed
    #[error("Inference failed: {reason}")]
    InferenceFailed { reason: String },

    /// No usable compute backend
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for learned model operations
pub type AgentResult<T> = Result<T, AgentError>;

impl AgentError {
    pub fn inference(reason: impl Into<String>) -> Self {
        Self::InferenceFailed {
            reason: reason.into(),
        }
    }
}
