//! Compute backend selection and enrichment status
//!
//! The learned components run on a capability-checked backend. Feature
//! extraction and the state machine never touch this module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compute backend for learned model inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComputeBackend {
    /// Pure Rust ndarray kernels
    #[default]
    Cpu,
    /// GPU/NPU accelerator (not compiled into this build)
    Accelerator,
}

impl ComputeBackend {
    /// All backends, in declaration order
    pub const ALL: [ComputeBackend; 2] = [ComputeBackend::Cpu, ComputeBackend::Accelerator];

    /// Check if this backend is usable on the current system
    pub fn is_available(&self) -> bool {
        match self {
            ComputeBackend::Cpu => true,
            ComputeBackend::Accelerator => false,
        }
    }

    /// Priority (higher = preferred)
    pub fn priority(&self) -> u32 {
        match self {
            ComputeBackend::Accelerator => 90,
            ComputeBackend::Cpu => 10,
        }
    }

    /// `preferred` if available, CPU otherwise
    pub fn select(preferred: ComputeBackend) -> ComputeBackend {
        if preferred.is_available() {
            preferred
        } else {
            log::info!("{preferred} backend not available, falling back to cpu");
            ComputeBackend::Cpu
        }
    }

    /// Highest-priority available backend
    pub fn best_available() -> ComputeBackend {
        Self::ALL
            .into_iter()
            .filter(ComputeBackend::is_available)
            .max_by_key(ComputeBackend::priority)
            .unwrap_or(ComputeBackend::Cpu)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeBackend::Cpu => "cpu",
            ComputeBackend::Accelerator => "accelerator",
        }
    }
}

impl fmt::Display for ComputeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of wiring up an optional learned component
///
/// Returned from construction instead of printing, so callers can surface it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichmentStatus {
    /// No model configured
    #[default]
    Disabled,
    /// Model loaded and active
    Loaded { source: String },
    /// Model configured but could not be loaded
    Failed { reason: String },
}

impl EnrichmentStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, EnrichmentStatus::Loaded { .. })
    }
}

impl fmt::Display for EnrichmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichmentStatus::Disabled => f.write_str("disabled"),
            EnrichmentStatus::Loaded { source } => write!(f, "loaded from {source}"),
            EnrichmentStatus::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}
