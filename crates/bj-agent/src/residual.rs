//! Learned residual personalization
//!
//! A small model maps the raw control vector to four deltas that nudge the
//! rule-based response: three additive deltas on note_density,
//! harmonic_tension and fill_probability, and one tempo delta scaled by
//! [`TEMPO_DELTA_SCALE`]. The reference model is a 4 → 8 → 4 MLP:
//!
//! ```text
//! delta = tanh(W2 · relu(W1 · x + b1) + b2) · 0.1
//! ```
//!
//! [`Personalizer`] is the failure boundary. Any error or non-finite delta is
//! logged and the rule-based output is kept untouched.

use crate::backend::{ComputeBackend, EnrichmentStatus};
use crate::error::{AgentError, AgentResult};
use crate::nn::{Linear, LinearWeights};
use bj_core::{ControlVector, ResponseVector, clamp_unit, tempo_from_f32};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tempo delta multiplier (±0.1 → ±2 BPM)
pub const TEMPO_DELTA_SCALE: f32 = 20.0;

/// Output magnitude of the reference MLP
pub const RESIDUAL_SCALE: f32 = 0.1;

/// Adjustment proposed by a residual model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResidualDelta {
    pub note_density: f32,
    pub harmonic_tension: f32,
    pub fill_probability: f32,
    /// Unscaled; multiplied by [`TEMPO_DELTA_SCALE`] when applied
    pub tempo: f32,
}

impl ResidualDelta {
    /// Model output order: [note_density, harmonic_tension, fill_probability, tempo]
    pub fn from_array(values: [f32; 4]) -> Self {
        Self {
            note_density: values[0],
            harmonic_tension: values[1],
            fill_probability: values[2],
            tempo: values[3],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.note_density.is_finite()
            && self.harmonic_tension.is_finite()
            && self.fill_probability.is_finite()
            && self.tempo.is_finite()
    }

    /// Add to a response, clamping every field back into its range
    pub fn apply(&self, base: ResponseVector) -> ResponseVector {
        ResponseVector {
            note_density: clamp_unit(base.note_density + self.note_density),
            harmonic_tension: clamp_unit(base.harmonic_tension + self.harmonic_tension),
            tempo_suggestion: tempo_from_f32(
                base.tempo_suggestion as f32 + self.tempo * TEMPO_DELTA_SCALE,
            ),
            fill_probability: clamp_unit(base.fill_probability + self.fill_probability),
        }
    }
}

/// Learned residual backend
pub trait ResidualModel: Send {
    /// Deltas for the given raw control vector
    fn delta(&self, controls: &ControlVector) -> AgentResult<ResidualDelta>;

    /// Backend the model runs on
    fn backend(&self) -> ComputeBackend {
        ComputeBackend::Cpu
    }
}

// ============ MLP Residual ============

/// Serialized residual MLP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpWeights {
    pub hidden: LinearWeights,
    pub output: LinearWeights,
}

/// Two-layer residual MLP (4 → hidden → 4)
#[derive(Debug, Clone)]
pub struct MlpResidual {
    hidden: Linear,
    output: Linear,
    hidden_dim: usize,
    backend: ComputeBackend,
}

impl MlpResidual {
    /// Build from deserialized weights; hidden width is taken from the bias
    pub fn from_weights(weights: &MlpWeights) -> AgentResult<Self> {
        let hidden_dim = weights.hidden.bias.len();
        if hidden_dim == 0 {
            return Err(AgentError::ModelLoadFailed {
                reason: "hidden layer is empty".into(),
            });
        }
        Ok(Self {
            hidden: Linear::from_weights("hidden", &weights.hidden, hidden_dim, 4)?,
            output: Linear::from_weights("output", &weights.output, 4, hidden_dim)?,
            hidden_dim,
            backend: ComputeBackend::best_available(),
        })
    }

    pub fn from_json_str(json: &str) -> AgentResult<Self> {
        let weights: MlpWeights = serde_json::from_str(json)?;
        Self::from_weights(&weights)
    }

    /// Load JSON weights from disk
    pub fn load(path: impl AsRef<Path>) -> AgentResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AgentError::ModelNotFound {
                path: path.display().to_string(),
            });
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    fn forward(&self, x: &[f32; 4]) -> Array1<f32> {
        let input = Array1::from(x.to_vec());
        let h = self.hidden.forward(input.view()).mapv(|v| v.max(0.0));
        self.output
            .forward(h.view())
            .mapv(|v| v.tanh() * RESIDUAL_SCALE)
    }
}

impl ResidualModel for MlpResidual {
    fn delta(&self, controls: &ControlVector) -> AgentResult<ResidualDelta> {
        let y = self.forward(&controls.to_array());
        match y.as_slice() {
            Some(&[a, b, c, d]) => Ok(ResidualDelta::from_array([a, b, c, d])),
            _ => Err(AgentError::inference(format!(
                "expected 4 outputs, got {}",
                y.len()
            ))),
        }
    }

    fn backend(&self) -> ComputeBackend {
        self.backend
    }
}

// ============ Personalizer ============

/// Optional learned adjustment of the rule-based response
pub enum Personalizer {
    /// Rules only
    RuleOnly,
    /// Rules nudged by a residual model, behind a failure boundary
    Learned(Box<dyn ResidualModel>),
}

impl std::fmt::Debug for Personalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Personalizer::RuleOnly => f.write_str("RuleOnly"),
            Personalizer::Learned(model) => write!(f, "Learned({})", model.backend()),
        }
    }
}

impl Default for Personalizer {
    fn default() -> Self {
        Personalizer::RuleOnly
    }
}

impl Personalizer {
    pub fn learned(model: impl ResidualModel + 'static) -> Self {
        Personalizer::Learned(Box::new(model))
    }

    /// Load an MLP residual; a failure disables personalization
    pub fn from_path(path: impl AsRef<Path>) -> (Self, EnrichmentStatus) {
        let path = path.as_ref();
        match MlpResidual::load(path) {
            Ok(model) => {
                let source = path.display().to_string();
                log::info!(
                    "Residual model loaded from {source} ({} hidden, {})",
                    model.hidden_dim(),
                    model.backend()
                );
                (Self::learned(model), EnrichmentStatus::Loaded { source })
            }
            Err(e) => {
                log::warn!("Residual model unavailable, using rules only: {e}");
                (
                    Personalizer::RuleOnly,
                    EnrichmentStatus::Failed {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    /// Personalizer for an optional configured path
    pub fn from_config(path: Option<&str>) -> (Self, EnrichmentStatus) {
        match path {
            Some(path) => Self::from_path(path),
            None => (Personalizer::RuleOnly, EnrichmentStatus::Disabled),
        }
    }

    pub fn is_learned(&self) -> bool {
        matches!(self, Personalizer::Learned(_))
    }

    /// Apply the residual if any; errors keep `base` unchanged
    pub fn apply(&self, controls: &ControlVector, base: ResponseVector) -> ResponseVector {
        let Personalizer::Learned(model) = self else {
            return base;
        };
        match model.delta(controls) {
            Ok(delta) if delta.is_finite() => delta.apply(base),
            Ok(delta) => {
                log::warn!("Residual produced non-finite delta {delta:?}, using rules only");
                base
            }
            Err(e) => {
                log::warn!("Residual adjustment failed, using rules only: {e}");
                base
            }
        }
    }
}
