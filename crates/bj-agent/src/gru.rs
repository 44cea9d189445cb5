//! Stacked GRU dialogue predictor
//!
//! Multi-layer GRU over a sequence of control vectors with a dense `tanh`
//! head on the top layer's last hidden state. Gate layout follows PyTorch
//! (reset, update, new), so exported `nn.GRU` state dicts load directly once
//! written as JSON:
//!
//! ```text
//! r  = σ(W_ir·x + b_ir + W_hr·h + b_hr)
//! z  = σ(W_iz·x + b_iz + W_hz·h + b_hz)
//! n  = tanh(W_in·x + b_in + r ⊙ (W_hn·h + b_hn))
//! h' = (1 − z) ⊙ n + z ⊙ h
//! ```

use crate::backend::ComputeBackend;
use crate::error::{AgentError, AgentResult};
use crate::memory::SequencePredictor;
use crate::nn::{self, Linear, LinearWeights};
use bj_core::{ControlVector, sigmoid};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Control vector width
const INPUT_DIM: usize = 4;

/// Serialized GRU layer (gate blocks stacked r, z, n along rows)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GruLayerWeights {
    /// `[3H][in]`
    pub weight_ih: Vec<Vec<f32>>,
    /// `[3H][H]`
    pub weight_hh: Vec<Vec<f32>>,
    /// `[3H]`
    pub bias_ih: Vec<f32>,
    /// `[3H]`
    pub bias_hh: Vec<f32>,
}

/// Serialized dialogue model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GruWeights {
    pub layers: Vec<GruLayerWeights>,
    pub output: LinearWeights,
}

#[derive(Debug, Clone)]
struct GruLayer {
    weight_ih: Array2<f32>,
    weight_hh: Array2<f32>,
    bias_ih: Array1<f32>,
    bias_hh: Array1<f32>,
}

impl GruLayer {
    fn from_weights(
        index: usize,
        w: &GruLayerWeights,
        in_dim: usize,
        hidden: usize,
    ) -> AgentResult<Self> {
        let gates = 3 * hidden;
        let name = |tensor: &str| format!("layers[{index}].{tensor}");
        Ok(Self {
            weight_ih: nn::matrix(&name("weight_ih"), &w.weight_ih, gates, in_dim)?,
            weight_hh: nn::matrix(&name("weight_hh"), &w.weight_hh, gates, hidden)?,
            bias_ih: nn::vector(&name("bias_ih"), &w.bias_ih, gates)?,
            bias_hh: nn::vector(&name("bias_hh"), &w.bias_hh, gates)?,
        })
    }

    /// One time step; `h` is updated in place
    fn step(&self, x: &Array1<f32>, h: &mut Array1<f32>) {
        let hidden = h.len();
        let gi = self.weight_ih.dot(x) + &self.bias_ih;
        let gh = self.weight_hh.dot(&*h) + &self.bias_hh;

        for j in 0..hidden {
            let r = sigmoid(gi[j] + gh[j]);
            let z = sigmoid(gi[hidden + j] + gh[hidden + j]);
            let n = (gi[2 * hidden + j] + r * gh[2 * hidden + j]).tanh();
            h[j] = (1.0 - z) * n + z * h[j];
        }
    }
}

/// Stacked GRU predictor of the next control vector
#[derive(Debug, Clone)]
pub struct GruPredictor {
    layers: Vec<GruLayer>,
    output: Linear,
    hidden: usize,
    backend: ComputeBackend,
}

impl GruPredictor {
    /// Build from deserialized weights; hidden width is `bias_hh.len() / 3`
    pub fn from_weights(weights: &GruWeights) -> AgentResult<Self> {
        let Some(first) = weights.layers.first() else {
            return Err(AgentError::ModelLoadFailed {
                reason: "dialogue model has no GRU layers".into(),
            });
        };
        if first.bias_hh.is_empty() || first.bias_hh.len() % 3 != 0 {
            return Err(AgentError::InvalidShape {
                tensor: "layers[0].bias_hh".into(),
                expected: "3·hidden".into(),
                got: first.bias_hh.len().to_string(),
            });
        }
        let hidden = first.bias_hh.len() / 3;

        let layers = weights
            .layers
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let in_dim = if i == 0 { INPUT_DIM } else { hidden };
                GruLayer::from_weights(i, w, in_dim, hidden)
            })
            .collect::<AgentResult<Vec<_>>>()?;

        Ok(Self {
            layers,
            output: Linear::from_weights("output", &weights.output, INPUT_DIM, hidden)?,
            hidden,
            backend: ComputeBackend::best_available(),
        })
    }

    pub fn from_json_str(json: &str) -> AgentResult<Self> {
        let weights: GruWeights = serde_json::from_str(json)?;
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

    pub fn hidden_size(&self) -> usize {
        self.hidden
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Run the sequence and return the head output of the last step
    fn forward(&self, sequence: &[ControlVector]) -> Array1<f32> {
        let mut states = vec![Array1::<f32>::zeros(self.hidden); self.layers.len()];
        for controls in sequence {
            let mut input = Array1::from(controls.to_array().to_vec());
            for (layer, h) in self.layers.iter().zip(states.iter_mut()) {
                layer.step(&input, h);
                input = h.clone();
            }
        }
        let top = states
            .last()
            .cloned()
            .unwrap_or_else(|| Array1::zeros(self.hidden));
        self.output.forward(top.view()).mapv(f32::tanh)
    }
}

impl SequencePredictor for GruPredictor {
    fn predict(&self, context: &[ControlVector]) -> AgentResult<[f32; 4]> {
        if context.is_empty() {
            return Err(AgentError::inference("empty context"));
        }
        let y = self.forward(context);
        match y.as_slice() {
            Some(&[a, b, c, d]) => Ok([a, b, c, d]),
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
