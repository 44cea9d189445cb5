//! Minimal dense-layer kernels for the learned components
//!
//! Weights arrive as nested JSON arrays (row-major, `[out][in]`) and are
//! converted once into ndarray matrices at load time.

use crate::error::{AgentError, AgentResult};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Serialized dense layer: `y = W·x + b`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearWeights {
    /// `[out][in]`
    pub weight: Vec<Vec<f32>>,
    /// `[out]`
    pub bias: Vec<f32>,
}

/// Row-major nested rows → `rows × cols` matrix, with shape check
pub(crate) fn matrix(
    tensor: &str,
    data: &[Vec<f32>],
    rows: usize,
    cols: usize,
) -> AgentResult<Array2<f32>> {
    let shape_error = || AgentError::InvalidShape {
        tensor: tensor.to_string(),
        expected: format!("{rows}×{cols}"),
        got: format!(
            "{}×{}",
            data.len(),
            data.first().map(Vec::len).unwrap_or(0)
        ),
    };
    if data.len() != rows || data.iter().any(|row| row.len() != cols) {
        return Err(shape_error());
    }
    let flat: Vec<f32> = data.iter().flatten().copied().collect();
    if flat.iter().any(|w| !w.is_finite()) {
        return Err(AgentError::ModelLoadFailed {
            reason: format!("{tensor} contains non-finite weights"),
        });
    }
    Array2::from_shape_vec((rows, cols), flat).map_err(|_| shape_error())
}

/// Bias vector with length check
pub(crate) fn vector(tensor: &str, data: &[f32], len: usize) -> AgentResult<Array1<f32>> {
    if data.len() != len {
        return Err(AgentError::InvalidShape {
            tensor: tensor.to_string(),
            expected: format!("{len}"),
            got: format!("{}", data.len()),
        });
    }
    if data.iter().any(|w| !w.is_finite()) {
        return Err(AgentError::ModelLoadFailed {
            reason: format!("{tensor} contains non-finite weights"),
        });
    }
    Ok(Array1::from(data.to_vec()))
}

/// Dense layer ready for inference
#[derive(Debug, Clone)]
pub(crate) struct Linear {
    weight: Array2<f32>,
    bias: Array1<f32>,
}

impl Linear {
    pub(crate) fn from_weights(
        name: &str,
        weights: &LinearWeights,
        out_dim: usize,
        in_dim: usize,
    ) -> AgentResult<Self> {
        Ok(Self {
            weight: matrix(&format!("{name}.weight"), &weights.weight, out_dim, in_dim)?,
            bias: vector(&format!("{name}.bias"), &weights.bias, out_dim)?,
        })
    }

    pub(crate) fn forward(&self, x: ArrayView1<'_, f32>) -> Array1<f32> {
        self.weight.dot(&x) + &self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_linear_forward() {
        let weights = LinearWeights {
            weight: vec![vec![1.0, 2.0], vec![0.0, -1.0], vec![0.5, 0.5]],
            bias: vec![0.0, 1.0, -1.0],
        };
        let layer = Linear::from_weights("test", &weights, 3, 2).unwrap();
        let y = layer.forward(arr1(&[1.0, 1.0]).view());
        assert_eq!(y.to_vec(), vec![3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shape_checked() {
        let weights = LinearWeights {
            weight: vec![vec![1.0, 2.0], vec![0.0]],
            bias: vec![0.0, 1.0],
        };
        let err = Linear::from_weights("hidden", &weights, 2, 2).unwrap_err();
        assert!(matches!(err, AgentError::InvalidShape { .. }));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(vector("bias", &[0.0, f32::NAN], 2).is_err());
    }
}
