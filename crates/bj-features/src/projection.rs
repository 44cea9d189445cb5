//! Latent alignment hook
//!
//! Optional linear projection of a feature vector into a learned latent space
//! (for example a cross-modality alignment fitted offline). Identity until a
//! matrix is installed.

use bj_core::{BjError, BjResult};

/// Row-major `rows × cols` projection matrix
#[derive(Debug, Clone, Default)]
pub struct LatentProjection {
    matrix: Option<Projection>,
}

#[derive(Debug, Clone)]
struct Projection {
    weights: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl LatentProjection {
    pub fn identity() -> Self {
        Self { matrix: None }
    }

    /// Install a projection; `weights.len()` must equal `rows × cols`
    ///
    /// A dimension mismatch is a configuration error and leaves the current
    /// projection in place.
    pub fn set(&mut self, weights: Vec<f32>, rows: usize, cols: usize) -> BjResult<()> {
        if rows == 0 || cols == 0 || Some(weights.len()) != rows.checked_mul(cols) {
            return Err(BjError::config(format!(
                "projection needs {rows}×{cols} weights, got {}",
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(BjError::config("projection weights must be finite"));
        }
        log::info!("Latent projection set: {rows}×{cols}");
        self.matrix = Some(Projection {
            weights,
            rows,
            cols,
        });
        Ok(())
    }

    pub fn clear(&mut self) {
        self.matrix = None;
    }

    pub fn is_identity(&self) -> bool {
        self.matrix.is_none()
    }

    /// Input dimension the installed matrix expects
    pub fn input_dim(&self) -> Option<usize> {
        self.matrix.as_ref().map(|m| m.cols)
    }

    /// Project `vector`; identity copy when no matrix is set
    pub fn align(&self, vector: &[f32]) -> BjResult<Vec<f32>> {
        let Some(m) = &self.matrix else {
            return Ok(vector.to_vec());
        };
        if vector.len() != m.cols {
            return Err(BjError::ShapeMismatch {
                expected: format!("{} features", m.cols),
                got: format!("{} features", vector.len()),
            });
        }
        Ok(m.weights
            .chunks_exact(m.cols)
            .take(m.rows)
            .map(|row| row.iter().zip(vector).map(|(w, x)| w * x).sum::<f32>())
            .collect())
    }
}
