//! Sequence memory (optional enrichment)
//!
//! Keeps the last K control vectors and, when a learned predictor is
//! available, predicts the next one. Predictor output lives in [−1, 1] and is
//! rescaled to [0, 1]. Without a predictor, or on any predictor failure,
//! `predict_response` returns `None` and [`blend`] is the identity.

use crate::backend::{ComputeBackend, EnrichmentStatus};
use crate::error::AgentResult;
use crate::gru::GruPredictor;
use bj_core::{BjResult, ControlVector, MemoryConfig, RingBuffer, clamp_unit};
use std::path::Path;

/// Learned next-step predictor over a control sequence
pub trait SequencePredictor: Send {
    /// Raw prediction in [−1, 1] for the step after `context` (oldest first)
    fn predict(&self, context: &[ControlVector]) -> AgentResult<[f32; 4]>;

    /// Backend the model runs on
    fn backend(&self) -> ComputeBackend {
        ComputeBackend::Cpu
    }
}

/// Mix a rule-based vector with an optional prediction
///
/// `(1 − w)·rule + w·prediction` per control; identity without a prediction.
pub fn blend(
    rule: &ControlVector,
    prediction: Option<&ControlVector>,
    weight: f32,
) -> ControlVector {
    let Some(prediction) = prediction else {
        return *rule;
    };
    let w = clamp_unit(weight);
    let r = rule.to_array();
    let p = prediction.to_array();
    ControlVector::from_array(std::array::from_fn(|i| (1.0 - w) * r[i] + w * p[i]))
}

/// Bounded context buffer plus optional learned predictor
pub struct SequenceMemory {
    context: RingBuffer<ControlVector>,
    predictor: Option<Box<dyn SequencePredictor>>,
    status: EnrichmentStatus,
    blend_weight: f32,
}

impl std::fmt::Debug for SequenceMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceMemory")
            .field("context_len", &self.context.len())
            .field("capacity", &self.context.capacity())
            .field("status", &self.status)
            .field("blend_weight", &self.blend_weight)
            .finish()
    }
}

impl SequenceMemory {
    /// Build from config, loading `model_path` when set
    pub fn new(config: &MemoryConfig) -> BjResult<Self> {
        config.validate()?;
        let memory = Self {
            context: RingBuffer::new(config.context_length),
            predictor: None,
            status: EnrichmentStatus::Disabled,
            blend_weight: config.blend_weight,
        };
        Ok(match config.model_path.as_deref() {
            Some(path) => memory.with_model_path(path),
            None => memory,
        })
    }

    /// Load a GRU predictor; a failure leaves prediction disabled
    pub fn with_model_path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match GruPredictor::load(path) {
            Ok(model) => {
                let source = path.display().to_string();
                log::info!(
                    "Dialogue model loaded from {source} ({} layers × {} hidden, {})",
                    model.num_layers(),
                    model.hidden_size(),
                    model.backend()
                );
                self.predictor = Some(Box::new(model));
                self.status = EnrichmentStatus::Loaded { source };
            }
            Err(e) => {
                log::warn!("Dialogue model unavailable, prediction disabled: {e}");
                self.predictor = None;
                self.status = EnrichmentStatus::Failed {
                    reason: e.to_string(),
                };
            }
        }
        self
    }

    /// Install a predictor directly
    pub fn with_predictor(mut self, predictor: impl SequencePredictor + 'static) -> Self {
        self.predictor = Some(Box::new(predictor));
        self.status = EnrichmentStatus::Loaded {
            source: "injected".into(),
        };
        self
    }

    /// Append a control vector to the context (oldest dropped when full)
    pub fn add_context(&mut self, controls: ControlVector) {
        self.context.push(controls.normalized());
    }

    /// Predicted next control vector in [0, 1], if a predictor is available
    pub fn predict_response(&self) -> Option<ControlVector> {
        let predictor = self.predictor.as_ref()?;
        if self.context.is_empty() {
            return None;
        }
        let sequence = self.context.snapshot();
        match predictor.predict(&sequence) {
            Ok(raw) if raw.iter().all(|v| v.is_finite()) => Some(ControlVector::from_array(
                raw.map(|v| clamp_unit((v + 1.0) / 2.0)),
            )),
            Ok(raw) => {
                log::warn!("Dialogue model produced non-finite output {raw:?}");
                None
            }
            Err(e) => {
                log::warn!("Dialogue prediction failed: {e}");
                None
            }
        }
    }

    /// [`blend`] with the configured weight
    pub fn blend(&self, rule: &ControlVector, prediction: Option<&ControlVector>) -> ControlVector {
        blend(rule, prediction, self.blend_weight)
    }

    pub fn blend_weight(&self) -> f32 {
        self.blend_weight
    }

    pub fn status(&self) -> &EnrichmentStatus {
        &self.status
    }

    pub fn is_available(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn context_len(&self) -> usize {
        self.context.len()
    }

    pub fn context(&self) -> Vec<ControlVector> {
        self.context.snapshot()
    }

    /// Clear the context; the predictor is kept
    pub fn reset(&mut self) {
        self.context.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;

    /// Echoes the last context entry mapped to [−1, 1]
    struct Echo;

    impl SequencePredictor for Echo {
        fn predict(&self, context: &[ControlVector]) -> AgentResult<[f32; 4]> {
            let last = context.last().ok_or_else(|| AgentError::inference("empty"))?;
            Ok(last.to_array().map(|v| 2.0 * v - 1.0))
        }
    }

    struct Broken;

    impl SequencePredictor for Broken {
        fn predict(&self, _: &[ControlVector]) -> AgentResult<[f32; 4]> {
            Err(AgentError::inference("broken"))
        }
    }

    fn memory() -> SequenceMemory {
        SequenceMemory::new(&MemoryConfig::default()).unwrap()
    }

    #[test]
    fn test_no_predictor_no_prediction() {
        let mut m = memory();
        m.add_context(ControlVector::splat(0.3));
        assert!(m.predict_response().is_none());
        assert_eq!(m.status(), &EnrichmentStatus::Disabled);
    }

    #[test]
    fn test_empty_context_no_prediction() {
        let m = memory().with_predictor(Echo);
        assert!(m.predict_response().is_none());
    }

    #[test]
    fn test_prediction_rescaled() {
        let mut m = memory().with_predictor(Echo);
        m.add_context(ControlVector::new(0.0, 0.25, 0.5, 1.0));
        let p = m.predict_response().unwrap();
        assert!((p.control_1 - 0.0).abs() < 1e-6);
        assert!((p.control_2 - 0.25).abs() < 1e-6);
        assert!((p.control_4 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_failure_degrades() {
        let mut m = memory().with_predictor(Broken);
        m.add_context(ControlVector::default());
        assert!(m.predict_response().is_none());
    }

    #[test]
    fn test_context_bounded() {
        let mut m = memory();
        for i in 0..25 {
            m.add_context(ControlVector::splat(i as f32 / 25.0));
        }
        assert_eq!(m.context_len(), 10);
        assert_eq!(m.context()[0], ControlVector::splat(15.0 / 25.0));
        m.reset();
        assert_eq!(m.context_len(), 0);
    }

    #[test]
    fn test_blend() {
        let rule = ControlVector::splat(0.0);
        let pred = ControlVector::splat(1.0);
        assert_eq!(blend(&rule, None, 0.2), rule);
        let mixed = blend(&rule, Some(&pred), 0.2);
        assert!((mixed.control_3 - 0.2).abs() < 1e-6);
        assert_eq!(blend(&rule, Some(&pred), 1.0), pred);
    }

    #[test]
    fn test_oversized_context_rejected() {
        let config = MemoryConfig {
            context_length: bj_core::MAX_BUFFER_LEN + 1,
            ..MemoryConfig::default()
        };
        assert!(SequenceMemory::new(&config).is_err());
    }

    #[test]
    fn test_missing_model_path() {
        let config = MemoryConfig {
            model_path: Some("/nonexistent/dialogue.json".into()),
            ..MemoryConfig::default()
        };
        let m = SequenceMemory::new(&config).unwrap();
        assert!(!m.is_available());
        assert!(matches!(m.status(), EnrichmentStatus::Failed { .. }));
    }
}
