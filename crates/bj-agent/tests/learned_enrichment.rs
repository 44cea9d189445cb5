//! Learned Enrichment Tests
//!
//! Verifies:
//! - Out-of-bound residual deltas never break the response contract
//! - JSON weight files load from disk and switch enrichment on
//! - Broken weight files disable enrichment without failing construction
//! - Sequence memory + blend over a loaded GRU

use bj_agent::{
    AgentError, AgentResult, EnrichmentStatus, HybridAgent, MlpResidual, Personalizer,
    ResidualDelta, ResidualModel, SequenceMemory, ZeroJitter,
};
use approx::assert_abs_diff_eq;
use bj_core::{AgentConfig, ControlVector, MemoryConfig, TEMPO_MAX, TEMPO_MIN};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

/// Returns a fixed, deliberately oversized delta
struct Wild(ResidualDelta);

impl ResidualModel for Wild {
    fn delta(&self, _: &ControlVector) -> AgentResult<ResidualDelta> {
        Ok(self.0)
    }
}

fn write_json(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{value}").unwrap();
    file.flush().unwrap();
    file
}

fn mlp_json(output_bias: [f32; 4]) -> serde_json::Value {
    json!({
        "hidden": { "weight": vec![vec![0.1f32; 4]; 8], "bias": vec![0.0f32; 8] },
        "output": { "weight": vec![vec![0.0f32; 8]; 4], "bias": output_bias },
    })
}

fn gru_json(output_bias: [f32; 4]) -> serde_json::Value {
    let layer = |in_dim: usize| {
        json!({
            "weight_ih": vec![vec![0.05f32; in_dim]; 48],
            "weight_hh": vec![vec![0.0f32; 16]; 48],
            "bias_ih": vec![0.0f32; 48],
            "bias_hh": vec![0.0f32; 48],
        })
    };
    json!({
        "layers": [layer(4), layer(16)],
        "output": { "weight": vec![vec![0.0f32; 16]; 4], "bias": output_bias },
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// SAFETY CLAMP
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_oversized_positive_deltas_are_clamped() {
    let wild = Wild(ResidualDelta::from_array([50.0, 50.0, 50.0, 500.0]));
    let mut agent = HybridAgent::new(&AgentConfig::default())
        .unwrap()
        .with_jitter(Box::new(ZeroJitter))
        .with_personalizer(Personalizer::learned(wild));

    for intensity in [0.0, 0.5, 1.0] {
        let r = agent.respond(&ControlVector::splat(intensity));
        assert!(r.is_bounded(), "unbounded {r:?}");
        assert_eq!(r.note_density, 1.0);
        assert_eq!(r.tempo_suggestion, TEMPO_MAX);
    }
}

#[test]
fn test_oversized_negative_deltas_are_clamped() {
    let wild = Wild(ResidualDelta::from_array([-50.0, -50.0, -50.0, -500.0]));
    let mut agent = HybridAgent::new(&AgentConfig::default())
        .unwrap()
        .with_personalizer(Personalizer::learned(wild));

    let r = agent.respond(&ControlVector::splat(0.9));
    assert!(r.is_bounded());
    assert_eq!(r.fill_probability, 0.0);
    assert_eq!(r.tempo_suggestion, TEMPO_MIN);
}

#[test]
fn test_failing_backend_falls_back_to_rules() {
    struct Failing;
    impl ResidualModel for Failing {
        fn delta(&self, _: &ControlVector) -> AgentResult<ResidualDelta> {
            Err(AgentError::inference("device lost"))
        }
    }

    let controls = ControlVector::new(0.4, 0.6, 0.3, 0.9);
    let mut rules_only = HybridAgent::new(&AgentConfig::default())
        .unwrap()
        .with_jitter(Box::new(ZeroJitter));
    let mut failing = HybridAgent::new(&AgentConfig::default())
        .unwrap()
        .with_jitter(Box::new(ZeroJitter))
        .with_personalizer(Personalizer::learned(Failing));

    for _ in 0..10 {
        assert_eq!(rules_only.respond(&controls), failing.respond(&controls));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WEIGHT FILES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_residual_model_from_file() {
    let file = write_json(&mlp_json([0.0, 0.0, 0.0, 100.0]));
    let config = AgentConfig {
        seed: Some(4),
        residual_model: Some(file.path().display().to_string()),
        ..AgentConfig::default()
    };
    let mut agent = HybridAgent::new(&config).unwrap().with_jitter(Box::new(ZeroJitter));
    assert!(agent.personalization().is_active());

    // Responsive at neutral input: 80 + 50·0.5 = 105, tempo delta +0.1·20
    let r = agent.respond(&ControlVector::default());
    assert_eq!(r.tempo_suggestion, 107);
    assert!(matches!(agent.snapshot().personalization, EnrichmentStatus::Loaded { .. }));
}

#[test]
fn test_truncated_file_disables_personalization() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{\"hidden\": {{\"weight\": [[0.0").unwrap();
    file.flush().unwrap();

    let (personalizer, status) = Personalizer::from_path(file.path());
    assert!(!personalizer.is_learned());
    assert!(matches!(status, EnrichmentStatus::Failed { .. }));
    assert!(matches!(MlpResidual::load(file.path()), Err(AgentError::Json(_))));
}

#[test]
fn test_gru_memory_from_file() {
    let file = write_json(&gru_json([2.0, -2.0, 0.0, 0.0]));
    let config = MemoryConfig {
        model_path: Some(file.path().display().to_string()),
        ..MemoryConfig::default()
    };
    let mut memory = SequenceMemory::new(&config).unwrap();
    assert!(memory.is_available());
    assert!(memory.predict_response().is_none());

    for _ in 0..15 {
        memory.add_context(ControlVector::splat(0.7));
    }
    assert_eq!(memory.context_len(), 10);

    let prediction = memory.predict_response().unwrap();
    // Zero head weights → output = tanh(bias) rescaled to [0, 1]
    assert_abs_diff_eq!(prediction.control_1, (2.0f32.tanh() + 1.0) / 2.0, epsilon = 1e-6);
    assert_abs_diff_eq!(prediction.control_2, ((-2.0f32).tanh() + 1.0) / 2.0, epsilon = 1e-6);
    assert_abs_diff_eq!(prediction.control_3, 0.5, epsilon = 1e-6);

    let rule = ControlVector::splat(0.5);
    let blended = memory.blend(&rule, Some(&prediction));
    let expected = 0.8 * 0.5 + 0.2 * prediction.control_1;
    assert_abs_diff_eq!(blended.control_1, expected, epsilon = 1e-6);
    assert_eq!(memory.blend(&rule, None), rule);
}
