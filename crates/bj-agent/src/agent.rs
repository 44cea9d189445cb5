//! Hybrid adaptive co-performer
//!
//! `respond` runs, in order: memory update and EMA, state classification,
//! per-state rules, optional learned residual, final hard clamp. The clamp is
//! unconditional so a learned component can nudge the response but never
//! push it outside its contract.

use crate::backend::EnrichmentStatus;
use crate::jitter::JitterSource;
use crate::policy::ResponsePolicy;
use crate::residual::Personalizer;
use crate::state::BehavioralStateMachine;
use bj_core::{AgentConfig, BehavioralState, BjResult, ControlVector, ResponseVector};
use serde::{Deserialize, Serialize};

/// Read-only view of the agent for visualization and logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub state: BehavioralState,
    pub ema_intensity: f32,
    pub ema_density: f32,
    pub buffer_len: usize,
    pub personalization: EnrichmentStatus,
}

/// Rule-based co-performer with optional learned personalization
#[derive(Debug)]
pub struct HybridAgent {
    machine: BehavioralStateMachine,
    policy: ResponsePolicy,
    personalizer: Personalizer,
    status: EnrichmentStatus,
}

impl HybridAgent {
    /// Build from config; a configured residual model that fails to load only
    /// disables personalization (see [`HybridAgent::personalization`]).
    pub fn new(config: &AgentConfig) -> BjResult<Self> {
        let machine = BehavioralStateMachine::new(config)?;
        let (personalizer, status) = Personalizer::from_config(config.residual_model.as_deref());
        log::info!(
            "HybridAgent: memory {} vectors, ema_alpha {}, personalization {status}",
            machine.buffer_capacity(),
            config.ema_alpha
        );
        Ok(Self {
            machine,
            policy: ResponsePolicy::with_seed(config.seed),
            personalizer,
            status,
        })
    }

    /// Replace the jitter source (e.g. a seeded or zero source in tests)
    pub fn with_jitter(mut self, jitter: Box<dyn JitterSource>) -> Self {
        self.policy.set_jitter(jitter);
        self
    }

    /// Swap the jitter source in place
    pub fn set_jitter(&mut self, jitter: Box<dyn JitterSource>) {
        self.policy.set_jitter(jitter);
    }

    /// Install a personalizer explicitly
    pub fn with_personalizer(mut self, personalizer: Personalizer) -> Self {
        self.status = if personalizer.is_learned() {
            EnrichmentStatus::Loaded {
                source: "injected".into(),
            }
        } else {
            EnrichmentStatus::Disabled
        };
        self.personalizer = personalizer;
        self
    }

    /// Produce the co-performer response to one control vector
    pub fn respond(&mut self, controls: &ControlVector) -> ResponseVector {
        let controls = controls.normalized();
        let state = self.machine.update(&controls);

        let rules = self.policy.respond(
            state,
            &controls,
            self.machine.ema_intensity(),
            self.machine.ema_density(),
        );
        let adjusted = self.personalizer.apply(&controls, rules);

        adjusted.clamped()
    }

    pub fn state(&self) -> BehavioralState {
        self.machine.state()
    }

    pub fn machine(&self) -> &BehavioralStateMachine {
        &self.machine
    }

    pub fn personalization(&self) -> &EnrichmentStatus {
        &self.status
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            state: self.machine.state(),
            ema_intensity: self.machine.ema_intensity(),
            ema_density: self.machine.ema_density(),
            buffer_len: self.machine.buffer_len(),
            personalization: self.status.clone(),
        }
    }

    pub fn recent_intensity(&self) -> Vec<f32> {
        self.machine.recent_intensity()
    }

    pub fn recent_density(&self) -> Vec<f32> {
        self.machine.recent_density()
    }

    pub fn recent_tension(&self) -> Vec<f32> {
        self.machine.recent_tension()
    }

    pub fn recent_variation(&self) -> Vec<f32> {
        self.machine.recent_variation()
    }

    /// Clear memory and EMAs; a seeded jitter source restarts its sequence
    pub fn reset(&mut self) {
        self.machine.reset();
        self.policy.reseed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::ZeroJitter;

    fn agent() -> HybridAgent {
        HybridAgent::new(&AgentConfig::default())
            .unwrap()
            .with_jitter(Box::new(ZeroJitter))
    }

    #[test]
    fn test_fresh_snapshot() {
        let snap = agent().snapshot();
        assert_eq!(snap.state, BehavioralState::Responsive);
        assert_eq!(snap.buffer_len, 0);
        assert_eq!(snap.personalization, EnrichmentStatus::Disabled);
    }

    #[test]
    fn test_out_of_range_input_normalized() {
        let mut a = agent();
        let r = a.respond(&ControlVector {
            control_1: 5.0,
            control_2: -3.0,
            control_3: f32::NAN,
            control_4: 2.0,
        });
        assert!(r.is_bounded());
        assert_eq!(a.recent_intensity(), vec![1.0]);
        assert_eq!(a.recent_density(), vec![0.0]);
    }

    #[test]
    fn test_missing_model_is_not_fatal() {
        let config = AgentConfig {
            residual_model: Some("/nonexistent/residual.json".into()),
            ..AgentConfig::default()
        };
        let a = HybridAgent::new(&config).unwrap();
        assert!(matches!(a.personalization(), EnrichmentStatus::Failed { .. }));
    }

    #[test]
    fn test_invalid_alpha_fails_fast() {
        let config = AgentConfig {
            ema_alpha: 1.5,
            ..AgentConfig::default()
        };
        assert!(HybridAgent::new(&config).is_err());
    }

    #[test]
    fn test_oversized_memory_fails_fast() {
        let config = AgentConfig {
            buffer_duration: 1e30,
            ..AgentConfig::default()
        };
        assert!(HybridAgent::new(&config).is_err());
    }
}
