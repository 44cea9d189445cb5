//! Behavioral state machine
//!
//! Short-term memory of the performer (one bounded buffer per control) plus
//! two exponential moving averages. The state is re-derived from the EMA on
//! every update:
//!
//! ```text
//! ema_intensity < 0.3  → calm
//! ema_intensity > 0.7  → active
//! otherwise            → responsive
//! ```
//!
//! There is no hysteresis band; the EMA already smooths the input.

use bj_core::{AgentConfig, BehavioralState, BjResult, ControlVector, NEUTRAL, RingBuffer};

/// Below this EMA intensity the agent is calm
pub const CALM_THRESHOLD: f32 = 0.3;

/// Above this EMA intensity the agent is active
pub const ACTIVE_THRESHOLD: f32 = 0.7;

/// EMA-driven classifier over performer control vectors
#[derive(Debug, Clone)]
pub struct BehavioralStateMachine {
    intensity: RingBuffer<f32>,
    density: RingBuffer<f32>,
    tension: RingBuffer<f32>,
    variation: RingBuffer<f32>,
    ema_alpha: f32,
    ema_intensity: f32,
    ema_density: f32,
    state: BehavioralState,
}

impl BehavioralStateMachine {
    pub fn new(config: &AgentConfig) -> BjResult<Self> {
        config.validate()?;
        let capacity = config.buffer_capacity();
        Ok(Self {
            intensity: RingBuffer::new(capacity),
            density: RingBuffer::new(capacity),
            tension: RingBuffer::new(capacity),
            variation: RingBuffer::new(capacity),
            ema_alpha: config.ema_alpha,
            ema_intensity: NEUTRAL,
            ema_density: NEUTRAL,
            state: BehavioralState::Responsive,
        })
    }

    /// Classify an EMA intensity
    #[inline]
    pub fn classify(ema_intensity: f32) -> BehavioralState {
        if ema_intensity < CALM_THRESHOLD {
            BehavioralState::Calm
        } else if ema_intensity > ACTIVE_THRESHOLD {
            BehavioralState::Active
        } else {
            BehavioralState::Responsive
        }
    }

    /// Record a control vector, update both EMAs and reclassify
    pub fn update(&mut self, controls: &ControlVector) -> BehavioralState {
        self.intensity.push(controls.intensity());
        self.density.push(controls.density());
        self.tension.push(controls.tension());
        self.variation.push(controls.variation());

        let a = self.ema_alpha;
        self.ema_intensity = a * controls.intensity() + (1.0 - a) * self.ema_intensity;
        self.ema_density = a * controls.density() + (1.0 - a) * self.ema_density;

        let next = Self::classify(self.ema_intensity);
        if next != self.state {
            log::debug!(
                "Agent state {} → {} (ema_intensity {:.3})",
                self.state,
                next,
                self.ema_intensity
            );
        }
        self.state = next;
        next
    }

    pub fn state(&self) -> BehavioralState {
        self.state
    }

    pub fn ema_intensity(&self) -> f32 {
        self.ema_intensity
    }

    pub fn ema_density(&self) -> f32 {
        self.ema_density
    }

    pub fn ema_alpha(&self) -> f32 {
        self.ema_alpha
    }

    /// Number of control vectors currently remembered
    pub fn buffer_len(&self) -> usize {
        self.intensity.len()
    }

    pub fn buffer_capacity(&self) -> usize {
        self.intensity.capacity()
    }

    pub fn recent_intensity(&self) -> Vec<f32> {
        self.intensity.snapshot()
    }

    pub fn recent_density(&self) -> Vec<f32> {
        self.density.snapshot()
    }

    pub fn recent_tension(&self) -> Vec<f32> {
        self.tension.snapshot()
    }

    pub fn recent_variation(&self) -> Vec<f32> {
        self.variation.snapshot()
    }

    /// Back to responsive with neutral EMAs and empty buffers
    pub fn reset(&mut self) {
        self.intensity.clear();
        self.density.clear();
        self.tension.clear();
        self.variation.clear();
        self.ema_intensity = NEUTRAL;
        self.ema_density = NEUTRAL;
        self.state = BehavioralState::Responsive;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> BehavioralStateMachine {
        BehavioralStateMachine::new(&AgentConfig::default()).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let sm = machine();
        assert_eq!(sm.state(), BehavioralState::Responsive);
        assert_eq!(sm.ema_intensity(), 0.5);
        assert_eq!(sm.ema_density(), 0.5);
        assert_eq!(sm.buffer_capacity(), 100);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(BehavioralStateMachine::classify(0.29), BehavioralState::Calm);
        assert_eq!(BehavioralStateMachine::classify(0.3), BehavioralState::Responsive);
        assert_eq!(BehavioralStateMachine::classify(0.7), BehavioralState::Responsive);
        assert_eq!(BehavioralStateMachine::classify(0.71), BehavioralState::Active);
    }

    #[test]
    fn test_single_update_ema() {
        let mut sm = machine();
        sm.update(&ControlVector::new(1.0, 0.0, 0.5, 0.5));
        // 0.3 * 1.0 + 0.7 * 0.5
        assert!((sm.ema_intensity() - 0.65).abs() < 1e-6);
        assert!((sm.ema_density() - 0.35).abs() < 1e-6);
        assert_eq!(sm.state(), BehavioralState::Responsive);
    }

    #[test]
    fn test_buffers_bounded() {
        let config = AgentConfig {
            buffer_duration: 1.0,
            sample_rate: 5.0,
            ..AgentConfig::default()
        };
        let mut sm = BehavioralStateMachine::new(&config).unwrap();
        for i in 0..12 {
            sm.update(&ControlVector::splat(i as f32 / 20.0));
        }
        assert_eq!(sm.buffer_len(), 5);
        assert_eq!(sm.recent_intensity(), vec![0.35, 0.4, 0.45, 0.5, 0.55]);
    }

    #[test]
    fn test_reset() {
        let mut sm = machine();
        for _ in 0..30 {
            sm.update(&ControlVector::splat(0.05));
        }
        assert_eq!(sm.state(), BehavioralState::Calm);
        sm.reset();
        assert_eq!(sm.state(), BehavioralState::Responsive);
        assert_eq!(sm.buffer_len(), 0);
        assert_eq!(sm.ema_intensity(), 0.5);
    }
}
