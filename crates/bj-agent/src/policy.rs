//! Rule-based response policy
//!
//! One rule set per behavioral state. Jitter comes from an injected
//! [`JitterSource`] so runs are reproducible under a fixed seed.
//!
//! | state      | note_density           | harmonic_tension         | tempo (BPM)   | fill_probability |
//! |------------|------------------------|--------------------------|---------------|------------------|
//! | calm       | 0.2 ± 0.1 in [0.1,0.3] | 0.2 + 0.2·c3             | 60 + 20·ema_i | 0.1 + 0.1·ema_d  |
//! | active     | 0.8 ± 0.1 in [0.7,0.9] | 0.5 + 0.3·c3             | 100 + 40·ema_i| 0.6 + 0.3·ema_d  |
//! | responsive | ema_d ± 0.2            | c3 ± 0.15                | 80 + 50·ema_i | 0.8·c4           |

use crate::jitter::{JitterSource, RngJitter};
use bj_core::{BehavioralState, ControlVector, ResponseVector, clamp_unit, tempo_from_f32};

/// Per-state rule generator with an injectable jitter source
pub struct ResponsePolicy {
    jitter: Box<dyn JitterSource>,
}

impl std::fmt::Debug for ResponsePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponsePolicy").finish_non_exhaustive()
    }
}

impl ResponsePolicy {
    pub fn new(jitter: Box<dyn JitterSource>) -> Self {
        Self { jitter }
    }

    /// ChaCha8 jitter with an optional seed
    pub fn with_seed(seed: Option<u64>) -> Self {
        Self::new(Box::new(RngJitter::new(seed)))
    }

    /// Swap the jitter source
    pub fn set_jitter(&mut self, jitter: Box<dyn JitterSource>) {
        self.jitter = jitter;
    }

    /// Restart the jitter sequence (seeded sources only)
    pub fn reseed(&mut self) {
        self.jitter.reseed();
    }

    /// Rule-based response for `state`
    pub fn respond(
        &mut self,
        state: BehavioralState,
        controls: &ControlVector,
        ema_intensity: f32,
        ema_density: f32,
    ) -> ResponseVector {
        match state {
            BehavioralState::Calm => ResponseVector {
                note_density: (0.2 + self.jitter.uniform(-0.1, 0.1)).clamp(0.1, 0.3),
                harmonic_tension: clamp_unit(0.2 + 0.2 * controls.tension()),
                tempo_suggestion: tempo_from_f32(60.0 + 20.0 * ema_intensity),
                fill_probability: clamp_unit(0.1 + 0.1 * ema_density),
            },
            BehavioralState::Active => ResponseVector {
                note_density: (0.8 + self.jitter.uniform(-0.1, 0.1)).clamp(0.7, 0.9),
                harmonic_tension: clamp_unit(0.5 + 0.3 * controls.tension()),
                tempo_suggestion: tempo_from_f32(100.0 + 40.0 * ema_intensity),
                fill_probability: clamp_unit(0.6 + 0.3 * ema_density),
            },
            BehavioralState::Responsive => {
                // Mirror recent density, modulate the performer's tension
                let note_density = clamp_unit(ema_density + self.jitter.uniform(-0.2, 0.2));
                let harmonic_tension =
                    clamp_unit(controls.tension() + self.jitter.uniform(-0.15, 0.15));
                ResponseVector {
                    note_density,
                    harmonic_tension,
                    tempo_suggestion: tempo_from_f32(80.0 + 50.0 * ema_intensity),
                    fill_probability: clamp_unit(0.8 * controls.variation()),
                }
            }
        }
    }
}

impl Default for ResponsePolicy {
    fn default() -> Self {
        Self::with_seed(None)
    }
}
