//! Feature → style vector mapping
//!
//! The diagnostic triple (arousal, cognitive_load, effort) is jointly
//! normalized with a temperature softmax scaled by 3 and clamped, then mixed
//! into the four renderer-facing parameters:
//!
//! | parameter           | source                              |
//! |---------------------|-------------------------------------|
//! | tempo_density       | 0.6 · arousal' + 0.4 · effort'      |
//! | harmonic_tension    | cognitive_load'                     |
//! | spectral_brightness | arousal'                            |
//! | noise_balance       | effort'                             |
//!
//! When raw arousal and raw effort both exceed their thresholds the tempo
//! trigger fires and tempo_density is forced to exactly 1.0. The other three
//! parameters keep their computed values.

use crate::extractor::BioFeatures;
use bj_core::{StyleVector, TriggerConfig, clamp_unit, scaled_softmax};

/// Style vector plus whether the tempo trigger fired
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleMapping {
    pub style: StyleVector,
    pub triggered: bool,
}

/// Maps diagnostic features into a bounded style vector
#[derive(Debug, Clone)]
pub struct StyleMapper {
    temperature: f32,
    trigger: TriggerConfig,
}

impl StyleMapper {
    pub fn new(temperature: f32, trigger: TriggerConfig) -> Self {
        Self {
            temperature,
            trigger,
        }
    }

    pub fn trigger(&self) -> &TriggerConfig {
        &self.trigger
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// True when both thresholds are strictly exceeded
    #[inline]
    pub fn is_triggered(&self, features: &BioFeatures) -> bool {
        features.arousal > self.trigger.arousal_threshold
            && features.effort > self.trigger.effort_threshold
    }

    pub fn map(&self, features: &BioFeatures) -> StyleMapping {
        let [arousal_n, load_n, effort_n] = scaled_softmax(features.to_array(), self.temperature);

        let triggered = self.is_triggered(features);
        let tempo_density = if triggered {
            1.0
        } else {
            clamp_unit(0.6 * arousal_n + 0.4 * effort_n)
        };

        StyleMapping {
            style: StyleVector {
                tempo_density,
                harmonic_tension: clamp_unit(load_n),
                spectral_brightness: clamp_unit(arousal_n),
                noise_balance: clamp_unit(effort_n),
                arousal: clamp_unit(features.arousal),
                cognitive_load: clamp_unit(features.cognitive_load),
                effort: clamp_unit(features.effort),
            },
            triggered,
        }
    }
}

impl Default for StyleMapper {
    fn default() -> Self {
        Self::new(1.0, TriggerConfig::default())
    }
}
