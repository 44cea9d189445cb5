//! Control, style and response vectors
//!
//! Each vector is a plain struct with named fields. Values are normalized once
//! at the boundary (`new`, `normalized`, deserialization defaults) so the hot
//! path never has to look up keys or guess defaults.

use crate::math::clamp_unit;
use crate::{NEUTRAL, TEMPO_MAX, TEMPO_MIN};
use serde::{Deserialize, Serialize};
use std::fmt;

fn neutral() -> f32 {
    NEUTRAL
}

// ============ Control Vector ============

/// Four-dimensional performer input, every value in [0, 1]
///
/// Semantic names: control_1 = intensity, control_2 = density,
/// control_3 = tension, control_4 = variation. Absent keys default to 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlVector {
    #[serde(default = "neutral", alias = "intensity")]
    pub control_1: f32,
    #[serde(default = "neutral", alias = "density")]
    pub control_2: f32,
    #[serde(default = "neutral", alias = "tension")]
    pub control_3: f32,
    #[serde(default = "neutral", alias = "variation")]
    pub control_4: f32,
}

impl Default for ControlVector {
    fn default() -> Self {
        Self::splat(NEUTRAL)
    }
}

impl ControlVector {
    /// Create a normalized control vector (clamped, NaN → 0.5)
    pub fn new(control_1: f32, control_2: f32, control_3: f32, control_4: f32) -> Self {
        Self {
            control_1,
            control_2,
            control_3,
            control_4,
        }
        .normalized()
    }

    /// Same value in every slot
    pub fn splat(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Neutral vector with only intensity set
    pub fn with_intensity(intensity: f32) -> Self {
        Self {
            control_1: clamp_unit(intensity),
            ..Self::default()
        }
    }

    pub fn from_array(values: [f32; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.control_1, self.control_2, self.control_3, self.control_4]
    }

    /// Clamp every field into [0, 1]
    pub fn normalized(self) -> Self {
        Self {
            control_1: clamp_unit(self.control_1),
            control_2: clamp_unit(self.control_2),
            control_3: clamp_unit(self.control_3),
            control_4: clamp_unit(self.control_4),
        }
    }

    #[inline]
    pub fn intensity(&self) -> f32 {
        self.control_1
    }

    #[inline]
    pub fn density(&self) -> f32 {
        self.control_2
    }

    #[inline]
    pub fn tension(&self) -> f32 {
        self.control_3
    }

    #[inline]
    pub fn variation(&self) -> f32 {
        self.control_4
    }

    /// True when every field lies in [0, 1]
    pub fn is_bounded(&self) -> bool {
        self.to_array().iter().all(|v| (0.0..=1.0).contains(v))
    }
}

// ============ Style Vector ============

/// Output of biosignal feature extraction
///
/// The first four fields are renderer-facing; arousal, cognitive_load and
/// effort are diagnostic. All values lie in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleVector {
    pub tempo_density: f32,
    pub harmonic_tension: f32,
    pub spectral_brightness: f32,
    pub noise_balance: f32,
    pub arousal: f32,
    pub cognitive_load: f32,
    pub effort: f32,
}

impl Default for StyleVector {
    fn default() -> Self {
        Self {
            tempo_density: NEUTRAL,
            harmonic_tension: NEUTRAL,
            spectral_brightness: NEUTRAL,
            noise_balance: NEUTRAL,
            arousal: NEUTRAL,
            cognitive_load: NEUTRAL,
            effort: NEUTRAL,
        }
    }
}

impl StyleVector {
    /// Renderer-facing parameters in control order
    pub fn renderer_params(&self) -> [f32; 4] {
        [
            self.tempo_density,
            self.harmonic_tension,
            self.spectral_brightness,
            self.noise_balance,
        ]
    }

    /// Renderer-facing parameters as a control vector
    pub fn as_controls(&self) -> ControlVector {
        ControlVector::from_array(self.renderer_params())
    }

    pub fn is_bounded(&self) -> bool {
        [
            self.tempo_density,
            self.harmonic_tension,
            self.spectral_brightness,
            self.noise_balance,
            self.arousal,
            self.cognitive_load,
            self.effort,
        ]
        .iter()
        .all(|v| (0.0..=1.0).contains(v))
    }
}

// ============ Response Vector ============

/// Bounded co-performer output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseVector {
    /// How many notes to play [0, 1]
    pub note_density: f32,
    /// Dissonance level [0, 1]
    pub harmonic_tension: f32,
    /// Suggested tempo, BPM in [60, 140]
    pub tempo_suggestion: u32,
    /// Chance of rhythmic fills [0, 1]
    pub fill_probability: f32,
}

impl ResponseVector {
    /// Apply the hard output contract to every field
    pub fn clamped(self) -> Self {
        Self {
            note_density: clamp_unit(self.note_density),
            harmonic_tension: clamp_unit(self.harmonic_tension),
            tempo_suggestion: self.tempo_suggestion.clamp(TEMPO_MIN, TEMPO_MAX),
            fill_probability: clamp_unit(self.fill_probability),
        }
    }

    pub fn is_bounded(&self) -> bool {
        (0.0..=1.0).contains(&self.note_density)
            && (0.0..=1.0).contains(&self.harmonic_tension)
            && (TEMPO_MIN..=TEMPO_MAX).contains(&self.tempo_suggestion)
            && (0.0..=1.0).contains(&self.fill_probability)
    }

    /// Render-facing controls: {note_density, harmonic_tension, note_density, fill_probability}
    pub fn as_controls(&self) -> ControlVector {
        ControlVector::new(
            self.note_density,
            self.harmonic_tension,
            self.note_density,
            self.fill_probability,
        )
    }
}

/// Truncate a tempo estimate to an integer BPM inside the allowed range
pub fn tempo_from_f32(bpm: f32) -> u32 {
    if bpm.is_nan() {
        return TEMPO_MIN;
    }
    bpm.clamp(TEMPO_MIN as f32, TEMPO_MAX as f32) as u32
}

// ============ Behavioral State ============

/// Co-performer behavior class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BehavioralState {
    /// Low intensity → sparse, consonant response
    Calm,
    /// High intensity → dense response with moderate tension
    Active,
    /// Mirrors the performer's recent patterns
    #[default]
    Responsive,
}

impl BehavioralState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BehavioralState::Calm => "calm",
            BehavioralState::Active => "active",
            BehavioralState::Responsive => "responsive",
        }
    }
}

impl fmt::Display for BehavioralState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_defaults_from_json() {
        let cv: ControlVector = serde_json::from_str(r#"{"control_1": 0.9}"#).unwrap();
        assert_eq!(cv.control_1, 0.9);
        assert_eq!(cv.control_2, 0.5);
        assert_eq!(cv.control_4, 0.5);
    }

    #[test]
    fn test_control_semantic_aliases() {
        let cv: ControlVector =
            serde_json::from_str(r#"{"intensity": 0.2, "variation": 0.7}"#).unwrap();
        assert_eq!(cv.intensity(), 0.2);
        assert_eq!(cv.variation(), 0.7);
        assert_eq!(cv.density(), 0.5);
    }

    #[test]
    fn test_control_normalization() {
        let cv = ControlVector::new(1.5, -0.2, f32::NAN, 0.3);
        assert_eq!(cv.to_array(), [1.0, 0.0, 0.5, 0.3]);
        assert!(cv.is_bounded());
    }

    #[test]
    fn test_response_clamp() {
        let r = ResponseVector {
            note_density: 1.4,
            harmonic_tension: -0.3,
            tempo_suggestion: 220,
            fill_probability: f32::NAN,
        }
        .clamped();
        assert!(r.is_bounded());
        assert_eq!(r.tempo_suggestion, 140);
    }

    #[test]
    fn test_tempo_truncation() {
        assert_eq!(tempo_from_f32(69.9), 69);
        assert_eq!(tempo_from_f32(10.0), 60);
        assert_eq!(tempo_from_f32(500.0), 140);
        assert_eq!(tempo_from_f32(f32::NAN), 60);
    }

    #[test]
    fn test_state_serde_names() {
        let json = serde_json::to_string(&BehavioralState::Calm).unwrap();
        assert_eq!(json, "\"calm\"");
        assert_eq!(BehavioralState::default(), BehavioralState::Responsive);
        assert_eq!(BehavioralState::Active.to_string(), "active");
    }
}
