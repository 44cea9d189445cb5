//! Configuration
//!
//! Plain serde structs. Every field has a default so a partial JSON document
//! is always a valid configuration; `validate()` catches values that would
//! make a component meaningless and is called by every constructor.

use crate::error::{BjError, BjResult};
use crate::latency::DEFAULT_LATENCY_WINDOW;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Longest ring buffer any config may request (rows, vectors or measurements)
pub const MAX_BUFFER_LEN: usize = 1 << 20;

/// Most channels a single modality may declare
pub const MAX_CHANNELS: usize = 256;

/// Reject lengths outside `1..=MAX_BUFFER_LEN`
fn check_len(name: &str, len: usize) -> BjResult<()> {
    if len == 0 {
        return Err(BjError::config(format!("{name} must be at least 1")));
    }
    if len > MAX_BUFFER_LEN {
        return Err(BjError::config(format!(
            "{name} of {len} exceeds the maximum of {MAX_BUFFER_LEN}"
        )));
    }
    Ok(())
}

// ============ Frequency Bands ============

/// Inclusive frequency band in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub low: f32,
    pub high: f32,
}

impl FrequencyBand {
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    #[inline]
    pub fn contains(&self, freq: f32) -> bool {
        freq >= self.low && freq <= self.high
    }

    fn validate(&self, name: &str) -> BjResult<()> {
        if !(self.low >= 0.0 && self.high > self.low) {
            return Err(BjError::config(format!(
                "band {name} must satisfy 0 <= low < high, got {}..{}",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// EEG band layout. Arousal uses the beta/alpha ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandConfig {
    #[serde(default = "default_delta")]
    pub delta: FrequencyBand,
    #[serde(default = "default_theta")]
    pub theta: FrequencyBand,
    /// Low band of the arousal ratio
    #[serde(default = "default_alpha")]
    pub alpha: FrequencyBand,
    /// High band of the arousal ratio
    #[serde(default = "default_beta")]
    pub beta: FrequencyBand,
}

fn default_delta() -> FrequencyBand {
    FrequencyBand::new(0.5, 4.0)
}
fn default_theta() -> FrequencyBand {
    FrequencyBand::new(4.0, 8.0)
}
fn default_alpha() -> FrequencyBand {
    FrequencyBand::new(8.0, 13.0)
}
fn default_beta() -> FrequencyBand {
    FrequencyBand::new(13.0, 30.0)
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            delta: default_delta(),
            theta: default_theta(),
            alpha: default_alpha(),
            beta: default_beta(),
        }
    }
}

impl BandConfig {
    pub fn validate(&self) -> BjResult<()> {
        self.delta.validate("delta")?;
        self.theta.validate("theta")?;
        self.alpha.validate("alpha")?;
        self.beta.validate("beta")
    }
}

// ============ Trigger ============

/// Conditional tempo trigger thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default = "default_arousal_threshold")]
    pub arousal_threshold: f32,
    #[serde(default = "default_effort_threshold")]
    pub effort_threshold: f32,
    /// Tempo renderers should use while the trigger holds. Informational only.
    #[serde(default = "default_triggered_bpm")]
    pub triggered_bpm: u32,
}

fn default_arousal_threshold() -> f32 {
    0.8
}
fn default_effort_threshold() -> f32 {
    0.7
}
fn default_triggered_bpm() -> u32 {
    180
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            arousal_threshold: 0.8,
            effort_threshold: 0.7,
            triggered_bpm: 180,
        }
    }
}

// ============ Inference ============

/// Biosignal feature extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Primary modality (EEG) channel count
    #[serde(default = "default_eeg_channels")]
    pub eeg_channels: usize,
    /// Secondary modality (fNIRS, channel 0 = HbO2) channel count
    #[serde(default = "default_fnirs_channels")]
    pub fnirs_channels: usize,
    /// Tertiary modality (EMG) channel count
    #[serde(default = "default_emg_channels")]
    pub emg_channels: usize,
    /// Shared acquisition sample rate (Hz)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f32,
    /// Rows retained per modality
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Window length in seconds; overrides `buffer_size` when set
    #[serde(default)]
    pub buffer_duration: Option<f32>,
    /// Warm-up thresholds (rows) before a feature leaves 0.5
    #[serde(default = "default_min_eeg")]
    pub min_samples_eeg: usize,
    #[serde(default = "default_min_other")]
    pub min_samples_fnirs: usize,
    #[serde(default = "default_min_other")]
    pub min_samples_emg: usize,
    #[serde(default)]
    pub bands: BandConfig,
    /// Temperature of the joint softmax normalization
    #[serde(default = "default_temperature")]
    pub softmax_temperature: f32,
    #[serde(default)]
    pub trigger: TriggerConfig,
    /// Number of processing-time measurements kept
    #[serde(default = "default_latency_window")]
    pub latency_window: usize,
}

fn default_eeg_channels() -> usize {
    8
}
fn default_fnirs_channels() -> usize {
    2
}
fn default_emg_channels() -> usize {
    1
}
fn default_sample_rate() -> f32 {
    250.0
}
fn default_buffer_size() -> usize {
    500
}
fn default_min_eeg() -> usize {
    100
}
fn default_min_other() -> usize {
    50
}
fn default_temperature() -> f32 {
    1.0
}
fn default_latency_window() -> usize {
    DEFAULT_LATENCY_WINDOW
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            eeg_channels: 8,
            fnirs_channels: 2,
            emg_channels: 1,
            sample_rate: 250.0,
            buffer_size: 500,
            buffer_duration: None,
            min_samples_eeg: 100,
            min_samples_fnirs: 50,
            min_samples_emg: 50,
            bands: BandConfig::default(),
            softmax_temperature: 1.0,
            trigger: TriggerConfig::default(),
            latency_window: DEFAULT_LATENCY_WINDOW,
        }
    }
}

impl InferenceConfig {
    /// Rows kept per modality buffer (saturating; `validate` bounds it)
    pub fn buffer_capacity(&self) -> usize {
        match self.buffer_duration {
            Some(seconds) => (seconds * self.sample_rate) as usize,
            None => self.buffer_size,
        }
    }

    pub fn validate(&self) -> BjResult<()> {
        if self.eeg_channels == 0 || self.fnirs_channels == 0 || self.emg_channels == 0 {
            return Err(BjError::config("every modality needs at least one channel"));
        }
        if self.eeg_channels.max(self.fnirs_channels).max(self.emg_channels) > MAX_CHANNELS {
            return Err(BjError::config(format!("at most {MAX_CHANNELS} channels per modality")));
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(BjError::config(format!(
                "sample_rate must be positive, got {}",
                self.sample_rate
            )));
        }
        let capacity = self.buffer_capacity();
        check_len("buffer capacity", capacity)?;
        for (modality, min_samples) in [
            ("eeg", self.min_samples_eeg),
            ("fnirs", self.min_samples_fnirs),
            ("emg", self.min_samples_emg),
        ] {
            if min_samples > capacity {
                return Err(BjError::config(format!(
                    "min_samples_{modality} ({min_samples}) exceeds the buffer capacity \
                     ({capacity} rows); the window could never warm up"
                )));
            }
        }
        if !(self.softmax_temperature.is_finite() && self.softmax_temperature > 0.0) {
            return Err(BjError::config("softmax_temperature must be positive"));
        }
        check_len("latency_window", self.latency_window)?;
        self.bands.validate()
    }
}

// ============ Agent ============

/// Adaptive co-performer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Short-term memory length in seconds
    #[serde(default = "default_buffer_duration")]
    pub buffer_duration: f32,
    /// Control vector rate in Hz
    #[serde(default = "default_control_rate")]
    pub sample_rate: f32,
    /// EMA weight of the newest control value
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f32,
    /// Jitter seed; `None` seeds from the OS
    #[serde(default)]
    pub seed: Option<u64>,
    /// Residual model weights (JSON); absent disables personalization
    #[serde(default)]
    pub residual_model: Option<String>,
}

fn default_buffer_duration() -> f32 {
    10.0
}
fn default_control_rate() -> f32 {
    10.0
}
fn default_ema_alpha() -> f32 {
    0.3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            buffer_duration: 10.0,
            sample_rate: 10.0,
            ema_alpha: 0.3,
            seed: None,
            residual_model: None,
        }
    }
}

impl AgentConfig {
    /// Ring buffer capacity = buffer_duration × sample_rate (saturating)
    pub fn buffer_capacity(&self) -> usize {
        (self.buffer_duration * self.sample_rate) as usize
    }

    pub fn validate(&self) -> BjResult<()> {
        if !(self.ema_alpha > 0.0 && self.ema_alpha < 1.0) {
            return Err(BjError::config(format!(
                "ema_alpha must lie in (0, 1), got {}",
                self.ema_alpha
            )));
        }
        check_len("buffer_duration × sample_rate", self.buffer_capacity())
    }
}

// ============ Sequence Memory ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Number of control vectors kept as context
    #[serde(default = "default_context_length")]
    pub context_length: usize,
    /// Weight of the learned prediction in the blend
    #[serde(default = "default_blend_weight")]
    pub blend_weight: f32,
    /// Dialogue model weights (JSON); absent disables prediction
    #[serde(default)]
    pub model_path: Option<String>,
}

fn default_context_length() -> usize {
    10
}
fn default_blend_weight() -> f32 {
    0.2
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            context_length: 10,
            blend_weight: 0.2,
            model_path: None,
        }
    }
}

impl MemoryConfig {
    pub fn validate(&self) -> BjResult<()> {
        check_len("context_length", self.context_length)?;
        if !(0.0..=1.0).contains(&self.blend_weight) {
            return Err(BjError::config(format!(
                "blend_weight must lie in [0, 1], got {}",
                self.blend_weight
            )));
        }
        Ok(())
    }
}

// ============ Smoothing ============

/// Renderer smoothing contract configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Weight of the previous smoothed value (higher = smoother)
    #[serde(default = "default_smoothing_alpha")]
    pub default_alpha: f32,
    /// Per-parameter overrides by name
    #[serde(default)]
    pub per_parameter: HashMap<String, f32>,
    /// Edge fade applied to both ends of each chunk (ms)
    #[serde(default = "default_fade_ms")]
    pub fade_ms: f32,
    /// Renderer output sample rate (Hz)
    #[serde(default = "default_audio_rate")]
    pub sample_rate: u32,
}

fn default_smoothing_alpha() -> f32 {
    0.95
}
fn default_fade_ms() -> f32 {
    2.0
}
fn default_audio_rate() -> u32 {
    44100
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            default_alpha: 0.95,
            per_parameter: HashMap::new(),
            fade_ms: 2.0,
            sample_rate: 44100,
        }
    }
}

impl SmoothingConfig {
    /// Alpha for a named parameter
    pub fn alpha_for(&self, name: &str) -> f32 {
        self.per_parameter
            .get(name)
            .copied()
            .unwrap_or(self.default_alpha)
    }

    pub fn validate(&self) -> BjResult<()> {
        let check = |name: &str, alpha: f32| {
            if (0.0..1.0).contains(&alpha) {
                Ok(())
            } else {
                Err(BjError::config(format!(
                    "smoothing alpha for {name} must lie in [0, 1), got {alpha}"
                )))
            }
        };
        check("default", self.default_alpha)?;
        for (name, &alpha) in &self.per_parameter {
            check(name, alpha)?;
        }
        if !(self.fade_ms.is_finite() && self.fade_ms >= 0.0) {
            return Err(BjError::config("fade_ms must be non-negative"));
        }
        if self.sample_rate == 0 {
            return Err(BjError::config("renderer sample_rate must be positive"));
        }
        Ok(())
    }
}

// ============ Session ============

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    /// End-to-end latency target per chunk (ms)
    #[serde(default = "default_latency_budget")]
    pub latency_budget_ms: f64,
}

fn default_latency_budget() -> f64 {
    100.0
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            agent: AgentConfig::default(),
            memory: MemoryConfig::default(),
            smoothing: SmoothingConfig::default(),
            latency_budget_ms: 100.0,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> BjResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> BjResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded session config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> BjResult<()> {
        self.inference.validate()?;
        self.agent.validate()?;
        self.memory.validate()?;
        self.smoothing.validate()?;
        if !(self.latency_budget_ms.is_finite() && self.latency_budget_ms > 0.0) {
            return Err(BjError::config("latency_budget_ms must be positive"));
        }
        Ok(())
    }
}
