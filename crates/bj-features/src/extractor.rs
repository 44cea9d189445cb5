//! Multi-modal feature extraction
//!
//! Three bounded streaming windows, one per modality, each a set of
//! per-channel ring buffers pushed in lockstep:
//!
//! - **EEG** → arousal: sigmoid(2 · (beta/alpha − 1))
//! - **fNIRS** → cognitive load: (tanh(100 · slope(HbO2)) + 1) / 2
//! - **EMG** → effort: sigmoid(5 · (rms − 0.5))
//!
//! A window shorter than its warm-up threshold yields the neutral 0.5.

use crate::frame::SignalFrame;
use crate::spectral::{BandPowerAnalyzer, BandPowers};
use bj_core::{
    BandConfig, InferenceConfig, NEUTRAL, RingBuffer, clamp_unit, least_squares_slope, rms,
    sigmoid,
};
use serde::{Deserialize, Serialize};

/// The three diagnostic features, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BioFeatures {
    pub arousal: f32,
    pub cognitive_load: f32,
    pub effort: f32,
}

impl Default for BioFeatures {
    fn default() -> Self {
        Self {
            arousal: NEUTRAL,
            cognitive_load: NEUTRAL,
            effort: NEUTRAL,
        }
    }
}

impl BioFeatures {
    pub fn to_array(&self) -> [f32; 3] {
        [self.arousal, self.cognitive_load, self.effort]
    }
}

/// Per-channel ring buffers for one modality
#[derive(Debug, Clone)]
struct ModalityWindow {
    channels: Vec<RingBuffer<f32>>,
    min_samples: usize,
}

impl ModalityWindow {
    fn new(channels: usize, capacity: usize, min_samples: usize) -> Self {
        Self {
            channels: (0..channels).map(|_| RingBuffer::new(capacity)).collect(),
            min_samples,
        }
    }

    fn push_frame(&mut self, frame: &SignalFrame) {
        for row in frame.iter_rows() {
            for (buf, &v) in self.channels.iter_mut().zip(row.iter()) {
                // Non-finite samples would poison every downstream sum
                buf.push(if v.is_finite() { v } else { 0.0 });
            }
        }
    }

    fn rows(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    fn is_warm(&self) -> bool {
        self.rows() >= self.min_samples.max(1)
    }

    fn clear(&mut self) {
        self.channels.iter_mut().for_each(RingBuffer::clear);
    }
}

/// Streaming feature extractor over EEG, fNIRS and EMG windows
#[derive(Debug)]
pub struct FeatureExtractor {
    eeg: ModalityWindow,
    fnirs: ModalityWindow,
    emg: ModalityWindow,
    bands: BandConfig,
    analyzer: BandPowerAnalyzer,
    /// Contiguous copy of the HbO2 channel for the regression
    slope_scratch: Vec<f32>,
    /// Contiguous copy of every EMG sample for RMS
    rms_scratch: Vec<f32>,
}

impl FeatureExtractor {
    /// Create from a validated inference configuration
    pub fn new(config: &InferenceConfig) -> Self {
        let capacity = config.buffer_capacity();
        Self {
            eeg: ModalityWindow::new(config.eeg_channels, capacity, config.min_samples_eeg),
            fnirs: ModalityWindow::new(config.fnirs_channels, capacity, config.min_samples_fnirs),
            emg: ModalityWindow::new(config.emg_channels, capacity, config.min_samples_emg),
            bands: config.bands.clone(),
            analyzer: BandPowerAnalyzer::new(config.sample_rate),
            slope_scratch: Vec::with_capacity(capacity),
            rms_scratch: Vec::with_capacity(capacity.saturating_mul(config.emg_channels)),
        }
    }

    /// Append frames to their windows. Channel counts are checked by the caller.
    pub fn push(&mut self, eeg: &SignalFrame, fnirs: &SignalFrame, emg: &SignalFrame) {
        self.eeg.push_frame(eeg);
        self.fnirs.push_frame(fnirs);
        self.emg.push_frame(emg);
    }

    /// Buffered rows per modality (eeg, fnirs, emg)
    pub fn buffered_rows(&self) -> (usize, usize, usize) {
        (self.eeg.rows(), self.fnirs.rows(), self.emg.rows())
    }

    /// Band powers of the EEG window, `None` during warm-up
    pub fn band_powers(&mut self) -> Option<BandPowers> {
        if !self.eeg.is_warm() {
            return None;
        }
        if self.analyzer.analyze(&self.eeg.channels) == 0 {
            return None;
        }
        Some(self.analyzer.band_powers(&self.bands))
    }

    /// EEG arousal proxy from the beta/alpha ratio
    pub fn arousal(&mut self) -> f32 {
        match self.band_powers() {
            Some(powers) => {
                let ratio = powers.beta_alpha_ratio();
                clamp_unit(sigmoid(2.0 * (ratio - 1.0)))
            }
            None => NEUTRAL,
        }
    }

    /// fNIRS cognitive load proxy from the HbO2 (channel 0) slope
    pub fn cognitive_load(&mut self) -> f32 {
        if !self.fnirs.is_warm() {
            return NEUTRAL;
        }
        let Some(hbo2) = self.fnirs.channels.first() else {
            return NEUTRAL;
        };
        self.slope_scratch.clear();
        self.slope_scratch.extend(hbo2.iter().copied());

        let slope = least_squares_slope(&self.slope_scratch);
        clamp_unit((((slope * 100.0).tanh() + 1.0) / 2.0) as f32)
    }

    /// EMG effort proxy from the RMS of every buffered sample
    pub fn effort(&mut self) -> f32 {
        if !self.emg.is_warm() {
            return NEUTRAL;
        }
        self.rms_scratch.clear();
        for channel in &self.emg.channels {
            self.rms_scratch.extend(channel.iter().copied());
        }
        let value = rms(&self.rms_scratch) as f32;
        clamp_unit(sigmoid(5.0 * (value - 0.5)))
    }

    /// All three features from the current windows
    pub fn features(&mut self) -> BioFeatures {
        BioFeatures {
            arousal: self.arousal(),
            cognitive_load: self.cognitive_load(),
            effort: self.effort(),
        }
    }

    /// Clear every window
    pub fn reset(&mut self) {
        self.eeg.clear();
        self.fnirs.clear();
        self.emg.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> InferenceConfig {
        InferenceConfig::default()
    }

    fn constant_frame(rows: usize, channels: usize, value: f32) -> SignalFrame {
        SignalFrame::new(vec![value; rows * channels], channels).unwrap()
    }

    #[test]
    fn test_warmup_is_neutral() {
        let mut fx = FeatureExtractor::new(&config());
        fx.push(
            &constant_frame(10, 8, 1.0),
            &constant_frame(10, 2, 1.0),
            &constant_frame(10, 1, 1.0),
        );
        assert_eq!(fx.features(), BioFeatures::default());
        assert!(fx.band_powers().is_none());
    }

    #[test]
    fn test_effort_from_rms() {
        let mut fx = FeatureExtractor::new(&config());
        fx.push(
            &SignalFrame::empty(8),
            &SignalFrame::empty(2),
            &constant_frame(60, 1, 0.8),
        );
        // sigmoid(5 * 0.3) = 0.8176
        assert!((fx.effort() - 0.8176).abs() < 1e-3);
        assert_eq!(fx.arousal(), NEUTRAL);
    }

    #[test]
    fn test_rising_hbo2_raises_load() {
        let mut fx = FeatureExtractor::new(&config());
        let rows: Vec<Vec<f32>> = (0..100).map(|i| vec![i as f32 * 0.01, 0.0]).collect();
        fx.push(
            &SignalFrame::empty(8),
            &SignalFrame::from_rows(&rows).unwrap(),
            &SignalFrame::empty(1),
        );
        assert!(fx.cognitive_load() > 0.7);
    }

    #[test]
    fn test_flat_hbo2_is_centered() {
        let mut fx = FeatureExtractor::new(&config());
        fx.push(
            &SignalFrame::empty(8),
            &constant_frame(80, 2, 3.0),
            &SignalFrame::empty(1),
        );
        assert!((fx.cognitive_load() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_nonfinite_samples_zeroed() {
        let mut fx = FeatureExtractor::new(&config());
        let mut data = vec![0.0; 60];
        data[3] = f32::NAN;
        data[7] = f32::INFINITY;
        fx.push(
            &SignalFrame::empty(8),
            &SignalFrame::empty(2),
            &SignalFrame::mono(data),
        );
        let effort = fx.effort();
        assert!(effort.is_finite());
        assert!(effort < 0.2);
    }

    #[test]
    fn test_window_bounded_and_reset() {
        let mut fx = FeatureExtractor::new(&config());
        for _ in 0..20 {
            fx.push(
                &constant_frame(50, 8, 0.1),
                &constant_frame(50, 2, 0.1),
                &constant_frame(50, 1, 0.1),
            );
        }
        assert_eq!(fx.buffered_rows(), (500, 500, 500));
        fx.reset();
        assert_eq!(fx.buffered_rows(), (0, 0, 0));
    }
}
