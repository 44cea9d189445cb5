//! Band power estimation
//!
//! Per-channel real FFT over the buffered window, |X_k|² power per bin,
//! averaged across channels. Bin k sits at k · fs / n. Plans are cached by
//! the realfft planner, so the window growing during warm-up only costs a
//! plan lookup once per new length.

use bj_core::{BandConfig, FrequencyBand, RingBuffer};
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Mean spectral power per EEG band
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandPowers {
    pub delta: f32,
    pub theta: f32,
    pub alpha: f32,
    pub beta: f32,
}

impl BandPowers {
    /// High-band over low-band ratio used for arousal (epsilon-guarded)
    pub fn beta_alpha_ratio(&self) -> f32 {
        (self.beta as f64 / (self.alpha as f64 + bj_core::EPSILON)) as f32
    }
}

/// Channel-averaged power spectrum analyzer
pub struct BandPowerAnalyzer {
    planner: RealFftPlanner<f32>,
    fft: Option<Arc<dyn RealToComplex<f32>>>,
    sample_rate: f32,
    /// FFT input scratch (realfft uses it as workspace)
    input: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    /// Mean power per bin across channels
    power: Vec<f32>,
    /// Window length of the last analysis
    len: usize,
}

impl std::fmt::Debug for BandPowerAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BandPowerAnalyzer")
            .field("sample_rate", &self.sample_rate)
            .field("len", &self.len)
            .finish()
    }
}

impl BandPowerAnalyzer {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            planner: RealFftPlanner::new(),
            fft: None,
            sample_rate,
            input: Vec::new(),
            spectrum: Vec::new(),
            power: Vec::new(),
            len: 0,
        }
    }

    fn prepare(&mut self, len: usize) {
        if self.len == len && self.fft.is_some() {
            return;
        }
        let fft = self.planner.plan_fft_forward(len);
        self.input = fft.make_input_vec();
        self.spectrum = fft.make_output_vec();
        self.power = vec![0.0; self.spectrum.len()];
        self.fft = Some(fft);
        self.len = len;
    }

    /// Compute the channel-averaged power spectrum of equally long buffers
    ///
    /// Returns the number of bins, 0 when the window is too short to analyze.
    pub fn analyze(&mut self, channels: &[RingBuffer<f32>]) -> usize {
        let len = channels.first().map(|c| c.len()).unwrap_or(0);
        if len < 2 || channels.iter().any(|c| c.len() != len) {
            self.power.iter_mut().for_each(|p| *p = 0.0);
            return 0;
        }
        self.prepare(len);

        let Some(fft) = self.fft.as_ref() else {
            return 0;
        };

        self.power.iter_mut().for_each(|p| *p = 0.0);
        let mut analyzed = 0usize;
        for channel in channels {
            for (dst, &src) in self.input.iter_mut().zip(channel.iter()) {
                *dst = src;
            }
            if fft.process(&mut self.input, &mut self.spectrum).is_err() {
                // Length mismatch cannot happen after prepare(); skip the channel if it does
                continue;
            }
            for (p, c) in self.power.iter_mut().zip(self.spectrum.iter()) {
                *p += c.norm_sqr();
            }
            analyzed += 1;
        }

        if analyzed == 0 {
            return 0;
        }
        let scale = 1.0 / analyzed as f32;
        self.power.iter_mut().for_each(|p| *p *= scale);
        self.power.len()
    }

    /// Frequency of bin `k` for the last analyzed window
    #[inline]
    pub fn bin_frequency(&self, k: usize) -> f32 {
        if self.len == 0 {
            return 0.0;
        }
        k as f32 * self.sample_rate / self.len as f32
    }

    /// Mean power of bins inside `band` (inclusive), 0 when no bin falls in it
    pub fn band_power(&self, band: FrequencyBand) -> f32 {
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for (k, &p) in self.power.iter().enumerate() {
            if band.contains(self.bin_frequency(k)) {
                sum += p as f64;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            (sum / count as f64) as f32
        }
    }

    /// All four configured bands from the last analysis
    pub fn band_powers(&self, bands: &BandConfig) -> BandPowers {
        BandPowers {
            delta: self.band_power(bands.delta),
            theta: self.band_power(bands.theta),
            alpha: self.band_power(bands.alpha),
            beta: self.band_power(bands.beta),
        }
    }

    /// Channel-averaged power per bin from the last analysis
    pub fn power_spectrum(&self) -> &[f32] {
        &self.power
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_buffer(freq: f32, amp: f32, n: usize, fs: f32) -> RingBuffer<f32> {
        let mut buf = RingBuffer::new(n);
        for i in 0..n {
            buf.push(amp * (2.0 * PI * freq * i as f32 / fs).sin());
        }
        buf
    }

    #[test]
    fn test_bin_frequency() {
        let mut analyzer = BandPowerAnalyzer::new(250.0);
        let bins = analyzer.analyze(&[sine_buffer(10.0, 1.0, 500, 250.0)]);
        assert_eq!(bins, 251);
        assert!((analyzer.bin_frequency(20) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_alpha_sine_lands_in_alpha() {
        let bands = BandConfig::default();
        let mut analyzer = BandPowerAnalyzer::new(250.0);
        analyzer.analyze(&[sine_buffer(10.0, 1.0, 500, 250.0)]);
        let powers = analyzer.band_powers(&bands);
        assert!(powers.alpha > 100.0 * powers.beta.max(1e-6));
        assert!(powers.beta_alpha_ratio() < 0.01);
    }

    #[test]
    fn test_channel_average() {
        let mut analyzer = BandPowerAnalyzer::new(250.0);
        let loud = sine_buffer(20.0, 2.0, 500, 250.0);
        let silent = sine_buffer(20.0, 0.0, 500, 250.0);
        analyzer.analyze(&[loud.clone()]);
        let single = analyzer.band_power(FrequencyBand::new(13.0, 30.0));
        analyzer.analyze(&[loud, silent]);
        let averaged = analyzer.band_power(FrequencyBand::new(13.0, 30.0));
        assert!((averaged - single / 2.0).abs() <= single * 1e-4);
    }

    #[test]
    fn test_short_window() {
        let mut analyzer = BandPowerAnalyzer::new(250.0);
        let mut buf = RingBuffer::new(4);
        buf.push(1.0);
        assert_eq!(analyzer.analyze(&[buf]), 0);
        assert_eq!(analyzer.band_power(FrequencyBand::new(8.0, 13.0)), 0.0);
    }

    #[test]
    fn test_empty_band() {
        let mut analyzer = BandPowerAnalyzer::new(250.0);
        analyzer.analyze(&[sine_buffer(10.0, 1.0, 500, 250.0)]);
        // Above Nyquist
        assert_eq!(analyzer.band_power(FrequencyBand::new(200.0, 300.0)), 0.0);
    }
}
