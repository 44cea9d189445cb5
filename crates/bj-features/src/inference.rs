//! Biosignal inference engine
//!
//! Front door of the feature stage: validates incoming frames against the
//! configured channel layout, appends them to the streaming windows, extracts
//! features, maps them to a style vector and records how long it all took.
//!
//! All state is owned; `process_frame` takes `&mut self`, so only one writer
//! can ever drive an instance.

use crate::extractor::{BioFeatures, FeatureExtractor};
use crate::frame::SignalFrame;
use crate::projection::LatentProjection;
use crate::spectral::BandPowers;
use crate::style::{StyleMapper, StyleMapping};
use bj_core::{BjError, BjResult, InferenceConfig, LatencyMonitor, LatencyStats, StyleVector};
use std::time::Instant;

/// Real-time biosignal → style vector processor
#[derive(Debug)]
pub struct BioSignalInference {
    config: InferenceConfig,
    extractor: FeatureExtractor,
    mapper: StyleMapper,
    projection: LatentProjection,
    latency: LatencyMonitor,
    last_features: BioFeatures,
    triggered: bool,
}

impl BioSignalInference {
    /// Create a processor. Fails fast on an invalid configuration.
    pub fn new(config: InferenceConfig) -> BjResult<Self> {
        config.validate()?;
        log::info!(
            "BioSignalInference: {}+{}+{} channels @ {} Hz, window {} rows",
            config.eeg_channels,
            config.fnirs_channels,
            config.emg_channels,
            config.sample_rate,
            config.buffer_capacity()
        );
        Ok(Self {
            extractor: FeatureExtractor::new(&config),
            mapper: StyleMapper::new(config.softmax_temperature, config.trigger.clone()),
            projection: LatentProjection::identity(),
            latency: LatencyMonitor::new(config.latency_window),
            last_features: BioFeatures::default(),
            triggered: false,
            config,
        })
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    fn check_channels(
        modality: &'static str,
        frame: &SignalFrame,
        expected: usize,
    ) -> BjResult<()> {
        if frame.channels() != expected {
            return Err(BjError::ChannelMismatch {
                modality,
                expected,
                got: frame.channels(),
            });
        }
        Ok(())
    }

    /// Process one synchronized frame per modality
    ///
    /// Empty frames are allowed and leave their window unchanged.
    pub fn process_frame(
        &mut self,
        eeg: &SignalFrame,
        fnirs: &SignalFrame,
        emg: &SignalFrame,
    ) -> BjResult<StyleVector> {
        let start = Instant::now();

        Self::check_channels("eeg", eeg, self.config.eeg_channels)?;
        Self::check_channels("fnirs", fnirs, self.config.fnirs_channels)?;
        Self::check_channels("emg", emg, self.config.emg_channels)?;

        self.extractor.push(eeg, fnirs, emg);
        let features = self.extractor.features();
        let StyleMapping { style, triggered } = self.mapper.map(&features);

        if triggered != self.triggered {
            if triggered {
                log::debug!(
                    "Tempo trigger on (arousal {:.3}, effort {:.3}) → {} BPM",
                    features.arousal,
                    features.effort,
                    self.config.trigger.triggered_bpm
                );
            } else {
                log::debug!("Tempo trigger off");
            }
        }
        self.triggered = triggered;
        self.last_features = features;

        self.latency.record(start.elapsed());
        Ok(style)
    }

    /// Convenience wrapper over row slices (n × C per modality)
    pub fn process_rows(
        &mut self,
        eeg: &[Vec<f32>],
        fnirs: &[Vec<f32>],
        emg: &[Vec<f32>],
    ) -> BjResult<StyleVector> {
        let eeg = SignalFrame::from_rows_with_channels(eeg, self.config.eeg_channels)?;
        let fnirs = SignalFrame::from_rows_with_channels(fnirs, self.config.fnirs_channels)?;
        let emg = SignalFrame::from_rows_with_channels(emg, self.config.emg_channels)?;
        self.process_frame(&eeg, &fnirs, &emg)
    }

    /// Whether the last frame fired the tempo trigger
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Tempo renderers should switch to while triggered
    pub fn triggered_bpm(&self) -> u32 {
        self.config.trigger.triggered_bpm
    }

    /// Diagnostic features of the last frame
    pub fn last_features(&self) -> BioFeatures {
        self.last_features
    }

    /// Band powers of the current EEG window (`None` during warm-up)
    pub fn band_powers(&mut self) -> Option<BandPowers> {
        self.extractor.band_powers()
    }

    /// Processing-time statistics over the recent window
    pub fn performance_stats(&self) -> LatencyStats {
        self.latency.stats()
    }

    /// Install a latent alignment matrix (rows × 3)
    pub fn set_projection(&mut self, weights: Vec<f32>, rows: usize) -> BjResult<()> {
        self.projection.set(weights, rows, 3)
    }

    /// Project the last diagnostic triple through the alignment hook
    pub fn align_features(&self) -> BjResult<Vec<f32>> {
        self.projection.align(&self.last_features.to_array())
    }

    /// Clear signal windows and trigger state. Latency history is kept.
    pub fn reset_buffers(&mut self) {
        self.extractor.reset();
        self.last_features = BioFeatures::default();
        self.triggered = false;
    }

    /// Full reset including latency history
    pub fn reset(&mut self) {
        self.reset_buffers();
        self.latency.clear();
    }
}
