//! bj-features: Biosignal → style vector inference
//!
//! Streams synchronized EEG, fNIRS and EMG frames into bounded per-channel
//! windows and turns them into renderer-facing parameters:
//!
//! - **SignalFrame**: validated interleaved multi-channel block
//! - **BandPowerAnalyzer**: FFT band power (delta/theta/alpha/beta)
//! - **FeatureExtractor**: arousal, cognitive load, effort
//! - **StyleMapper**: temperature softmax + tempo trigger
//! - **BioSignalInference**: the full per-frame pipeline with latency stats
//!
//! ## Real-Time Notes
//!
//! FFT plans and scratch vectors are reused between frames. Only a change of
//! window length (during warm-up) triggers a new plan.

pub mod extractor;
pub mod frame;
pub mod inference;
pub mod projection;
pub mod spectral;
pub mod style;

pub use extractor::*;
pub use frame::*;
pub use inference::*;
pub use projection::*;
pub use spectral::*;
pub use style::*;
