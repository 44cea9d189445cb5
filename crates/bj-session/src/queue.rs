//! Acquisition → session frame queue
//!
//! Lock-free SPSC channel (rtrb) for an acquisition thread that produces
//! synchronized frames while the session thread consumes them. The session
//! side stays the single writer of all pipeline state.

use bj_core::{BjResult, InferenceConfig};
use bj_features::SignalFrame;
use rtrb::{Consumer, Producer, RingBuffer};
use serde::{Deserialize, Serialize};

/// One synchronized block per modality
#[derive(Debug, Clone, PartialEq)]
pub struct FramePacket {
    pub eeg: SignalFrame,
    pub fnirs: SignalFrame,
    pub emg: SignalFrame,
}

/// Recorded frame as stored in replay files (rows × channels per modality)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub eeg: Vec<Vec<f32>>,
    #[serde(default)]
    pub fnirs: Vec<Vec<f32>>,
    #[serde(default)]
    pub emg: Vec<Vec<f32>>,
}

impl RecordedFrame {
    /// Validate against the configured channel layout
    pub fn to_packet(&self, config: &InferenceConfig) -> BjResult<FramePacket> {
        Ok(FramePacket {
            eeg: SignalFrame::from_rows_with_channels(&self.eeg, config.eeg_channels)?,
            fnirs: SignalFrame::from_rows_with_channels(&self.fnirs, config.fnirs_channels)?,
            emg: SignalFrame::from_rows_with_channels(&self.emg, config.emg_channels)?,
        })
    }
}

/// Producer half, owned by the acquisition thread
pub type FrameProducer = Producer<FramePacket>;

/// Consumer half, drained by the session
pub type FrameConsumer = Consumer<FramePacket>;

/// Default queue depth (frames)
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Frame channel factory
pub struct FrameQueue;

impl FrameQueue {
    /// Create a bounded producer/consumer pair
    pub fn channel(capacity: usize) -> (FrameProducer, FrameConsumer) {
        RingBuffer::new(capacity.max(1))
    }
}
