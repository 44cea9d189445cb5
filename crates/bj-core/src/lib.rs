//! bj-core: Shared types, buffers and configuration for BrainJam
//!
//! Everything the real-time control pipeline passes between stages lives here:
//!
//! - **RingBuffer**: fixed-capacity, drop-oldest streaming buffer
//! - **ControlVector / StyleVector / ResponseVector**: bounded parameter sets
//! - **BehavioralState**: calm / active / responsive
//! - **LatencyMonitor**: bounded processing-time statistics
//! - **Config**: serde configuration with validated defaults
//!
//! No component in this workspace is internally thread-safe. Hot-path methods
//! take `&mut self`, so a single writer is enforced by ownership.

mod config;
mod control;
mod error;
mod latency;
mod math;
mod ring_buffer;

pub use config::*;
pub use control::*;
pub use error::*;
pub use latency::*;
pub use math::*;
pub use ring_buffer::*;

/// Neutral value returned by any feature that has not warmed up yet
pub const NEUTRAL: f32 = 0.5;

/// Lowest tempo the agent may suggest (BPM)
pub const TEMPO_MIN: u32 = 60;

/// Highest tempo the agent may suggest (BPM)
pub const TEMPO_MAX: u32 = 140;
