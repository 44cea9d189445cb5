//! bj-session: Real-time orchestration for BrainJam
//!
//! Ties the pipeline crates together behind one owner:
//!
//! - **PerformanceSession**: inference, agent and sequence memory, single writer
//! - **SharedSession**: mutex-serialized handle for multi-threaded callers
//! - **FrameQueue**: lock-free SPSC queue from an acquisition thread
//! - **DeadlineWatchdog**: counts calls over the latency budget
//! - **InteractionLogger**: per-step latency and render-control stability
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bj_session::{FrameQueue, PerformanceSession};
//! use bj_core::{ControlVector, SessionConfig};
//!
//! let mut session = PerformanceSession::new(SessionConfig::default())?;
//! let (mut tx, mut rx) = FrameQueue::channel(64);
//!
//! // Acquisition thread pushes FramePackets into `tx`
//! let style = session.drain_frames(&mut rx)?;
//! let out = session.step(&ControlVector::splat(0.6));
//! renderer.generate(0.1, &out.render_controls);
//! ```

mod logger;
mod queue;
mod session;
mod shared;
mod watchdog;

pub use logger::*;
pub use queue::*;
pub use session::*;
pub use shared::*;
pub use watchdog::*;
