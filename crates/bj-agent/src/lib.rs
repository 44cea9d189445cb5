//! # bj-agent: Adaptive co-performer
//!
//! Turns a performer's control vector into a bounded response vector.
//!
//! ## Architecture
//!
//! - **BehavioralStateMachine**: bounded memory + EMA → calm / active / responsive
//! - **ResponsePolicy**: per-state rules with injectable jitter
//! - **Personalizer**: optional learned residual behind a failure boundary
//! - **HybridAgent**: `respond` = rules → residual → hard clamp
//! - **SequenceMemory**: optional GRU prediction of the next control vector
//! - **TemporalSmoother**: input smoothing (EMA / moving average / median)
//!
//! ## Safety
//!
//! Every response is clamped to its documented range after the learned path
//! runs. A missing or failing model only disables the enrichment; it never
//! fails `respond` or `predict_response`.

pub mod agent;
pub mod backend;
pub mod error;
pub mod gru;
pub mod jitter;
pub mod memory;
mod nn;
pub mod policy;
pub mod residual;
pub mod smoother;
pub mod state;

pub use agent::*;
pub use backend::*;
pub use error::*;
pub use gru::*;
pub use jitter::*;
pub use memory::*;
pub use nn::LinearWeights;
pub use policy::*;
pub use residual::*;
pub use smoother::*;
pub use state::*;
