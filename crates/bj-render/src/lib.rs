//! bj-render: Renderer smoothing contract
//!
//! The seam between the control pipeline and any synthesis recipe. A recipe
//! implements [`Voice`]; [`ContractRenderer`] guarantees that whatever the
//! control or style vector does, the audio stays in [−1, 1], parameters move
//! smoothly and chunk edges are click-free when concatenated.

pub mod renderer;
pub mod smoothing;

pub use renderer::*;
pub use smoothing::*;
