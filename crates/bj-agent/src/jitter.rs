//! Injectable randomness for the response rules
//!
//! The policy never touches a global generator. Production uses a ChaCha8
//! stream seeded from config (or the OS); tests can seed it or swap in
//! [`ZeroJitter`] for exact expectations.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Source of uniform jitter terms
pub trait JitterSource: Send {
    /// Uniform sample in `[low, high)`
    fn uniform(&mut self, low: f32, high: f32) -> f32;

    /// Restart the sequence, if the source supports it
    fn reseed(&mut self) {}
}

/// Seedable ChaCha8 jitter
#[derive(Debug, Clone)]
pub struct RngJitter {
    rng: ChaCha8Rng,
    seed: Option<u64>,
}

impl RngJitter {
    /// Create with optional seed (`None` draws entropy from the OS)
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self { rng, seed }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl JitterSource for RngJitter {
    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        if !(low.is_finite() && high.is_finite()) || low >= high {
            return low;
        }
        self.rng.random_range(low..high)
    }

    fn reseed(&mut self) {
        if let Some(s) = self.seed {
            self.rng = ChaCha8Rng::seed_from_u64(s);
        }
    }
}

/// Always returns the midpoint of the range (zero for symmetric ranges)
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroJitter;

impl JitterSource for ZeroJitter {
    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        0.5 * (low + high)
    }
}
