//! Mutex-serialized session handle
//!
//! The pipeline components are not internally synchronized. `SharedSession`
//! serializes every call through one `parking_lot::Mutex`, so concurrent
//! callers see the same results as sequential ones in lock order.

use crate::session::{PerformanceSession, SessionOutput, SessionReport};
use bj_core::{BjResult, ControlVector, ResponseVector, StyleVector};
use bj_features::SignalFrame;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Cloneable, thread-safe handle to one [`PerformanceSession`]
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<PerformanceSession>>,
}

impl SharedSession {
    pub fn new(session: PerformanceSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn process_frame(
        &self,
        eeg: &SignalFrame,
        fnirs: &SignalFrame,
        emg: &SignalFrame,
    ) -> BjResult<StyleVector> {
        self.inner.lock().process_frame(eeg, fnirs, emg)
    }

    pub fn respond(&self, controls: &ControlVector) -> ResponseVector {
        self.inner.lock().respond(controls)
    }

    pub fn step(&self, controls: &ControlVector) -> SessionOutput {
        self.inner.lock().step(controls)
    }

    pub fn report(&self) -> SessionReport {
        self.inner.lock().report()
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Run several operations under one lock
    pub fn with<R>(&self, f: impl FnOnce(&mut PerformanceSession) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Direct guard access
    pub fn lock(&self) -> MutexGuard<'_, PerformanceSession> {
        self.inner.lock()
    }
}
