//! Service readiness.
//!
//! The process is either `Starting` or `Ready`. The server flips it exactly
//! once, right before it starts accepting connections; handlers read it on
//! every health request. There is no way back to `Starting`: a process that
//! can no longer serve terminates and is restarted by its supervisor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lifecycle state reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Not yet answering health probes with success
    Starting,
    /// Accepting and answering requests
    Ready,
}

/// Shared, cloneable readiness flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    /// A new flag in the `Starting` state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ServiceState {
        if self.0.load(Ordering::Acquire) {
            ServiceState::Ready
        } else {
            ServiceState::Starting
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ServiceState::Ready
    }

    /// Transition `Starting -> Ready`.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// service was already ready.
    pub fn mark_ready(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}
