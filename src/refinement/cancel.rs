//! Two-tier cooperative cancellation shared between a refinement run and
//! the thread that controls it.
//!
//! - `stop`: end the run and keep the best solution found so far.
//! - `kill`: abandon the run and restore the starting solution.
//!
//! Flags are polled once per objective evaluation; kill wins over stop.
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::optimization::errors::{OptError, OptResult};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    stop: Arc<AtomicBool>,
    kill: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn kill(&self) {
        self.kill.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub fn is_killed(&self) -> bool {
        self.kill.load(Ordering::Acquire)
    }

    /// Clear both flags so the token can drive another run.
    pub fn reset(&self) {
        self.stop.store(false, Ordering::Release);
        self.kill.store(false, Ordering::Release);
    }

    /// `Err(Killed)` / `Err(Stopped)` when a flag is raised.
    pub fn check(&self) -> OptResult<()> {
        if self.is_killed() {
            Err(OptError::Killed)
        } else if self.is_stopped() {
            Err(OptError::Stopped)
        } else {
            Ok(())
        }
    }
}
