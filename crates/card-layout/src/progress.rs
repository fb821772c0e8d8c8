//! Progress reporting and cooperative cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancel flag.
///
/// Clones observe the same flag, so a UI or signal handler can keep one
/// while a worker runs the layout with another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

/// Marker returned when a search stops because the flag was set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Clear the flag so the next run can proceed
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    /// `Err(Cancelled)` once the flag is set
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Receives per-card progress from a layout run
pub trait ProgressSink {
    fn progress(&self, current: usize, max: usize);

    fn status(&self, message: &str);
}

/// Discards all progress
impl ProgressSink for () {
    fn progress(&self, _current: usize, _max: usize) {}

    fn status(&self, _message: &str) {}
}
