//! Shared request counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// A lock-free, monotonically increasing request counter.
///
/// Build one at startup and hand an `Arc<RequestCounter>` to whatever needs
/// it. Only [`increment`](Self::increment) mutates it, so the value never
/// goes down.
#[derive(Debug, Default)]
pub struct RequestCounter {
    served: AtomicU64,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self { served: AtomicU64::new(0) }
    }

    /// Adds one. Safe to call from any number of tasks at once.
    pub fn increment(&self) {
        // No other memory is published through the counter.
        self.served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read(&self) -> u64 {
        self.served.load(Ordering::Relaxed)
    }
}
