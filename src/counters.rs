//! Process-wide atomic counters for transaction accounting.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Counters {
    pub next_tx_id: AtomicU64,
    pub processed: AtomicU64,
    pub failed: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.next_tx_id.store(0, Ordering::Relaxed);
        self.processed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }
}
