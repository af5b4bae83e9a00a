//! Periodic, non-synchronized snapshots of engine activity.
//!
//! Each field is read from its own atomic independently — the snapshot is
//! not a single consistent point-in-time view across fields, only per
//! field. That's a deliberate trade for a telemetry path that never
//! contends with the transfer hot path.

use std::sync::atomic::Ordering;

use serde::Serialize;

use crate::counters::Counters;
use crate::ledger::Ledger;
use crate::queue::JobQueue;
use crate::worker_pool::WorkerPool;

#[derive(Debug, Clone, Serialize)]
pub struct TelemetrySnapshot {
    pub worker_pool_size: usize,
    pub active_worker_count: usize,
    pub processed_count: u64,
    pub failed_count: u64,
    pub in_flight_count: u64,
    pub queue_capacity: u64,
    pub runtime_thread_count: usize,
    /// Per-shard activity probe; `None` unless explicitly requested since it
    /// visits every shard instead of reading a handful of atomics.
    pub shard_activity: Option<Vec<bool>>,
}

pub fn snapshot(
    ledger: &Ledger,
    queue: &JobQueue,
    counters: &Counters,
    workers: &WorkerPool,
    probe_shards: bool,
) -> TelemetrySnapshot {
    TelemetrySnapshot {
        worker_pool_size: workers.worker_pool_size(),
        active_worker_count: workers.active_worker_count(),
        processed_count: counters.processed.load(Ordering::Relaxed),
        failed_count: counters.failed.load(Ordering::Relaxed),
        in_flight_count: queue.in_flight(),
        queue_capacity: queue.capacity(),
        runtime_thread_count: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
        shard_activity: if probe_shards {
            Some(probe_shard_activity(ledger))
        } else {
            None
        },
    }
}

/// Non-blocking per-shard probe: a shard whose writer lock can't be taken
/// immediately is reported active. Any lock it does obtain is released on
/// the spot.
fn probe_shard_activity(ledger: &Ledger) -> Vec<bool> {
    (0..ledger.shard_count())
        .map(|idx| ledger.shard(idx).try_write().is_none())
        .collect()
}
