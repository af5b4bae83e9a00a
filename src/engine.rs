//! The owned aggregate wiring every component together.
//!
//! A single constructible, testable value replacing the process-wide
//! globals of the design this was distilled from: one `Engine` owns the
//! ledger, the job queue, the worker pool, and the commit/telemetry buses,
//! and nothing reaches them except through it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tracing::info;

use crate::broadcast::{Broadcaster, Subscription};
use crate::commit_bus::CommitBus;
use crate::config::LedgerConfig;
use crate::counters::Counters;
use crate::error::{LedgerError, SubmitOutcome};
use crate::ledger::Ledger;
use crate::queue::JobQueue;
use crate::submission;
use crate::telemetry::{self, TelemetrySnapshot};
use crate::transaction::Transaction;
use crate::types::Balance;
use crate::worker_pool::WorkerPool;

pub struct Engine {
    config: LedgerConfig,
    ledger: Arc<Ledger>,
    queue: Arc<JobQueue>,
    counters: Arc<Counters>,
    bus: Arc<CommitBus>,
    workers: WorkerPool,
    telemetry: Arc<Broadcaster<TelemetrySnapshot>>,
    tickers_running: Arc<AtomicBool>,
    ticker_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Engine {
    pub fn new(config: LedgerConfig) -> Result<Arc<Self>, LedgerError> {
        config.validate()?;

        let ledger = Arc::new(Ledger::new(
            config.shard_count,
            config.account_count,
            config.initial_balance,
        ));
        let queue = Arc::new(JobQueue::new(config.max_queue_size));
        let counters = Arc::new(Counters::new());
        let bus = Arc::new(CommitBus::new(config.subscriber_buffer_depth, config.commit_batch_threshold));
        let workers = WorkerPool::new(
            ledger.clone(),
            queue.clone(),
            counters.clone(),
            bus.clone(),
            config.worker_micro_pause(),
            config.resolved_worker_count(),
        );
        let telemetry = Arc::new(Broadcaster::new(config.subscriber_buffer_depth));

        let engine = Arc::new(Self {
            config,
            ledger,
            queue,
            counters,
            bus,
            workers,
            telemetry,
            tickers_running: Arc::new(AtomicBool::new(true)),
            ticker_handles: Mutex::new(Vec::new()),
        });

        engine.spawn_commit_ticker();
        engine.spawn_telemetry_ticker();

        info!(
            workers = engine.workers.worker_pool_size(),
            shards = engine.ledger.shard_count(),
            "engine started"
        );
        Ok(engine)
    }

    fn spawn_commit_ticker(self: &Arc<Self>) {
        let bus = self.bus.clone();
        let running = self.tickers_running.clone();
        let interval = self.config.commit_batch_interval();
        let handle = std::thread::Builder::new()
            .name("ledger-commit-ticker".into())
            .spawn(move || {
                while running.load(Ordering::Relaxed) {
                    std::thread::sleep(interval);
                    bus.flush_tick();
                }
            })
            .expect("failed to spawn commit ticker thread");
        self.ticker_handles.lock().push(handle);
    }

    fn spawn_telemetry_ticker(self: &Arc<Self>) {
        let engine = self.clone();
        let running = self.tickers_running.clone();
        let interval = self.config.telemetry_interval();
        let handle = std::thread::Builder::new()
            .name("ledger-telemetry-ticker".into())
            .spawn(move || {
                while running.load(Ordering::Relaxed) {
                    std::thread::sleep(interval);
                    let snap = engine.snapshot();
                    engine.telemetry.publish(snap);
                }
            })
            .expect("failed to spawn telemetry ticker thread");
        self.ticker_handles.lock().push(handle);
    }

    pub fn submit(self: &Arc<Self>, count: u64, submitter: Option<String>) -> SubmitOutcome {
        submission::submit(self, count, submitter)
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        telemetry::snapshot(&self.ledger, &self.queue, &self.counters, &self.workers, false)
    }

    pub fn snapshot_with_shard_probe(&self) -> TelemetrySnapshot {
        telemetry::snapshot(&self.ledger, &self.queue, &self.counters, &self.workers, true)
    }

    pub fn subscribe_commits(&self) -> Subscription<Vec<Transaction>> {
        self.bus.subscribe()
    }

    pub fn subscribe_telemetry(self: &Arc<Self>) -> Subscription<TelemetrySnapshot> {
        self.telemetry.subscribe()
    }

    /// Resets every balance to the configured initial value and zeroes the
    /// counters. Does not drain the queue or wait for in-flight work first —
    /// callers that need a quiescent reset are responsible for that.
    pub fn reset(&self) {
        self.ledger.reset(self.config.initial_balance);
        self.counters.reset();
        self.queue.reset_in_flight();
    }

    pub fn total_balance(&self) -> Balance {
        self.ledger.total_balance()
    }

    pub fn grow_workers(&self, n: usize) {
        self.workers.grow(n);
    }

    pub fn shrink_workers(&self, n: usize) {
        self.workers.shrink(n);
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Refreshes a metrics registry from the current snapshot and renders it
    /// in Prometheus text exposition format.
    pub fn metrics_text(&self, metrics: &crate::metrics::Metrics) -> Result<String, prometheus::Error> {
        metrics.observe(&self.snapshot());
        metrics.gather()
    }

    /// Stops both ticker threads, closes the queue, and joins every worker.
    /// Workers finish draining whatever is already buffered before exiting.
    pub fn shutdown(&self) {
        self.tickers_running.store(false, Ordering::Relaxed);
        self.queue.close();
        self.workers.shutdown();
        for handle in self.ticker_handles.lock().drain(..) {
            let _ = handle.join();
        }
        info!("engine shut down");
    }

    pub(crate) fn queue(&self) -> &JobQueue {
        &self.queue
    }

    pub(crate) fn account_count(&self) -> u32 {
        self.config.account_count
    }

    pub(crate) fn transfer_amount(&self) -> Balance {
        self.config.transfer_amount
    }

    pub(crate) fn next_tx_id(&self) -> crate::types::TxId {
        self.counters.next_tx_id.fetch_add(1, Ordering::Relaxed)
    }
}
