//! A resizable pool of OS threads draining the job queue.
//!
//! Modeled on the background-scheduler shape: workers read a lightweight
//! atomic flag at each dequeue boundary rather than being torn down from
//! outside mid-transaction, and the pool never mutates a worker's state
//! from any thread but its own.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use crate::commit_bus::CommitBus;
use crate::counters::Counters;
use crate::executor;
use crate::ledger::Ledger;
use crate::queue::JobQueue;

const DEQUEUE_POLL: Duration = Duration::from_millis(50);

struct Worker {
    handle: JoinHandle<()>,
    exit_requested: Arc<AtomicBool>,
}

pub struct WorkerPool {
    ledger: Arc<Ledger>,
    queue: Arc<JobQueue>,
    counters: Arc<Counters>,
    bus: Arc<CommitBus>,
    micro_pause: Duration,
    workers: Mutex<Vec<Worker>>,
    target_size: Arc<AtomicUsize>,
    active_worker_count: Arc<AtomicUsize>,
}

impl WorkerPool {
    pub fn new(
        ledger: Arc<Ledger>,
        queue: Arc<JobQueue>,
        counters: Arc<Counters>,
        bus: Arc<CommitBus>,
        micro_pause: Duration,
        initial_size: usize,
    ) -> Self {
        let pool = Self {
            ledger,
            queue,
            counters,
            bus,
            micro_pause,
            workers: Mutex::new(Vec::new()),
            target_size: Arc::new(AtomicUsize::new(0)),
            active_worker_count: Arc::new(AtomicUsize::new(0)),
        };
        pool.grow(initial_size);
        pool
    }

    pub fn worker_pool_size(&self) -> usize {
        self.target_size.load(Ordering::Relaxed)
    }

    pub fn active_worker_count(&self) -> usize {
        self.active_worker_count.load(Ordering::Relaxed)
    }

    /// Spawns `n` additional worker threads.
    pub fn grow(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut workers = self.workers.lock();
        for _ in 0..n {
            let exit_requested = Arc::new(AtomicBool::new(false));
            let handle = self.spawn_worker(exit_requested.clone());
            workers.push(Worker { handle, exit_requested });
        }
        self.target_size.fetch_add(n, Ordering::Relaxed);
        info!(total = workers.len(), "worker pool grown");
    }

    /// Signals up to `n` workers to exit at their next dequeue boundary.
    /// A worker mid-transaction finishes it first; nothing here interrupts
    /// the executor.
    pub fn shrink(&self, n: usize) {
        let mut workers = self.workers.lock();
        let drop_count = n.min(workers.len());
        for worker in workers.iter().rev().take(drop_count) {
            worker.exit_requested.store(true, Ordering::Relaxed);
        }
        self.target_size.fetch_sub(drop_count, Ordering::Relaxed);
        workers.retain(|w| !w.handle.is_finished());
        info!(remaining = self.target_size.load(Ordering::Relaxed), "worker pool shrunk");
    }

    /// Joins every worker thread. Callers must close the queue first, or
    /// workers with nothing left to drain will never observe an exit
    /// condition.
    pub fn shutdown(&self) {
        let mut workers = self.workers.lock();
        for worker in workers.drain(..) {
            worker.exit_requested.store(true, Ordering::Relaxed);
            let _ = worker.handle.join();
        }
        self.target_size.store(0, Ordering::Relaxed);
    }

    fn spawn_worker(&self, exit_requested: Arc<AtomicBool>) -> JoinHandle<()> {
        let ledger = self.ledger.clone();
        let queue = self.queue.clone();
        let counters = self.counters.clone();
        let bus = self.bus.clone();
        let micro_pause = self.micro_pause;
        let active_worker_count = self.active_worker_count.clone();

        std::thread::Builder::new()
            .name("ledger-worker".into())
            .spawn(move || {
                worker_loop(ledger, queue, counters, bus, micro_pause, active_worker_count, exit_requested);
            })
            .expect("failed to spawn ledger worker thread")
    }
}

fn worker_loop(
    ledger: Arc<Ledger>,
    queue: Arc<JobQueue>,
    counters: Arc<Counters>,
    bus: Arc<CommitBus>,
    micro_pause: Duration,
    active_worker_count: Arc<AtomicUsize>,
    exit_requested: Arc<AtomicBool>,
) {
    loop {
        match queue.dequeue_timeout(DEQUEUE_POLL) {
            Some(tx) => {
                active_worker_count.fetch_add(1, Ordering::Relaxed);
                executor::execute(&ledger, &counters, &bus, tx);
                queue.release(1);
                active_worker_count.fetch_sub(1, Ordering::Relaxed);
                std::thread::sleep(micro_pause);
            }
            None => {
                if exit_requested.load(Ordering::Relaxed) || queue.is_closed() {
                    break;
                }
            }
        }
    }
}
