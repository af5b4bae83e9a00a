//! Bounded MPMC job queue with atomic admission control.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use crate::transaction::Transaction;

/// A bounded channel paired with an admission counter. The counter is
/// reserved *before* anything is enqueued and released only after the
/// executor returns, so it always reflects "admitted but not yet drained" —
/// queued plus currently executing — not merely "sitting in the channel".
pub struct JobQueue {
    sender: Sender<Transaction>,
    receiver: Receiver<Transaction>,
    capacity: u64,
    in_flight: AtomicU64,
    closed: AtomicBool,
}

impl JobQueue {
    pub fn new(capacity: u64) -> Self {
        let (sender, receiver) = bounded(capacity as usize);
        Self {
            sender,
            receiver,
            capacity,
            in_flight: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Atomically reserves capacity for a batch of `n`. Rejects the whole
    /// batch rather than admitting part of it, so a submission is never
    /// half-accepted.
    pub fn admit(&self, n: u64) -> bool {
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                if cur.saturating_add(n) > self.capacity {
                    None
                } else {
                    Some(cur + n)
                }
            })
            .is_ok()
    }

    /// Enqueues a single already-admitted transaction. Expected never to
    /// block in practice: the channel is sized to `capacity` and `admit`
    /// reserved a slot before this is called.
    pub fn enqueue(&self, tx: Transaction) {
        if self.sender.send(tx).is_err() {
            tracing::error!("job queue enqueue failed: channel disconnected");
        }
    }

    /// Blocks up to `timeout` for the next item. Returns `None` on timeout
    /// or disconnect — callers distinguish the two via [`JobQueue::is_closed`].
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<Transaction> {
        match self.receiver.recv_timeout(timeout) {
            Ok(tx) => Some(tx),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.closed.store(true, Ordering::Relaxed);
                None
            }
        }
    }

    /// Releases `n` units of admitted capacity once the executor has
    /// returned for each of them, regardless of success or failure.
    pub fn release(&self, n: u64) {
        self.in_flight.fetch_sub(n, Ordering::AcqRel);
    }

    pub fn reset_in_flight(&self) {
        self.in_flight.store(0, Ordering::Relaxed);
    }

    /// Marks the queue closed. Workers keep draining whatever remains
    /// buffered; they only exit once the queue is both closed and empty.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admit_accepts_up_to_capacity_and_rejects_the_overflow() {
        let queue = JobQueue::new(10);
        assert!(queue.admit(6));
        assert!(queue.admit(4));
        assert!(!queue.admit(1));
        assert_eq!(queue.in_flight(), 10);
    }

    #[test]
    fn admit_rejects_the_whole_batch_rather_than_admitting_part_of_it() {
        let queue = JobQueue::new(5);
        assert!(queue.admit(5));
        assert!(!queue.admit(1));
        assert_eq!(queue.in_flight(), 5);
    }

    #[test]
    fn release_frees_capacity_for_later_admission() {
        let queue = JobQueue::new(5);
        assert!(queue.admit(5));
        queue.release(2);
        assert_eq!(queue.in_flight(), 3);
        assert!(queue.admit(2));
        assert!(!queue.admit(1));
    }
}
