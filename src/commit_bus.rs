//! Lossy, batched distribution of committed transfers to subscribers.
//!
//! Commits accumulate in a small buffer that flushes on whichever comes
//! first: a fixed cadence tick, or a batch-size threshold crossed inline by
//! `publish`. Delivery to each subscriber is then a single non-blocking
//! offer via [`Broadcaster`] — nothing here waits on a slow consumer.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::broadcast::{Broadcaster, Subscription};
use crate::transaction::Transaction;

pub struct CommitBus {
    broadcaster: Arc<Broadcaster<Vec<Transaction>>>,
    pending: Mutex<Vec<Transaction>>,
    batch_threshold: usize,
}

impl CommitBus {
    pub fn new(buffer_depth: usize, batch_threshold: usize) -> Self {
        Self {
            broadcaster: Arc::new(Broadcaster::new(buffer_depth)),
            pending: Mutex::new(Vec::new()),
            batch_threshold,
        }
    }

    /// Called by the executor on every successful commit. The critical
    /// section is a single `Vec::push`; when the pending batch crosses the
    /// threshold it is flushed inline rather than waiting for the next tick.
    pub fn publish(&self, tx: Transaction) {
        let mut pending = self.pending.lock();
        pending.push(tx);
        if pending.len() >= self.batch_threshold {
            let batch = std::mem::take(&mut *pending);
            drop(pending);
            self.broadcaster.publish(batch);
        }
    }

    /// Called by the ticker thread on its fixed cadence; flushes whatever is
    /// pending even if it never crossed the threshold. A no-op if nothing
    /// has committed since the last flush.
    pub fn flush_tick(&self) {
        let mut pending = self.pending.lock();
        if pending.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut *pending);
        drop(pending);
        self.broadcaster.publish(batch);
    }

    pub fn subscribe(&self) -> Subscription<Vec<Transaction>> {
        self.broadcaster.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: u64) -> Transaction {
        Transaction {
            id,
            from: 0,
            to: 1,
            amount: 1,
            submitted_by: "test".into(),
            timestamp_millis: 0,
        }
    }

    #[test]
    fn publish_below_threshold_waits_for_the_tick() {
        let bus = CommitBus::new(8, 10);
        let sub = bus.subscribe();
        bus.publish(tx(1));
        assert!(sub.try_recv().is_none());
        bus.flush_tick();
        let batch = sub.try_recv().expect("tick should flush the pending batch");
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn crossing_the_threshold_flushes_inline() {
        let bus = CommitBus::new(8, 2);
        let sub = bus.subscribe();
        bus.publish(tx(1));
        bus.publish(tx(2));
        let batch = sub.try_recv().expect("threshold crossing should flush immediately");
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn unsubscribing_stops_further_delivery() {
        let bus = CommitBus::new(8, 1);
        let sub = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(tx(1));
    }
}
