//! A lossy, bounded fan-out used by both the commit bus and the telemetry
//! stream: publishing never blocks, and a subscriber whose buffer is full
//! simply misses the item rather than stalling the publisher.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

struct Subscriber<T> {
    id: u64,
    sender: Sender<T>,
}

pub struct Broadcaster<T> {
    subscribers: Mutex<Vec<Subscriber<T>>>,
    next_id: AtomicU64,
    buffer_depth: usize,
}

impl<T: Clone> Broadcaster<T> {
    pub fn new(buffer_depth: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            buffer_depth,
        }
    }

    /// Offers `item` to every subscriber without blocking. Holds the
    /// subscriber-set lock only long enough to iterate it once.
    pub fn publish(&self, item: T) {
        let subscribers = self.subscribers.lock();
        for sub in subscribers.iter() {
            let _ = sub.sender.try_send(item.clone());
        }
    }

    pub fn subscribe(self: &Arc<Self>) -> Subscription<T> {
        let (sender, receiver) = bounded(self.buffer_depth);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push(Subscriber { id, sender });
        Subscription {
            receiver,
            id,
            broadcaster: self.clone(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

/// A live subscription. Dropping it removes the subscriber immediately —
/// the broadcaster stops holding a sender for it on the very next publish.
pub struct Subscription<T> {
    receiver: Receiver<T>,
    id: u64,
    broadcaster: Arc<Broadcaster<T>>,
}

impl<T> Subscription<T> {
    pub fn recv(&self) -> Option<T> {
        self.receiver.recv().ok()
    }

    pub fn try_recv(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.broadcaster.subscribers.lock().retain(|s| s.id != self.id);
    }
}
