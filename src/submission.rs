//! The synthetic-load submission endpoint.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use tracing::debug;

use crate::engine::Engine;
use crate::error::SubmitOutcome;
use crate::transaction::Transaction;

/// Requests that `count` random transfers be enqueued on behalf of
/// `submitter`. Admission is checked synchronously, so the caller learns
/// Accepted/Overload immediately; synthesis and enqueue then run on a
/// detached thread so the caller is never blocked by them.
pub fn submit(engine: &Arc<Engine>, count: u64, submitter: Option<String>) -> SubmitOutcome {
    if count == 0 {
        return SubmitOutcome::Accepted;
    }
    if !engine.queue().admit(count) {
        return SubmitOutcome::Overload;
    }

    let engine = engine.clone();
    let submitter = submitter.unwrap_or_else(|| "anonymous".to_string());
    std::thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let account_count = engine.account_count();
        let amount = engine.transfer_amount();
        for _ in 0..count {
            let tx = Transaction {
                id: engine.next_tx_id(),
                from: rng.gen_range(0..account_count),
                to: rng.gen_range(0..account_count),
                amount,
                submitted_by: submitter.clone(),
                timestamp_millis: now_millis(),
            };
            engine.queue().enqueue(tx);
        }
        debug!(count, submitter = %submitter, "submission batch synthesized");
    });

    SubmitOutcome::Accepted
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
