//! End-to-end tests against a real multi-threaded `Engine`: overload
//! rejection under admission control, and conservation of value under
//! concurrent load.

use std::thread;
use std::time::Duration;

use ledger_sim::config::LedgerConfig;
use ledger_sim::engine::Engine;
use ledger_sim::error::SubmitOutcome;

fn small_config() -> LedgerConfig {
    LedgerConfig {
        shard_count: 8,
        account_count: 64,
        initial_balance: 1_000,
        transfer_amount: 1,
        max_queue_size: 200,
        worker_count: Some(4),
        worker_micro_pause_micros: 10,
        commit_batch_interval_millis: 5,
        commit_batch_threshold: 50,
        subscriber_buffer_depth: 16,
        telemetry_interval_millis: 5,
        log_level: "error".into(),
    }
}

#[test]
fn overload_is_rejected_without_disturbing_admitted_work() {
    let config = small_config();
    let capacity = config.max_queue_size;
    let engine = Engine::new(config).expect("engine should construct");

    let first = engine.submit(capacity, Some("filler".into()));
    assert_eq!(first, SubmitOutcome::Accepted);

    let second = engine.submit(1, Some("overflow".into()));
    assert_eq!(second, SubmitOutcome::Overload);

    wait_for_drain(&engine);
    assert_eq!(engine.snapshot().processed_count + engine.snapshot().failed_count, capacity);

    engine.shutdown();
}

#[test]
fn total_balance_is_conserved_under_concurrent_load() {
    let config = small_config();
    let engine = Engine::new(config.clone()).expect("engine should construct");
    let expected_total = config.initial_balance * config.account_count as i64;

    assert_eq!(engine.total_balance(), expected_total);

    for _ in 0..5 {
        engine.submit(500, Some("load".into()));
    }

    wait_for_drain(&engine);
    assert_eq!(engine.total_balance(), expected_total);

    engine.shutdown();
}

#[test]
fn reset_restores_every_balance_and_zeroes_counters() {
    let config = small_config();
    let engine = Engine::new(config.clone()).expect("engine should construct");
    let expected_total = config.initial_balance * config.account_count as i64;

    engine.submit(500, Some("load".into()));
    wait_for_drain(&engine);
    assert!(engine.snapshot().processed_count > 0);

    engine.reset();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.processed_count, 0);
    assert_eq!(snapshot.failed_count, 0);
    assert_eq!(snapshot.in_flight_count, 0);
    assert_eq!(engine.total_balance(), expected_total);

    engine.shutdown();
}

fn wait_for_drain(engine: &std::sync::Arc<Engine>) {
    for _ in 0..200 {
        if engine.snapshot().in_flight_count == 0 {
            return;
        }
        thread::sleep(Duration::from_millis(20));
    }
    panic!("engine did not drain within the test timeout");
}
