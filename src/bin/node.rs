//! Ledger engine demo node.
//!
//! Builds an `Engine` from a config file (or defaults), keeps it busy with
//! synthetic load, and prints telemetry snapshots to the console. The
//! request-ingest surface — HTTP submission, WebSocket commit/telemetry
//! streaming, a browser dashboard — is explicitly out of scope for this
//! core; this binary exercises the public `Engine` API directly instead.

use std::time::Duration;

use ledger_sim::config::LedgerConfig;
use ledger_sim::engine::Engine;
use tokio::signal;
use tokio::time::interval;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => LedgerConfig::from_file(&path)?,
        None => LedgerConfig::default(),
    };

    let engine = Engine::new(config.clone())?;
    info!(
        workers = config.resolved_worker_count(),
        shards = config.shard_count,
        accounts = config.account_count,
        "ledger engine live"
    );

    let shutdown_engine = engine.clone();
    tokio::spawn(async move {
        let _ = signal::ctrl_c().await;
        info!("shutdown signal received, draining");
        shutdown_engine.shutdown();
        std::process::exit(0);
    });

    let load_engine = engine.clone();
    tokio::spawn(async move {
        loop {
            load_engine.submit(10_000, Some("demo-load".to_string()));
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    });

    let mut ticker = interval(Duration::from_secs(2));
    loop {
        ticker.tick().await;
        let snapshot = engine.snapshot();
        println!(
            "workers {:>3}/{:<3} active | processed {:>10} | failed {:>8} | in_flight {:>9}/{}",
            snapshot.active_worker_count,
            snapshot.worker_pool_size,
            snapshot.processed_count,
            snapshot.failed_count,
            snapshot.in_flight_count,
            snapshot.queue_capacity,
        );
    }
}
