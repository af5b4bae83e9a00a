//! Prometheus metrics for the ledger engine.
//!
//! Additive instrumentation over the engine's atomic counters: it reads the
//! same counters the telemetry snapshot reads, it does not own a second
//! source of truth.

use prometheus::{Counter, Encoder, Gauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::error::LedgerError;
use crate::telemetry::TelemetrySnapshot;

/// Metrics collector for the ledger engine.
pub struct Metrics {
    pub processed_total: Counter,
    pub failed_total: Counter,
    pub in_flight: Gauge,
    pub worker_pool_size: Gauge,
    pub active_workers: Gauge,
    pub queue_capacity: Gauge,

    registry: Registry,
}

impl Metrics {
    /// Create a new metrics collector and register all series.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let processed_total = Counter::with_opts(
            Opts::new(
                "ledger_transactions_processed_total",
                "Total number of transfers that committed successfully",
            )
            .namespace("ledger"),
        )?;

        let failed_total = Counter::with_opts(
            Opts::new(
                "ledger_transactions_failed_total",
                "Total number of transfers that failed (insufficient funds)",
            )
            .namespace("ledger"),
        )?;

        let in_flight = Gauge::with_opts(
            Opts::new(
                "ledger_transactions_in_flight",
                "Transactions admitted but not yet drained (queued + executing)",
            )
            .namespace("ledger"),
        )?;

        let worker_pool_size = Gauge::with_opts(
            Opts::new("ledger_worker_pool_size", "Configured worker pool size")
                .namespace("ledger"),
        )?;

        let active_workers = Gauge::with_opts(
            Opts::new(
                "ledger_active_workers",
                "Workers currently executing a transfer",
            )
            .namespace("ledger"),
        )?;

        let queue_capacity = Gauge::with_opts(
            Opts::new("ledger_queue_capacity", "Configured job queue capacity")
                .namespace("ledger"),
        )?;

        registry.register(Box::new(processed_total.clone()))?;
        registry.register(Box::new(failed_total.clone()))?;
        registry.register(Box::new(in_flight.clone()))?;
        registry.register(Box::new(worker_pool_size.clone()))?;
        registry.register(Box::new(active_workers.clone()))?;
        registry.register(Box::new(queue_capacity.clone()))?;

        Ok(Self {
            processed_total,
            failed_total,
            in_flight,
            worker_pool_size,
            active_workers,
            queue_capacity,
            registry,
        })
    }

    /// Overwrite the gauge/counter series from a fresh telemetry snapshot.
    ///
    /// Counters are monotonic in Prometheus's model; since the engine's own
    /// `processed_count`/`failed_count` are themselves monotonic until
    /// `reset`, this mirrors them directly rather than computing deltas.
    pub fn observe(&self, snapshot: &TelemetrySnapshot) {
        self.processed_total.reset();
        self.processed_total.inc_by(snapshot.processed_count as f64);
        self.failed_total.reset();
        self.failed_total.inc_by(snapshot.failed_count as f64);
        self.in_flight.set(snapshot.in_flight_count as f64);
        self.worker_pool_size.set(snapshot.worker_pool_size as f64);
        self.active_workers.set(snapshot.active_worker_count as f64);
        self.queue_capacity.set(snapshot.queue_capacity as f64);
    }

    /// Render the registry in Prometheus text exposition format.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

/// Thread-safe metrics handle, shared between the engine and the binary's
/// scrape endpoint.
pub type MetricsHandle = Arc<Metrics>;

/// Create a metrics handle.
pub fn create_metrics() -> Result<MetricsHandle, LedgerError> {
    Ok(Arc::new(Metrics::new()?))
}
