//! Configuration management
//!
//! Provides configuration loading and validation for the ledger engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::LedgerError;

/// Ledger engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Number of shards the account space is partitioned into.
    pub shard_count: usize,

    /// Number of synthetic accounts, addressed `[0, account_count)`.
    pub account_count: u32,

    /// Starting balance for every account.
    pub initial_balance: i64,

    /// Amount moved by a synthesized transfer.
    pub transfer_amount: i64,

    /// Capacity of the bounded job queue.
    pub max_queue_size: u64,

    /// Number of worker threads. `None` means `4 * available_parallelism`.
    pub worker_count: Option<usize>,

    /// Micro-pause taken by a worker after each transaction, in microseconds.
    pub worker_micro_pause_micros: u64,

    /// Commit-bus batch tick, in milliseconds.
    pub commit_batch_interval_millis: u64,

    /// Commit-bus batch size threshold that forces an early flush.
    pub commit_batch_threshold: usize,

    /// Bounded delivery buffer depth per commit-bus subscriber, in batches.
    pub subscriber_buffer_depth: usize,

    /// Telemetry snapshot emission cadence, in milliseconds.
    pub telemetry_interval_millis: u64,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            shard_count: 1024,
            account_count: 10_000,
            initial_balance: 10_000,
            transfer_amount: 1,
            max_queue_size: 10_000_000,
            worker_count: None,
            worker_micro_pause_micros: 50,
            commit_batch_interval_millis: 16,
            commit_batch_threshold: 5000,
            subscriber_buffer_depth: 128,
            telemetry_interval_millis: 16,
            log_level: "info".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// any field the file omits.
    pub fn from_file(path: &str) -> Result<Self, LedgerError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        let cfg: LedgerConfig = settings
            .try_deserialize()
            .map_err(|e| LedgerError::Config(e.to_string()))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file(&self, path: &str) -> Result<(), LedgerError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| LedgerError::Config(e.to_string()))?;
        Ok(())
    }

    /// Validate configuration, rejecting zero-valued capacities that would
    /// make the engine unconstructible or meaningless.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.shard_count == 0 {
            return Err(LedgerError::Config("shard_count must be > 0".into()));
        }
        if self.account_count == 0 {
            return Err(LedgerError::Config("account_count must be > 0".into()));
        }
        if self.initial_balance < 0 {
            return Err(LedgerError::Config("initial_balance must be >= 0".into()));
        }
        if self.transfer_amount <= 0 {
            return Err(LedgerError::Config("transfer_amount must be > 0".into()));
        }
        if self.max_queue_size == 0 {
            return Err(LedgerError::Config("max_queue_size must be > 0".into()));
        }
        if let Some(0) = self.worker_count {
            return Err(LedgerError::Config(
                "worker_count must be > 0 when set".into(),
            ));
        }
        if self.commit_batch_threshold == 0 {
            return Err(LedgerError::Config(
                "commit_batch_threshold must be > 0".into(),
            ));
        }
        if self.subscriber_buffer_depth == 0 {
            return Err(LedgerError::Config(
                "subscriber_buffer_depth must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the configured worker count against available parallelism.
    pub fn resolved_worker_count(&self) -> usize {
        self.worker_count.unwrap_or_else(|| {
            4 * std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn worker_micro_pause(&self) -> Duration {
        Duration::from_micros(self.worker_micro_pause_micros)
    }

    pub fn commit_batch_interval(&self) -> Duration {
        Duration::from_millis(self.commit_batch_interval_millis)
    }

    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(LedgerConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_shard_count_is_rejected() {
        let mut config = LedgerConfig::default();
        config.shard_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_worker_count_is_rejected_but_unset_is_fine() {
        let mut config = LedgerConfig::default();
        config.worker_count = Some(0);
        assert!(config.validate().is_err());
        config.worker_count = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_positive_transfer_amount_is_rejected() {
        let mut config = LedgerConfig::default();
        config.transfer_amount = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolved_worker_count_falls_back_to_available_parallelism() {
        let mut config = LedgerConfig::default();
        config.worker_count = Some(7);
        assert_eq!(config.resolved_worker_count(), 7);
        config.worker_count = None;
        assert!(config.resolved_worker_count() > 0);
    }
}
