//! Common types shared across the ledger engine.

/// Identifies an account within the ledger's fixed identifier space `[0, account_count)`.
pub type AccountId = u32;

/// Monotonic transaction identifier, assigned at enqueue time.
pub type TxId = u64;

/// Signed balance / transfer amount. Signed so that checked arithmetic on a
/// failed debit cannot silently wrap into a valid-looking balance.
pub type Balance = i64;

/// Index of a shard within the ledger's fixed shard array.
pub type ShardIndex = usize;
