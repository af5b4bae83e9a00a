//! The unit of work moving through the queue, executor, and commit bus.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Balance, TxId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Balance,
    pub submitted_by: String,
    pub timestamp_millis: i64,
}
