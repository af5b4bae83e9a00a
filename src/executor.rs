//! Applies a single transfer to the ledger.

use std::sync::atomic::Ordering;

use tracing::error;

use crate::account::Account;
use crate::commit_bus::CommitBus;
use crate::counters::Counters;
use crate::ledger::Ledger;
use crate::lock_order::ascending;
use crate::transaction::Transaction;

/// Moves `tx.amount` from `tx.from` to `tx.to`, or counts a failure if the
/// sender's balance is insufficient.
///
/// Acquires shard-structural read locks in ascending shard-index order,
/// then account locks in ascending account-id order. These are two
/// independent total orders; together they rule out deadlock across any
/// interleaving of concurrent transfers, regardless of which account each
/// transfers between.
pub fn execute(ledger: &Ledger, counters: &Counters, bus: &CommitBus, tx: Transaction) {
    if tx.from == tx.to {
        counters.processed.fetch_add(1, Ordering::Relaxed);
        return;
    }

    let shard_from = ledger.shard_of(tx.from);
    let shard_to = ledger.shard_of(tx.to);
    let (lo, hi) = ascending(shard_from, shard_to);

    if shard_from == shard_to {
        let accounts = ledger.shard(lo).read();
        let acct_from = accounts.get(&tx.from).expect("account id out of range");
        let acct_to = accounts.get(&tx.to).expect("account id out of range");
        transfer_locked(acct_from, acct_to, &tx, counters, bus);
    } else {
        let accounts_lo = ledger.shard(lo).read();
        let accounts_hi = ledger.shard(hi).read();
        let acct_from = if shard_from == lo {
            accounts_lo.get(&tx.from)
        } else {
            accounts_hi.get(&tx.from)
        }
        .expect("account id out of range");
        let acct_to = if shard_to == lo {
            accounts_lo.get(&tx.to)
        } else {
            accounts_hi.get(&tx.to)
        }
        .expect("account id out of range");
        transfer_locked(acct_from, acct_to, &tx, counters, bus);
    }
}

/// Acquires both account guards in ascending account-id order. Guards are
/// declared in that same order, so Rust's reverse-declaration drop order
/// releases them in the required reverse-of-acquisition order for free.
fn transfer_locked(
    acct_from: &Account,
    acct_to: &Account,
    tx: &Transaction,
    counters: &Counters,
    bus: &CommitBus,
) {
    let from_first = tx.from < tx.to;
    let (first, second) = if from_first {
        (acct_from, acct_to)
    } else {
        (acct_to, acct_from)
    };

    let mut first_guard = first.lock();
    let mut second_guard = second.lock();

    let (from_balance, to_balance) = if from_first {
        (&mut *first_guard, &mut *second_guard)
    } else {
        (&mut *second_guard, &mut *first_guard)
    };

    if *from_balance < tx.amount {
        counters.failed.fetch_add(1, Ordering::Relaxed);
        return;
    }

    *from_balance = from_balance.checked_sub(tx.amount).unwrap_or_else(|| {
        error!(from = tx.from, amount = tx.amount, "balance underflow past guard check");
        panic!("internal invariant violation: balance underflow");
    });
    *to_balance = to_balance.checked_add(tx.amount).unwrap_or_else(|| {
        error!(to = tx.to, amount = tx.amount, "balance overflow");
        panic!("internal invariant violation: balance overflow");
    });

    counters.processed.fetch_add(1, Ordering::Relaxed);
    bus.publish(tx.clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Ledger, Counters, CommitBus) {
        (Ledger::new(4, 16, 100), Counters::new(), CommitBus::new(8, 64))
    }

    fn tx(id: u64, from: u32, to: u32, amount: i64) -> Transaction {
        Transaction {
            id,
            from,
            to,
            amount,
            submitted_by: "test".into(),
            timestamp_millis: 0,
        }
    }

    #[test]
    fn self_transfer_is_a_no_op_that_still_counts_as_processed() {
        let (ledger, counters, bus) = setup();
        execute(&ledger, &counters, &bus, tx(1, 3, 3, 50));
        assert_eq!(ledger.shard(ledger.shard_of(3)).read().get(&3).unwrap().balance(), 100);
        assert_eq!(counters.processed.load(Ordering::Relaxed), 1);
        assert_eq!(counters.failed.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn successful_transfer_moves_balance_between_accounts() {
        let (ledger, counters, bus) = setup();
        execute(&ledger, &counters, &bus, tx(1, 0, 1, 40));
        assert_eq!(ledger.shard(ledger.shard_of(0)).read().get(&0).unwrap().balance(), 60);
        assert_eq!(ledger.shard(ledger.shard_of(1)).read().get(&1).unwrap().balance(), 140);
        assert_eq!(counters.processed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn insufficient_funds_fails_without_mutating_balances() {
        let (ledger, counters, bus) = setup();
        execute(&ledger, &counters, &bus, tx(1, 0, 1, 1000));
        assert_eq!(ledger.shard(ledger.shard_of(0)).read().get(&0).unwrap().balance(), 100);
        assert_eq!(ledger.shard(ledger.shard_of(1)).read().get(&1).unwrap().balance(), 100);
        assert_eq!(counters.failed.load(Ordering::Relaxed), 1);
        assert_eq!(counters.processed.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn transfer_across_shards_takes_both_read_locks() {
        let (ledger, counters, bus) = setup();
        // account 0 and account 1 land in different shards when shard_count < account_count
        // and ids are adjacent mod shard_count == 4: shard_of(0) = 0, shard_of(1) = 1.
        assert_ne!(ledger.shard_of(0), ledger.shard_of(1));
        execute(&ledger, &counters, &bus, tx(1, 1, 0, 25));
        assert_eq!(ledger.shard(ledger.shard_of(1)).read().get(&1).unwrap().balance(), 75);
        assert_eq!(ledger.shard(ledger.shard_of(0)).read().get(&0).unwrap().balance(), 125);
    }
}
