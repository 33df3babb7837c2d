//! Concurrent per-group balance table
//!
//! The ledger is the shared resource between the asynchronous expense
//! consumer and synchronous transfer application. Concurrency contract:
//!
//! - a read-modify-write of one (group, member) entry is a single atomic
//!   step (the map's shard lock is held across the whole update)
//! - mutations on different groups proceed in parallel; there is no ledger-
//!   wide lock
//! - the credit and debits of one expense are *not* atomic as a set; a
//!   concurrent snapshot may observe a partially applied expense

use crate::types::{BalanceSnapshot, GroupId, MemberId};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Per-group, per-member signed balance table.
///
/// Entries are created lazily with an implicit zero starting balance. A group
/// whose balances are all zero is behaviorally identical to an absent group.
#[derive(Debug, Default)]
pub struct BalanceLedger {
    /// group → (member → net balance)
    groups: DashMap<GroupId, DashMap<MemberId, Decimal>>,
}

impl BalanceLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the member's balance, creating the entry at zero if
    /// absent. No sign validation happens here; callers pass the correct
    /// sign for their operation's semantics.
    pub fn credit(&self, group: GroupId, member: MemberId, amount: Decimal) {
        loop {
            if let Some(members) = self.groups.get(&group) {
                // Entry holds the shard lock for the full read-modify-write.
                *members.entry(member).or_insert(Decimal::ZERO) += amount;
                return;
            }
            // Group vanished or never existed; (re)create and retry. The
            // retry covers a concurrent prune between insert and lookup.
            self.groups.entry(group).or_default();
        }
    }

    /// Subtract `amount` from the member's balance.
    pub fn debit(&self, group: GroupId, member: MemberId, amount: Decimal) {
        self.credit(group, member, -amount);
    }

    /// Immutable copy of the group's member → balance mapping. Unknown groups
    /// yield an empty mapping.
    pub fn snapshot(&self, group: GroupId) -> BalanceSnapshot {
        match self.groups.get(&group) {
            Some(members) => members.iter().map(|e| (*e.key(), *e.value())).collect(),
            None => BalanceSnapshot::new(),
        }
    }

    /// Sum of all member balances in the group. Exactly zero whenever no
    /// mutation is in flight (the conservation law).
    pub fn balance_sum(&self, group: GroupId) -> Decimal {
        match self.groups.get(&group) {
            Some(members) => members.iter().map(|e| *e.value()).sum(),
            None => Decimal::ZERO,
        }
    }

    /// Number of groups currently materialized.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Drop groups whose balances are all exactly zero. Returns the number of
    /// groups removed. This is an optimization, never a correctness
    /// requirement.
    pub fn prune_settled_groups(&self) -> usize {
        let before = self.groups.len();
        self.groups
            .retain(|_, members| members.iter().any(|e| !e.value().is_zero()));
        before.saturating_sub(self.groups.len())
    }
}
