//! Core types for the balance ledger
//!
//! All monetary amounts are `Decimal`. The zero-sum invariant requires exact
//! arithmetic; binary floating point is a correctness bug here, not an
//! approximation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Group identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GroupId(i64);

impl GroupId {
    /// Create new group ID
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get raw value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Member identifier, scoped to a group
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MemberId(i64);

impl MemberId {
    /// Create new member ID
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get raw value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable copy of one group's member → balance mapping.
///
/// Positive = the group owes this member; negative = this member owes the
/// group; zero = settled.
pub type BalanceSnapshot = HashMap<MemberId, Decimal>;

/// Notification that a new expense was recorded.
///
/// Published by the expense service whenever an expense is persisted. The
/// shares map lists what each member owes for this expense; it normally
/// excludes the payer, and the share amounts sum to the expense total. A payer
/// appearing in its own shares is accepted bookkeeping (the payer owes part of
/// their own payment) and nets to `total - own share`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseNotification {
    /// Group the expense belongs to
    pub group_id: GroupId,

    /// Unique identifier of the recorded expense
    pub expense_id: i64,

    /// Member who paid the expense
    pub payer_member_id: MemberId,

    /// Member → owed amount; amounts are non-negative
    pub shares: HashMap<MemberId, Decimal>,
}

impl ExpenseNotification {
    /// Total amount the payer laid out, i.e. the sum of all shares.
    pub fn total(&self) -> Decimal {
        self.shares.values().copied().sum()
    }
}
