//! Core types for the settlement service

use balance_core::{BalanceSnapshot, GroupId, MemberId, TransferEffect};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a persisted transfer record
pub type TransferId = u64;

/// A recorded real-world payment between two members.
///
/// Transfers are persisted so their history can be retrieved and so that an
/// update or delete can recover the values whose ledger effect must be
/// reversed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    /// Record ID
    pub id: TransferId,

    /// Group both members belong to
    pub group_id: GroupId,

    /// Member who paid
    pub from_member_id: MemberId,

    /// Member who received payment
    pub to_member_id: MemberId,

    /// Amount transferred (positive)
    pub amount: Decimal,

    /// Free-form note
    pub note: Option<String>,

    /// When the record was created
    pub recorded_at: DateTime<Utc>,
}

impl Transfer {
    /// The ledger effect of this transfer.
    pub fn effect(&self) -> TransferEffect {
        TransferEffect {
            group_id: self.group_id,
            from: self.from_member_id,
            to: self.to_member_id,
            amount: self.amount,
        }
    }
}

/// Values for a transfer to be recorded or updated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDraft {
    /// Group both members belong to
    pub group_id: GroupId,

    /// Member who paid
    pub from_member_id: MemberId,

    /// Member who received payment
    pub to_member_id: MemberId,

    /// Amount transferred; must be positive
    pub amount: Decimal,

    /// Free-form note
    #[serde(default)]
    pub note: Option<String>,
}

/// Request to compute a settlement plan for a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRequest {
    /// Group whose balances should be settled
    pub group_id: GroupId,

    /// Currency the settlement is expressed in. Accepted for interface
    /// compatibility; conversion is out of scope, so it is not used.
    pub base_currency: String,
}

/// One planned transfer within a settlement plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTransfer {
    /// Member who should pay
    pub from_member_id: MemberId,

    /// Member who should receive payment
    pub to_member_id: MemberId,

    /// Amount to transfer
    pub amount: Decimal,
}

/// Output of a settlement computation.
///
/// Computed fresh on every request; never persisted and carries no identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// Transfers to execute, in order
    pub transfers: Vec<PlannedTransfer>,
}

impl SettlementPlan {
    /// A plan with no transfers
    pub fn empty() -> Self {
        Self { transfers: vec![] }
    }

    /// True if nothing needs to move
    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Total amount moved by the plan
    pub fn total_amount(&self) -> Decimal {
        self.transfers.iter().map(|t| t.amount).sum()
    }
}

/// One side of the netting walk: a member and their remaining magnitude.
///
/// For creditors `remaining` is the outstanding credit, for debtors the
/// outstanding debt; both are positive while the member is unsettled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberPosition {
    /// Member ID
    pub member_id: MemberId,

    /// Remaining magnitude to settle
    pub remaining: Decimal,
}

impl MemberPosition {
    /// Create new position
    pub fn new(member_id: MemberId, remaining: Decimal) -> Self {
        Self {
            member_id,
            remaining,
        }
    }

    /// Fully settled?
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Decimal::ZERO
    }
}

/// Summary statistics for a computed plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStats {
    /// Members with a non-zero balance
    pub open_position_count: usize,

    /// Members owed money
    pub creditor_count: usize,

    /// Members owing money
    pub debtor_count: usize,

    /// Transfers in the plan
    pub transfer_count: usize,

    /// Total amount moved
    pub total_settled: Decimal,
}

impl PlanStats {
    /// Derive stats from a snapshot and the plan computed over it
    pub fn from_plan(balances: &BalanceSnapshot, plan: &SettlementPlan) -> Self {
        let creditor_count = balances.values().filter(|b| **b > Decimal::ZERO).count();
        let debtor_count = balances.values().filter(|b| **b < Decimal::ZERO).count();

        Self {
            open_position_count: creditor_count + debtor_count,
            creditor_count,
            debtor_count,
            transfer_count: plan.transfers.len(),
            total_settled: plan.total_amount(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_effect_mirrors_record() {
        let transfer = Transfer {
            id: 1,
            group_id: GroupId::new(3),
            from_member_id: MemberId::new(4),
            to_member_id: MemberId::new(9),
            amount: Decimal::from(7),
            note: Some("dinner".to_string()),
            recorded_at: Utc::now(),
        };

        let effect = transfer.effect();
        assert_eq!(effect.group_id, GroupId::new(3));
        assert_eq!(effect.from, MemberId::new(4));
        assert_eq!(effect.to, MemberId::new(9));
        assert_eq!(effect.amount, Decimal::from(7));
    }

    #[test]
    fn test_plan_total() {
        let plan = SettlementPlan {
            transfers: vec![
                PlannedTransfer {
                    from_member_id: MemberId::new(3),
                    to_member_id: MemberId::new(1),
                    amount: Decimal::from(8),
                },
                PlannedTransfer {
                    from_member_id: MemberId::new(4),
                    to_member_id: MemberId::new(1),
                    amount: Decimal::from(2),
                },
            ],
        };

        assert_eq!(plan.total_amount(), Decimal::from(10));
        assert!(!plan.is_empty());
        assert!(SettlementPlan::empty().is_empty());
    }

    #[test]
    fn test_compute_request_wire_shape() {
        let json = r#"{"groupId": 5, "baseCurrency": "EUR"}"#;
        let request: ComputeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.group_id, GroupId::new(5));
        assert_eq!(request.base_currency, "EUR");
    }

    #[test]
    fn test_plan_stats() {
        let mut balances = BalanceSnapshot::new();
        balances.insert(MemberId::new(1), Decimal::from(10));
        balances.insert(MemberId::new(2), Decimal::from(-10));
        balances.insert(MemberId::new(3), Decimal::ZERO);

        let plan = SettlementPlan {
            transfers: vec![PlannedTransfer {
                from_member_id: MemberId::new(2),
                to_member_id: MemberId::new(1),
                amount: Decimal::from(10),
            }],
        };

        let stats = PlanStats::from_plan(&balances, &plan);
        assert_eq!(stats.open_position_count, 2);
        assert_eq!(stats.creditor_count, 1);
        assert_eq!(stats.debtor_count, 1);
        assert_eq!(stats.transfer_count, 1);
        assert_eq!(stats.total_settled, Decimal::from(10));
    }
}
