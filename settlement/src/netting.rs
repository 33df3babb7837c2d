//! Greedy debt-netting algorithm
//!
//! Turns one group's balance snapshot into a settlement plan.
//!
//! # Algorithm
//!
//! 1. Partition members into creditors (balance > 0) and debtors
//!    (balance < 0, tracked by owed magnitude)
//! 2. Sort both sides by magnitude descending; equal magnitudes order by
//!    ascending member id
//! 3. Walk both lists with two cursors, emitting
//!    `(debtor → creditor, min(remaining debt, remaining credit))` and
//!    advancing whichever side reaches exactly zero
//! 4. Stop when either side is exhausted
//!
//! # Example
//!
//! ```text
//! Balances:
//!   member 1: +10    member 2: +5    member 3: -8    member 4: -7
//!
//! Plan:
//!   3 pays 1: 8
//!   4 pays 1: 2
//!   4 pays 2: 5
//!
//! Total moved: 15 = total credit = total debt
//! ```
//!
//! The plan fully zeroes every balance and never invents or destroys money.
//! The transfer count is optimal for most distributions but not in general;
//! that stronger guarantee is a non-goal.

use crate::types::{MemberPosition, PlannedTransfer, SettlementPlan};
use balance_core::BalanceSnapshot;
use rust_decimal::Decimal;

/// Settlement planner
///
/// Stateless; reads a snapshot, never writes back to the ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementPlanner;

impl SettlementPlanner {
    /// Create new planner
    pub fn new() -> Self {
        Self
    }

    /// Compute the settlement plan for one group's snapshot.
    ///
    /// Members with a zero balance, and an empty snapshot, produce no
    /// transfers. All arithmetic is exact decimal; zero comparisons are
    /// exact, never epsilon-tolerant.
    pub fn plan(&self, balances: &BalanceSnapshot) -> SettlementPlan {
        let (mut creditors, mut debtors) = partition_positions(balances);

        let mut transfers = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < debtors.len() && j < creditors.len() {
            let amount = debtors[i].remaining.min(creditors[j].remaining);

            transfers.push(PlannedTransfer {
                from_member_id: debtors[i].member_id,
                to_member_id: creditors[j].member_id,
                amount,
            });

            debtors[i].remaining -= amount;
            creditors[j].remaining -= amount;

            // amount = min(debt, credit), so at least one side hits zero;
            // both advance when debt and credit matched exactly.
            if debtors[i].is_exhausted() {
                i += 1;
            }
            if creditors[j].is_exhausted() {
                j += 1;
            }
        }

        SettlementPlan { transfers }
    }
}

/// Split a snapshot into creditor and debtor positions, both sorted by
/// magnitude descending with ascending member id breaking ties.
///
/// The explicit tie-break keeps plan output deterministic regardless of the
/// snapshot's map iteration order.
fn partition_positions(
    balances: &BalanceSnapshot,
) -> (Vec<MemberPosition>, Vec<MemberPosition>) {
    let mut creditors = Vec::new();
    let mut debtors = Vec::new();

    for (&member, &balance) in balances {
        if balance > Decimal::ZERO {
            creditors.push(MemberPosition::new(member, balance));
        } else if balance < Decimal::ZERO {
            debtors.push(MemberPosition::new(member, -balance));
        }
    }

    let by_magnitude_desc = |a: &MemberPosition, b: &MemberPosition| {
        b.remaining
            .cmp(&a.remaining)
            .then(a.member_id.cmp(&b.member_id))
    };
    creditors.sort_by(by_magnitude_desc);
    debtors.sort_by(by_magnitude_desc);

    (creditors, debtors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use balance_core::MemberId;

    fn snapshot(entries: &[(i64, i64)]) -> BalanceSnapshot {
        entries
            .iter()
            .map(|&(m, v)| (MemberId::new(m), Decimal::from(v)))
            .collect()
    }

    fn planned(from: i64, to: i64, amount: i64) -> PlannedTransfer {
        PlannedTransfer {
            from_member_id: MemberId::new(from),
            to_member_id: MemberId::new(to),
            amount: Decimal::from(amount),
        }
    }

    #[test]
    fn test_empty_snapshot_yields_empty_plan() {
        let plan = SettlementPlanner::new().plan(&BalanceSnapshot::new());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_all_zero_balances_yield_empty_plan() {
        let plan = SettlementPlanner::new().plan(&snapshot(&[(1, 0), (2, 0), (3, 0)]));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_single_pair() {
        let plan = SettlementPlanner::new().plan(&snapshot(&[(1, 10), (2, -10)]));
        assert_eq!(plan.transfers, vec![planned(2, 1, 10)]);
    }

    #[test]
    fn test_worked_example() {
        // {1: +10, 2: +5, 3: -8, 4: -7}
        let plan =
            SettlementPlanner::new().plan(&snapshot(&[(1, 10), (2, 5), (3, -8), (4, -7)]));

        assert_eq!(
            plan.transfers,
            vec![planned(3, 1, 8), planned(4, 1, 2), planned(4, 2, 5)]
        );
        assert_eq!(plan.total_amount(), Decimal::from(15));
    }

    #[test]
    fn test_equal_magnitudes_break_ties_by_member_id() {
        let plan = SettlementPlanner::new().plan(&snapshot(&[(2, 5), (1, 5), (3, -10)]));
        assert_eq!(plan.transfers, vec![planned(3, 1, 5), planned(3, 2, 5)]);
    }

    #[test]
    fn test_zero_balance_members_are_skipped() {
        let plan = SettlementPlanner::new().plan(&snapshot(&[(1, 4), (2, 0), (3, -4)]));
        assert_eq!(plan.transfers, vec![planned(3, 1, 4)]);
    }

    #[test]
    fn test_exact_match_advances_both_cursors() {
        let plan =
            SettlementPlanner::new().plan(&snapshot(&[(1, 6), (2, 3), (3, -6), (4, -3)]));
        assert_eq!(plan.transfers, vec![planned(3, 1, 6), planned(4, 2, 3)]);
    }

    #[test]
    fn test_fractional_amounts_settle_exactly() {
        let mut balances = BalanceSnapshot::new();
        balances.insert(MemberId::new(1), Decimal::new(1001, 2)); // 10.01
        balances.insert(MemberId::new(2), Decimal::new(-999, 2)); // -9.99
        balances.insert(MemberId::new(3), Decimal::new(-2, 2)); // -0.02

        let plan = SettlementPlanner::new().plan(&balances);

        assert_eq!(
            plan.transfers,
            vec![
                PlannedTransfer {
                    from_member_id: MemberId::new(2),
                    to_member_id: MemberId::new(1),
                    amount: Decimal::new(999, 2),
                },
                PlannedTransfer {
                    from_member_id: MemberId::new(3),
                    to_member_id: MemberId::new(1),
                    amount: Decimal::new(2, 2),
                },
            ]
        );
        assert_eq!(plan.total_amount(), Decimal::new(1001, 2));
    }

    #[test]
    fn test_plan_settles_every_balance() {
        let balances = snapshot(&[(1, 12), (2, 7), (3, -5), (4, -9), (5, -5)]);
        let plan = SettlementPlanner::new().plan(&balances);

        // Replay the plan against a copy of the snapshot.
        let mut remaining = balances.clone();
        for transfer in &plan.transfers {
            *remaining.get_mut(&transfer.from_member_id).unwrap() += transfer.amount;
            *remaining.get_mut(&transfer.to_member_id).unwrap() -= transfer.amount;
        }

        assert!(remaining.values().all(|b| b.is_zero()));
    }
}
