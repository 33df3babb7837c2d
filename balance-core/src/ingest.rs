//! Expense ingestion
//!
//! Translates an expense-recorded notification into ledger mutations: the
//! payer is credited the expense total, every share member is debited their
//! share. The individual mutations commute, so application order within one
//! notification does not matter; the group is consistent once all of them
//! have landed.

use crate::ledger::BalanceLedger;
use crate::types::ExpenseNotification;

/// Apply an expense notification to the ledger.
///
/// Preserves the zero-sum invariant by construction: the payer's credit
/// equals the sum of the individual debits. A payer listed in its own shares
/// nets to `total - own share`, which is accepted self-owed bookkeeping.
///
/// Delivery is at-least-once; a redelivered notification double-counts.
/// Deduplication by `expense_id` is an extension point at this seam, not a
/// ledger concern.
pub fn record_expense(ledger: &BalanceLedger, event: &ExpenseNotification) {
    let total = event.total();
    ledger.credit(event.group_id, event.payer_member_id, total);

    for (&member, &share) in &event.shares {
        ledger.debit(event.group_id, member, share);
    }

    tracing::debug!(
        group_id = %event.group_id,
        expense_id = event.expense_id,
        payer = %event.payer_member_id,
        %total,
        shares = event.shares.len(),
        "expense applied to ledger"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GroupId, MemberId};
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    fn notification(
        group: i64,
        payer: i64,
        shares: &[(i64, i64)],
    ) -> ExpenseNotification {
        ExpenseNotification {
            group_id: GroupId::new(group),
            expense_id: 1,
            payer_member_id: MemberId::new(payer),
            shares: shares
                .iter()
                .map(|&(m, v)| (MemberId::new(m), Decimal::from(v)))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_payer_credited_shares_debited() {
        let ledger = BalanceLedger::new();
        // Group 1, payer 2, shares {1: 3, 3: 2} → {2: +5, 1: -3, 3: -2}
        record_expense(&ledger, &notification(1, 2, &[(1, 3), (3, 2)]));

        let snapshot = ledger.snapshot(GroupId::new(1));
        assert_eq!(snapshot.get(&MemberId::new(2)), Some(&Decimal::from(5)));
        assert_eq!(snapshot.get(&MemberId::new(1)), Some(&Decimal::from(-3)));
        assert_eq!(snapshot.get(&MemberId::new(3)), Some(&Decimal::from(-2)));
        assert_eq!(ledger.balance_sum(GroupId::new(1)), Decimal::ZERO);
    }

    #[test]
    fn test_expenses_accumulate() {
        let ledger = BalanceLedger::new();
        record_expense(&ledger, &notification(2, 5, &[(7, 3)]));
        record_expense(&ledger, &notification(2, 6, &[(5, 2)]));

        let snapshot = ledger.snapshot(GroupId::new(2));
        assert_eq!(snapshot.get(&MemberId::new(5)), Some(&Decimal::from(1)));
        assert_eq!(snapshot.get(&MemberId::new(6)), Some(&Decimal::from(2)));
        assert_eq!(snapshot.get(&MemberId::new(7)), Some(&Decimal::from(-3)));
        assert_eq!(ledger.balance_sum(GroupId::new(2)), Decimal::ZERO);
    }

    #[test]
    fn test_payer_in_own_shares_nets_out() {
        let ledger = BalanceLedger::new();
        // Payer 1 covers 10 total and owes 4 of it themselves.
        record_expense(&ledger, &notification(1, 1, &[(1, 4), (2, 6)]));

        let snapshot = ledger.snapshot(GroupId::new(1));
        assert_eq!(snapshot.get(&MemberId::new(1)), Some(&Decimal::from(6)));
        assert_eq!(snapshot.get(&MemberId::new(2)), Some(&Decimal::from(-6)));
        assert_eq!(ledger.balance_sum(GroupId::new(1)), Decimal::ZERO);
    }

    #[test]
    fn test_empty_shares_is_a_noop_for_everyone_but_the_payer() {
        let ledger = BalanceLedger::new();
        record_expense(&ledger, &notification(1, 2, &[]));

        let snapshot = ledger.snapshot(GroupId::new(1));
        assert_eq!(snapshot.get(&MemberId::new(2)), Some(&Decimal::ZERO));
        assert_eq!(ledger.balance_sum(GroupId::new(1)), Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_delivery_double_counts() {
        let ledger = BalanceLedger::new();
        let event = notification(1, 2, &[(1, 3)]);
        record_expense(&ledger, &event);
        record_expense(&ledger, &event);

        let snapshot = ledger.snapshot(GroupId::new(1));
        assert_eq!(snapshot.get(&MemberId::new(2)), Some(&Decimal::from(6)));
        assert_eq!(snapshot.get(&MemberId::new(1)), Some(&Decimal::from(-6)));
    }
}
