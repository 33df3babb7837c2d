//! Main settlement engine
//!
//! Orchestrates the balance ledger, transfer store, membership oracle, and
//! planner into the operation set the surrounding service exposes: expense
//! ingestion, settlement computation, and transfer record/update/delete.
//!
//! Updating a transfer reverses the old effect and applies the new one;
//! deleting reverses alone. The two ledger calls of an update are not a
//! transaction: they interleave freely with other requests and only per-key
//! atomicity is guaranteed, which is sufficient for the conservation law.

use crate::{
    membership::MembershipOracle,
    netting::SettlementPlanner,
    store::TransferStore,
    types::{ComputeRequest, PlanStats, SettlementPlan, Transfer, TransferDraft, TransferId},
    Error, Result,
};
use balance_core::{
    apply_transfer, record_expense, BalanceLedger, BalanceSnapshot, ExpenseNotification,
    GroupId, Metrics,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;

/// Settlement engine
pub struct SettlementEngine {
    /// Shared balance ledger
    ledger: Arc<BalanceLedger>,

    /// Transfer history store
    store: Arc<dyn TransferStore>,

    /// Group/member existence checks
    membership: Arc<dyn MembershipOracle>,

    /// Netting planner
    planner: SettlementPlanner,

    /// Metrics collector
    metrics: Metrics,
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new(
        ledger: Arc<BalanceLedger>,
        store: Arc<dyn TransferStore>,
        membership: Arc<dyn MembershipOracle>,
    ) -> Result<Self> {
        let metrics = Metrics::new().map_err(|e| Error::Metrics(e.to_string()))?;

        Ok(Self {
            ledger,
            store,
            membership,
            planner: SettlementPlanner::new(),
            metrics,
        })
    }

    /// The engine's metrics collector (for scrape endpoints)
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Apply an expense notification to the ledger.
    ///
    /// Entry point for the event consumer. Notifications arrive at least
    /// once; redeliveries double-count.
    pub fn handle_expense(&self, event: &ExpenseNotification) {
        record_expense(&self.ledger, event);
        self.metrics.record_expense_applied();
        self.metrics
            .update_live_groups(self.ledger.group_count() as i64);
    }

    /// Current balances for a group (empty for unknown groups)
    pub fn balances(&self, group: GroupId) -> BalanceSnapshot {
        self.ledger.snapshot(group)
    }

    /// Compute a settlement plan for a group.
    ///
    /// The request's base currency is accepted but unused; conversion is out
    /// of scope. A group the oracle rejects is an error; a known group with
    /// no balances yields an empty plan, indistinguishable from one whose
    /// balances are all zero.
    pub async fn compute_settlement(&self, request: &ComputeRequest) -> Result<SettlementPlan> {
        if !self.membership.group_exists(request.group_id).await? {
            return Err(Error::GroupNotFound(request.group_id));
        }

        let start = Instant::now();
        let balances = self.ledger.snapshot(request.group_id);
        let plan = self.planner.plan(&balances);
        self.metrics
            .record_plan_computed(start.elapsed().as_secs_f64());

        let stats = PlanStats::from_plan(&balances, &plan);
        tracing::info!(
            group_id = %request.group_id,
            base_currency = %request.base_currency,
            open_positions = stats.open_position_count,
            transfers = stats.transfer_count,
            total = %stats.total_settled,
            "settlement plan computed"
        );

        Ok(plan)
    }

    /// Record a completed transfer: persist it, then apply it to the ledger.
    pub async fn record_transfer(&self, draft: TransferDraft) -> Result<Transfer> {
        self.validate_draft(&draft).await?;

        let transfer = self.store.insert(draft).await?;
        apply_transfer(&self.ledger, &transfer.effect());
        self.metrics.record_transfer_applied();

        tracing::info!(
            transfer_id = transfer.id,
            group_id = %transfer.group_id,
            from = %transfer.from_member_id,
            to = %transfer.to_member_id,
            amount = %transfer.amount,
            "transfer recorded"
        );

        Ok(transfer)
    }

    /// Update a recorded transfer.
    ///
    /// Reverses the old effect, persists the new values, then applies the new
    /// effect, in that order. Taken together the two ledger calls leave the
    /// zero-sum invariant intact even when the group changed.
    pub async fn update_transfer(
        &self,
        id: TransferId,
        draft: TransferDraft,
    ) -> Result<Transfer> {
        let existing = self
            .store
            .get(id)
            .await?
            .ok_or(Error::TransferNotFound(id))?;
        self.validate_draft(&draft).await?;

        apply_transfer(&self.ledger, &existing.effect().reversed());
        self.metrics.record_transfer_reversed();

        let updated = Transfer {
            id,
            group_id: draft.group_id,
            from_member_id: draft.from_member_id,
            to_member_id: draft.to_member_id,
            amount: draft.amount,
            note: draft.note,
            recorded_at: existing.recorded_at,
        };
        self.store.update(updated.clone()).await?;

        apply_transfer(&self.ledger, &updated.effect());
        self.metrics.record_transfer_applied();

        tracing::info!(transfer_id = id, "transfer updated");

        Ok(updated)
    }

    /// Delete a recorded transfer, reversing its effect on the ledger.
    pub async fn delete_transfer(&self, id: TransferId) -> Result<()> {
        let existing = self
            .store
            .get(id)
            .await?
            .ok_or(Error::TransferNotFound(id))?;

        apply_transfer(&self.ledger, &existing.effect().reversed());
        self.metrics.record_transfer_reversed();

        self.store.delete(id).await?;

        tracing::info!(transfer_id = id, "transfer deleted");

        Ok(())
    }

    /// Fetch a recorded transfer
    pub async fn get_transfer(&self, id: TransferId) -> Result<Transfer> {
        self.store
            .get(id)
            .await?
            .ok_or(Error::TransferNotFound(id))
    }

    /// List a group's recorded transfers, oldest first
    pub async fn list_transfers(&self, group: GroupId) -> Result<Vec<Transfer>> {
        if !self.membership.group_exists(group).await? {
            return Err(Error::GroupNotFound(group));
        }

        self.store.list_by_group(group).await
    }

    /// Validate a transfer draft before it touches the store or ledger.
    ///
    /// A non-positive amount is rejected here so a negative value can never
    /// silently invert a transfer's meaning further down.
    async fn validate_draft(&self, draft: &TransferDraft) -> Result<()> {
        if draft.amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(draft.amount));
        }

        if !self.membership.group_exists(draft.group_id).await? {
            return Err(Error::GroupNotFound(draft.group_id));
        }

        for member in [draft.from_member_id, draft.to_member_id] {
            if !self.membership.member_exists(draft.group_id, member).await? {
                return Err(Error::MemberNotFound {
                    group: draft.group_id,
                    member,
                });
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for SettlementEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettlementEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::{PermissiveOracle, StaticRoster};
    use crate::store::InMemoryTransferStore;
    use balance_core::MemberId;
    use std::collections::HashMap;

    fn engine_with_roster(roster: StaticRoster) -> SettlementEngine {
        SettlementEngine::new(
            Arc::new(BalanceLedger::new()),
            Arc::new(InMemoryTransferStore::new()),
            Arc::new(roster),
        )
        .unwrap()
    }

    fn permissive_engine() -> SettlementEngine {
        SettlementEngine::new(
            Arc::new(BalanceLedger::new()),
            Arc::new(InMemoryTransferStore::new()),
            Arc::new(PermissiveOracle),
        )
        .unwrap()
    }

    fn draft(group: i64, from: i64, to: i64, amount: i64) -> TransferDraft {
        TransferDraft {
            group_id: GroupId::new(group),
            from_member_id: MemberId::new(from),
            to_member_id: MemberId::new(to),
            amount: Decimal::from(amount),
            note: None,
        }
    }

    fn expense(group: i64, payer: i64, shares: &[(i64, i64)]) -> ExpenseNotification {
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

    #[tokio::test]
    async fn test_expense_then_settlement() {
        let engine = permissive_engine();
        engine.handle_expense(&expense(1, 2, &[(1, 3), (3, 2)]));

        let plan = engine
            .compute_settlement(&ComputeRequest {
                group_id: GroupId::new(1),
                base_currency: "USD".to_string(),
            })
            .await
            .unwrap();

        // {2: +5, 1: -3, 3: -2} → 1 pays 2: 3, 3 pays 2: 2
        assert_eq!(plan.transfers.len(), 2);
        assert_eq!(plan.total_amount(), Decimal::from(5));
    }

    #[tokio::test]
    async fn test_compute_for_unknown_group_fails() {
        let engine = engine_with_roster(StaticRoster::new());

        let result = engine
            .compute_settlement(&ComputeRequest {
                group_id: GroupId::new(9),
                base_currency: "USD".to_string(),
            })
            .await;

        assert!(matches!(result, Err(Error::GroupNotFound(_))));
    }

    #[tokio::test]
    async fn test_compute_for_known_group_without_balances_is_empty() {
        let roster = StaticRoster::new();
        roster.add_group(GroupId::new(1), [MemberId::new(1)]);
        let engine = engine_with_roster(roster);

        let plan = engine
            .compute_settlement(&ComputeRequest {
                group_id: GroupId::new(1),
                base_currency: "USD".to_string(),
            })
            .await
            .unwrap();

        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn test_record_transfer_applies_to_ledger() {
        let engine = permissive_engine();
        let transfer = engine.record_transfer(draft(1, 1, 2, 5)).await.unwrap();

        assert_eq!(transfer.id, 1);
        let balances = engine.balances(GroupId::new(1));
        assert_eq!(balances.get(&MemberId::new(1)), Some(&Decimal::from(5)));
        assert_eq!(balances.get(&MemberId::new(2)), Some(&Decimal::from(-5)));
    }

    #[tokio::test]
    async fn test_record_transfer_rejects_non_positive_amount() {
        let engine = permissive_engine();

        let zero = engine.record_transfer(draft(1, 1, 2, 0)).await;
        assert!(matches!(zero, Err(Error::InvalidAmount(_))));

        let negative = engine.record_transfer(draft(1, 1, 2, -3)).await;
        assert!(matches!(negative, Err(Error::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn test_record_transfer_rejects_unknown_member() {
        let roster = StaticRoster::new();
        roster.add_group(GroupId::new(1), [MemberId::new(1)]);
        let engine = engine_with_roster(roster);

        let result = engine.record_transfer(draft(1, 1, 2, 5)).await;
        assert!(matches!(result, Err(Error::MemberNotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_transfer_swaps_effects() {
        let engine = permissive_engine();
        let transfer = engine.record_transfer(draft(1, 1, 2, 5)).await.unwrap();

        // Change payer, payee and amount entirely.
        let updated = engine
            .update_transfer(transfer.id, draft(1, 3, 4, 7))
            .await
            .unwrap();
        assert_eq!(updated.amount, Decimal::from(7));

        let balances = engine.balances(GroupId::new(1));
        // Old effect reversed: members 1 and 2 back to zero.
        assert_eq!(balances.get(&MemberId::new(1)), Some(&Decimal::ZERO));
        assert_eq!(balances.get(&MemberId::new(2)), Some(&Decimal::ZERO));
        // New effect applied.
        assert_eq!(balances.get(&MemberId::new(3)), Some(&Decimal::from(7)));
        assert_eq!(balances.get(&MemberId::new(4)), Some(&Decimal::from(-7)));

        let stored = engine.get_transfer(transfer.id).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_missing_transfer_fails() {
        let engine = permissive_engine();
        let result = engine.update_transfer(42, draft(1, 1, 2, 5)).await;
        assert!(matches!(result, Err(Error::TransferNotFound(42))));
    }

    #[tokio::test]
    async fn test_delete_transfer_reverses_effect() {
        let engine = permissive_engine();
        engine.handle_expense(&expense(1, 1, &[(2, 10)]));
        let transfer = engine.record_transfer(draft(1, 2, 1, 10)).await.unwrap();

        // Transfer settled the debt...
        assert_eq!(
            engine.balances(GroupId::new(1)).get(&MemberId::new(2)),
            Some(&Decimal::ZERO)
        );

        // ...deleting it restores the debt.
        engine.delete_transfer(transfer.id).await.unwrap();
        let balances = engine.balances(GroupId::new(1));
        assert_eq!(balances.get(&MemberId::new(1)), Some(&Decimal::from(10)));
        assert_eq!(balances.get(&MemberId::new(2)), Some(&Decimal::from(-10)));

        assert!(matches!(
            engine.get_transfer(transfer.id).await,
            Err(Error::TransferNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_transfers_scoped_to_group() {
        let engine = permissive_engine();
        engine.record_transfer(draft(1, 1, 2, 5)).await.unwrap();
        engine.record_transfer(draft(2, 1, 2, 6)).await.unwrap();
        engine.record_transfer(draft(1, 2, 1, 7)).await.unwrap();

        let transfers = engine.list_transfers(GroupId::new(1)).await.unwrap();
        assert_eq!(transfers.len(), 2);
        assert!(transfers.iter().all(|t| t.group_id == GroupId::new(1)));
    }

    #[tokio::test]
    async fn test_conservation_across_mixed_operations() {
        let engine = permissive_engine();
        let group = GroupId::new(1);

        engine.handle_expense(&expense(1, 1, &[(2, 4), (3, 6)]));
        let transfer = engine.record_transfer(draft(1, 2, 1, 4)).await.unwrap();
        engine
            .update_transfer(transfer.id, draft(1, 3, 1, 6))
            .await
            .unwrap();
        engine.handle_expense(&expense(1, 2, &[(1, 1)]));

        assert_eq!(engine.ledger.balance_sum(group), Decimal::ZERO);
    }
}
