//! Metrics collection for observability
//!
//! Prometheus metrics for the balance ledger and its mutation paths.
//!
//! # Metrics
//!
//! - `balance_expenses_total` - Expense notifications applied
//! - `balance_transfers_applied_total` - Transfer effects applied
//! - `balance_transfer_reversals_total` - Transfer effects reversed
//! - `balance_plans_computed_total` - Settlement plans computed
//! - `balance_live_groups` - Groups currently materialized in the ledger
//! - `balance_plan_duration_seconds` - Settlement computation latency

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Each collector owns its registry, so independent instances (one per
/// service, many per test run) never collide on metric names.
#[derive(Clone)]
pub struct Metrics {
    /// Expense notifications applied
    pub expenses_total: IntCounter,

    /// Transfer effects applied
    pub transfers_applied_total: IntCounter,

    /// Transfer effects reversed (update/delete paths)
    pub transfer_reversals_total: IntCounter,

    /// Settlement plans computed
    pub plans_computed_total: IntCounter,

    /// Groups currently materialized
    pub live_groups: IntGauge,

    /// Settlement computation latency
    pub plan_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let expenses_total = IntCounter::new(
            "balance_expenses_total",
            "Expense notifications applied to the ledger",
        )?;
        registry.register(Box::new(expenses_total.clone()))?;

        let transfers_applied_total = IntCounter::new(
            "balance_transfers_applied_total",
            "Transfer effects applied to the ledger",
        )?;
        registry.register(Box::new(transfers_applied_total.clone()))?;

        let transfer_reversals_total = IntCounter::new(
            "balance_transfer_reversals_total",
            "Transfer effects reversed on update or delete",
        )?;
        registry.register(Box::new(transfer_reversals_total.clone()))?;

        let plans_computed_total = IntCounter::new(
            "balance_plans_computed_total",
            "Settlement plans computed",
        )?;
        registry.register(Box::new(plans_computed_total.clone()))?;

        let live_groups = IntGauge::new(
            "balance_live_groups",
            "Groups currently materialized in the ledger",
        )?;
        registry.register(Box::new(live_groups.clone()))?;

        let plan_duration = Histogram::with_opts(
            HistogramOpts::new(
                "balance_plan_duration_seconds",
                "Settlement computation latency",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100]),
        )?;
        registry.register(Box::new(plan_duration.clone()))?;

        Ok(Self {
            expenses_total,
            transfers_applied_total,
            transfer_reversals_total,
            plans_computed_total,
            live_groups,
            plan_duration,
            registry,
        })
    }

    /// Record an expense application
    pub fn record_expense_applied(&self) {
        self.expenses_total.inc();
    }

    /// Record a transfer application
    pub fn record_transfer_applied(&self) {
        self.transfers_applied_total.inc();
    }

    /// Record a transfer reversal
    pub fn record_transfer_reversed(&self) {
        self.transfer_reversals_total.inc();
    }

    /// Record a settlement computation and its latency
    pub fn record_plan_computed(&self, duration_seconds: f64) {
        self.plans_computed_total.inc();
        self.plan_duration.observe(duration_seconds);
    }

    /// Update the live-group gauge
    pub fn update_live_groups(&self, count: i64) {
        self.live_groups.set(count);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("metric names are valid and the registry is fresh")
    }
}
