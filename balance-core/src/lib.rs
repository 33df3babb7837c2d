//! SettleUp Balance Core
//!
//! In-memory, concurrent per-group balance ledger for shared expenses.
//!
//! # Architecture
//!
//! - **Balance table**: sharded concurrent map, group → member → net balance
//! - **Expense ingestion**: payer credited the total, each share debited
//! - **Transfer application**: symmetric credit/debit pair, reversible by
//!   swapping endpoints
//! - **Exact arithmetic**: all money is `Decimal`, never binary floats
//!
//! # Invariants
//!
//! - Zero-sum: within a group, balances always sum to exactly zero once all
//!   mutations of an expense or transfer have landed
//! - Per-key atomicity: concurrent mutations of the same (group, member)
//!   entry never lose updates
//! - No global lock: different groups mutate fully in parallel
//!
//! The ledger is deliberately not durable. It is rebuildable by replaying the
//! expense event history and the recorded transfers.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod error;
pub mod ingest;
pub mod ledger;
pub mod metrics;
pub mod transfer;
pub mod types;

// Re-exports
pub use error::{Error, Result};
pub use ingest::record_expense;
pub use ledger::BalanceLedger;
pub use metrics::Metrics;
pub use transfer::{apply_transfer, TransferEffect};
pub use types::{BalanceSnapshot, ExpenseNotification, GroupId, MemberId};
