//! Settlement Service
//!
//! Computes debt-netting settlement plans over the shared balance ledger and
//! keeps that ledger in sync with recorded expenses and transfers.
//!
//! # Architecture
//!
//! 1. **Ingestion**: an expense-event consumer feeds the balance ledger
//! 2. **Transfer bookkeeping**: record/update/delete of manually executed
//!    transfers; update and delete reverse the old effect before anything else
//! 3. **Planning**: a greedy netting pass over one group's snapshot emits a
//!    minimal-ish transfer sequence that zeroes every balance
//!
//! # Netting Algorithm
//!
//! Greedy two-cursor matching:
//! - partition members into creditors and debtors
//! - sort both sides by magnitude, largest first (ties by ascending member id)
//! - repeatedly transfer `min(remaining debt, remaining credit)` from the
//!   current debtor to the current creditor
//!
//! The plan always zeroes every balance and conserves money exactly; the
//! transfer count is minimal for most balance distributions but not
//! guaranteed minimal in general.
//!
//! # Example
//!
//! ```
//! use balance_core::{BalanceLedger, GroupId, MemberId};
//! use rust_decimal::Decimal;
//! use settlement::SettlementPlanner;
//!
//! let ledger = BalanceLedger::new();
//! let group = GroupId::new(1);
//! ledger.credit(group, MemberId::new(1), Decimal::from(10));
//! ledger.debit(group, MemberId::new(2), Decimal::from(10));
//!
//! let plan = SettlementPlanner::new().plan(&ledger.snapshot(group));
//! assert_eq!(plan.transfers.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod consumer;
pub mod engine;
pub mod error;
pub mod membership;
pub mod netting;
pub mod store;
pub mod types;

// Re-exports
pub use config::Config;
pub use consumer::{spawn_ingest_worker, ExpenseConsumer};
pub use engine::SettlementEngine;
pub use error::{Error, Result};
pub use membership::{MembershipOracle, PermissiveOracle, StaticRoster};
pub use netting::SettlementPlanner;
pub use store::{InMemoryTransferStore, TransferStore};
pub use types::*;
