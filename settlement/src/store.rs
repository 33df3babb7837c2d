//! Transfer history store
//!
//! The settlement engine only needs the store to recover a transfer's prior
//! values when updating or deleting it; durability is the deployment's
//! concern. The trait keeps the engine testable and lets a database-backed
//! implementation slot in without touching the core.

use crate::error::{Error, Result};
use crate::types::{Transfer, TransferDraft, TransferId};
use async_trait::async_trait;
use balance_core::GroupId;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Durable store contract for transfer records
#[async_trait]
pub trait TransferStore: Send + Sync {
    /// Persist a new transfer, assigning its ID
    async fn insert(&self, draft: TransferDraft) -> Result<Transfer>;

    /// Fetch a transfer by ID
    async fn get(&self, id: TransferId) -> Result<Option<Transfer>>;

    /// Replace an existing transfer's values
    async fn update(&self, transfer: Transfer) -> Result<()>;

    /// Remove a transfer
    async fn delete(&self, id: TransferId) -> Result<()>;

    /// All transfers recorded for a group, oldest first
    async fn list_by_group(&self, group: GroupId) -> Result<Vec<Transfer>>;
}

/// In-memory transfer store
///
/// Backs tests and single-node deployments; IDs are assigned from a
/// process-local sequence.
#[derive(Debug, Default)]
pub struct InMemoryTransferStore {
    transfers: DashMap<TransferId, Transfer>,
    next_id: AtomicU64,
}

impl InMemoryTransferStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransferStore for InMemoryTransferStore {
    async fn insert(&self, draft: TransferDraft) -> Result<Transfer> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;

        let transfer = Transfer {
            id,
            group_id: draft.group_id,
            from_member_id: draft.from_member_id,
            to_member_id: draft.to_member_id,
            amount: draft.amount,
            note: draft.note,
            recorded_at: Utc::now(),
        };

        self.transfers.insert(id, transfer.clone());
        Ok(transfer)
    }

    async fn get(&self, id: TransferId) -> Result<Option<Transfer>> {
        Ok(self.transfers.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update(&self, transfer: Transfer) -> Result<()> {
        match self.transfers.get_mut(&transfer.id) {
            Some(mut entry) => {
                *entry = transfer;
                Ok(())
            }
            None => Err(Error::TransferNotFound(transfer.id)),
        }
    }

    async fn delete(&self, id: TransferId) -> Result<()> {
        match self.transfers.remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::TransferNotFound(id)),
        }
    }

    async fn list_by_group(&self, group: GroupId) -> Result<Vec<Transfer>> {
        let mut transfers: Vec<Transfer> = self
            .transfers
            .iter()
            .filter(|entry| entry.group_id == group)
            .map(|entry| entry.value().clone())
            .collect();

        transfers.sort_by_key(|t| t.id);
        Ok(transfers)
    }
}
