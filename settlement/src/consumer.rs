//! Expense event consumption
//!
//! Two entry points feed the same mutation path:
//! - `ExpenseConsumer` plugs into the event bus subscriber for broker-driven
//!   deployments
//! - `spawn_ingest_worker` drains an in-process channel, for tests and
//!   embedded setups
//!
//! Either way the consumer only decodes and delegates; all balance arithmetic
//! stays in the engine and ledger.

use crate::engine::SettlementEngine;
use balance_core::ExpenseNotification;
use event_bus::{Message, MessageHandler};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handler that applies expense-recorded events to the ledger
pub struct ExpenseConsumer {
    engine: Arc<SettlementEngine>,
}

impl ExpenseConsumer {
    /// Create new consumer
    pub fn new(engine: Arc<SettlementEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait::async_trait]
impl MessageHandler for ExpenseConsumer {
    async fn handle(&self, message: Message) -> event_bus::Result<()> {
        let event: ExpenseNotification = match serde_json::from_value(message.payload) {
            Ok(event) => event,
            Err(e) => {
                // A malformed payload will not decode on redelivery either;
                // drop it instead of erroring into a NAK loop.
                tracing::error!(
                    message_id = %message.id,
                    error = %e,
                    "discarding undecodable expense event"
                );
                return Ok(());
            }
        };

        self.engine.handle_expense(&event);
        Ok(())
    }
}

impl std::fmt::Debug for ExpenseConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpenseConsumer").finish_non_exhaustive()
    }
}

/// Spawn a worker task that drains expense notifications from a channel and
/// applies them to the ledger. The worker exits when every sender is dropped.
pub fn spawn_ingest_worker(
    engine: Arc<SettlementEngine>,
    mut rx: mpsc::Receiver<ExpenseNotification>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            engine.handle_expense(&event);
        }
        tracing::debug!("ingest channel closed, worker exiting");
    })
}
