//! Settlement service binary
//!
//! Wires the expense-event subscriber to the settlement engine and runs
//! until interrupted. Request-facing surfaces (HTTP, membership lookups)
//! live in the surrounding services; this process only consumes events and
//! keeps the ledger current.

use anyhow::Result;
use event_bus::{MessageType, NatsClient, NatsConfig, Subscriber};
use event_bus::subscriber::SubscriberConfig;
use settlement::{
    Config, ExpenseConsumer, InMemoryTransferStore, PermissiveOracle, SettlementEngine,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting SettleUp Settlement Service");

    // Load configuration
    let config = Config::from_env()?;

    // Assemble the engine
    let engine_ledger = Arc::new(balance_core::BalanceLedger::new());
    let store = Arc::new(InMemoryTransferStore::new());
    let membership = Arc::new(PermissiveOracle);
    let engine = Arc::new(SettlementEngine::new(
        engine_ledger.clone(),
        store,
        membership,
    )?);

    // Subscribe to expense events
    let nats = Arc::new(NatsClient::new(NatsConfig {
        url: config.bus.url.clone(),
        client_name: config.service_name.clone(),
    }));
    let subscriber = Subscriber::new(
        nats,
        SubscriberConfig {
            consumer_group: config.bus.consumer_group.clone(),
            durable_name: config.bus.durable_name.clone(),
            use_jetstream: config.bus.use_jetstream,
            ..Default::default()
        },
        MessageType::ExpenseRecorded,
    );
    let consumer = Arc::new(ExpenseConsumer::new(engine.clone()));

    let subscription = tokio::spawn(async move {
        if let Err(e) = subscriber.subscribe(consumer).await {
            tracing::error!("Expense subscription terminated: {}", e);
        }
    });

    // Optional housekeeping: drop fully settled groups on an interval.
    let pruner = match config.ingest.prune_interval_secs {
        0 => None,
        secs => {
            let ledger = engine_ledger.clone();
            Some(tokio::spawn(async move {
                let mut ticker =
                    tokio::time::interval(std::time::Duration::from_secs(secs));
                loop {
                    ticker.tick().await;
                    let pruned = ledger.prune_settled_groups();
                    if pruned > 0 {
                        tracing::debug!(pruned, "dropped settled groups");
                    }
                }
            }))
        }
    };

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down settlement service");
    subscription.abort();
    if let Some(pruner) = pruner {
        pruner.abort();
    }
    Ok(())
}
