//! Configuration for the settlement service

use serde::{Deserialize, Serialize};

/// Settlement service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Metrics listen address
    pub metrics_listen_addr: String,

    /// Event bus configuration
    pub bus: BusConfig,

    /// Ingestion configuration
    pub ingest: IngestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "settlement-service".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            metrics_listen_addr: "0.0.0.0:9091".to_string(),
            bus: BusConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

/// Event bus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// NATS server URL
    pub url: String,

    /// Consumer group name
    pub consumer_group: String,

    /// Durable consumer name
    pub durable_name: String,

    /// Use JetStream (vs core NATS)
    pub use_jetstream: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            consumer_group: "settlement-workers".to_string(),
            durable_name: "settlement-consumer".to_string(),
            use_jetstream: true,
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Capacity of the in-process ingest channel
    pub queue_capacity: usize,

    /// Prune all-zero groups from the ledger every N seconds (0 = never)
    pub prune_interval_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            prune_interval_secs: 0,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(url) = std::env::var("SETTLEMENT_NATS_URL") {
            config.bus.url = url;
        }

        if let Ok(group) = std::env::var("SETTLEMENT_CONSUMER_GROUP") {
            config.bus.consumer_group = group;
        }

        if let Ok(addr) = std::env::var("SETTLEMENT_METRICS_ADDR") {
            config.metrics_listen_addr = addr;
        }

        Ok(config)
    }
}
