//! NATS client with lazy connection and JetStream access

use crate::{Error, Result};
use async_nats::jetstream;
use tokio::sync::RwLock;
use tracing::info;

/// NATS connection configuration
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// Server URL
    pub url: String,

    /// Client name reported to the server
    pub client_name: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            client_name: "settleup".to_string(),
        }
    }
}

/// NATS client
///
/// The connection is established lazily on first use so services can be
/// constructed (and unit-tested) without a running broker.
pub struct NatsClient {
    config: NatsConfig,
    connection: RwLock<Option<async_nats::Client>>,
}

impl NatsClient {
    /// Create new client (does not connect)
    pub fn new(config: NatsConfig) -> Self {
        Self {
            config,
            connection: RwLock::new(None),
        }
    }

    /// Get the underlying connection, connecting on first use
    pub async fn client(&self) -> Result<async_nats::Client> {
        {
            let guard = self.connection.read().await;
            if let Some(client) = guard.as_ref() {
                return Ok(client.clone());
            }
        }

        let mut guard = self.connection.write().await;
        // Another task may have connected while we waited for the write lock.
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        info!("Connecting to NATS at {}", self.config.url);
        let client = async_nats::ConnectOptions::new()
            .name(&self.config.client_name)
            .connect(&self.config.url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        *guard = Some(client.clone());
        Ok(client)
    }

    /// Get a JetStream context
    pub async fn jetstream(&self) -> Result<jetstream::Context> {
        let client = self.client().await?;
        Ok(jetstream::new(client))
    }

    /// Ensure a stream exists, creating it if necessary
    pub async fn get_or_create_stream(
        &self,
        name: &str,
        subjects: Vec<String>,
    ) -> Result<()> {
        let js = self.jetstream().await?;

        js.get_or_create_stream(jetstream::stream::Config {
            name: name.to_string(),
            subjects,
            ..Default::default()
        })
        .await
        .map_err(|e| Error::JetStream(e.to_string()))?;

        Ok(())
    }
}

impl std::fmt::Debug for NatsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsClient")
            .field("url", &self.config.url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = NatsConfig::default();
        assert_eq!(config.url, "nats://localhost:4222");
    }

    #[tokio::test]
    async fn test_client_creation_does_not_connect() {
        let client = NatsClient::new(NatsConfig::default());
        assert!(client.connection.read().await.is_none());
    }
}
