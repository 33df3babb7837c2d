//! Error types for event bus

use thiserror::Error;

/// Event bus error
#[derive(Debug, Error)]
pub enum Error {
    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// NATS publish error
    #[error("Publish error: {0}")]
    NatsPublish(String),

    /// NATS subscribe error
    #[error("Subscribe error: {0}")]
    NatsSubscribe(String),

    /// JetStream error
    #[error("JetStream error: {0}")]
    JetStream(String),

    /// Consumer group error
    #[error("Consumer group error: {0}")]
    ConsumerGroup(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Request timed out
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Handler error
    #[error("Handler error: {0}")]
    Handler(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
