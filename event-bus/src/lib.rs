//! Event Bus with NATS support
//!
//! Pub/sub plumbing for expense and settlement events:
//! - Partitioning by group id, so one group's events land on one partition
//! - JetStream for persistence and at-least-once delivery
//! - Consumer groups for load balancing
//! - Retry logic with exponential backoff on publish
//! - Observability via Prometheus metrics

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod client;
pub mod error;
pub mod message;
pub mod metrics;
pub mod publisher;
pub mod subscriber;
pub mod types;

pub use client::{NatsClient, NatsConfig};
pub use error::{Error, Result};
pub use message::Message;
pub use publisher::Publisher;
pub use subscriber::{MessageHandler, Subscriber};
pub use types::{MessageType, PartitionKey};
