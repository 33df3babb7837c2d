//! Error types for the settlement service

use balance_core::{GroupId, MemberId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Balance-core error
    #[error("Ledger error: {0}")]
    Ledger(#[from] balance_core::Error),

    /// Transfer record missing from the store
    #[error("Transfer not found: {0}")]
    TransferNotFound(u64),

    /// Group unknown to the membership oracle
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    /// Member not part of the group
    #[error("Member {member} is not part of group {group}")]
    MemberNotFound {
        /// Group that was checked
        group: GroupId,
        /// Member that was missing
        member: MemberId,
    },

    /// Transfer amount must be positive
    #[error("Invalid transfer amount: {0} (must be positive)")]
    InvalidAmount(Decimal),

    /// Event bus error
    #[error("Event bus error: {0}")]
    Bus(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<event_bus::Error> for Error {
    fn from(err: event_bus::Error) -> Self {
        Error::Bus(err.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
