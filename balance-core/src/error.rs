//! Error types for the balance core

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for balance-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Balance-core errors
///
/// The ledger itself has almost no failure modes; it performs exact
/// arithmetic on already-validated inputs. What remains is input validation
/// at the component boundaries.
#[derive(Error, Debug)]
pub enum Error {
    /// Amount would invert the operation's meaning
    #[error("Invalid amount: {0} (must not be negative)")]
    InvalidAmount(Decimal),

    /// Generic error
    #[error("{0}")]
    Other(String),
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
