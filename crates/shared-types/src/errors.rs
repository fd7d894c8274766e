//! # Error Types
//!
//! Errors produced while parsing identifiers from their textual form.

use thiserror::Error;

/// Errors that can occur when parsing a `TransactionId` or `StateRef`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The transaction id is not valid hexadecimal.
    #[error("Invalid hex in transaction id: {0}")]
    InvalidHex(String),

    /// The transaction id does not decode to 32 bytes.
    #[error("Invalid transaction id length: expected 32 bytes, got {actual}")]
    InvalidLength { actual: usize },

    /// The state reference has no `:<index>` suffix.
    #[error("State reference '{0}' is missing the ':<index>' suffix")]
    MissingIndex(String),

    /// The output index is not an unsigned 32-bit integer.
    #[error("Invalid output index '{0}' in state reference")]
    InvalidIndex(String),
}
