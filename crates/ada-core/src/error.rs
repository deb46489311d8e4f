//! Error types shared by the collaborator contracts.

use thiserror::Error;

/// Errors from the ledger-node API collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// Transport-level failure (connection, timeout, DNS).
    #[error("transport: {0}")]
    Transport(String),

    /// The node answered with an error status.
    #[error("node rejected request: {0}")]
    Rejected(String),

    /// The node's response could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors from the ledger transaction codec collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The address string is not a valid bech32 Shelley address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The transaction exceeds a protocol limit (size, value).
    #[error("transaction limit exceeded: {0}")]
    LimitExceeded(String),

    /// Serialization of the transaction body failed.
    #[error("serialization: {0}")]
    Serialization(String),
}
