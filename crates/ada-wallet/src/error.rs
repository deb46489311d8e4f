//! Wallet error taxonomy.
//!
//! Every variant is terminal to the call that raised it: no wallet state is
//! mutated on a rejected operation. Collaborator failures surface through the
//! transparent variants, except the fee-schedule service whose failures are
//! swallowed at the call site and degrade to "fee disabled".

use ada_core::error::{CodecError, NodeError};
use thiserror::Error;

/// Errors that can occur in wallet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Malformed or wrong-network destination address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Destination equals the wallet's own address.
    #[error("destination address equals source address")]
    DestinationEqualsSource,

    /// Amount is below the dust threshold (carried for display).
    #[error("amount is below the dust threshold of {dust_threshold}")]
    SmallAmount {
        /// Minimum sendable amount in lovelace.
        dust_threshold: u64,
    },

    /// Amount exceeds the spendable maximum.
    #[error("amount exceeds the maximum of {max_amount}")]
    BigAmount {
        /// Spendable maximum in lovelace.
        max_amount: u64,
    },

    /// Amount exceeds the confirmed maximum but would be covered once
    /// pending deposits confirm.
    #[error("amount exceeds the confirmed maximum of {max_amount}; additional funds pending")]
    BigAmountConfirmationPending {
        /// Confirmed spendable maximum in lovelace.
        max_amount: u64,
    },

    /// Selected confirmed UTXOs cannot cover amount plus fee. `pending` is
    /// set when including not-yet-confirmed UTXOs would cover the shortfall.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Available confirmed value in lovelace.
        have: u64,
        /// Required amount plus fee in lovelace.
        need: u64,
        /// More funds become available after confirmation.
        pending: bool,
    },

    /// Caller-proposed fee under-covers the computed requirement.
    #[error("invalid fee")]
    InvalidFee,

    /// Hardened derivation requested on a public-only key.
    #[error("unsupported derivation: hardened index requires the private key")]
    UnsupportedDerivation,

    /// Seed bytes have an unusable length.
    #[error("invalid seed length: {0}")]
    InvalidSeed(usize),

    /// Seed provided to `unlock` derives a different account key.
    #[error("seed does not match this wallet")]
    SeedMismatch,

    /// Derivation path string could not be parsed.
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    /// Public key bytes do not encode a curve point.
    #[error("invalid public key bytes")]
    InvalidPublicKey,

    /// A signing operation was attempted while the wallet is locked.
    #[error("wallet is locked")]
    Locked,

    /// An operation needing chain state ran before `load()`.
    #[error("wallet is not loaded")]
    NotLoaded,

    /// Ledger node API failure.
    #[error(transparent)]
    Node(#[from] NodeError),

    /// Transaction codec failure.
    #[error(transparent)]
    Codec(#[from] CodecError),
}
