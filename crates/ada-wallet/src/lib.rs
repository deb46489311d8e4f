//! # ada-wallet — single-address Cardano wallet engine.
//!
//! Derives Ed25519 keys from a seed along the CIP-1852 path, selects
//! spendable UTXOs largest-first, computes the layered fee (network miner
//! fee plus an optional operator service fee), and plans balanced
//! transactions for an external ledger codec to serialize. Network access
//! and transaction CBOR live behind the [`ada_core::traits`] seams.
//!
//! # Modules
//!
//! - [`error`] — `WalletError` taxonomy
//! - [`keys`] — BIP32-Ed25519 derivation, extended-key signing
//! - [`coin_selection`] — confirmation filtering, ranking, input cap
//! - [`fee`] — service-fee forward and reverse calculation
//! - [`estimator`] — fee and max-amount estimation
//! - [`builder`] — payment planning
//! - [`wallet`] — high-level wallet composition
//! - [`config`] — static wallet settings

pub mod builder;
pub mod coin_selection;
pub mod config;
pub mod error;
pub mod estimator;
pub mod fee;
pub mod keys;
pub mod wallet;

// Re-exports for convenient access
pub use builder::TxPlanner;
pub use config::WalletConfig;
pub use error::WalletError;
pub use estimator::{FeeEstimate, FeeEstimator};
pub use fee::{CsFeeConfig, calculate_cs_fee, reverse_cs_fee};
pub use keys::{DerivationPath, Xprv, Xpub};
pub use wallet::{
    SignedTransaction, TxHistoryPage, UnsignedTransaction, Wallet, WalletTransaction,
};
