//! # ada-core — shared types and contracts for the Cardano wallet engine.
//!
//! Defines the data model (UTXOs, protocol parameters, fee schedules,
//! transaction plans) and the three collaborator contracts the engine is
//! built against: the ledger node API, the fee-schedule service, and the
//! ledger transaction codec.
//!
//! # Modules
//!
//! - [`constants`] — lovelace units, input ceiling, CIP-1852 indices
//! - [`error`] — `NodeError`, `CodecError`
//! - [`types`] — wire-facing data model
//! - [`traits`] — `NodeApi`, `FeeScheduleApi`, `TxCodec`

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-exports for convenient access
pub use constants::Network;
pub use error::{CodecError, NodeError};
pub use traits::{FeeScheduleApi, NodeApi, TxCodec};
pub use types::{
    Address, AppliedTransaction, FeeSchedule, FeeScheduleDto, ProtocolParams, RawTransaction,
    TxBody, TxId, TxOut, TxPlan, Utxo, Witness,
};
