//! Collaborator contracts between the wallet engine and the outside world.
//!
//! Three seams:
//! - [`NodeApi`] — the ledger node's HTTP API (async, network-bound)
//! - [`FeeScheduleApi`] — the operator's fee-schedule service (async)
//! - [`TxCodec`] — the ledger transaction codec: address handling, fee
//!   sizing, body building and witness assembly (pure, synchronous)
//!
//! The engine never talks to the network directly; retries and timeouts
//! belong to the implementations behind these traits.

use async_trait::async_trait;

use crate::constants::Network;
use crate::error::{CodecError, NodeError};
use crate::types::{
    Address, AppliedTransaction, FeeSchedule, ProtocolParams, RawTransaction, TxBody, TxOut,
    TxPlan, Utxo, Witness,
};

/// Ledger node API.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Current protocol parameters.
    async fn protocol_params(&self) -> Result<ProtocolParams, NodeError>;

    /// All UTXOs owned by an address.
    async fn utxos(&self, address: &Address) -> Result<Vec<Utxo>, NodeError>;

    /// One page of transaction history for an address.
    async fn transactions(
        &self,
        address: &Address,
        cursor: u64,
        count: u32,
    ) -> Result<Vec<RawTransaction>, NodeError>;

    /// Submit a signed transaction; the echo reports the applied inputs and
    /// outputs for local UTXO-set reconciliation.
    async fn submit(&self, transaction: &[u8]) -> Result<AppliedTransaction, NodeError>;
}

/// Fee-schedule service.
///
/// Callers must treat any error as "fee disabled" rather than propagate it.
#[async_trait]
pub trait FeeScheduleApi: Send + Sync {
    /// Fetch the fee schedule for an asset id such as `cardano@cardano`.
    async fn fee_schedule(&self, asset_id: &str) -> Result<FeeSchedule, NodeError>;
}

/// Ledger transaction codec.
///
/// Owns everything the wallet does not reimplement: bech32 address
/// decoding/encoding, min-UTXO computation, transaction sizing against the
/// linear fee formula, body serialization and witness assembly.
pub trait TxCodec: Send + Sync {
    /// Decode and validate a bech32 address string for the given network.
    fn decode_address(&self, bech32: &str, network: Network) -> Result<Address, CodecError>;

    /// Build a base address from raw payment and staking public keys.
    fn base_address(
        &self,
        payment_key: &[u8; 32],
        stake_key: &[u8; 32],
        network: Network,
    ) -> Address;

    /// Minimum value a standalone output must carry under these parameters.
    fn min_utxo_value(&self, params: &ProtocolParams) -> u64;

    /// Minimum miner fee for a transaction with these inputs and outputs.
    fn min_fee(
        &self,
        params: &ProtocolParams,
        inputs: &[Utxo],
        outputs: &[TxOut],
    ) -> Result<u64, CodecError>;

    /// Serialize a finalized plan into an unsigned body and its hash.
    fn build(&self, params: &ProtocolParams, plan: &TxPlan) -> Result<TxBody, CodecError>;

    /// Attach a witness and produce the signed, submittable bytes.
    fn assemble(&self, body: &TxBody, witness: &Witness) -> Result<Vec<u8>, CodecError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Object safety: verify each trait is dyn-compatible.
    fn _assert_object_safe(
        _node: &dyn NodeApi,
        _fees: &dyn FeeScheduleApi,
        _codec: &dyn TxCodec,
    ) {
    }
}
