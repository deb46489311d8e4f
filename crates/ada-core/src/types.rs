//! Wire-facing wallet types: UTXOs, protocol parameters, fee schedules.
//!
//! All monetary values are in lovelace (1 ADA = 10^6 lovelace) and fit in
//! `u64`; intermediate fee arithmetic widens to `u128` where it multiplies.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::constants::RATE_PRECISION;

/// A 32-byte transaction id, displayed and serialized as lowercase hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    /// The zero id.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a transaction id from a 64-character hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let bytes: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for TxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid hex tx id"))
    }
}

/// A validated bech32 Shelley address.
///
/// Only the codec constructs these from untrusted strings; the wallet treats
/// the inner string as opaque.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an already-validated bech32 string.
    ///
    /// Callers other than a [`TxCodec`](crate::traits::TxCodec)
    /// implementation should go through `decode_address`.
    pub fn new_unchecked(bech32: impl Into<String>) -> Self {
        Self(bech32.into())
    }

    /// The bech32 string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An unspent transaction output as reported by the node.
///
/// Immutable once observed. The working set is replaced wholesale on each
/// `load` and patched from the submission echo after a send.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    /// Id of the transaction that created this output.
    #[serde(rename = "txHash")]
    pub tx_id: TxId,
    /// Output index within that transaction.
    pub index: u32,
    /// Owning address.
    pub address: Address,
    /// Value in lovelace.
    pub value: u64,
    /// Confirmation count at observation time.
    pub confirmations: u32,
}

/// Network-supplied protocol constants, refreshed on each `load`.
///
/// Miner fee for a sized transaction is `min_fee_a * size + min_fee_b`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolParams {
    /// Linear fee coefficient (per byte).
    pub min_fee_a: u64,
    /// Linear fee constant.
    pub min_fee_b: u64,
    /// Min-UTXO constant ("coins per UTxO word").
    pub coins_per_utxo_word: u64,
    /// Stake pool registration deposit.
    pub pool_deposit: u64,
    /// Stake key registration deposit.
    pub key_deposit: u64,
    /// Maximum serialized value size.
    pub max_val_size: u32,
    /// Maximum serialized transaction size.
    pub max_tx_size: u32,
}

/// A transaction output in a plan handed to the codec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    /// Destination address.
    pub address: Address,
    /// Value in lovelace.
    pub value: u64,
}

/// Finalized input/output/fee plan for the Transaction Assembler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxPlan {
    /// Selected inputs, in accumulation order.
    pub inputs: Vec<Utxo>,
    /// Outputs: destination, then optional CS-fee output, then optional change.
    pub outputs: Vec<TxOut>,
    /// Network miner fee in lovelace.
    pub miner_fee: u64,
}

/// An unsigned transaction body produced by the codec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxBody {
    /// Blake2b-256 body hash, signed by each witness.
    pub hash: TxId,
    /// Serialized body bytes.
    pub bytes: Vec<u8>,
}

/// A verification-key witness over a transaction body hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness {
    /// Raw Ed25519 public key.
    pub public_key: [u8; 32],
    /// Ed25519 signature over the body hash.
    pub signature: [u8; 64],
}

/// An input reference inside a submission echo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedInput {
    /// Id of the transaction whose output was spent.
    pub hash: TxId,
    /// Spent output index.
    pub index: u32,
}

/// An output inside a submission echo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedOutput {
    /// Receiving address.
    pub address: Address,
    /// Value in lovelace.
    pub value: u64,
    /// Output index within the applied transaction.
    pub index: u32,
}

/// Submission echo: the applied transaction as the node accepted it.
///
/// Used to reconcile the local UTXO set without waiting for the next `load`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedTransaction {
    /// Id of the applied transaction.
    pub hash: TxId,
    /// Inputs consumed.
    pub inputs: Vec<AppliedInput>,
    /// Outputs created.
    pub outputs: Vec<AppliedOutput>,
    /// Confirmations at echo time (usually zero).
    pub confirmations: u32,
}

/// One side of a historical transaction (input or plain output).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTxSide {
    /// Address on this side.
    pub address: Address,
    /// Value in lovelace.
    pub value: u64,
    /// Marked true by the node on outputs paying a CS-fee collector.
    #[serde(default, rename = "csfee")]
    pub cs_fee: bool,
}

/// A historical transaction page entry from the node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    /// Transaction id.
    pub hash: TxId,
    /// Inputs.
    pub inputs: Vec<RawTxSide>,
    /// Outputs.
    pub outputs: Vec<RawTxSide>,
    /// Miner fee paid.
    pub fee: u64,
    /// Confirmation count.
    pub confirmations: u32,
    /// Inclusion time, unix seconds.
    pub included_at: i64,
}

/// Fee schedule as served by the fee service, in display units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeScheduleDto {
    /// Percentage rate as a decimal fraction, e.g. 0.005.
    pub fee: f64,
    /// Minimum fee in display units (ADA).
    pub min_fee: f64,
    /// Maximum fee in display units (ADA).
    pub max_fee: f64,
    /// Exempt sub-minimum transactions instead of charging the minimum.
    #[serde(default)]
    pub skip_min_fee: bool,
    /// Collector addresses; an empty list disables the fee.
    #[serde(default)]
    pub addresses: Vec<String>,
    /// Sender addresses exempt from the fee.
    #[serde(default)]
    pub whitelist: Vec<String>,
}

/// Fee schedule converted to base units and fixed-point rate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Rate in parts per billion.
    pub rate_ppb: u64,
    /// Minimum fee in lovelace.
    pub min_fee: u64,
    /// Maximum fee in lovelace.
    pub max_fee: u64,
    /// Exempt sub-minimum transactions entirely.
    pub skip_min_fee: bool,
    /// Collector addresses; an empty list disables the fee.
    pub addresses: Vec<Address>,
    /// Sender addresses exempt from the fee.
    pub whitelist: Vec<Address>,
}

impl FeeSchedule {
    /// The disabled schedule, used when the fee service is unreachable.
    pub fn disabled() -> Self {
        Self {
            rate_ppb: 0,
            min_fee: 0,
            max_fee: 0,
            skip_min_fee: false,
            addresses: Vec::new(),
            whitelist: Vec::new(),
        }
    }

    /// Convert a service DTO into base units for an asset with the given
    /// number of decimals.
    pub fn from_dto(dto: &FeeScheduleDto, decimals: u32) -> Self {
        let unit = 10u64.pow(decimals) as f64;
        Self {
            rate_ppb: (dto.fee * RATE_PRECISION as f64).round() as u64,
            min_fee: (dto.min_fee * unit).round() as u64,
            max_fee: (dto.max_fee * unit).round() as u64,
            skip_min_fee: dto.skip_min_fee,
            addresses: dto.addresses.iter().cloned().map(Address::new_unchecked).collect(),
            whitelist: dto.whitelist.iter().cloned().map(Address::new_unchecked).collect(),
        }
    }

    /// True if the fee does not apply to the given sender.
    ///
    /// The fee is off when no collector address is configured or the sender
    /// is whitelisted.
    pub fn is_off_for(&self, sender: &Address) -> bool {
        self.addresses.is_empty() || self.whitelist.contains(sender)
    }

    /// First collector address, if any.
    pub fn collector(&self) -> Option<&Address> {
        self.addresses.first()
    }
}
