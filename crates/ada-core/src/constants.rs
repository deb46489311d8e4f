//! Protocol and engine constants. All monetary values in lovelace
//! (1 ADA = 10^6 lovelace).

/// Lovelace per ADA.
pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// Network-defined floor for the dust threshold.
///
/// A standalone output below this value is not economically valid on
/// Cardano, whatever the protocol parameters say.
pub const DUST_FLOOR: u64 = LOVELACE_PER_ADA;

/// Hard ceiling on inputs per transaction.
///
/// The serialization library rejects larger input sets; balance and
/// max-amount math must be computed over the same truncated set.
pub const MAX_INPUTS_PER_TX: usize = 400;

/// Fixed-point precision for the CS fee rate (parts per billion).
pub const RATE_PRECISION: u64 = 1_000_000_000;

/// CIP-1852 purpose index (pre-hardening).
pub const PURPOSE: u32 = 1852;

/// Cardano coin type index (pre-hardening).
pub const COIN_TYPE: u32 = 1815;

/// Default confirmation depth before a UTXO is spendable.
pub const DEFAULT_MIN_CONFIRMATIONS: u32 = 3;

/// Network identifier: Mainnet or the preprod Testnet.
///
/// Selects the address network tag used by the codec when rendering
/// base addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    #[default]
    Mainnet,
    /// Preprod test network.
    Testnet,
}

impl Network {
    /// Network id byte embedded in Shelley addresses.
    pub fn id(&self) -> u8 {
        match self {
            Self::Mainnet => 1,
            Self::Testnet => 0,
        }
    }

    /// Bech32 human-readable prefix for addresses on this network.
    pub fn address_hrp(&self) -> &'static str {
        match self {
            Self::Mainnet => "addr",
            Self::Testnet => "addr_test",
        }
    }
}
