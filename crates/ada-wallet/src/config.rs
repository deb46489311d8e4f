//! Wallet configuration.

use ada_core::constants::{DEFAULT_MIN_CONFIRMATIONS, Network};
use serde::{Deserialize, Serialize};

/// Static wallet settings, fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletConfig {
    /// Network the wallet operates on.
    pub network: Network,
    /// Hardened account index under `m/1852'/1815'`.
    pub account_index: u32,
    /// Confirmations a UTXO needs before it is spendable.
    pub min_confirmations: u32,
    /// Asset identifier sent to the fee-schedule service.
    pub asset_id: String,
    /// History page size for transaction listing.
    pub tx_page_size: u32,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            account_index: 0,
            min_confirmations: DEFAULT_MIN_CONFIRMATIONS,
            asset_id: "cardano@cardano".to_string(),
            tx_page_size: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = WalletConfig::default();
        assert_eq!(cfg.network, Network::Mainnet);
        assert_eq!(cfg.account_index, 0);
        assert_eq!(cfg.min_confirmations, DEFAULT_MIN_CONFIRMATIONS);
        assert_eq!(cfg.asset_id, "cardano@cardano");
    }

    #[test]
    fn deserializes_partial_config() {
        let cfg: WalletConfig =
            serde_json::from_str(r#"{"network":"testnet","minConfirmations":1}"#).unwrap();
        assert_eq!(cfg.network, Network::Testnet);
        assert_eq!(cfg.min_confirmations, 1);
        assert_eq!(cfg.account_index, 0);
    }
}
