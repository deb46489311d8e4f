//! Payment planning: validation, input accumulation and output layout.
//!
//! The planner turns a validated payment request into a [`TxPlan`] the
//! codec can serialize. It never signs and never touches the network; the
//! caller supplies a snapshot of spendable UTXOs and the resolved fee
//! configuration.

use ada_core::constants::Network;
use ada_core::error::CodecError;
use ada_core::traits::TxCodec;
use ada_core::types::{Address, ProtocolParams, TxOut, TxPlan, Utxo};
use tracing::debug;

use crate::error::WalletError;
use crate::fee::{CsFeeConfig, calculate_cs_fee};

/// Plans payments against a fixed snapshot of wallet state.
pub struct TxPlanner<'a> {
    codec: &'a dyn TxCodec,
    params: &'a ProtocolParams,
    cs_config: &'a CsFeeConfig,
    dust_threshold: u64,
    own_address: &'a Address,
    network: Network,
    /// Spendable UTXOs, ranked largest-first and capped.
    utxos: &'a [Utxo],
    /// Total wallet value including unconfirmed UTXOs, for distinguishing
    /// a true shortfall from one that clears with the next blocks.
    total_balance: u64,
}

impl<'a> TxPlanner<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        codec: &'a dyn TxCodec,
        params: &'a ProtocolParams,
        cs_config: &'a CsFeeConfig,
        dust_threshold: u64,
        own_address: &'a Address,
        network: Network,
        utxos: &'a [Utxo],
        total_balance: u64,
    ) -> Self {
        Self {
            codec,
            params,
            cs_config,
            dust_threshold,
            own_address,
            network,
            utxos,
            total_balance,
        }
    }

    /// Plan sending `amount` lovelace to `destination` with a total fee of
    /// `fee` (service fee plus miner fee, as returned by estimation).
    ///
    /// Inputs are accumulated largest-first until they cover amount plus
    /// fee. Change at or below the dust threshold is folded into the miner
    /// fee instead of creating an unspendable output. The requested fee is
    /// rejected if its miner share falls below the codec's minimum for the
    /// final input and output sets.
    pub fn plan(&self, destination: &str, amount: u64, fee: u64) -> Result<TxPlan, WalletError> {
        let destination = self
            .codec
            .decode_address(destination, self.network)
            .map_err(|e| match e {
                CodecError::InvalidAddress(s) => WalletError::InvalidAddress(s),
                other => WalletError::Codec(other),
            })?;
        if destination == *self.own_address {
            return Err(WalletError::DestinationEqualsSource);
        }
        if amount < self.dust_threshold {
            return Err(WalletError::SmallAmount {
                dust_threshold: self.dust_threshold,
            });
        }

        let cs_fee = calculate_cs_fee(amount, self.cs_config, self.dust_threshold);
        if fee < cs_fee {
            return Err(WalletError::InvalidFee);
        }

        let total = amount.saturating_add(fee);
        let mut inputs: Vec<Utxo> = Vec::new();
        let mut available: u64 = 0;
        let mut change: u64 = 0;
        for utxo in self.utxos {
            available = available.saturating_add(utxo.value);
            inputs.push(utxo.clone());
            if available < total {
                continue;
            }
            change = available - total;
            if change <= self.dust_threshold {
                change = 0;
            }
            break;
        }
        if total > available {
            return Err(WalletError::InsufficientFunds {
                have: available,
                need: total,
                pending: total <= self.total_balance,
            });
        }

        let mut outputs = vec![TxOut {
            address: destination,
            value: amount,
        }];
        if cs_fee > 0 {
            // A nonzero fee implies a configured collector.
            if let Some(collector) = &self.cs_config.collector {
                outputs.push(TxOut {
                    address: collector.clone(),
                    value: cs_fee,
                });
            }
        }
        if change > 0 {
            outputs.push(TxOut {
                address: self.own_address.clone(),
                value: change,
            });
        }

        // The requested fee was estimated with placeholder outputs; the
        // real output set must still clear the protocol minimum.
        let min_miner_fee = self.codec.min_fee(self.params, &inputs, &outputs)?;
        if fee - cs_fee < min_miner_fee {
            return Err(WalletError::InvalidFee);
        }

        // Whatever the outputs do not claim goes to the miner, including
        // any folded dust change.
        let miner_fee = available - amount - cs_fee - change;
        debug!(
            amount,
            inputs = inputs.len(),
            outputs = outputs.len(),
            miner_fee,
            cs_fee,
            change,
            "payment planned"
        );
        Ok(TxPlan {
            inputs,
            outputs,
            miner_fee,
        })
    }
}
