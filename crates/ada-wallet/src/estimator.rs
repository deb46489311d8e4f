//! Fee and max-amount estimation over the loaded UTXO set.
//!
//! Estimation prices hypothetical transactions without building them. The
//! miner fee depends on the number of inputs, so the estimator walks the
//! ranked UTXO list and prices the first prefix that covers the requested
//! amount, using dust-valued placeholder outputs to the wallet's own
//! address for sizing.

use ada_core::traits::TxCodec;
use ada_core::types::{Address, ProtocolParams, TxOut, Utxo};
use tracing::trace;

use crate::error::WalletError;
use crate::fee::{CsFeeConfig, calculate_cs_fee, reverse_cs_fee};

/// The priced layers of a hypothetical payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeEstimate {
    /// Network miner fee in lovelace, including any folded dust change.
    pub miner_fee: u64,
    /// Service fee in lovelace.
    pub cs_fee: u64,
    /// Change returned to the wallet, zero when folded.
    pub change: u64,
}

impl FeeEstimate {
    /// Total fee the sender pays on top of the amount.
    pub fn total(&self) -> u64 {
        self.miner_fee + self.cs_fee
    }
}

/// Prices payments against a fixed snapshot of wallet state.
///
/// Borrows the loaded state; a new estimator is constructed per call so a
/// reload can never leak stale parameters into an estimate.
pub struct FeeEstimator<'a> {
    codec: &'a dyn TxCodec,
    params: &'a ProtocolParams,
    cs_config: &'a CsFeeConfig,
    dust_threshold: u64,
    own_address: &'a Address,
    /// Spendable UTXOs, ranked largest-first and capped.
    utxos: &'a [Utxo],
}

impl<'a> FeeEstimator<'a> {
    pub fn new(
        codec: &'a dyn TxCodec,
        params: &'a ProtocolParams,
        cs_config: &'a CsFeeConfig,
        dust_threshold: u64,
        own_address: &'a Address,
        utxos: &'a [Utxo],
    ) -> Self {
        Self {
            codec,
            params,
            cs_config,
            dust_threshold,
            own_address,
            utxos,
        }
    }

    /// Miner fee for a transaction spending `inputs` with `output_count`
    /// placeholder outputs to our own address.
    ///
    /// Placeholder values only influence sizing through their byte length,
    /// so the dust threshold stands in for every real value.
    fn placeholder_fee(&self, inputs: &[Utxo], output_count: usize) -> Result<u64, WalletError> {
        let outputs: Vec<TxOut> = (0..output_count)
            .map(|_| TxOut {
                address: self.own_address.clone(),
                value: self.dust_threshold,
            })
            .collect();
        Ok(self.codec.min_fee(self.params, inputs, &outputs)?)
    }

    /// Price sending `amount` lovelace.
    ///
    /// Walks the ranked UTXO list accumulating inputs. Once the accumulated
    /// value exceeds the amount, prices that prefix; if amount plus both fee
    /// layers fits, the remainder is change, with sub-dust change folded
    /// into the miner fee. When no prefix fits, prices the full list with
    /// no change as an upper bound so callers still get a usable figure for
    /// insufficient-funds reporting.
    pub fn estimate_fee(&self, amount: u64) -> Result<FeeEstimate, WalletError> {
        let cs_fee = calculate_cs_fee(amount, self.cs_config, self.dust_threshold);
        let output_count = if cs_fee == 0 { 2 } else { 3 };

        let mut available: u64 = 0;
        for count in 1..=self.utxos.len() {
            available = available.saturating_add(self.utxos[count - 1].value);
            if available <= amount {
                continue;
            }
            let inputs = &self.utxos[..count];
            let mut miner_fee = self.placeholder_fee(inputs, output_count)?;
            let total = amount.saturating_add(cs_fee).saturating_add(miner_fee);
            if total <= available {
                let mut change = available - total;
                if change > 0 && change <= self.dust_threshold {
                    miner_fee += change;
                    change = 0;
                }
                trace!(amount, inputs = count, miner_fee, cs_fee, change, "fee estimated");
                return Ok(FeeEstimate {
                    miner_fee,
                    cs_fee,
                    change,
                });
            }
        }

        let miner_fee = self.placeholder_fee(self.utxos, output_count)?;
        trace!(amount, inputs = self.utxos.len(), miner_fee, cs_fee, "fee estimated over full set");
        Ok(FeeEstimate {
            miner_fee,
            cs_fee,
            change: 0,
        })
    }

    /// The largest amount the wallet can send, spending every spendable
    /// UTXO with no change output.
    ///
    /// The miner fee is priced over the whole set; the service fee is
    /// recovered from the remainder with the reverse rate formula.
    pub fn max_amount(&self) -> Result<u64, WalletError> {
        let available: u64 = self.utxos.iter().map(|u| u.value).sum();
        if available == 0 {
            return Ok(0);
        }
        let output_count = if self.cs_config.off { 2 } else { 3 };
        let miner_fee = self.placeholder_fee(self.utxos, output_count)?;
        if available <= miner_fee {
            return Ok(0);
        }
        let after_miner = available - miner_fee;
        let cs_fee = reverse_cs_fee(after_miner, self.cs_config, self.dust_threshold);
        Ok(after_miner.saturating_sub(cs_fee))
    }
}
