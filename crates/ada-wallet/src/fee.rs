//! CS (service) fee calculation.
//!
//! The operator's layered fee is computed from a rate schedule fetched at
//! load time, independently of the network miner fee. All arithmetic is
//! integer fixed-point (parts per billion) and rounds down, in the user's
//! favor. The forward function has a closed-form inverse used for
//! max-amount estimation; the inverse is a close approximation, not an
//! exact fixed point (see [`reverse_cs_fee`]).

use ada_core::constants::RATE_PRECISION;
use ada_core::types::{Address, FeeSchedule};

/// Fee schedule resolved against a specific sender address.
///
/// `off` folds in the two exemptions decided at load time: no collector
/// addresses configured, or the sender is whitelisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsFeeConfig {
    /// The fee does not apply at all.
    pub off: bool,
    /// Rate in parts per billion.
    pub rate_ppb: u64,
    /// Minimum fee in lovelace.
    pub min_fee: u64,
    /// Maximum fee in lovelace.
    pub max_fee: u64,
    /// Exempt sub-minimum transactions entirely instead of charging the
    /// minimum.
    pub skip_min_fee: bool,
    /// Collector address receiving the fee output.
    pub collector: Option<Address>,
}

impl CsFeeConfig {
    /// The permanently-off configuration, used when the fee service is
    /// unreachable.
    pub fn disabled() -> Self {
        Self {
            off: true,
            rate_ppb: 0,
            min_fee: 0,
            max_fee: 0,
            skip_min_fee: false,
            collector: None,
        }
    }

    /// Resolve a fetched schedule against the wallet's own address.
    pub fn resolve(schedule: &FeeSchedule, sender: &Address) -> Self {
        Self {
            off: schedule.is_off_for(sender),
            rate_ppb: schedule.rate_ppb,
            min_fee: schedule.min_fee,
            max_fee: schedule.max_fee,
            skip_min_fee: schedule.skip_min_fee,
            collector: schedule.collector().cloned(),
        }
    }
}

/// Compute the CS fee for a sent value.
///
/// `floor(value * rate)`, exempted entirely when `skip_min_fee` and the raw
/// fee is below the minimum, otherwise clamped into `[min_fee, max_fee]`.
/// The result is finally floored at the dust threshold so the fee output
/// itself can never become an unspendable UTXO at the collector address.
pub fn calculate_cs_fee(value: u64, config: &CsFeeConfig, dust_threshold: u64) -> u64 {
    if config.off {
        return 0;
    }
    let raw = (value as u128 * config.rate_ppb as u128 / RATE_PRECISION as u128) as u64;
    if config.skip_min_fee && raw < config.min_fee {
        return 0;
    }
    let fee = raw.max(config.min_fee).min(config.max_fee);
    fee.max(dust_threshold)
}

/// Solve `value + fee = total_available` for the fee without search.
///
/// Uses the algebraic identity `reverse = floor(total * rate / (1 + rate))`,
/// re-clamped through the same min/max/dust rules as the forward
/// computation, then corrected with one `max` against the forward fee on
/// the remainder. The closed form can be up to one unit below the true
/// fixed point for some rate/rounding combinations; the correction
/// compensates only partially, which is a known approximation.
pub fn reverse_cs_fee(total_available: u64, config: &CsFeeConfig, dust_threshold: u64) -> u64 {
    if config.off {
        return 0;
    }
    let rate = config.rate_ppb as u128;
    let reverse = (total_available as u128 * rate / (RATE_PRECISION as u128 + rate)) as u64;
    if config.skip_min_fee && reverse < config.min_fee {
        return 0;
    }
    let reverse = reverse
        .max(config.min_fee)
        .min(config.max_fee)
        .max(dust_threshold);
    let forward = calculate_cs_fee(
        total_available.saturating_sub(reverse),
        config,
        dust_threshold,
    );
    reverse.max(forward)
}
