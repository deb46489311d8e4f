//! UTXO selection: filter by confirmation depth, rank largest-first,
//! truncate to the per-transaction input ceiling.
//!
//! Largest-first minimizes the input count and therefore the miner fee. The
//! same ranked set feeds fee estimation, max-amount computation and
//! transaction construction, so all three agree on what is spendable.

use ada_core::constants::MAX_INPUTS_PER_TX;
use ada_core::types::Utxo;

/// Select the spendable UTXO candidates from a working set.
///
/// A UTXO qualifies iff `include_unconfirmed` or its confirmation count is
/// at least `min_confirmations`. Qualifying UTXOs are ordered descending by
/// value (stable, so ties keep their observed order) and truncated to
/// `max_inputs`.
///
/// Two call modes share this one function: confirmed-only for real
/// transaction construction, and `include_unconfirmed` for classifying an
/// over-limit amount as "funds pending" rather than plainly too big.
pub fn select_utxos(
    utxos: &[Utxo],
    include_unconfirmed: bool,
    min_confirmations: u32,
    max_inputs: usize,
) -> Vec<Utxo> {
    let mut selected: Vec<Utxo> = utxos
        .iter()
        .filter(|utxo| include_unconfirmed || utxo.confirmations >= min_confirmations)
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.value.cmp(&a.value));
    selected.truncate(max_inputs);
    selected
}

/// [`select_utxos`] with the protocol input ceiling.
pub fn select_utxos_capped(
    utxos: &[Utxo],
    include_unconfirmed: bool,
    min_confirmations: u32,
) -> Vec<Utxo> {
    select_utxos(utxos, include_unconfirmed, min_confirmations, MAX_INPUTS_PER_TX)
}

/// Sum of values over a selection.
pub fn total_value(utxos: &[Utxo]) -> u64 {
    utxos.iter().map(|utxo| utxo.value).sum()
}
