//! Wallet composition: keys, loaded chain state, payments and history.
//!
//! [`Wallet`] ties the derivation engine, coin selector, fee calculator and
//! planner together over three collaborator seams: the ledger node, the
//! fee-schedule service and the transaction codec. It assumes a single
//! logical caller; operations run to completion and are never interleaved.

use std::collections::HashMap;
use std::fmt;

use ada_core::constants::{COIN_TYPE, DUST_FLOOR, Network, PURPOSE};
use ada_core::error::CodecError;
use ada_core::traits::{FeeScheduleApi, NodeApi, TxCodec};
use ada_core::types::{
    Address, FeeSchedule, ProtocolParams, RawTransaction, TxBody, TxId, TxPlan, Utxo, Witness,
};
use tracing::{info, warn};

use crate::builder::TxPlanner;
use crate::coin_selection::{select_utxos_capped, total_value};
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::estimator::{FeeEstimate, FeeEstimator};
use crate::fee::CsFeeConfig;
use crate::keys::{Xprv, Xpub, harden};

/// A planned payment with its serialized unsigned body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    /// Inputs, outputs and miner fee as planned.
    pub plan: TxPlan,
    /// Unsigned body and its hash from the codec.
    pub body: TxBody,
}

/// A witnessed transaction ready for submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Body hash, the eventual transaction id.
    pub hash: TxId,
    /// Submittable serialized bytes.
    pub bytes: Vec<u8>,
}

/// One entry of the wallet's transaction history, classified from the
/// node's raw record against the wallet's own address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletTransaction {
    /// Transaction id.
    pub id: TxId,
    /// Net amount moved, from the wallet's perspective. For outgoing
    /// transactions the fee is not part of the amount.
    pub amount: u64,
    /// True when the wallet received value.
    pub incoming: bool,
    /// Total fee paid: miner fee plus any service-fee outputs.
    pub fee: u64,
    /// Inclusion time, unix seconds.
    pub timestamp: i64,
    /// Confirmation count at fetch time.
    pub confirmations: u32,
    /// Still below the wallet's confirmation policy.
    pub pending: bool,
}

/// One page of transaction history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxHistoryPage {
    pub transactions: Vec<WalletTransaction>,
    pub has_more: bool,
    /// Cursor to request the next page with.
    pub cursor: u64,
}

/// Chain state captured by the last `load`.
struct LoadedState {
    utxos: Vec<Utxo>,
    params: ProtocolParams,
    cs_config: CsFeeConfig,
}

/// Memoized results over one load generation, cleared whenever the
/// underlying UTXO set, parameters or fee schedule change.
#[derive(Default)]
struct Caches {
    fee_estimates: HashMap<u64, FeeEstimate>,
    max_amount: Option<u64>,
    max_amount_unconfirmed: Option<u64>,
}

impl Caches {
    fn clear(&mut self) {
        self.fee_estimates.clear();
        self.max_amount = None;
        self.max_amount_unconfirmed = None;
    }
}

/// Single-address HD wallet over a node, a fee service and a codec.
pub struct Wallet<N, F, C> {
    node: N,
    fee_service: F,
    codec: C,
    config: WalletConfig,
    /// Account-level private key; absent in watch-only or locked wallets.
    xprv: Option<Xprv>,
    xpub: Xpub,
    address: Address,
    state: Option<LoadedState>,
    caches: Caches,
}

impl<N, F, C> Wallet<N, F, C>
where
    N: NodeApi,
    F: FeeScheduleApi,
    C: TxCodec,
{
    /// Create a wallet from a seed, keeping the account private key in
    /// memory for signing until [`lock`](Self::lock) is called.
    pub fn create(
        seed: &[u8],
        config: WalletConfig,
        node: N,
        fee_service: F,
        codec: C,
    ) -> Result<Self, WalletError> {
        let xprv = account_xprv(seed, config.account_index)?;
        let xpub = xprv.to_public();
        let address = derive_address(&codec, &xpub, config.network)?;
        Ok(Self {
            node,
            fee_service,
            codec,
            config,
            xprv: Some(xprv),
            xpub,
            address,
            state: None,
            caches: Caches::default(),
        })
    }

    /// Open a watch-only wallet from an exported account public key.
    ///
    /// The wallet starts locked; signing requires [`unlock`](Self::unlock).
    pub fn open(
        public_key: [u8; 64],
        config: WalletConfig,
        node: N,
        fee_service: F,
        codec: C,
    ) -> Result<Self, WalletError> {
        let xpub = Xpub::from_bytes(public_key)?;
        let address = derive_address(&codec, &xpub, config.network)?;
        Ok(Self {
            node,
            fee_service,
            codec,
            config,
            xprv: None,
            xpub,
            address,
            state: None,
            caches: Caches::default(),
        })
    }

    /// The wallet's single base address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    /// Export the account public key for a later watch-only [`open`](Self::open).
    pub fn public_key(&self) -> [u8; 64] {
        self.xpub.to_bytes()
    }

    /// Export the account extended private key bytes, re-derived from the
    /// seed. Bech32 rendering (`acct_xsk`) is left to the caller.
    pub fn export_private_key(&self, seed: &[u8]) -> Result<[u8; 96], WalletError> {
        let xprv = account_xprv(seed, self.config.account_index)?;
        if xprv.to_public().to_bytes() != self.xpub.to_bytes() {
            return Err(WalletError::SeedMismatch);
        }
        Ok(xprv.to_bytes())
    }

    pub fn is_locked(&self) -> bool {
        self.xprv.is_none()
    }

    /// Drop the private key. Key bytes are zeroed as the key is released.
    pub fn lock(&mut self) {
        self.xprv = None;
    }

    /// Restore signing capability from the seed.
    pub fn unlock(&mut self, seed: &[u8]) -> Result<(), WalletError> {
        let xprv = account_xprv(seed, self.config.account_index)?;
        if xprv.to_public().to_bytes() != self.xpub.to_bytes() {
            return Err(WalletError::SeedMismatch);
        }
        self.xprv = Some(xprv);
        Ok(())
    }

    /// Refresh UTXOs, protocol parameters and the fee schedule.
    ///
    /// The UTXO set is replaced wholesale and every memoized estimate is
    /// invalidated. A fee-service failure degrades to "fee disabled"
    /// instead of failing the load.
    pub async fn load(&mut self) -> Result<(), WalletError> {
        let params = self.node.protocol_params().await?;
        let utxos = self.node.utxos(&self.address).await?;
        let schedule = match self.fee_service.fee_schedule(&self.config.asset_id).await {
            Ok(schedule) => schedule,
            Err(err) => {
                warn!(%err, "fee schedule unavailable, service fee disabled");
                FeeSchedule::disabled()
            }
        };
        let cs_config = CsFeeConfig::resolve(&schedule, &self.address);
        let utxo_count = utxos.len();
        self.state = Some(LoadedState {
            utxos,
            params,
            cs_config,
        });
        self.caches.clear();
        let balance = self.balance()?;
        info!(address = %self.address, utxos = utxo_count, balance, "wallet loaded");
        Ok(())
    }

    fn loaded(&self) -> Result<&LoadedState, WalletError> {
        self.state.as_ref().ok_or(WalletError::NotLoaded)
    }

    /// Spendable UTXOs under the confirmation policy, ranked and capped.
    fn spendable(&self, include_unconfirmed: bool) -> Result<Vec<Utxo>, WalletError> {
        let state = self.loaded()?;
        Ok(select_utxos_capped(
            &state.utxos,
            include_unconfirmed,
            self.config.min_confirmations,
        ))
    }

    /// Total balance over the capped UTXO set, unconfirmed included.
    ///
    /// Computed over the same truncated set as max-amount so the two never
    /// disagree when the wallet holds more than the input cap.
    pub fn balance(&self) -> Result<u64, WalletError> {
        Ok(total_value(&self.spendable(true)?))
    }

    /// Minimum sendable value: the protocol min-UTXO constant with a
    /// network-wide floor.
    pub fn dust_threshold(&self) -> Result<u64, WalletError> {
        let state = self.loaded()?;
        Ok(self.codec.min_utxo_value(&state.params).max(DUST_FLOOR))
    }

    fn estimator_over<'a>(
        &'a self,
        dust_threshold: u64,
        utxos: &'a [Utxo],
    ) -> Result<FeeEstimator<'a>, WalletError> {
        let state = self.loaded()?;
        Ok(FeeEstimator::new(
            &self.codec,
            &state.params,
            &state.cs_config,
            dust_threshold,
            &self.address,
            utxos,
        ))
    }

    /// Price sending `amount` from confirmed funds. Memoized per load.
    pub fn estimate_fee(&mut self, amount: u64) -> Result<FeeEstimate, WalletError> {
        if let Some(estimate) = self.caches.fee_estimates.get(&amount) {
            return Ok(*estimate);
        }
        let dust_threshold = self.dust_threshold()?;
        let spendable = self.spendable(false)?;
        let estimate = self
            .estimator_over(dust_threshold, &spendable)?
            .estimate_fee(amount)?;
        self.caches.fee_estimates.insert(amount, estimate);
        Ok(estimate)
    }

    /// The largest sendable amount from confirmed funds. Memoized per load.
    pub fn estimate_max_amount(&mut self) -> Result<u64, WalletError> {
        if let Some(max) = self.caches.max_amount {
            return Ok(max);
        }
        let max = self.max_amount_over(false)?;
        self.caches.max_amount = Some(max);
        Ok(max)
    }

    fn max_amount_unconfirmed(&mut self) -> Result<u64, WalletError> {
        if let Some(max) = self.caches.max_amount_unconfirmed {
            return Ok(max);
        }
        let max = self.max_amount_over(true)?;
        self.caches.max_amount_unconfirmed = Some(max);
        Ok(max)
    }

    fn max_amount_over(&self, include_unconfirmed: bool) -> Result<u64, WalletError> {
        let dust_threshold = self.dust_threshold()?;
        let spendable = self.spendable(include_unconfirmed)?;
        self.estimator_over(dust_threshold, &spendable)?.max_amount()
    }

    /// Check a destination address without building anything.
    pub fn validate_address(&self, address: &str) -> Result<(), WalletError> {
        let decoded = self
            .codec
            .decode_address(address, self.config.network)
            .map_err(|e| match e {
                CodecError::InvalidAddress(s) => WalletError::InvalidAddress(s),
                other => WalletError::Codec(other),
            })?;
        if decoded == self.address {
            return Err(WalletError::DestinationEqualsSource);
        }
        Ok(())
    }

    /// Check an amount against the dust threshold and the spendable
    /// maximum, distinguishing a hard cap from one that lifts once pending
    /// deposits confirm.
    pub fn validate_amount(&mut self, amount: u64) -> Result<(), WalletError> {
        let dust_threshold = self.dust_threshold()?;
        if amount < dust_threshold {
            return Err(WalletError::SmallAmount { dust_threshold });
        }
        let max_amount = self.estimate_max_amount()?;
        if amount > max_amount {
            if amount <= self.max_amount_unconfirmed()? {
                return Err(WalletError::BigAmountConfirmationPending { max_amount });
            }
            return Err(WalletError::BigAmount { max_amount });
        }
        Ok(())
    }

    /// Plan and serialize a payment. Signing is a separate step.
    pub fn create_transaction(
        &self,
        destination: &str,
        amount: u64,
        fee: u64,
    ) -> Result<UnsignedTransaction, WalletError> {
        let dust_threshold = self.dust_threshold()?;
        let state = self.loaded()?;
        let spendable = self.spendable(false)?;
        let total_balance = self.balance()?;
        let planner = TxPlanner::new(
            &self.codec,
            &state.params,
            &state.cs_config,
            dust_threshold,
            &self.address,
            self.config.network,
            &spendable,
            total_balance,
        );
        let plan = planner.plan(destination, amount, fee)?;
        let body = self.codec.build(&state.params, &plan)?;
        Ok(UnsignedTransaction { plan, body })
    }

    /// Witness an unsigned transaction with the payment key.
    ///
    /// The single address means a single witness, derived at `0/0` under
    /// the account key.
    pub fn sign(&self, transaction: &UnsignedTransaction) -> Result<SignedTransaction, WalletError> {
        let xprv = self.xprv.as_ref().ok_or(WalletError::Locked)?;
        let payment = xprv.derive(0).derive(0);
        let witness = Witness {
            public_key: payment.public_key_bytes(),
            signature: payment.sign(transaction.body.hash.as_bytes()),
        };
        let bytes = self.codec.assemble(&transaction.body, &witness)?;
        Ok(SignedTransaction {
            hash: transaction.body.hash,
            bytes,
        })
    }

    /// Submit a signed transaction and reconcile the local UTXO set from
    /// the node's echo: spent inputs leave, own outputs join. The echo is
    /// the only thing that mutates wallet state outside `load`.
    pub async fn submit(&mut self, transaction: &SignedTransaction) -> Result<TxId, WalletError> {
        self.loaded()?;
        let echo = self.node.submit(&transaction.bytes).await?;
        let state = self.state.as_mut().ok_or(WalletError::NotLoaded)?;
        for input in &echo.inputs {
            state
                .utxos
                .retain(|utxo| !(utxo.tx_id == input.hash && utxo.index == input.index));
        }
        for output in &echo.outputs {
            if output.address == self.address {
                state.utxos.push(Utxo {
                    tx_id: echo.hash,
                    index: output.index,
                    address: self.address.clone(),
                    value: output.value,
                    confirmations: echo.confirmations,
                });
            }
        }
        self.caches.clear();
        info!(hash = %echo.hash, "transaction submitted");
        Ok(echo.hash)
    }

    /// Fetch and classify one page of transaction history.
    pub async fn load_transactions(&self, cursor: u64) -> Result<TxHistoryPage, WalletError> {
        let page_size = self.config.tx_page_size;
        let raw = self
            .node
            .transactions(&self.address, cursor, page_size)
            .await?;
        let has_more = raw.len() as u32 >= page_size;
        let transactions = raw.iter().map(|tx| self.transform_tx(tx)).collect();
        Ok(TxHistoryPage {
            transactions,
            has_more,
            cursor: cursor + 1,
        })
    }

    /// Classify a raw history record against the wallet's own address.
    ///
    /// Value into own outputs minus value out of own inputs decides the
    /// direction; fee-collector outputs count toward the fee, not the
    /// amount.
    fn transform_tx(&self, tx: &RawTransaction) -> WalletTransaction {
        let mut input_value: u64 = 0;
        let mut output_value: u64 = 0;
        let mut cs_fee: u64 = 0;
        for input in &tx.inputs {
            if input.address == self.address {
                input_value = input_value.saturating_add(input.value);
            }
        }
        for output in &tx.outputs {
            if output.address == self.address {
                output_value = output_value.saturating_add(output.value);
            } else if output.cs_fee {
                cs_fee = cs_fee.saturating_add(output.value);
            }
        }
        let total_fee = cs_fee.saturating_add(tx.fee);
        let (amount, incoming) = if output_value > input_value {
            (output_value - input_value, true)
        } else {
            ((input_value - output_value).saturating_sub(total_fee), false)
        };
        WalletTransaction {
            id: tx.hash,
            amount,
            incoming,
            fee: total_fee,
            timestamp: tx.included_at,
            confirmations: tx.confirmations,
            pending: tx.confirmations < self.config.min_confirmations,
        }
    }
}

impl<N, F, C> fmt::Debug for Wallet<N, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("network", &self.config.network)
            .field("locked", &self.xprv.is_none())
            .field("loaded", &self.state.is_some())
            .finish()
    }
}

/// Account-level key at `m/1852'/1815'/account'`.
fn account_xprv(seed: &[u8], account_index: u32) -> Result<Xprv, WalletError> {
    Ok(Xprv::from_seed(seed)?
        .derive(harden(PURPOSE))
        .derive(harden(COIN_TYPE))
        .derive(harden(account_index)))
}

/// Base address from the soft-derived payment (`0/0`) and staking (`2/0`)
/// keys.
fn derive_address<C: TxCodec>(
    codec: &C,
    xpub: &Xpub,
    network: Network,
) -> Result<Address, WalletError> {
    let payment = xpub.derive(0)?.derive(0)?;
    let stake = xpub.derive(2)?.derive(0)?;
    Ok(codec.base_address(
        &payment.public_key_bytes(),
        &stake.public_key_bytes(),
        network,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ada_core::error::NodeError;
    use ada_core::types::{AppliedInput, AppliedOutput, AppliedTransaction, RawTxSide, TxOut};
    use async_trait::async_trait;

    // --- Mocks ---

    /// Deterministic base addresses, linear fee sizing, call counting.
    #[derive(Clone)]
    struct MockCodec {
        min_utxo: u64,
        fee_calls: Arc<AtomicUsize>,
    }

    impl MockCodec {
        fn new() -> Self {
            Self {
                min_utxo: 1_000_000,
                fee_calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl TxCodec for MockCodec {
        fn decode_address(&self, bech32: &str, _network: Network) -> Result<Address, CodecError> {
            if bech32.starts_with("addr1") {
                Ok(Address::new_unchecked(bech32))
            } else {
                Err(CodecError::InvalidAddress(bech32.to_string()))
            }
        }

        fn base_address(
            &self,
            payment_key: &[u8; 32],
            stake_key: &[u8; 32],
            _network: Network,
        ) -> Address {
            Address::new_unchecked(format!(
                "addr1{}{}",
                hex::encode(&payment_key[..4]),
                hex::encode(&stake_key[..4])
            ))
        }

        fn min_utxo_value(&self, _params: &ProtocolParams) -> u64 {
            self.min_utxo
        }

        fn min_fee(
            &self,
            params: &ProtocolParams,
            inputs: &[Utxo],
            outputs: &[TxOut],
        ) -> Result<u64, CodecError> {
            self.fee_calls.fetch_add(1, Ordering::SeqCst);
            let size = 10 + inputs.len() as u64 * 40 + outputs.len() as u64 * 65;
            Ok(params.min_fee_a * size + params.min_fee_b)
        }

        fn build(&self, _params: &ProtocolParams, plan: &TxPlan) -> Result<TxBody, CodecError> {
            let mut hash = [0u8; 32];
            hash[0] = plan.inputs.len() as u8;
            hash[1] = plan.outputs.len() as u8;
            Ok(TxBody {
                hash: TxId(hash),
                bytes: vec![0xB0; 64],
            })
        }

        fn assemble(&self, body: &TxBody, witness: &Witness) -> Result<Vec<u8>, CodecError> {
            let mut bytes = body.bytes.clone();
            bytes.extend_from_slice(&witness.public_key);
            bytes.extend_from_slice(&witness.signature);
            Ok(bytes)
        }
    }

    struct MockNode {
        params: ProtocolParams,
        utxos: Vec<Utxo>,
        echo: Option<AppliedTransaction>,
        history: Vec<RawTransaction>,
    }

    impl MockNode {
        fn new(utxos: Vec<Utxo>) -> Self {
            Self {
                params: params(),
                utxos,
                echo: None,
                history: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl NodeApi for MockNode {
        async fn protocol_params(&self) -> Result<ProtocolParams, NodeError> {
            Ok(self.params.clone())
        }

        async fn utxos(&self, _address: &Address) -> Result<Vec<Utxo>, NodeError> {
            Ok(self.utxos.clone())
        }

        async fn transactions(
            &self,
            _address: &Address,
            _cursor: u64,
            _count: u32,
        ) -> Result<Vec<RawTransaction>, NodeError> {
            Ok(self.history.clone())
        }

        async fn submit(&self, _transaction: &[u8]) -> Result<AppliedTransaction, NodeError> {
            self.echo
                .clone()
                .ok_or_else(|| NodeError::Rejected("no echo configured".into()))
        }
    }

    /// Fee service returning a fixed schedule, or failing outright.
    struct MockFees {
        schedule: Option<FeeSchedule>,
    }

    impl MockFees {
        fn disabled() -> Self {
            Self {
                schedule: Some(FeeSchedule::disabled()),
            }
        }

        fn unreachable() -> Self {
            Self { schedule: None }
        }
    }

    #[async_trait]
    impl FeeScheduleApi for MockFees {
        async fn fee_schedule(&self, _asset_id: &str) -> Result<FeeSchedule, NodeError> {
            self.schedule
                .clone()
                .ok_or_else(|| NodeError::Transport("connection refused".into()))
        }
    }

    // --- Fixtures ---

    const SEED: [u8; 64] = [7u8; 64];

    fn params() -> ProtocolParams {
        ProtocolParams {
            min_fee_a: 44,
            min_fee_b: 155_381,
            coins_per_utxo_word: 4_310,
            pool_deposit: 500_000_000,
            key_deposit: 2_000_000,
            max_val_size: 5_000,
            max_tx_size: 16_384,
        }
    }

    fn utxo(value: u64, index: u32, confirmations: u32) -> Utxo {
        Utxo {
            tx_id: TxId([3; 32]),
            index,
            address: Address::new_unchecked("addr1own"),
            value,
            confirmations,
        }
    }

    fn mock_fee(input_count: u64, output_count: u64) -> u64 {
        let p = params();
        p.min_fee_a * (10 + input_count * 40 + output_count * 65) + p.min_fee_b
    }

    fn wallet(utxos: Vec<Utxo>) -> Wallet<MockNode, MockFees, MockCodec> {
        Wallet::create(
            &SEED,
            WalletConfig::default(),
            MockNode::new(utxos),
            MockFees::disabled(),
            MockCodec::new(),
        )
        .unwrap()
    }

    /// The address the mock codec renders for the test seed.
    fn own_address() -> Address {
        wallet(Vec::new()).address().clone()
    }

    // --- Tests ---

    #[test]
    fn create_is_deterministic() {
        let w1 = wallet(Vec::new());
        let w2 = wallet(Vec::new());
        assert_eq!(w1.address(), w2.address());
        assert_eq!(w1.public_key(), w2.public_key());
        assert!(!w1.is_locked());
    }

    #[test]
    fn open_watch_only_matches_created() {
        let created = wallet(Vec::new());
        let opened = Wallet::open(
            created.public_key(),
            WalletConfig::default(),
            MockNode::new(Vec::new()),
            MockFees::disabled(),
            MockCodec::new(),
        )
        .unwrap();
        assert_eq!(opened.address(), created.address());
        assert!(opened.is_locked());
    }

    #[test]
    fn operations_before_load_fail() {
        let w = wallet(vec![utxo(5_000_000, 0, 10)]);
        assert_eq!(w.balance(), Err(WalletError::NotLoaded));
        assert_eq!(w.dust_threshold(), Err(WalletError::NotLoaded));
        assert!(matches!(
            w.create_transaction("addr1dest", 2_000_000, 200_000),
            Err(WalletError::NotLoaded)
        ));
    }

    #[tokio::test]
    async fn load_computes_balance() {
        let mut w = wallet(vec![utxo(5_000_000, 0, 10), utxo(1_000_000, 1, 0)]);
        w.load().await.unwrap();
        // Unconfirmed UTXOs count toward the balance.
        assert_eq!(w.balance().unwrap(), 6_000_000);
        assert_eq!(w.dust_threshold().unwrap(), 1_000_000);
    }

    #[tokio::test]
    async fn fee_service_failure_degrades_to_disabled() {
        let mut w = Wallet::create(
            &SEED,
            WalletConfig::default(),
            MockNode::new(vec![utxo(20_000_000, 0, 10)]),
            MockFees::unreachable(),
            MockCodec::new(),
        )
        .unwrap();
        w.load().await.unwrap();
        let estimate = w.estimate_fee(5_000_000).unwrap();
        assert_eq!(estimate.cs_fee, 0);
    }

    #[tokio::test]
    async fn fee_estimates_are_memoized_until_reload() {
        let codec = MockCodec::new();
        let calls = codec.fee_calls.clone();
        let mut w = Wallet::create(
            &SEED,
            WalletConfig::default(),
            MockNode::new(vec![utxo(20_000_000, 0, 10)]),
            MockFees::disabled(),
            codec,
        )
        .unwrap();
        w.load().await.unwrap();

        w.estimate_fee(5_000_000).unwrap();
        let after_first = calls.load(Ordering::SeqCst);
        w.estimate_fee(5_000_000).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), after_first);

        w.load().await.unwrap();
        w.estimate_fee(5_000_000).unwrap();
        assert!(calls.load(Ordering::SeqCst) > after_first);
    }

    #[tokio::test]
    async fn small_amount_never_sizes_a_transaction() {
        let codec = MockCodec::new();
        let calls = codec.fee_calls.clone();
        let mut w = Wallet::create(
            &SEED,
            WalletConfig::default(),
            MockNode::new(vec![utxo(20_000_000, 0, 10)]),
            MockFees::disabled(),
            codec,
        )
        .unwrap();
        w.load().await.unwrap();

        let err = w.create_transaction("addr1dest", 999_999, 200_000).unwrap_err();
        assert_eq!(
            err,
            WalletError::SmallAmount {
                dust_threshold: 1_000_000
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn end_to_end_payment_plan() {
        // Two confirmed UTXOs; the larger one alone covers the payment.
        let mut w = wallet(vec![utxo(1_000_000, 0, 5), utxo(5_000_000, 1, 5)]);
        w.load().await.unwrap();

        let estimate = w.estimate_fee(2_000_000).unwrap();
        assert_eq!(estimate.cs_fee, 0);
        assert_eq!(estimate.miner_fee, mock_fee(1, 2));

        let tx = w
            .create_transaction("addr1dest", 2_000_000, estimate.total())
            .unwrap();
        assert_eq!(tx.plan.inputs.len(), 1);
        assert_eq!(tx.plan.inputs[0].value, 5_000_000);
        assert_eq!(tx.plan.outputs[0].address.as_str(), "addr1dest");
        assert_eq!(tx.plan.outputs[0].value, 2_000_000);
        assert_eq!(
            tx.plan.outputs[1].value,
            5_000_000 - 2_000_000 - estimate.miner_fee
        );
        assert_eq!(tx.plan.miner_fee, estimate.miner_fee);
    }

    #[tokio::test]
    async fn validate_amount_distinguishes_pending_funds() {
        // One small confirmed UTXO, one large unconfirmed one.
        let mut w = wallet(vec![utxo(2_000_000, 0, 10), utxo(50_000_000, 1, 0)]);
        w.load().await.unwrap();

        let confirmed_max = w.estimate_max_amount().unwrap();
        assert!(confirmed_max < 2_000_000);

        // Covered once the deposit confirms.
        assert_eq!(
            w.validate_amount(10_000_000),
            Err(WalletError::BigAmountConfirmationPending {
                max_amount: confirmed_max
            })
        );
        // Never coverable.
        assert_eq!(
            w.validate_amount(100_000_000),
            Err(WalletError::BigAmount {
                max_amount: confirmed_max
            })
        );
    }

    #[tokio::test]
    async fn validate_address_rejects_own_and_malformed() {
        let w = wallet(Vec::new());
        let own = w.address().as_str().to_string();
        assert_eq!(
            w.validate_address(&own),
            Err(WalletError::DestinationEqualsSource)
        );
        assert!(matches!(
            w.validate_address("not-an-address"),
            Err(WalletError::InvalidAddress(_))
        ));
        assert_eq!(w.validate_address("addr1dest"), Ok(()));
    }

    #[tokio::test]
    async fn sign_requires_unlocked_wallet() {
        let mut w = wallet(vec![utxo(5_000_000, 0, 10)]);
        w.load().await.unwrap();
        let estimate = w.estimate_fee(2_000_000).unwrap();
        let tx = w
            .create_transaction("addr1dest", 2_000_000, estimate.total())
            .unwrap();

        w.lock();
        assert!(w.is_locked());
        assert_eq!(w.sign(&tx).unwrap_err(), WalletError::Locked);

        assert_eq!(w.unlock(&[9u8; 64]).unwrap_err(), WalletError::SeedMismatch);
        w.unlock(&SEED).unwrap();
        let signed = w.sign(&tx).unwrap();
        assert_eq!(signed.hash, tx.body.hash);
        assert!(signed.bytes.len() > tx.body.bytes.len());
    }

    #[test]
    fn export_private_key_checks_seed() {
        let w = wallet(Vec::new());
        assert_eq!(
            w.export_private_key(&[9u8; 64]).unwrap_err(),
            WalletError::SeedMismatch
        );
        let xprv = w.export_private_key(&SEED).unwrap();
        assert_eq!(xprv.len(), 96);
    }

    #[tokio::test]
    async fn submit_reconciles_utxo_set() {
        let own = own_address();
        let spent = utxo(5_000_000, 0, 10);
        let mut node = MockNode::new(vec![spent.clone()]);
        let new_hash = TxId([0xAA; 32]);
        node.echo = Some(AppliedTransaction {
            hash: new_hash,
            inputs: vec![AppliedInput {
                hash: spent.tx_id,
                index: spent.index,
            }],
            outputs: vec![
                AppliedOutput {
                    address: Address::new_unchecked("addr1dest"),
                    value: 2_000_000,
                    index: 0,
                },
                AppliedOutput {
                    address: own.clone(),
                    value: 2_800_000,
                    index: 1,
                },
            ],
            confirmations: 0,
        });
        let mut w = Wallet::create(
            &SEED,
            WalletConfig::default(),
            node,
            MockFees::disabled(),
            MockCodec::new(),
        )
        .unwrap();
        w.load().await.unwrap();
        assert_eq!(w.balance().unwrap(), 5_000_000);

        let estimate = w.estimate_fee(2_000_000).unwrap();
        let tx = w
            .create_transaction("addr1dest", 2_000_000, estimate.total())
            .unwrap();
        let signed = w.sign(&tx).unwrap();
        let hash = w.submit(&signed).await.unwrap();
        assert_eq!(hash, new_hash);

        // The spent UTXO left, only the echoed change output remains.
        assert_eq!(w.balance().unwrap(), 2_800_000);
    }

    #[tokio::test]
    async fn history_classifies_directions() {
        let own = own_address();
        let mut node = MockNode::new(Vec::new());
        node.history = vec![
            // Incoming deposit, still pending.
            RawTransaction {
                hash: TxId([1; 32]),
                inputs: vec![RawTxSide {
                    address: Address::new_unchecked("addr1sender"),
                    value: 10_000_000,
                    cs_fee: false,
                }],
                outputs: vec![RawTxSide {
                    address: own.clone(),
                    value: 9_800_000,
                    cs_fee: false,
                }],
                fee: 200_000,
                confirmations: 1,
                included_at: 1_700_000_000,
            },
            // Outgoing payment with a service-fee output.
            RawTransaction {
                hash: TxId([2; 32]),
                inputs: vec![RawTxSide {
                    address: own.clone(),
                    value: 9_800_000,
                    cs_fee: false,
                }],
                outputs: vec![
                    RawTxSide {
                        address: Address::new_unchecked("addr1dest"),
                        value: 5_000_000,
                        cs_fee: false,
                    },
                    RawTxSide {
                        address: Address::new_unchecked("addr1collector"),
                        value: 1_000_000,
                        cs_fee: true,
                    },
                    RawTxSide {
                        address: own.clone(),
                        value: 3_600_000,
                        cs_fee: false,
                    },
                ],
                fee: 200_000,
                confirmations: 12,
                included_at: 1_700_000_600,
            },
        ];
        let w = Wallet::create(
            &SEED,
            WalletConfig::default(),
            node,
            MockFees::disabled(),
            MockCodec::new(),
        )
        .unwrap();

        let page = w.load_transactions(0).await.unwrap();
        assert_eq!(page.cursor, 1);
        assert!(!page.has_more);

        let deposit = &page.transactions[0];
        assert!(deposit.incoming);
        assert_eq!(deposit.amount, 9_800_000);
        assert_eq!(deposit.fee, 200_000);
        assert!(deposit.pending);

        let payment = &page.transactions[1];
        assert!(!payment.incoming);
        // 9_800_000 out, 3_600_000 back, 1_200_000 total fee.
        assert_eq!(payment.amount, 5_000_000);
        assert_eq!(payment.fee, 1_200_000);
        assert!(!payment.pending);
    }
}
