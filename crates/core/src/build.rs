//! The external transaction-builder capability. A draft accumulates per-field mutations and
//! is completed exactly once, producing a balanced artifact. Coin selection, fee computation
//! and script budgeting all live behind this boundary.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    enc::Address,
    hashes::{KeyHash, PolicyId},
    time::Slot,
    types::{
        script::{Datum, OutputDatum, Script},
        tx::Transaction,
        utxo::Utxo,
        value::{AssetName, Value},
    },
};

/// Errors thrown by builder backends. Opaque to callers; never retried at this layer.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Balancing failed — typically the available outputs cannot cover the payments plus fee.
    #[error("Balancing failed: {0}")]
    Balancing(String),

    /// Script evaluation failed during completion.
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// Unsupported operation for this backend.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Custom builder backend error.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl BuildError {
    /// Shortcut for instantiating a custom error.
    pub fn custom<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Custom(Box::new(e))
    }
}

/// A transaction draft under construction by an external builder.
///
/// Mutation order is significant: later calls may depend on state established by earlier
/// ones, and implementations must apply them in the order received.
#[async_trait]
pub trait DraftTx: Send {
    /// Add a mandatory input. A redeemer makes it a script spend; `unhashed_datum` supplies
    /// the preimage when the spent output carried only a datum hash.
    fn add_input(&mut self, utxo: Utxo, redeemer: Option<Datum>, unhashed_datum: Option<Datum>);

    /// Add an output that is read during validation but not consumed.
    fn add_reference_input(&mut self, utxo: Utxo);

    /// Make additional outputs available for coin selection without forcing them in.
    fn add_unspent_outputs(&mut self, utxos: Vec<Utxo>);

    /// Pay `value` to `address`, optionally attaching a datum.
    fn pay_assets(&mut self, address: Address, value: Value, datum: Option<OutputDatum>);

    /// Lock `value` at a script `address` under `datum`, optionally carrying a reference
    /// script.
    fn lock_assets(
        &mut self,
        address: Address,
        value: Value,
        datum: OutputDatum,
        script_ref: Option<Script>,
    );

    /// Mint (positive) or burn (negative) assets under `policy`.
    fn add_mint(
        &mut self,
        policy: PolicyId,
        assets: BTreeMap<AssetName, i64>,
        redeemer: Option<Datum>,
    );

    /// The transaction is invalid before this slot.
    fn set_valid_from(&mut self, slot: Slot);

    /// The transaction is invalid at or after this slot.
    fn set_valid_until(&mut self, slot: Slot);

    /// Require a witness from the holder of `signer`.
    fn add_required_signer(&mut self, signer: KeyHash);

    /// Provide a script needed by an input being spent.
    fn provide_script(&mut self, script: Script);

    /// Balance the draft, compute fees, and produce the artifact. Consumes the draft.
    async fn complete(self) -> Result<Transaction, BuildError>
    where
        Self: Sized;
}
