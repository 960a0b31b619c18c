//! The transaction sequencer: accumulates deferred builder mutations over an owned tracked
//! collection, then completes exactly once.

use std::collections::BTreeMap;
use std::mem;

use log::debug;

use chains_core::{
    build::DraftTx,
    enc::Address,
    hashes::{KeyHash, PolicyId},
    provider::Provider,
    time::{Rounding, Slot},
    types::{AssetName, Datum, OutputDatum, Script, Utxo, Value},
    wallet::Wallet,
};

use crate::{
    built::BuiltTx,
    client::Client,
    error::{ChainError, ChainResult},
    trace::{Trace, TraceSource},
    utxo_set::{TracedUtxo, UtxoSet},
};

/// Where change goes at completion time: the owner wallet's change address (resolved during
/// completion), or an address fixed up front.
#[derive(Clone, Debug)]
pub enum ChangeAddress {
    /// Ask the wallet when the sequencer completes.
    OwnerWallet,
    /// Use this address.
    Fixed(Address),
}

/// One deferred builder mutation. Steps are replayed over the external draft in insertion
/// order at completion time; order is significant.
#[derive(Clone, Debug)]
pub enum BuildStep {
    /// A mandatory input, optionally script-consumed.
    Input {
        /// The output being spent.
        utxo: Utxo,
        /// Redeemer for a script spend; `None` for a plain spend.
        redeemer: Option<Datum>,
        /// Datum preimage when the spent output carries only a hash.
        unhashed_datum: Option<Datum>,
    },
    /// An output read during validation but not consumed.
    ReferenceInput(Utxo),
    /// Outputs made available for coin selection.
    UnspentOutputs(Vec<Utxo>),
    /// A payment.
    Pay {
        /// The address paid.
        address: Address,
        /// The value paid.
        value: Value,
        /// An optional datum to attach.
        datum: Option<OutputDatum>,
    },
    /// Value locked at a script address.
    Lock {
        /// The script address.
        address: Address,
        /// The value locked.
        value: Value,
        /// The datum governing the lock.
        datum: OutputDatum,
        /// An optional reference script carried by the output.
        script_ref: Option<Script>,
    },
    /// Assets minted or burned under one policy.
    Mint {
        /// The minting policy.
        policy: PolicyId,
        /// Minted (positive) or burned (negative) quantities by asset name.
        assets: BTreeMap<AssetName, i64>,
        /// Redeemer for the minting policy, if it is a script.
        redeemer: Option<Datum>,
    },
    /// Validity window start.
    ValidFrom(Slot),
    /// Validity window end.
    ValidUntil(Slot),
    /// A required signer.
    RequiredSigner(KeyHash),
    /// A script provided for an input being spent.
    ProvideScript(Script),
}

impl BuildStep {
    pub(crate) fn apply<D: DraftTx>(self, draft: &mut D) {
        match self {
            BuildStep::Input {
                utxo,
                redeemer,
                unhashed_datum,
            } => draft.add_input(utxo, redeemer, unhashed_datum),
            BuildStep::ReferenceInput(utxo) => draft.add_reference_input(utxo),
            BuildStep::UnspentOutputs(utxos) => draft.add_unspent_outputs(utxos),
            BuildStep::Pay {
                address,
                value,
                datum,
            } => draft.pay_assets(address, value, datum),
            BuildStep::Lock {
                address,
                value,
                datum,
                script_ref,
            } => draft.lock_assets(address, value, datum, script_ref),
            BuildStep::Mint {
                policy,
                assets,
                redeemer,
            } => draft.add_mint(policy, assets, redeemer),
            BuildStep::ValidFrom(slot) => draft.set_valid_from(slot),
            BuildStep::ValidUntil(slot) => draft.set_valid_until(slot),
            BuildStep::RequiredSigner(signer) => draft.add_required_signer(signer),
            BuildStep::ProvideScript(script) => draft.provide_script(script),
        }
    }
}

#[derive(Debug)]
enum TxState {
    Open {
        steps: Vec<BuildStep>,
        available: UtxoSet,
    },
    Complete,
}

/// A transaction in progress.
///
/// The sequencer owns the collection of outputs the eventual transaction may draw on, and an
/// ordered list of deferred mutations. It is linear: after [`Tx::complete`] has run, every
/// further mutation, clone, or re-completion fails with [`ChainError::AlreadyComplete`].
#[derive(Debug)]
pub struct Tx<'a, P, W> {
    client: &'a Client<P, W>,
    change: ChangeAddress,
    state: TxState,
}

impl<'a, P, W> Tx<'a, P, W>
where
    P: Provider,
    W: Wallet,
{
    pub(crate) fn new(client: &'a Client<P, W>, change: ChangeAddress, available: UtxoSet) -> Self {
        Self {
            client,
            change,
            state: TxState::Open {
                steps: vec![],
                available,
            },
        }
    }

    fn sequence(&mut self, step: BuildStep) -> ChainResult<&mut Self> {
        match &mut self.state {
            TxState::Open { steps, .. } => {
                steps.push(step);
                Ok(self)
            }
            TxState::Complete => Err(ChainError::AlreadyComplete),
        }
    }

    /// Spend `utxo`. A redeemer makes it a script spend; `unhashed_datum` supplies the
    /// preimage when the spent output carries only a datum hash.
    pub fn add_input(
        &mut self,
        utxo: Utxo,
        redeemer: Option<Datum>,
        unhashed_datum: Option<Datum>,
    ) -> ChainResult<&mut Self> {
        self.sequence(BuildStep::Input {
            utxo,
            redeemer,
            unhashed_datum,
        })
    }

    /// Reference `utxo` without consuming it.
    pub fn add_reference_input(&mut self, utxo: Utxo) -> ChainResult<&mut Self> {
        self.sequence(BuildStep::ReferenceInput(utxo))
    }

    /// Make additional outputs available to the eventual builder, tagging their provenance
    /// as caller input. Each output is also admitted to the owned collection, so the set of
    /// known-available outputs stays consistent with what the builder will be told.
    pub fn add_unspent_outputs(&mut self, utxos: Vec<Utxo>) -> ChainResult<&mut Self> {
        let trace = Trace::source(TraceSource::CallerInput, "add_unspent_outputs");
        self.add_traced_unspent_outputs(
            utxos
                .into_iter()
                .map(|utxo| TracedUtxo::new(utxo, trace.clone()))
                .collect(),
        )
    }

    /// [`Tx::add_unspent_outputs`], preserving provenance the caller already holds.
    pub fn add_traced_unspent_outputs(
        &mut self,
        utxos: Vec<TracedUtxo>,
    ) -> ChainResult<&mut Self> {
        match &mut self.state {
            TxState::Open { steps, available } => {
                let plain: Vec<Utxo> = utxos.iter().map(|traced| traced.utxo.clone()).collect();
                for traced in utxos {
                    available.insert_new(traced)?;
                }
                steps.push(BuildStep::UnspentOutputs(plain));
                Ok(self)
            }
            TxState::Complete => Err(ChainError::AlreadyComplete),
        }
    }

    /// Pay `value` to `address`, optionally attaching a datum.
    pub fn pay_assets(
        &mut self,
        address: Address,
        value: Value,
        datum: Option<OutputDatum>,
    ) -> ChainResult<&mut Self> {
        self.sequence(BuildStep::Pay {
            address,
            value,
            datum,
        })
    }

    /// Lock `value` at a script `address` under `datum`.
    pub fn lock_assets(
        &mut self,
        address: Address,
        value: Value,
        datum: OutputDatum,
        script_ref: Option<Script>,
    ) -> ChainResult<&mut Self> {
        self.sequence(BuildStep::Lock {
            address,
            value,
            datum,
            script_ref,
        })
    }

    /// Mint (positive) or burn (negative) assets under `policy`.
    pub fn add_mint(
        &mut self,
        policy: PolicyId,
        assets: BTreeMap<AssetName, i64>,
        redeemer: Option<Datum>,
    ) -> ChainResult<&mut Self> {
        self.sequence(BuildStep::Mint {
            policy,
            assets,
            redeemer,
        })
    }

    /// The transaction is invalid before `slot`.
    pub fn set_valid_from(&mut self, slot: Slot) -> ChainResult<&mut Self> {
        self.sequence(BuildStep::ValidFrom(slot))
    }

    /// The transaction is invalid at or after `slot`.
    pub fn set_valid_until(&mut self, slot: Slot) -> ChainResult<&mut Self> {
        self.sequence(BuildStep::ValidUntil(slot))
    }

    /// [`Tx::set_valid_from`] with a millisecond timestamp, rounded to a slot in the
    /// caller-selected direction.
    pub fn set_valid_from_ms(&mut self, ms: u64, rounding: Rounding) -> ChainResult<&mut Self> {
        let slot = self.client.provider().slot_config().slot_at(ms, rounding);
        self.set_valid_from(slot)
    }

    /// [`Tx::set_valid_until`] with a millisecond timestamp, rounded to a slot in the
    /// caller-selected direction.
    pub fn set_valid_until_ms(&mut self, ms: u64, rounding: Rounding) -> ChainResult<&mut Self> {
        let slot = self.client.provider().slot_config().slot_at(ms, rounding);
        self.set_valid_until(slot)
    }

    /// Require a witness from the holder of `signer`.
    pub fn add_required_signer(&mut self, signer: KeyHash) -> ChainResult<&mut Self> {
        self.sequence(BuildStep::RequiredSigner(signer))
    }

    /// Provide a script needed by an input being spent.
    pub fn provide_script(&mut self, script: Script) -> ChainResult<&mut Self> {
        self.sequence(BuildStep::ProvideScript(script))
    }

    /// The deferred steps accumulated so far. Fails once the sequencer has completed.
    pub fn steps(&self) -> ChainResult<&[BuildStep]> {
        match &self.state {
            TxState::Open { steps, .. } => Ok(steps),
            TxState::Complete => Err(ChainError::AlreadyComplete),
        }
    }

    /// The collection of outputs this sequencer may draw on. Fails once completed.
    pub fn available(&self) -> ChainResult<&UtxoSet> {
        match &self.state {
            TxState::Open { available, .. } => Ok(available),
            TxState::Complete => Err(ChainError::AlreadyComplete),
        }
    }

    /// Branch a speculative copy: the same deferred steps over a deep clone of the owned
    /// collection. Fails once the sequencer has completed.
    pub fn try_clone(&self) -> ChainResult<Self> {
        match &self.state {
            TxState::Open { steps, available } => Ok(Self {
                client: self.client,
                change: self.change.clone(),
                state: TxState::Open {
                    steps: steps.clone(),
                    available: available.clone(),
                },
            }),
            TxState::Complete => Err(ChainError::AlreadyComplete),
        }
    }

    /// Complete the sequencer: resolve the change address, construct the external draft
    /// seeded with the full current collection, replay the deferred steps in order, and ask
    /// the builder to balance. One-shot and irreversible; the sequencer is inert afterwards.
    pub async fn complete(&mut self) -> ChainResult<BuiltTx<'a, P, W>> {
        let (steps, available) = match mem::replace(&mut self.state, TxState::Complete) {
            TxState::Open { steps, available } => (steps, available),
            TxState::Complete => return Err(ChainError::AlreadyComplete),
        };
        let change_address = match &self.change {
            ChangeAddress::Fixed(address) => address.clone(),
            ChangeAddress::OwnerWallet => self.client.wallet().change_address().await?,
        };
        let network = self.client.wallet().network_id().await?;
        debug!(
            "completing: {} deferred steps over {} tracked outputs",
            steps.len(),
            available.len()
        );
        let mut draft = self
            .client
            .provider()
            .draft(network, &change_address, available.utxos());
        for step in steps {
            step.apply(&mut draft);
        }
        let tx = draft.complete().await?;
        Ok(BuiltTx::new(self.client, change_address, available, tx))
    }
}
