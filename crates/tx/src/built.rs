//! Completed transactions and the chaining algorithm.
//!
//! A completed transaction knows the collection it was built against and its own artifact.
//! From those it partitions its produced outputs into *residual* (change, back under the
//! account's control) and *posterior* (paid elsewhere), and can seed a follow-up sequencer
//! before anything reaches the network.

use log::debug;
use once_cell::sync::OnceCell;

use chains_core::{
    enc::Address,
    provider::Provider,
    types::{Datum, Transaction},
    wallet::Wallet,
};

use crate::{
    client::Client,
    error::ChainResult,
    signed::SignedTx,
    trace::{Trace, TraceSource},
    tx::{ChangeAddress, Tx},
    utxo_set::{Excepted, TracedUtxo, UtxoSet},
};

/// How a chainer admits a posterior output into the follow-up transaction.
#[derive(Clone, Debug)]
pub enum Inclusion {
    /// Optionally available: the builder may select it, but need not.
    Supply,
    /// A mandatory plain spend, no redeemer.
    Coerce,
    /// Read-only: added as a reference input, not consumed.
    Read,
    /// A mandatory script spend with this redeemer.
    Redeem(Datum),
}

/// A posterior output selected by a chainer, together with how to include it.
#[derive(Clone, Debug)]
pub struct ChainedUtxo {
    /// The selected output, provenance intact.
    pub utxo: TracedUtxo,
    /// How to include it.
    pub inclusion: Inclusion,
}

/// Which account the follow-up transaction belongs to.
pub enum NextAccount<'a, P, W> {
    /// Chain within the same account; the cached partition is reused.
    Same,
    /// Chain into a different account; the partition is recomputed against that account's
    /// change address.
    Switch(&'a Client<P, W>),
}

/// A chainer inspects the posterior set and selects outputs to re-admit.
pub type Chainer<'f> = &'f dyn Fn(&UtxoSet) -> Vec<ChainedUtxo>;

#[derive(Clone, Debug)]
struct Partition {
    residual: UtxoSet,
    posterior: UtxoSet,
}

/// A balanced, unsubmitted transaction, still bound to the collection it was built against.
#[derive(Debug)]
pub struct BuiltTx<'a, P, W> {
    client: &'a Client<P, W>,
    change_address: Address,
    prior: UtxoSet,
    /// The balanced artifact.
    pub tx: Transaction,
    partition: OnceCell<Partition>,
}

impl<'a, P, W> BuiltTx<'a, P, W>
where
    P: Provider,
    W: Wallet,
{
    pub(crate) fn new(
        client: &'a Client<P, W>,
        change_address: Address,
        prior: UtxoSet,
        tx: Transaction,
    ) -> Self {
        Self {
            client,
            change_address,
            prior,
            tx,
            partition: OnceCell::new(),
        }
    }

    /// The change address this transaction was balanced against.
    pub fn change_address(&self) -> &Address {
        &self.change_address
    }

    /// Partition this transaction's outputs against `change_address`.
    ///
    /// The residual starts as the prior collection minus the consumed inputs — a consumed
    /// input the collection never tracked means the builder spent something unknown to this
    /// bookkeeping layer, and fails loudly. Produced outputs are then keyed `(id, 0..n)` in
    /// declared order: change-address outputs join the residual, everything else a fresh
    /// posterior set.
    fn partition_against(&self, change_address: &Address) -> ChainResult<Partition> {
        let Excepted {
            remaining: mut residual,
            ..
        } = self.prior.except(self.tx.inputs())?;
        let mut posterior = UtxoSet::empty();
        let root = Trace::source(TraceSource::ChainReplay, &self.tx.id().to_hex());
        for utxo in self.tx.produced() {
            if utxo.output.address == *change_address {
                residual.insert_new(TracedUtxo::new(utxo, root.via("change")))?;
            } else {
                posterior.insert_new(TracedUtxo::new(utxo, root.via("posterior")))?;
            }
        }
        Ok(Partition {
            residual,
            posterior,
        })
    }

    fn partition(&self) -> ChainResult<&Partition> {
        self.partition
            .get_or_try_init(|| self.partition_against(&self.change_address))
    }

    /// The outputs that return to this account: the prior collection minus consumed inputs,
    /// plus this transaction's change outputs. Computed once and cached.
    pub fn residual(&self) -> ChainResult<&UtxoSet> {
        Ok(&self.partition()?.residual)
    }

    /// The outputs this transaction pays elsewhere. Computed once and cached.
    pub fn posterior(&self) -> ChainResult<&UtxoSet> {
        Ok(&self.partition()?.posterior)
    }

    /// Open a follow-up sequencer seeded with the residual set, before this transaction has
    /// been submitted.
    ///
    /// Posterior outputs are unavailable to the follow-up unless a chainer re-admits them:
    /// each chainer is shown the posterior set and returns selections with an [`Inclusion`]
    /// mode, applied in the order supplied.
    pub async fn chain(
        &self,
        next: NextAccount<'a, P, W>,
        chainers: &[Chainer<'_>],
    ) -> ChainResult<Tx<'a, P, W>> {
        let (client, change_address, partition) = match next {
            NextAccount::Same => (
                self.client,
                self.change_address.clone(),
                self.partition()?.clone(),
            ),
            NextAccount::Switch(other) => {
                let change_address = other.wallet().change_address().await?;
                let partition = self.partition_against(&change_address)?;
                (other, change_address, partition)
            }
        };
        debug!(
            "chaining {}: {} residual, {} posterior",
            self.tx.id(),
            partition.residual.len(),
            partition.posterior.len()
        );
        let Partition {
            residual,
            posterior,
        } = partition;
        let mut tx = Tx::new(client, ChangeAddress::Fixed(change_address), residual);
        for chainer in chainers {
            for ChainedUtxo { utxo, inclusion } in chainer(&posterior) {
                match inclusion {
                    Inclusion::Supply => {
                        tx.add_traced_unspent_outputs(vec![utxo])?;
                    }
                    Inclusion::Coerce => {
                        tx.add_input(utxo.utxo, None, None)?;
                    }
                    Inclusion::Read => {
                        tx.add_reference_input(utxo.utxo)?;
                    }
                    Inclusion::Redeem(redeemer) => {
                        tx.add_input(utxo.utxo, Some(redeemer), None)?;
                    }
                }
            }
        }
        Ok(tx)
    }

    /// Sign the artifact through the wallet.
    pub async fn sign(&self) -> ChainResult<SignedTx<'a, P, W>> {
        let tx = self.client.wallet().sign(&self.tx).await?;
        Ok(SignedTx::new(self.client, tx))
    }
}
