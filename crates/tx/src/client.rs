//! The per-account context: one wallet plus one provider, from which sequencers are opened.

use chains_core::{enc::Address, provider::Provider, wallet::Wallet};

use crate::{
    error::ChainResult,
    trace::{Trace, TraceSource},
    tx::{ChangeAddress, Tx},
    utxo_set::{TracedUtxo, UtxoSet},
};

/// An account-level handle pairing a [`Wallet`] with a [`Provider`]. Transaction sequencers
/// borrow the client they were opened from, so one client can host any number of
/// independent chains.
#[derive(Debug)]
pub struct Client<P, W> {
    provider: P,
    wallet: W,
}

impl<P, W> Client<P, W>
where
    P: Provider,
    W: Wallet,
{
    /// Pair a provider with a wallet.
    pub fn new(provider: P, wallet: W) -> Self {
        Self { provider, wallet }
    }

    /// The provider half of this client.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The wallet half of this client.
    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Enumerate the wallet's unspent outputs into a fresh tracked collection.
    pub async fn owned_utxos(&self) -> ChainResult<UtxoSet> {
        let utxos = self.wallet.unspent_outputs().await?;
        let trace = Trace::source(TraceSource::InitialLoad, "wallet unspent outputs");
        UtxoSet::from_list(
            utxos
                .into_iter()
                .map(|utxo| TracedUtxo::new(utxo, trace.clone())),
        )
    }

    /// Open a sequencer over `available`, returning change to this wallet's change address.
    pub fn tx(&self, available: UtxoSet) -> Tx<'_, P, W> {
        Tx::new(self, ChangeAddress::OwnerWallet, available)
    }

    /// Open a sequencer over `available` with a fixed change address.
    pub fn tx_with_change(&self, available: UtxoSet, change_address: Address) -> Tx<'_, P, W> {
        Tx::new(self, ChangeAddress::Fixed(change_address), available)
    }
}
