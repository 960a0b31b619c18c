//! Signed transactions.

use log::debug;

use chains_core::{hashes::TxId, provider::Provider, types::Transaction, wallet::Wallet};

use crate::{client::Client, error::ChainResult};

/// A signed, submittable transaction.
pub struct SignedTx<'a, P, W> {
    client: &'a Client<P, W>,
    /// The witnessed artifact.
    pub tx: Transaction,
}

impl<'a, P, W> SignedTx<'a, P, W>
where
    P: Provider,
    W: Wallet,
{
    pub(crate) fn new(client: &'a Client<P, W>, tx: Transaction) -> Self {
        Self { client, tx }
    }

    /// Submit through the wallet, returning the id of the submitted artifact.
    pub async fn submit(&self) -> ChainResult<TxId> {
        debug!("submitting {}", self.tx.id());
        Ok(self.client.wallet().submit(&self.tx).await?)
    }
}
