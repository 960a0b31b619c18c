//! The wallet capability: the account-side collaborator that knows the network, owns
//! addresses and outputs, signs, and submits.

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    enc::{Address, NetworkId},
    hashes::TxId,
    types::{tx::Transaction, utxo::Utxo},
};

/// Errors thrown by wallet backends.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Unsupported action. The backend should give a string describing the action and reason.
    #[error("Unsupported action: {0}")]
    Unsupported(String),

    /// The backend refused to sign, or signing failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The network rejected a submission.
    #[error("Submission rejected: {0}")]
    Rejected(String),

    /// Custom wallet backend error.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl WalletError {
    /// Shortcut for instantiating a custom error.
    pub fn custom<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Custom(Box::new(e))
    }
}

/// An account-side wallet. All methods are suspension points that may reach a remote
/// backend; none are retried at this layer.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// The network this wallet operates on.
    async fn network_id(&self) -> Result<NetworkId, WalletError>;

    /// The address change should be returned to.
    async fn change_address(&self) -> Result<Address, WalletError>;

    /// All outputs currently owned by this wallet.
    async fn unspent_outputs(&self) -> Result<Vec<Utxo>, WalletError>;

    /// Sign the transaction, returning a witnessed copy.
    async fn sign(&self, tx: &Transaction) -> Result<Transaction, WalletError>;

    /// Submit the transaction to the network, returning its id.
    async fn submit(&self, tx: &Transaction) -> Result<TxId, WalletError>;
}
