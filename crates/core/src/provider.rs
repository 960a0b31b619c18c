//! The provider capability: the chain-side collaborator that constructs builder drafts and
//! evaluates scripts.

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    build::DraftTx,
    enc::{Address, NetworkId},
    time::SlotConfig,
    types::{tx::Transaction, utxo::Utxo},
};

/// Errors thrown by providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Unsupported action. The provider should give a string describing the action and reason.
    #[error("Unsupported action: {0}")]
    Unsupported(String),

    /// Script evaluation failed.
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// Custom provider error.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
    /// Shortcut for instantiating a custom error.
    pub fn custom<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Custom(Box::new(e))
    }
}

/// Execution units consumed by the scripts of a transaction.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExUnits {
    /// Memory units.
    pub mem: u64,
    /// CPU step units.
    pub steps: u64,
}

/// A chain provider. Constructs builder drafts bound to its own evaluator, and exposes
/// script evaluation for fee estimation.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The draft type this provider's builders produce.
    type Draft: DraftTx;

    /// The slot timing parameters of the network this provider serves.
    fn slot_config(&self) -> SlotConfig;

    /// Construct a fresh draft seeded with the network id, the change address, and the
    /// outputs available for coin selection. The draft is pre-bound to this provider's
    /// evaluator for execution-unit estimation during completion.
    fn draft(&self, network: NetworkId, change_address: &Address, available: Vec<Utxo>)
        -> Self::Draft;

    /// Evaluate the scripts of `tx`, given any additional outputs it references, and return
    /// the execution units they consume.
    async fn evaluate(&self, tx: &Transaction, additional: &[Utxo])
        -> Result<ExUnits, ProviderError>;
}
