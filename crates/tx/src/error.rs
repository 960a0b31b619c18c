//! Errors raised by the chaining layer.
//!
//! The local variants are immediate contract violations — they indicate a bookkeeping or
//! caller-logic inconsistency, never a transient condition, and are never retried here.
//! Collaborator failures pass through unchanged.

use chains_core::{build::BuildError, provider::ProviderError, types::Outpoint, wallet::WalletError};
use thiserror::Error;

/// Errors thrown while tracking outputs and chaining transactions.
#[derive(Debug, Error)]
pub enum ChainError {
    /// An output was inserted under an outpoint that is already tracked.
    #[error("{outpoint} is already tracked\ninserted {trace}tracked set:\n{held}")]
    DuplicateUtxo {
        /// The conflicting outpoint.
        outpoint: Outpoint,
        /// The provenance trail of the rejected insertion.
        trace: String,
        /// A rendering of the collection at the time of the conflict.
        held: String,
    },

    /// An operation referenced an outpoint that is not tracked.
    #[error("{outpoint} is not tracked")]
    UnknownUtxo {
        /// The missing outpoint.
        outpoint: Outpoint,
    },

    /// `remove_head` was called on an empty collection.
    #[error("The UTXO set is empty")]
    EmptySet,

    /// A mutation, clone, or re-completion was attempted on a sequencer that has already
    /// been completed.
    #[error("The transaction has already been completed")]
    AlreadyComplete,

    /// Bubbled up from the wallet.
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Bubbled up from the provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Bubbled up from the external builder.
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Type alias for chaining results.
pub type ChainResult<T> = Result<T, ChainError>;
