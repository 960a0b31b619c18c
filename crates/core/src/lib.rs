//! Abstract eUTXO types and capability traits for transaction chaining.
//!
//! This crate holds the concrete value vocabulary (outpoints, values, outputs, transaction
//! artifacts, marked digests, bech32 addresses) and the capability traits behind which the
//! external collaborators live: the [`wallet::Wallet`], the [`provider::Provider`], and the
//! [`build::DraftTx`] builder. Chaining logic itself lives in the `chains-tx` crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod build;
pub mod enc;
pub mod hashes;
pub mod macros;
pub mod prelude;
pub mod provider;
pub mod ser;
pub mod time;
pub mod types;
pub mod wallet;

pub use prelude::*;
