//! Re-exports of the most commonly used types.

pub use crate::{
    built::*,
    client::*,
    error::*,
    signed::*,
    trace::*,
    tx::*,
    utxo_set::*,
};

pub use chains_core::prelude::*;
