//! Re-exports of the most commonly used types and traits.

pub use crate::{
    build::*,
    enc::*,
    hashes::*,
    provider::*,
    ser::{ByteFormat, SerError, SerResult},
    time::*,
    types::*,
    wallet::*,
};
