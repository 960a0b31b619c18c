//! Outpoints: the composite key identifying one output of one transaction.

use std::fmt;
use std::io::{Read, Write};

use crate::{
    hashes::TxId,
    ser::{ByteFormat, SerError, SerResult},
};

/// A reference to a single output: the id of the producing transaction plus the output's
/// position in that transaction's output list. Globally unique on any one chain.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Outpoint {
    /// The id of the transaction that produced the output.
    pub txid: TxId,
    /// The position of the output within the producing transaction.
    pub index: u64,
}

impl Outpoint {
    /// Instantiate a new outpoint.
    pub fn new(txid: TxId, index: u64) -> Self {
        Self { txid, index }
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

impl ByteFormat for Outpoint {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.txid.serialized_length() + 8
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        Ok(Outpoint {
            txid: TxId::read_from(reader, 0)?,
            index: Self::read_u64_le(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        Ok(self.txid.write_to(writer)? + Self::write_u64_le(writer, self.index)?)
    }
}
