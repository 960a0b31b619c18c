//! UTXO struct. Pairs an output with the outpoint that identifies it.

use std::fmt;
use std::io::{Read, Write};

use crate::{
    hashes::TxId,
    ser::{ByteFormat, SerError, SerResult},
    types::{outpoint::Outpoint, txout::TxOut},
};

/// An unspent transaction output: the outpoint it lives at plus the output itself.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Utxo {
    /// The outpoint identifying this output.
    pub outpoint: Outpoint,
    /// The output.
    pub output: TxOut,
}

impl Utxo {
    /// Instantiate a new UTXO.
    pub fn new(outpoint: Outpoint, output: TxOut) -> Self {
        Self { outpoint, output }
    }

    /// The id of the transaction that produced this output.
    pub fn txid(&self) -> TxId {
        self.outpoint.txid
    }
}

impl fmt::Display for Utxo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.outpoint, self.output.value.coin)
    }
}

impl ByteFormat for Utxo {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.outpoint.serialized_length() + self.output.serialized_length()
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        Ok(Utxo {
            outpoint: Outpoint::read_from(reader, 0)?,
            output: TxOut::read_from(reader, 0)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        Ok(self.outpoint.write_to(writer)? + self.output.write_to(writer)?)
    }
}
