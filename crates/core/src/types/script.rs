//! Opaque script-layer byte wrappers: datums, scripts, signatures, and the two ways a datum
//! can be attached to an output.

use std::io::{Read, Write};

use crate::{
    hashes::DatumHash,
    ser::{ByteFormat, SerError, SerResult},
    wrap_byte_vector,
};

wrap_byte_vector!(
    /// Plutus-style datum bytes. Opaque to this layer; interpreted only by script evaluation.
    Datum
);

wrap_byte_vector!(
    /// Serialized script bytes. Opaque to this layer.
    Script
);

wrap_byte_vector!(
    /// A signature over a transaction body. Opaque to this layer.
    Signature
);

/// How a datum is attached to an output: by hash, or inline.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum OutputDatum {
    /// Only the hash of the datum is carried by the output.
    Hash(DatumHash),
    /// The full datum is carried inline.
    Inline(Datum),
}

impl ByteFormat for OutputDatum {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        1 + match self {
            OutputDatum::Hash(h) => h.serialized_length(),
            OutputDatum::Inline(d) => d.serialized_length(),
        }
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        match Self::read_u8(reader)? {
            0 => Ok(OutputDatum::Hash(DatumHash::read_from(reader, 0)?)),
            1 => Ok(OutputDatum::Inline(Datum::read_from(reader, 0)?)),
            got => Err(SerError::UnknownTag {
                got,
                reading: "OutputDatum",
            }),
        }
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        match self {
            OutputDatum::Hash(h) => Ok(Self::write_u8(writer, 0)? + h.write_to(writer)?),
            OutputDatum::Inline(d) => Ok(Self::write_u8(writer, 1)? + d.write_to(writer)?),
        }
    }
}
