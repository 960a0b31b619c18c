//! Transaction outputs.

use std::io::{Read, Write};

use crate::{
    enc::Address,
    ser::{ByteFormat, SerError, SerResult},
    types::script::{OutputDatum, Script},
    types::value::Value,
};

/// An output: an address, the value paid to it, and optionally an attached datum and/or a
/// script reference.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TxOut {
    /// The address the value is paid to.
    pub address: Address,
    /// The value paid.
    pub value: Value,
    /// An optional datum, by hash or inline.
    pub datum: Option<OutputDatum>,
    /// An optional reference script carried by the output.
    pub script_ref: Option<Script>,
}

impl TxOut {
    /// Instantiate a plain output with no datum and no script reference.
    pub fn new(address: Address, value: Value) -> Self {
        Self {
            address,
            value,
            datum: None,
            script_ref: None,
        }
    }

    /// Builder-style helper attaching a datum.
    pub fn with_datum(mut self, datum: OutputDatum) -> Self {
        self.datum = Some(datum);
        self
    }

    /// Builder-style helper attaching a script reference.
    pub fn with_script_ref(mut self, script: Script) -> Self {
        self.script_ref = Some(script);
        self
    }
}

fn option_length<T: ByteFormat>(opt: &Option<T>) -> usize {
    1 + opt.as_ref().map(|v| v.serialized_length()).unwrap_or(0)
}

impl ByteFormat for TxOut {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.address.serialized_length()
            + self.value.serialized_length()
            + option_length(&self.datum)
            + option_length(&self.script_ref)
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        let address = Address::read_from(reader, 0)?;
        let value = Value::read_from(reader, 0)?;
        let datum = match Self::read_u8(reader)? {
            0 => None,
            1 => Some(OutputDatum::read_from(reader, 0)?),
            got => {
                return Err(SerError::UnknownTag {
                    got,
                    reading: "TxOut::datum",
                })
            }
        };
        let script_ref = match Self::read_u8(reader)? {
            0 => None,
            1 => Some(Script::read_from(reader, 0)?),
            got => {
                return Err(SerError::UnknownTag {
                    got,
                    reading: "TxOut::script_ref",
                })
            }
        };
        Ok(TxOut {
            address,
            value,
            datum,
            script_ref,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut written = self.address.write_to(writer)?;
        written += self.value.write_to(writer)?;
        match &self.datum {
            None => written += Self::write_u8(writer, 0)?,
            Some(d) => {
                written += Self::write_u8(writer, 1)?;
                written += d.write_to(writer)?;
            }
        }
        match &self.script_ref {
            None => written += Self::write_u8(writer, 0)?,
            Some(s) => {
                written += Self::write_u8(writer, 1)?;
                written += s.write_to(writer)?;
            }
        }
        Ok(written)
    }
}
