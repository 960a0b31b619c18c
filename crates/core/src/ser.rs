//! A simple trait for binary (de)serialization using std `Read` and `Write` traits.

use std::io::{Cursor, Error as IoError, Read, Write};

use hex::FromHexError;
use thiserror::Error;

/// Upper bound on collection length prefixes accepted by `read_from`. Anything larger is
/// assumed to be a corrupt or hostile length prefix.
pub const MAX_COLLECTION_LEN: u32 = 100_000;

/// Errors related to serialization of types.
#[derive(Debug, Error)]
pub enum SerError {
    /// A collection length prefix exceeded [`MAX_COLLECTION_LEN`].
    #[error("Collection length {0} exceeds maximum {MAX_COLLECTION_LEN}")]
    LengthTooLong(u32),

    /// An unknown discriminant was read where an enum tag was expected.
    #[error("Unknown tag {got} while reading {reading}")]
    UnknownTag {
        /// The tag byte encountered.
        got: u8,
        /// The type being read.
        reading: &'static str,
    },

    /// A string field did not contain valid UTF-8.
    #[error("Invalid UTF-8 in string field")]
    BadString(#[from] std::string::FromUtf8Error),

    /// IOError bubbled up from a `Write` passed to a `ByteFormat::write_to` implementation.
    #[error("Serialization error")]
    IoError(#[from] IoError),

    /// `deserialize_hex` encountered an error on its input.
    #[error("Error deserializing hex string")]
    FromHexError(#[from] FromHexError),
}

/// Type alias for serialization errors
pub type SerResult<T> = Result<T, SerError>;

/// A simple trait for deserializing from `std::io::Read` and serializing to `std::io::Write`.
///
/// Integers are little-endian. Variable-length collections carry a `u32` LE count prefix.
/// `ByteFormat` is used in transaction-id calculation and in the compact interchange encoding
/// of transaction artifacts.
pub trait ByteFormat {
    /// Errors raised during reading or writing.
    type Error: std::error::Error + From<SerError> + From<IoError>;

    /// Returns the byte-length of the serialized data structure.
    fn serialized_length(&self) -> usize;

    /// Deserializes an instance of `Self` from a `std::io::Read`. The `limit` argument is used
    /// only when deserializing collections, and specifies the number of instances of the
    /// underlying type to read.
    fn read_from<R>(reader: &mut R, limit: usize) -> Result<Self, Self::Error>
    where
        R: Read,
        Self: std::marker::Sized;

    /// Serializes `Self` to a `std::io::Write`. Returns the number of bytes written.
    fn write_to<W>(&self, writer: &mut W) -> Result<usize, Self::Error>
    where
        W: Write;

    /// Decodes a hex string and deserializes an instance of `Self` from the resulting bytes.
    fn deserialize_hex(s: &str) -> Result<Self, Self::Error>
    where
        Self: std::marker::Sized,
    {
        let v: Vec<u8> = hex::decode(s).map_err(SerError::from)?;
        let mut cursor = Cursor::new(v);
        Self::read_from(&mut cursor, 0)
    }

    /// Serializes `self` to a vector, returns the hex-encoded vector.
    fn serialize_hex(&self) -> String {
        let mut v: Vec<u8> = Vec::with_capacity(self.serialized_length());
        // Writes to a Vec cannot fail
        self.write_to(&mut v).expect("no error on sink writes");
        hex::encode(v)
    }

    /// Convenience function for reading a single byte.
    fn read_u8<R>(reader: &mut R) -> SerResult<u8>
    where
        R: Read,
    {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Convenience function for reading a LE u32.
    fn read_u32_le<R>(reader: &mut R) -> SerResult<u32>
    where
        R: Read,
    {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Convenience function for reading a LE u64.
    fn read_u64_le<R>(reader: &mut R) -> SerResult<u64>
    where
        R: Read,
    {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Convenience function for reading a LE i64.
    fn read_i64_le<R>(reader: &mut R) -> SerResult<i64>
    where
        R: Read,
    {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Convenience function for writing a single byte.
    fn write_u8<W>(writer: &mut W, byte: u8) -> SerResult<usize>
    where
        W: Write,
    {
        Ok(writer.write(&[byte])?)
    }

    /// Convenience function for writing a LE u32.
    fn write_u32_le<W>(writer: &mut W, number: u32) -> SerResult<usize>
    where
        W: Write,
    {
        Ok(writer.write(&number.to_le_bytes())?)
    }

    /// Convenience function for writing a LE u64.
    fn write_u64_le<W>(writer: &mut W, number: u64) -> SerResult<usize>
    where
        W: Write,
    {
        Ok(writer.write(&number.to_le_bytes())?)
    }

    /// Convenience function for writing a LE i64.
    fn write_i64_le<W>(writer: &mut W, number: i64) -> SerResult<usize>
    where
        W: Write,
    {
        Ok(writer.write(&number.to_le_bytes())?)
    }

    /// Reads a `u32` LE count prefix, validates it against [`MAX_COLLECTION_LEN`], and returns
    /// it as a `usize`.
    fn read_count_prefix<R>(reader: &mut R) -> SerResult<usize>
    where
        R: Read,
    {
        let count = Self::read_u32_le(reader)?;
        if count > MAX_COLLECTION_LEN {
            return Err(SerError::LengthTooLong(count));
        }
        Ok(count as usize)
    }

    /// Reads a count-prefixed byte vector.
    fn read_prefix_vec<R>(reader: &mut R) -> SerResult<Vec<u8>>
    where
        R: Read,
    {
        let count = Self::read_count_prefix(reader)?;
        let mut v = vec![0u8; count];
        reader.read_exact(&mut v)?;
        Ok(v)
    }

    /// Writes a count-prefixed byte vector.
    fn write_prefix_vec<W>(writer: &mut W, v: &[u8]) -> SerResult<usize>
    where
        W: Write,
    {
        let mut written = Self::write_u32_le(writer, v.len() as u32)?;
        written += writer.write(v)?;
        Ok(written)
    }
}

impl ByteFormat for u8 {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        1
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        Self::read_u8(reader)
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        Self::write_u8(writer, *self)
    }
}

impl<A> ByteFormat for Vec<A>
where
    A: ByteFormat<Error = SerError>,
{
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.iter().map(|v| v.serialized_length()).sum()
    }

    fn read_from<R>(reader: &mut R, limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        let mut v = vec![];
        for _ in 0..limit {
            v.push(A::read_from(reader, 0)?);
        }
        Ok(v)
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut written = 0;
        for item in self.iter() {
            written += item.write_to(writer)?;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_rejects_oversized_count_prefixes() {
        let mut buf = vec![];
        <Vec<u8> as ByteFormat>::write_u32_le(&mut buf, MAX_COLLECTION_LEN + 1).unwrap();
        let err = <Vec<u8> as ByteFormat>::read_count_prefix(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, SerError::LengthTooLong(_)));
    }

    #[test]
    fn it_round_trips_prefix_vectors() {
        let data = vec![0xde, 0xad, 0xbe, 0xef];
        let mut buf = vec![];
        let written = <Vec<u8> as ByteFormat>::write_prefix_vec(&mut buf, &data).unwrap();
        assert_eq!(written, 8);
        let read = <Vec<u8> as ByteFormat>::read_prefix_vec(&mut buf.as_slice()).unwrap();
        assert_eq!(read, data);
    }
}
