//! Holds utilities for working with cryptographic digests, and disambiguating digests via
//! marker newtypes.
//!
//! Transaction ids, policy ids, required-signer key hashes and datum hashes are all 32-byte
//! blake2b digests. Wrapping them in marked newtypes prevents type-confusion between them.

use std::io::{Result as IoResult, Write};

use blake2::{digest::consts::U32, Blake2b, Digest};

use crate::{
    impl_hex_serde, mark_digest,
    ser::{ByteFormat, SerResult},
};

/// A blake2b-256 digest.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Blake2b256Digest([u8; 32]);

impl_hex_serde!(Blake2b256Digest);

impl ByteFormat for Blake2b256Digest {
    type Error = crate::ser::SerError;

    fn serialized_length(&self) -> usize {
        32
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: std::io::Read,
        Self: std::marker::Sized,
    {
        let mut buf = Blake2b256Digest::default();
        reader.read_exact(buf.as_mut())?;
        Ok(buf)
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        Ok(writer.write(self.as_ref())?)
    }
}

impl core::fmt::Debug for Blake2b256Digest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Blake2b256Digest({})", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Blake2b256Digest {
    fn from(buf: [u8; 32]) -> Self {
        Self(buf)
    }
}

impl AsRef<[u8; 32]> for Blake2b256Digest {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsMut<[u8; 32]> for Blake2b256Digest {
    fn as_mut(&mut self) -> &mut [u8; 32] {
        &mut self.0
    }
}

/// A digest newtype carrying a domain marker.
pub trait MarkedDigest {
    /// The underlying digest type.
    type Digest;

    /// Wrap a digest in the marked newtype.
    fn new(hash: Self::Digest) -> Self;

    /// Return the wrapped digest.
    fn internal(&self) -> Self::Digest;
}

/// A hasher that exposes a `std::io::Write` interface and finishes into a digest.
pub trait MarkedDigestWriter<D>: Default + Write {
    /// Consume the hasher, producing the digest.
    fn finish(self) -> D;

    /// Consume the hasher, producing a marked digest.
    fn finish_marked<M: MarkedDigest<Digest = D>>(self) -> M {
        M::new(self.finish())
    }
}

/// A struct that exposes a blake2b-256 `Write` interface.
pub struct Blake2b256Writer {
    internal: Blake2b<U32>,
}

impl Default for Blake2b256Writer {
    fn default() -> Blake2b256Writer {
        Blake2b256Writer {
            internal: Blake2b::new(),
        }
    }
}

impl Write for Blake2b256Writer {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.internal.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl MarkedDigestWriter<Blake2b256Digest> for Blake2b256Writer {
    fn finish(self) -> Blake2b256Digest {
        let digest: [u8; 32] = self.internal.finalize().into();
        Blake2b256Digest(digest)
    }
}

mark_digest!(
    /// A marked digest representing a transaction id.
    TxId
);
mark_digest!(
    /// A marked digest representing a minting-policy id.
    PolicyId
);
mark_digest!(
    /// A marked digest representing a payment-key hash, as used for required signers.
    KeyHash
);
mark_digest!(
    /// A marked digest representing the hash of a datum.
    DatumHash
);
