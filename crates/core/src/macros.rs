//! Useful macros for declaring new marked digests and byte wrappers.

#[macro_export]
/// Implement `serde::Serialize` and `serde::Deserialize` by passing through to the hex
/// representation.
macro_rules! impl_hex_serde {
    ($item:ty) => {
        impl serde::Serialize for $item {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                let s = $crate::ser::ByteFormat::serialize_hex(self);
                serializer.serialize_str(&s)
            }
        }

        impl<'de> serde::Deserialize<'de> for $item {
            fn deserialize<D>(deserializer: D) -> Result<$item, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s: String = serde::Deserialize::deserialize(deserializer)?;
                <$item as $crate::ser::ByteFormat>::deserialize_hex(&s)
                    .map_err(|e| serde::de::Error::custom(e.to_string()))
            }
        }
    };
}

#[macro_export]
/// Make a new marked digest wrapping [`crate::hashes::Blake2b256Digest`]. Marked digests keep
/// transaction ids, policy ids, key hashes and datum hashes from being confused for one another.
macro_rules! mark_digest {
    (
        $(#[$outer:meta])*
        $hash_name:ident
    ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $hash_name(pub $crate::hashes::Blake2b256Digest);

        $crate::impl_hex_serde!($hash_name);

        impl $hash_name {
            /// Parse from a hex string.
            pub fn from_hex(hex: &str) -> $crate::ser::SerResult<Self> {
                <Self as $crate::ser::ByteFormat>::deserialize_hex(hex)
            }

            /// The hex rendering of the digest.
            pub fn to_hex(&self) -> String {
                $crate::ser::ByteFormat::serialize_hex(self)
            }
        }

        impl From<[u8; 32]> for $hash_name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes.into())
            }
        }

        impl AsRef<[u8; 32]> for $hash_name {
            fn as_ref(&self) -> &[u8; 32] {
                self.0.as_ref()
            }
        }

        impl std::fmt::Display for $hash_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl $crate::ser::ByteFormat for $hash_name {
            type Error = $crate::ser::SerError;

            fn serialized_length(&self) -> usize {
                32
            }

            fn read_from<R>(reader: &mut R, _limit: usize) -> $crate::ser::SerResult<Self>
            where
                R: std::io::Read,
                Self: std::marker::Sized,
            {
                let mut buf = $crate::hashes::Blake2b256Digest::default();
                reader.read_exact(buf.as_mut())?;
                Ok(Self(buf))
            }

            fn write_to<W>(&self, writer: &mut W) -> $crate::ser::SerResult<usize>
            where
                W: std::io::Write,
            {
                Ok(writer.write(self.0.as_ref())?)
            }
        }

        impl $crate::hashes::MarkedDigest for $hash_name {
            type Digest = $crate::hashes::Blake2b256Digest;

            fn new(hash: $crate::hashes::Blake2b256Digest) -> Self {
                Self(hash)
            }

            fn internal(&self) -> $crate::hashes::Blake2b256Digest {
                self.0
            }
        }

        impl From<$crate::hashes::Blake2b256Digest> for $hash_name {
            fn from(h: $crate::hashes::Blake2b256Digest) -> Self {
                Self(h)
            }
        }
    };
}

#[macro_export]
/// Wrap a count-prefixed vector of bytes (`u8`) in a newtype, and implement convenience
/// functions for it.
macro_rules! wrap_byte_vector {
    (
        $(#[$outer:meta])*
        $wrapper_name:ident
    ) => {
        $(#[$outer])*
        #[derive(Clone, Debug, Eq, PartialEq, Default, Hash, PartialOrd, Ord)]
        pub struct $wrapper_name(Vec<u8>);

        $crate::impl_hex_serde!($wrapper_name);

        impl $crate::ser::ByteFormat for $wrapper_name {
            type Error = $crate::ser::SerError;

            fn serialized_length(&self) -> usize {
                4 + self.len()
            }

            fn read_from<R>(reader: &mut R, _limit: usize) -> Result<Self, Self::Error>
            where
                R: std::io::Read,
            {
                Ok(Self::read_prefix_vec(reader)?.into())
            }

            fn write_to<W>(&self, writer: &mut W) -> Result<usize, Self::Error>
            where
                W: std::io::Write,
            {
                Self::write_prefix_vec(writer, &self.0)
            }
        }

        impl $wrapper_name {
            /// Instantiate a new wrapped vector.
            pub fn new(v: Vec<u8>) -> Self {
                Self(v)
            }

            /// Construct an empty wrapped vector instance.
            pub fn null() -> Self {
                Self(vec![])
            }

            /// Return a reference to the underlying bytes.
            pub fn items(&self) -> &[u8] {
                &self.0
            }

            /// Return the length of the item vector.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Return true if the length of the item vector is 0.
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }
        }

        impl std::convert::AsRef<[u8]> for $wrapper_name {
            fn as_ref(&self) -> &[u8] {
                &self.0[..]
            }
        }

        impl From<&[u8]> for $wrapper_name {
            fn from(v: &[u8]) -> Self {
                Self(v.to_vec())
            }
        }

        impl From<Vec<u8>> for $wrapper_name {
            fn from(v: Vec<u8>) -> Self {
                Self(v)
            }
        }
    };
}
