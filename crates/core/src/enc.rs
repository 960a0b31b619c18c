//! Bech32 address encoding with a network-derived human-readable prefix. Addresses compare by
//! exact value equality only; no normalization beyond bech32 decoding is performed.

use std::fmt;
use std::str::FromStr;

use bech32::{FromBase32, ToBase32, Variant};
use thiserror::Error;

/// Errors that can be returned by the address codec.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// Bubbled up from the bech32 library.
    #[error(transparent)]
    BechError(#[from] bech32::Error),

    /// The string decoded, but with an unexpected human-readable prefix.
    #[error("Wrong HRP. Expected {expected}, got {got}")]
    WrongHrp {
        /// The HRP implied by the network.
        expected: String,
        /// The HRP found in the string.
        got: String,
    },
}

/// Type alias for encoding errors.
pub type EncodingResult<T> = Result<T, EncodingError>;

/// The network a transaction chain operates on. Determines the address prefix.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NetworkId {
    /// The production network.
    Mainnet,
    /// Any test network.
    Testnet,
}

impl NetworkId {
    /// The bech32 human-readable prefix for addresses on this network.
    pub fn hrp(self) -> &'static str {
        match self {
            NetworkId::Mainnet => "addr",
            NetworkId::Testnet => "addr_test",
        }
    }

    /// Recover the network from an address prefix, if it is a known one.
    pub fn from_hrp(hrp: &str) -> Option<Self> {
        match hrp {
            "addr" => Some(NetworkId::Mainnet),
            "addr_test" => Some(NetworkId::Testnet),
            _ => None,
        }
    }
}

/// A payment address: a human-readable prefix plus an opaque payload.
///
/// Construction goes through [`Address::new`] (network-derived prefix) or [`FromStr`]
/// (bech32 decoding), so the prefix is always encodable.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Address {
    hrp: String,
    payload: Vec<u8>,
}

impl Address {
    /// Instantiate an address on `network` with the given payload bytes.
    pub fn new(network: NetworkId, payload: Vec<u8>) -> Self {
        Self {
            hrp: network.hrp().to_owned(),
            payload,
        }
    }

    /// The human-readable prefix.
    pub fn hrp(&self) -> &str {
        &self.hrp
    }

    /// The opaque payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The network this address belongs to, if its prefix is a known one.
    pub fn network(&self) -> Option<NetworkId> {
        NetworkId::from_hrp(&self.hrp)
    }

    /// Parse an address, additionally checking that it belongs to `network`.
    pub fn parse_on(network: NetworkId, s: &str) -> EncodingResult<Self> {
        let addr: Address = s.parse()?;
        if addr.hrp != network.hrp() {
            return Err(EncodingError::WrongHrp {
                expected: network.hrp().to_owned(),
                got: addr.hrp,
            });
        }
        Ok(addr)
    }
}

impl crate::ser::ByteFormat for Address {
    type Error = crate::ser::SerError;

    fn serialized_length(&self) -> usize {
        4 + self.hrp.len() + 4 + self.payload.len()
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> crate::ser::SerResult<Self>
    where
        R: std::io::Read,
        Self: std::marker::Sized,
    {
        let hrp = String::from_utf8(Self::read_prefix_vec(reader)?)?;
        let payload = Self::read_prefix_vec(reader)?;
        Ok(Address { hrp, payload })
    }

    fn write_to<W>(&self, writer: &mut W) -> crate::ser::SerResult<usize>
    where
        W: std::io::Write,
    {
        let mut written = Self::write_prefix_vec(writer, self.hrp.as_bytes())?;
        written += Self::write_prefix_vec(writer, &self.payload)?;
        Ok(written)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match bech32::encode(&self.hrp, self.payload.to_base32(), Variant::Bech32) {
            Ok(s) => f.write_str(&s),
            // Unreachable for addresses built via `new` or `FromStr`
            Err(_) => write!(f, "{}1{}", self.hrp, hex::encode(&self.payload)),
        }
    }
}

impl FromStr for Address {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hrp, data, _variant) = bech32::decode(s)?;
        let payload = Vec::<u8>::from_base32(&data)?;
        Ok(Address { hrp, payload })
    }
}

impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        s.parse().map_err(|e: EncodingError| serde::de::Error::custom(e.to_string()))
    }
}
