//! Slot arithmetic. Validity windows are expressed in slots on-chain, but callers often hold
//! wall-clock milliseconds; the conversion rounds in a caller-selected direction.

use std::fmt;

use crate::ser::{ByteFormat, SerError, SerResult};

/// A slot number.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Slot(pub u64);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Slot {
    fn from(n: u64) -> Self {
        Slot(n)
    }
}

impl ByteFormat for Slot {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        8
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: std::io::Read,
        Self: std::marker::Sized,
    {
        Ok(Slot(Self::read_u64_le(reader)?))
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: std::io::Write,
    {
        Self::write_u64_le(writer, self.0)
    }
}

/// Which way to round when a millisecond timestamp falls inside a slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Rounding {
    /// Round toward the slot containing the timestamp.
    Down,
    /// Round toward the next slot boundary.
    Up,
}

/// Slot timing parameters, supplied by the provider.
#[derive(Copy, Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SlotConfig {
    /// Duration of one slot in milliseconds. Must be nonzero.
    pub slot_length_ms: u64,
}

impl SlotConfig {
    /// Instantiate a slot config. `slot_length_ms` must be nonzero.
    pub fn new(slot_length_ms: u64) -> Self {
        Self { slot_length_ms }
    }

    /// The slot containing (or bounding, under [`Rounding::Up`]) the given millisecond
    /// timestamp.
    pub fn slot_at(&self, ms: u64, rounding: Rounding) -> Slot {
        let len = self.slot_length_ms;
        let slot = match rounding {
            Rounding::Down => ms / len,
            Rounding::Up => ms / len + u64::from(ms % len != 0),
        };
        Slot(slot)
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self { slot_length_ms: 1_000 }
    }
}
