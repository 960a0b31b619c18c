//! Asset values: a coin quantity plus arbitrarily many policy-scoped assets.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::{
    hashes::PolicyId,
    ser::{ByteFormat, SerError, SerResult},
    wrap_byte_vector,
};

wrap_byte_vector!(
    /// An asset name within a minting policy.
    AssetName
);

/// The globally unique identity of an asset class: minting policy plus name.
#[derive(
    Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct AssetId {
    /// The minting policy that governs the asset.
    pub policy: PolicyId,
    /// The name of the asset under that policy.
    pub name: AssetName,
}

impl AssetId {
    /// Instantiate a new asset id.
    pub fn new(policy: PolicyId, name: AssetName) -> Self {
        Self { policy, name }
    }
}

impl ByteFormat for AssetId {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.policy.serialized_length() + self.name.serialized_length()
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        Ok(AssetId {
            policy: PolicyId::read_from(reader, 0)?,
            name: AssetName::read_from(reader, 0)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        Ok(self.policy.write_to(writer)? + self.name.write_to(writer)?)
    }
}

/// A quantity of coin plus any number of other assets. The map is ordered so the serialized
/// form is deterministic.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Value {
    /// The coin (lovelace-like base unit) quantity.
    pub coin: u64,
    /// Quantities of non-coin assets, keyed by asset id. Zero quantities are never stored.
    pub assets: BTreeMap<AssetId, u64>,
}

impl Value {
    /// A pure-coin value.
    pub fn coin(coin: u64) -> Self {
        Self {
            coin,
            assets: BTreeMap::new(),
        }
    }

    /// Builder-style helper adding `amount` of `id` to this value.
    pub fn with_asset(mut self, id: AssetId, amount: u64) -> Self {
        if amount > 0 {
            *self.assets.entry(id).or_insert(0) += amount;
        }
        self
    }

    /// True if this value carries no coin and no assets.
    pub fn is_zero(&self) -> bool {
        self.coin == 0 && self.assets.is_empty()
    }

    /// Component-wise sum. `None` on overflow.
    pub fn checked_add(&self, other: &Value) -> Option<Value> {
        let mut out = self.clone();
        out.coin = out.coin.checked_add(other.coin)?;
        for (id, amount) in &other.assets {
            let entry = out.assets.entry(id.clone()).or_insert(0);
            *entry = entry.checked_add(*amount)?;
        }
        Some(out)
    }

    /// Component-wise difference. `None` if any component of `other` exceeds `self`.
    /// Asset entries that reach zero are dropped.
    pub fn checked_sub(&self, other: &Value) -> Option<Value> {
        let mut out = self.clone();
        out.coin = out.coin.checked_sub(other.coin)?;
        for (id, amount) in &other.assets {
            let held = out.assets.get_mut(id)?;
            *held = held.checked_sub(*amount)?;
            if *held == 0 {
                out.assets.remove(id);
            }
        }
        Some(out)
    }

    /// True if every component of `other` is covered by `self`.
    pub fn covers(&self, other: &Value) -> bool {
        self.checked_sub(other).is_some()
    }
}

impl ByteFormat for Value {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        let mut len = 8 + 4;
        len += self
            .assets
            .iter()
            .map(|(id, _)| id.serialized_length() + 8)
            .sum::<usize>();
        len
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        let coin = Self::read_u64_le(reader)?;
        let count = Self::read_count_prefix(reader)?;
        let mut assets = BTreeMap::new();
        for _ in 0..count {
            let id = AssetId::read_from(reader, 0)?;
            let amount = Self::read_u64_le(reader)?;
            assets.insert(id, amount);
        }
        Ok(Value { coin, assets })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut written = Self::write_u64_le(writer, self.coin)?;
        written += Self::write_u32_le(writer, self.assets.len() as u32)?;
        for (id, amount) in &self.assets {
            written += id.write_to(writer)?;
            written += Self::write_u64_le(writer, *amount)?;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn asset(tag: u8) -> AssetId {
        AssetId::new(PolicyId::from([tag; 32]), AssetName::from(vec![tag]))
    }

    #[test]
    fn it_adds_and_subtracts_values() {
        let a = Value::coin(100).with_asset(asset(1), 5);
        let b = Value::coin(40).with_asset(asset(1), 5);

        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.coin, 140);
        assert_eq!(sum.assets[&asset(1)], 10);

        let diff = a.checked_sub(&b).unwrap();
        assert_eq!(diff.coin, 60);
        // Entries that reach zero are dropped
        assert!(diff.assets.is_empty());

        assert!(b.checked_sub(&a).is_none());
        assert!(a.covers(&b));
        assert!(!b.covers(&a));
    }

    #[test]
    fn it_serializes_values_deterministically() {
        let v = Value::coin(7).with_asset(asset(2), 3).with_asset(asset(1), 9);
        let mut buf = vec![];
        let written = v.write_to(&mut buf).unwrap();
        assert_eq!(written, buf.len());
        assert_eq!(written, v.serialized_length());
    }
}
