//! An indexed collection of tracked outputs.
//!
//! The collection maintains two views over one set of entries: a two-level index
//! (transaction id, then output index) for O(1) membership and lookup, and the insertion
//! order for deterministic iteration and FIFO draining. Both views are backed by a single
//! arena so an entry is owned exactly once; every mutation goes through methods that keep
//! the views in agreement.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chains_core::{
    hashes::TxId,
    types::{Outpoint, Utxo},
};

use crate::{
    error::{ChainError, ChainResult},
    trace::Trace,
};

/// A tracked output: the output value itself plus the provenance trail explaining how it
/// entered the collection. Provenance never participates in equality.
#[derive(Clone, Debug)]
pub struct TracedUtxo {
    /// The output value.
    pub utxo: Utxo,
    /// How the output came to be tracked.
    pub trace: Trace,
}

impl TracedUtxo {
    /// Pair an output with its provenance.
    pub fn new(utxo: Utxo, trace: Trace) -> Self {
        Self { utxo, trace }
    }

    /// The outpoint keying this entry.
    pub fn outpoint(&self) -> Outpoint {
        self.utxo.outpoint
    }
}

/// The result of [`UtxoSet::except`]: both halves are new collections; the source is left
/// untouched.
#[derive(Debug)]
pub struct Excepted {
    /// Entries whose outpoints were not excluded.
    pub remaining: UtxoSet,
    /// The excluded entries.
    pub removed: UtxoSet,
}

/// An indexed, insertion-ordered collection of tracked outputs.
///
/// No two entries share an outpoint. Lookup is O(1); iteration follows insertion order.
#[derive(Clone, Debug, Default)]
pub struct UtxoSet {
    // Arena in insertion order. Removed entries become tombstones so live slots keep
    // their positions.
    entries: Vec<Option<TracedUtxo>>,
    index: HashMap<TxId, HashMap<u64, usize>>,
    // First slot that may still be live; advanced by remove_head.
    head: usize,
    len: usize,
}

impl UtxoSet {
    /// A collection with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a collection from a list of tracked outputs. Fails with
    /// [`ChainError::DuplicateUtxo`] if any two entries share an outpoint.
    pub fn from_list<I>(list: I) -> ChainResult<Self>
    where
        I: IntoIterator<Item = TracedUtxo>,
    {
        let mut set = Self::empty();
        for traced in list {
            set.insert_new(traced)?;
        }
        Ok(set)
    }

    /// The number of tracked outputs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// O(1) membership test.
    pub fn has(&self, outpoint: &Outpoint) -> bool {
        self.slot_of(outpoint).is_some()
    }

    /// The entry at `outpoint`, if tracked.
    pub fn get(&self, outpoint: &Outpoint) -> Option<&TracedUtxo> {
        let slot = self.slot_of(outpoint)?;
        self.entries[slot].as_ref()
    }

    /// Insert if the outpoint is new. Returns whether the insert happened; the caller
    /// decides what a duplicate means.
    pub fn insert(&mut self, traced: TracedUtxo) -> bool {
        let outpoint = traced.outpoint();
        if self.has(&outpoint) {
            return false;
        }
        let slot = self.entries.len();
        self.entries.push(Some(traced));
        self.index
            .entry(outpoint.txid)
            .or_default()
            .insert(outpoint.index, slot);
        self.len += 1;
        true
    }

    /// Insert an output the caller asserts is new. Fails with [`ChainError::DuplicateUtxo`]
    /// — carrying the rejected provenance and a rendering of the current contents — if the
    /// outpoint is already tracked. The collection is unchanged on failure.
    pub fn insert_new(&mut self, traced: TracedUtxo) -> ChainResult<()> {
        if self.has(&traced.outpoint()) {
            return Err(ChainError::DuplicateUtxo {
                outpoint: traced.outpoint(),
                trace: traced.trace.to_string(),
                held: self.to_string(),
            });
        }
        self.insert(traced);
        Ok(())
    }

    /// Insert every entry of `other`, each asserted new. Fails at the first conflict;
    /// entries inserted before the conflict remain inserted.
    pub fn insert_from_set(&mut self, other: UtxoSet) -> ChainResult<()> {
        for traced in other {
            self.insert_new(traced)?;
        }
        Ok(())
    }

    /// Remove the entry at `outpoint` if present. Returns whether something was removed;
    /// absence is not an error.
    pub fn remove(&mut self, outpoint: &Outpoint) -> bool {
        let Some(slot) = self.slot_of(outpoint) else {
            return false;
        };
        self.entries[slot] = None;
        self.unindex(outpoint);
        self.len -= 1;
        true
    }

    /// Split off the entries at `outpoints` into a new collection, returning both the
    /// entries that stay and those that leave. Fails with [`ChainError::UnknownUtxo`] if any
    /// requested outpoint is not tracked; the source is never mutated, and both returned
    /// collections are new.
    pub fn except(&self, outpoints: &[Outpoint]) -> ChainResult<Excepted> {
        for outpoint in outpoints {
            if !self.has(outpoint) {
                return Err(ChainError::UnknownUtxo {
                    outpoint: *outpoint,
                });
            }
        }
        let excluded: HashSet<Outpoint> = outpoints.iter().copied().collect();
        let mut remaining = UtxoSet::empty();
        let mut removed = UtxoSet::empty();
        for traced in self.iter() {
            if excluded.contains(&traced.outpoint()) {
                removed.insert(traced.clone());
            } else {
                remaining.insert(traced.clone());
            }
        }
        Ok(Excepted { remaining, removed })
    }

    /// Remove and return the first entry in insertion order. Fails with
    /// [`ChainError::EmptySet`] on an empty collection.
    pub fn remove_head(&mut self) -> ChainResult<TracedUtxo> {
        while self.head < self.entries.len() {
            if let Some(traced) = self.entries[self.head].take() {
                self.head += 1;
                self.unindex(&traced.outpoint());
                self.len -= 1;
                return Ok(traced);
            }
            self.head += 1;
        }
        Err(ChainError::EmptySet)
    }

    /// The tracked entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TracedUtxo> {
        self.entries.iter().filter_map(|entry| entry.as_ref())
    }

    /// A snapshot of the tracked output values, in insertion order, without provenance.
    pub fn utxos(&self) -> Vec<Utxo> {
        self.iter().map(|traced| traced.utxo.clone()).collect()
    }

    /// The tracked outpoints, in insertion order.
    pub fn outpoints(&self) -> Vec<Outpoint> {
        self.iter().map(TracedUtxo::outpoint).collect()
    }

    fn slot_of(&self, outpoint: &Outpoint) -> Option<usize> {
        self.index.get(&outpoint.txid)?.get(&outpoint.index).copied()
    }

    fn unindex(&mut self, outpoint: &Outpoint) {
        if let Some(by_index) = self.index.get_mut(&outpoint.txid) {
            by_index.remove(&outpoint.index);
            if by_index.is_empty() {
                self.index.remove(&outpoint.txid);
            }
        }
    }
}

/// Equality compares sizes and, per outpoint, the external output values. Provenance is
/// excluded.
impl PartialEq for UtxoSet {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.iter().all(|traced| {
                other
                    .get(&traced.outpoint())
                    .map(|found| found.utxo == traced.utxo)
                    .unwrap_or(false)
            })
    }
}

impl Eq for UtxoSet {}

impl IntoIterator for UtxoSet {
    type Item = TracedUtxo;
    type IntoIter = std::iter::Flatten<std::vec::IntoIter<Option<TracedUtxo>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter().flatten()
    }
}

impl fmt::Display for UtxoSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "  (empty)");
        }
        for traced in self.iter() {
            writeln!(f, "  {}", traced.utxo)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trace::TraceSource;
    use chains_core::{
        enc::{Address, NetworkId},
        types::{TxOut, Value},
    };

    fn utxo(txid_byte: u8, index: u64, coin: u64) -> TracedUtxo {
        let outpoint = Outpoint::new(TxId::from([txid_byte; 32]), index);
        let output = TxOut::new(
            Address::new(NetworkId::Testnet, vec![txid_byte]),
            Value::coin(coin),
        );
        TracedUtxo::new(
            Utxo::new(outpoint, output),
            Trace::source(TraceSource::CallerInput, "test fixture"),
        )
    }

    #[test]
    fn it_tracks_membership_and_lookup() {
        let a = utxo(1, 0, 100);
        let set = UtxoSet::from_list([a.clone(), utxo(1, 1, 50), utxo(2, 0, 25)]).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.has(&a.outpoint()));
        assert_eq!(set.get(&a.outpoint()).unwrap().utxo, a.utxo);
        assert!(!set.has(&Outpoint::new(TxId::from([9u8; 32]), 0)));
        assert!(set.get(&Outpoint::new(TxId::from([1u8; 32]), 2)).is_none());

        // Iteration follows insertion order, not key order
        let expected: Vec<Outpoint> = [(1u8, 0u64), (1, 1), (2, 0)]
            .into_iter()
            .map(|(tag, index)| Outpoint::new(TxId::from([tag; 32]), index))
            .collect();
        assert_eq!(set.outpoints(), expected);
    }

    #[test]
    fn it_builds_the_same_set_from_list_and_from_merge() {
        let a = vec![utxo(1, 0, 10), utxo(1, 1, 20)];
        let b = vec![utxo(2, 0, 30), utxo(3, 0, 40)];

        let combined =
            UtxoSet::from_list(a.iter().cloned().chain(b.iter().cloned())).unwrap();
        let mut merged = UtxoSet::from_list(a).unwrap();
        merged.insert_from_set(UtxoSet::from_list(b).unwrap()).unwrap();

        assert_eq!(combined, merged);
    }

    #[test]
    fn it_rejects_duplicate_inserts_without_mutating() {
        let mut set = UtxoSet::from_list([utxo(1, 0, 100), utxo(2, 0, 50)]).unwrap();
        let snapshot = set.clone();

        assert!(!set.insert(utxo(1, 0, 999)));
        let err = set.insert_new(utxo(1, 0, 999)).unwrap_err();
        assert!(matches!(err, ChainError::DuplicateUtxo { .. }));
        assert_eq!(set, snapshot);
    }

    #[test]
    fn it_reports_the_provenance_of_a_rejected_insert() {
        let mut set = UtxoSet::from_list([utxo(1, 0, 100)]).unwrap();
        let err = set.insert_new(utxo(1, 0, 100)).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("INPUT: test fixture"));
        assert!(rendered.contains("already tracked"));
    }

    #[test]
    fn it_splits_with_except() {
        let a = utxo(1, 0, 10);
        let b = utxo(1, 1, 20);
        let c = utxo(2, 0, 30);
        let set = UtxoSet::from_list([a.clone(), b.clone(), c.clone()]).unwrap();

        let Excepted { remaining, removed } = set.except(&[b.outpoint()]).unwrap();
        assert_eq!(remaining, UtxoSet::from_list([a.clone(), c.clone()]).unwrap());
        assert_eq!(removed, UtxoSet::from_list([b.clone()]).unwrap());
        // The source is untouched
        assert_eq!(set.len(), 3);

        // Excluding exactly the full key set leaves nothing behind
        let Excepted { remaining, removed } =
            set.except(&[a.outpoint(), b.outpoint(), c.outpoint()]).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(removed, set);
    }

    #[test]
    fn it_fails_except_on_an_untracked_outpoint() {
        let set = UtxoSet::from_list([utxo(1, 0, 10)]).unwrap();
        let snapshot = set.clone();
        let missing = Outpoint::new(TxId::from([7u8; 32]), 3);
        let err = set.except(&[missing]).unwrap_err();
        assert!(matches!(err, ChainError::UnknownUtxo { outpoint } if outpoint == missing));
        assert_eq!(set, snapshot);
    }

    #[test]
    fn it_drains_in_insertion_order() {
        let entries = [utxo(1, 0, 10), utxo(2, 0, 20), utxo(3, 0, 30)];
        let mut set = UtxoSet::from_list(entries.clone()).unwrap();

        for (drained, expected) in std::iter::from_fn(|| set.remove_head().ok()).zip(&entries) {
            assert_eq!(drained.utxo, expected.utxo);
        }
        assert!(set.is_empty());
        assert!(matches!(set.remove_head(), Err(ChainError::EmptySet)));
        assert!(matches!(UtxoSet::empty().remove_head(), Err(ChainError::EmptySet)));
    }

    #[test]
    fn it_interleaves_removal_and_fifo_draining() {
        let a = utxo(1, 0, 10);
        let b = utxo(2, 0, 20);
        let c = utxo(3, 0, 30);
        let mut set = UtxoSet::from_list([a.clone(), b.clone(), c.clone()]).unwrap();

        assert!(set.remove(&b.outpoint()));
        assert!(!set.remove(&b.outpoint()));
        assert_eq!(set.remove_head().unwrap().utxo, a.utxo);
        assert_eq!(set.remove_head().unwrap().utxo, c.utxo);
        assert!(set.is_empty());
    }

    #[test]
    fn it_deep_clones() {
        let original = UtxoSet::from_list([utxo(1, 0, 10), utxo(2, 0, 20)]).unwrap();
        let snapshot = original.clone();
        let mut branch = original.clone();

        branch.remove_head().unwrap();
        branch.insert(utxo(9, 0, 90));

        assert_eq!(original, snapshot);
        assert_ne!(branch, original);
    }

    #[test]
    fn it_ignores_provenance_in_equality() {
        let plain = utxo(1, 0, 10);
        let mut relabeled = plain.clone();
        relabeled.trace = plain.trace.via("relabeled");

        let left = UtxoSet::from_list([plain]).unwrap();
        let right = UtxoSet::from_list([relabeled]).unwrap();
        assert_eq!(left, right);
    }
}
