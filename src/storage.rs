// 🗂️ Sequence Storage - transaction identity → owning sequence lookup

use crate::error::Result;
use crate::sequence::TransactionSequence;
use crate::transaction::{RawTransaction, Transaction};
use arc_swap::ArcSwapOption;
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// SEQUENCE STORAGE
// ============================================================================

/// Index from transaction identity to the sequence owning it.
///
/// Sequences are stored once; the index points into them. Adding a sequence
/// overwrites the mapping of any identity it shares with an earlier one.
#[derive(Debug, Default)]
pub struct SequenceStorage {
    sequences: Vec<TransactionSequence>,

    /// identity → index in `sequences`
    index: HashMap<String, usize>,

    /// identities in first-registration order (serialization only)
    order: Vec<String>,
}

impl SequenceStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every member of `sequence`
    pub fn add_sequence(&mut self, sequence: TransactionSequence) {
        let position = self.sequences.len();

        for transaction in &sequence {
            let id = transaction.id().to_string();
            if self.index.insert(id.clone(), position).is_none() {
                self.order.push(id);
            }
        }

        self.sequences.push(sequence);
    }

    pub fn add_sequences<I>(&mut self, sequences: I)
    where
        I: IntoIterator<Item = TransactionSequence>,
    {
        for sequence in sequences {
            self.add_sequence(sequence);
        }
    }

    /// O(1) lookup by identity; `None` when the transaction was never registered
    pub fn lookup(&self, transaction: &Transaction) -> Option<&TransactionSequence> {
        self.lookup_id(transaction.id())
    }

    pub fn lookup_id(&self, id: &str) -> Option<&TransactionSequence> {
        self.index.get(id).map(|&position| &self.sequences[position])
    }

    /// Lookup for a record in its raw form. Fails only on a malformed date.
    pub fn lookup_raw(&self, raw: &RawTransaction) -> Result<Option<&TransactionSequence>> {
        let transaction = Transaction::from_raw(raw)?;
        Ok(self.lookup(&transaction))
    }

    /// Number of registered transaction identities
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Distinct sequences still reachable through the index, in insertion order
    pub fn sequences(&self) -> Vec<&TransactionSequence> {
        let mut reachable = vec![false; self.sequences.len()];
        for &position in self.index.values() {
            reachable[position] = true;
        }

        self.sequences
            .iter()
            .zip(reachable)
            .filter_map(|(sequence, keep)| keep.then_some(sequence))
            .collect()
    }
}

/// Serialized as `{"transactions": {<identity>: <sequence>, ...}}`
impl Serialize for SequenceStorage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SequenceStorage", 1)?;
        state.serialize_field("transactions", &IdentityMap(self))?;
        state.end()
    }
}

struct IdentityMap<'a>(&'a SequenceStorage);

impl Serialize for IdentityMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let storage = self.0;
        let mut map = serializer.serialize_map(Some(storage.order.len()))?;
        for id in &storage.order {
            if let Some(sequence) = storage.lookup_id(id) {
                map.serialize_entry(id, sequence)?;
            }
        }
        map.end()
    }
}

// ============================================================================
// SHARED STORAGE HANDLE
// ============================================================================

/// Handle for hosts that load and query from different threads.
///
/// Each parse run publishes a fresh immutable snapshot; readers keep whatever
/// snapshot they loaded even if a newer one is published meanwhile.
#[derive(Debug, Default)]
pub struct SharedStorage {
    current: ArcSwapOption<SequenceStorage>,
}

impl SharedStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new snapshot, replacing the previous one atomically
    pub fn replace(&self, storage: SequenceStorage) {
        self.current.store(Some(Arc::new(storage)));
    }

    /// Current snapshot, or `None` if nothing was loaded yet
    pub fn snapshot(&self) -> Option<Arc<SequenceStorage>> {
        self.current.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    /// Lookup against the current snapshot
    pub fn lookup(&self, transaction: &Transaction) -> Option<TransactionSequence> {
        self.snapshot()
            .and_then(|storage| storage.lookup(transaction).cloned())
    }
}

// ============================================================================
// TESTS
// ============================================================================
