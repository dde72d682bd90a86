//! Key-based row indexing

use indexmap::map::Entry;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::model::{CompositeKey, Row};

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Mapping from composite key to the first row carrying it.
///
/// Later rows with an already-seen key are dropped and their key is recorded
/// once per extra occurrence in `duplicates`.
#[derive(Debug)]
pub struct RowIndex<'a> {
    entries: FxIndexMap<CompositeKey, &'a Row>,
    duplicates: Vec<CompositeKey>,
}

impl<'a> RowIndex<'a> {
    /// Index `rows` by the values of `key_columns`
    pub fn build(rows: &'a [Row], key_columns: &[String]) -> Self {
        let mut entries = FxIndexMap::with_capacity_and_hasher(rows.len(), FxBuildHasher);
        let mut duplicates = Vec::new();

        for row in rows {
            match entries.entry(CompositeKey::from_row(row, key_columns)) {
                Entry::Vacant(slot) => {
                    slot.insert(row);
                }
                Entry::Occupied(slot) => duplicates.push(slot.key().clone()),
            }
        }

        Self {
            entries,
            duplicates,
        }
    }

    /// Look up the authoritative row for a key
    pub fn get(&self, key: &CompositeKey) -> Option<&'a Row> {
        self.entries.get(key).copied()
    }

    pub fn contains_key(&self, key: &CompositeKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Indexed keys and rows in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&CompositeKey, &'a Row)> + '_ {
        self.entries.iter().map(|(k, r)| (k, *r))
    }

    /// Keys seen more than once, one entry per extra occurrence
    pub fn duplicates(&self) -> &[CompositeKey] {
        &self.duplicates
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
