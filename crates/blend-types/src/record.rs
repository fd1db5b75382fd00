//! Immutable, shared key-value records.
//!
//! A [`Record`] is an `Arc<BTreeMap<String, Value>>`. It cannot be mutated in
//! place; [`Record::with`] and [`Record::without`] derive a new record that
//! shares every untouched child with its source. Keys iterate in sorted order.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// A plain key-value container.
#[derive(Clone, Default)]
pub struct Record(Arc<BTreeMap<String, Value>>);

impl Record {
    /// Create a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a map as a record.
    pub fn from_map(entries: BTreeMap<String, Value>) -> Self {
        Self(Arc::new(entries))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.values()
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// The underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.0
    }

    /// Returns `true` if both handles point at the same record allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns `true` if both records have exactly the same key set.
    pub fn same_keys(&self, other: &Self) -> bool {
        self.len() == other.len() && self.keys().eq(other.keys())
    }

    /// A new record allocation holding the same children.
    #[must_use]
    pub fn shallow_copy(&self) -> Self {
        Self::from_map(BTreeMap::clone(&self.0))
    }

    /// Derive a record with `key` set to `value`. Other entries are shared.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut entries = BTreeMap::clone(&self.0);
        entries.insert(key.into(), value.into());
        Self::from_map(entries)
    }

    /// Derive a record without `key`. Other entries are shared.
    #[must_use]
    pub fn without(&self, key: &str) -> Self {
        let mut entries = BTreeMap::clone(&self.0);
        entries.remove(key);
        Self::from_map(entries)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
