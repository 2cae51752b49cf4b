//! Backing stores for memoized results
//!
//! A store owns every key/value entry of one engine. Two backends exist:
//! - [`OrderedStore`]: `BTreeMap`, O(log n), iterates in key order
//! - [`UnorderedStore`]: `HashMap` with AHash, amortized O(1), no order
//!
//! The [`Ordered`] and [`Unordered`] tags pick one at the type level.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::hash_map::{self, HashMap};
use std::fmt;
use std::hash::Hash;

use ahash::RandomState;

/// Key/value container behind a memoization engine
pub trait Store<K, V> {
    /// Iterator over the stored keys
    type Keys<'a>: Iterator<Item = &'a K>
    where
        Self: 'a,
        K: 'a;

    /// Look up the value stored for `key`
    fn lookup(&self, key: &K) -> Option<&V>;

    /// Insert a new entry and return a reference to its value.
    ///
    /// The key must not already be present.
    fn insert(&mut self, key: K, value: V) -> &V;

    /// Remove the entry for `key`
    fn erase(&mut self, key: &K) -> Option<V>;

    /// Number of entries
    fn len(&self) -> usize;

    /// Check if the store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry
    fn clear(&mut self);

    /// Iterate the stored keys
    fn keys(&self) -> Self::Keys<'_>;
}

/// Tree-backed store with sorted iteration
pub struct OrderedStore<K, V> {
    map: BTreeMap<K, V>,
}

impl<K, V> OrderedStore<K, V> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
}

impl<K, V> Default for OrderedStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for OrderedStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

impl<K: Ord, V> Store<K, V> for OrderedStore<K, V> {
    type Keys<'a>
        = btree_map::Keys<'a, K, V>
    where
        Self: 'a,
        K: 'a;

    #[inline]
    fn lookup(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    fn insert(&mut self, key: K, value: V) -> &V {
        match self.map.entry(key) {
            btree_map::Entry::Vacant(slot) => slot.insert(value),
            btree_map::Entry::Occupied(mut slot) => {
                debug_assert!(false, "duplicate key inserted into ordered store");
                slot.insert(value);
                slot.into_mut()
            }
        }
    }

    fn erase(&mut self, key: &K) -> Option<V> {
        self.map.remove(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&mut self) {
        self.map.clear();
    }

    fn keys(&self) -> Self::Keys<'_> {
        self.map.keys()
    }
}

/// Hash-backed store, AHash-keyed
pub struct UnorderedStore<K, V> {
    map: HashMap<K, V, RandomState>,
}

impl<K, V> UnorderedStore<K, V> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            map: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Create an empty store with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn allocated(&self) -> usize {
        self.map.capacity()
    }
}

impl<K, V> Default for UnorderedStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for UnorderedStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for UnorderedStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

impl<K: Hash + Eq, V> Store<K, V> for UnorderedStore<K, V> {
    type Keys<'a>
        = hash_map::Keys<'a, K, V>
    where
        Self: 'a,
        K: 'a;

    #[inline]
    fn lookup(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    fn insert(&mut self, key: K, value: V) -> &V {
        match self.map.entry(key) {
            hash_map::Entry::Vacant(slot) => slot.insert(value),
            hash_map::Entry::Occupied(mut slot) => {
                debug_assert!(false, "duplicate key inserted into unordered store");
                slot.insert(value);
                slot.into_mut()
            }
        }
    }

    fn erase(&mut self, key: &K) -> Option<V> {
        self.map.remove(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&mut self) {
        self.map.clear();
    }

    fn keys(&self) -> Self::Keys<'_> {
        self.map.keys()
    }
}

/// Picks the store backend for keys of type `K`.
///
/// Implemented only by [`Ordered`] and [`Unordered`].
pub trait StorePolicy<K> {
    /// Store holding values of type `V`
    type Store<V>: Store<K, V> + Default;

    /// Empty store expected to hold up to `capacity` values
    fn with_capacity<V>(capacity: usize) -> Self::Store<V>;

    /// Deep copy of a store
    fn duplicate<V: Clone>(store: &Self::Store<V>) -> Self::Store<V>
    where
        K: Clone;
}

/// Tree-backed store policy (the default)
#[derive(Debug, Clone, Copy, Default)]
pub struct Ordered;

/// Hash-backed store policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Unordered;

impl<K: Ord> StorePolicy<K> for Ordered {
    type Store<V> = OrderedStore<K, V>;

    fn with_capacity<V>(_capacity: usize) -> OrderedStore<K, V> {
        OrderedStore::new()
    }

    fn duplicate<V: Clone>(store: &OrderedStore<K, V>) -> OrderedStore<K, V>
    where
        K: Clone,
    {
        store.clone()
    }
}

impl<K: Hash + Eq> StorePolicy<K> for Unordered {
    type Store<V> = UnorderedStore<K, V>;

    fn with_capacity<V>(capacity: usize) -> UnorderedStore<K, V> {
        UnorderedStore::with_capacity(capacity)
    }

    fn duplicate<V: Clone>(store: &UnorderedStore<K, V>) -> UnorderedStore<K, V>
    where
        K: Clone,
    {
        store.clone()
    }
}
