//! LRU (Least Recently Used) recency tracking
//!
//! Slab-allocated doubly-linked list, oldest at the front. Every store entry
//! keeps the [`NodeHandle`] of its node, so a hit relocates the node in O(1)
//! without scanning the list.

use tracing::trace;

use crate::error::{Error, Result};
use crate::policy::Eviction;
use crate::store::Store;

/// Position of a key in the recency list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle(usize);

/// Node in the LRU doubly-linked list
#[derive(Debug, Clone)]
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Recency list for a cache with fixed capacity
#[derive(Debug, Clone)]
pub struct LruTracker<K> {
    nodes: Vec<Option<Node<K>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    len: usize,
    capacity: usize,
}

impl<K> LruTracker<K> {
    /// Create a tracker for at most `capacity` entries
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Self::bounded(capacity))
    }

    pub(crate) fn bounded(capacity: usize) -> Self {
        debug_assert!(capacity > 0);

        Self {
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_list: Vec::new(),
            len: 0,
            capacity,
        }
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Keys from least to most recently used
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            tracker: self,
            cursor: self.head,
        }
    }

    /// Append a key at the most-recently-used end
    pub(crate) fn push_back(&mut self, key: K) -> NodeHandle {
        let idx = self.alloc_node(Node {
            key,
            prev: None,
            next: None,
        });
        self.attach_back(idx);
        self.len += 1;
        NodeHandle(idx)
    }

    /// Relocate a node to the most-recently-used end.
    ///
    /// Handles whose node has already been popped are ignored.
    pub(crate) fn move_to_back(&mut self, handle: NodeHandle) {
        let idx = handle.0;
        if self.tail == Some(idx) || self.node(idx).is_none() {
            return;
        }

        self.unlink(idx);
        self.attach_back(idx);
    }

    /// Remove and return the least recently used key
    pub(crate) fn pop_front(&mut self) -> Option<K> {
        let head_idx = self.head?;
        self.unlink(head_idx);
        let node = self.release_node(head_idx)?;
        self.len -= 1;
        Some(node.key)
    }

    /// Forget every key
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn node(&self, idx: usize) -> Option<&Node<K>> {
        self.nodes.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<K>> {
        self.nodes.get_mut(idx).and_then(Option::as_mut)
    }

    /// Link a detached live node after the current tail
    fn attach_back(&mut self, idx: usize) {
        let prev = self.tail;
        if let Some(node) = self.node_mut(idx) {
            node.prev = prev;
            node.next = None;
        }

        match prev.and_then(|tail_idx| self.node_mut(tail_idx)) {
            Some(tail) => tail.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    /// Detach a live node from its neighbours, leaving it in its slot
    fn unlink(&mut self, idx: usize) {
        let Some(&Node { prev, next, .. }) = self.node(idx) else {
            return;
        };

        match prev.and_then(|p| self.node_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }
    }

    /// Place `node` in a free slot, growing the slab when none is left
    fn alloc_node(&mut self, node: Node<K>) -> usize {
        match self.free_list.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    /// Empty a slot and make it available for reuse
    fn release_node(&mut self, idx: usize) -> Option<Node<K>> {
        let node = self.nodes.get_mut(idx)?.take()?;
        self.free_list.push(idx);
        Some(node)
    }
}

impl<K: Clone> Eviction<K> for LruTracker<K> {
    type Handle = NodeHandle;

    fn record(&mut self, key: &K) -> NodeHandle {
        self.push_back(key.clone())
    }

    fn touch(&mut self, handle: NodeHandle) {
        self.move_to_back(handle);
    }

    fn evict_if_full<V, S: Store<K, V>>(&mut self, store: &mut S) -> Option<K> {
        if store.len() < self.capacity || store.is_empty() {
            return None;
        }

        let victim = self.pop_front()?;
        let erased = store.erase(&victim);
        debug_assert!(erased.is_some(), "evicted key was not in the store");
        trace!(remaining = self.len, "dropped least-recently-used node");
        Some(victim)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.capacity)
    }

    fn clear(&mut self) {
        LruTracker::clear(self);
    }

    fn tracked<'a>(&'a self) -> Box<dyn Iterator<Item = &'a K> + 'a>
    where
        K: 'a,
    {
        Box::new(self.iter())
    }
}

/// Iterator over tracked keys, least recently used first
pub struct Iter<'a, K> {
    tracker: &'a LruTracker<K>,
    cursor: Option<usize>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.tracker.node(idx)?;
        self.cursor = node.next;
        Some(&node.key)
    }
}
