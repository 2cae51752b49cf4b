//! Capacity policies
//!
//! [`Unlimited`] caches grow without bound and carry a zero-sized
//! [`NoEviction`]. [`Limited<N>`] and [`Bounded`] cap the cache and evict in
//! LRU order through an [`LruTracker`].

use crate::lru::LruTracker;
use crate::store::Store;

/// Recency bookkeeping driven by the engine on every call
pub trait Eviction<K> {
    /// Token kept next to each stored value to find its recency record
    type Handle: Copy;

    /// Track a freshly inserted key as most recently used
    fn record(&mut self, key: &K) -> Self::Handle;

    /// Mark an existing key as most recently used
    fn touch(&mut self, handle: Self::Handle);

    /// If `store` is at capacity, drop the least recently used entry from
    /// both the tracker and the store and return its key.
    fn evict_if_full<V, S: Store<K, V>>(&mut self, store: &mut S) -> Option<K>;

    /// Number of tracked keys
    fn len(&self) -> usize;

    /// Check if nothing is tracked
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries, `None` when unbounded
    fn capacity(&self) -> Option<usize>;

    /// Forget every key
    fn clear(&mut self);

    /// Tracked keys, least recently used first
    fn tracked<'a>(&'a self) -> Box<dyn Iterator<Item = &'a K> + 'a>
    where
        K: 'a;
}

/// Eviction stand-in for unbounded caches
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEviction;

impl<K> Eviction<K> for NoEviction {
    type Handle = ();

    #[inline]
    fn record(&mut self, _key: &K) {}

    #[inline]
    fn touch(&mut self, _handle: ()) {}

    #[inline]
    fn evict_if_full<V, S: Store<K, V>>(&mut self, _store: &mut S) -> Option<K> {
        None
    }

    fn len(&self) -> usize {
        0
    }

    fn capacity(&self) -> Option<usize> {
        None
    }

    fn clear(&mut self) {}

    fn tracked<'a>(&'a self) -> Box<dyn Iterator<Item = &'a K> + 'a>
    where
        K: 'a,
    {
        Box::new(std::iter::empty())
    }
}

/// Picks the eviction tracker for keys of type `K`.
///
/// Implemented only by [`Unlimited`], [`Limited<N>`] and [`Bounded`].
pub trait LimitPolicy<K> {
    /// Tracker owned by the engine
    type Tracker: Eviction<K>;
}

/// Limit policies whose tracker needs no runtime input
pub trait FixedLimit<K>: LimitPolicy<K> {
    /// Build the tracker
    fn tracker() -> Self::Tracker;
}

/// No capacity limit (the default)
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

/// Compile-time capacity `N` with LRU eviction. `N` must be non-zero.
///
/// ```
/// use memocache::{Limited, Memo, Ordered};
///
/// let m: Memo<(u8,), u8, Ordered, Limited<2>> = Memo::new(|(x,): (u8,)| x);
/// assert_eq!(m.capacity(), Some(2));
/// ```
///
/// A zero capacity is refused when the engine is built:
///
/// ```compile_fail
/// use memocache::{Limited, Memo, Ordered};
///
/// let _m: Memo<(u8,), u8, Ordered, Limited<0>> = Memo::new(|(x,): (u8,)| x);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Limited<const N: usize>;

/// Capacity chosen at construction with LRU eviction
#[derive(Debug, Clone, Copy, Default)]
pub struct Bounded;

impl<K> LimitPolicy<K> for Unlimited {
    type Tracker = NoEviction;
}

impl<K> FixedLimit<K> for Unlimited {
    fn tracker() -> NoEviction {
        NoEviction
    }
}

impl<const N: usize> Limited<N> {
    const NON_ZERO: () = assert!(N > 0, "Limited<N> requires a capacity greater than 0");
}

impl<K: Clone, const N: usize> LimitPolicy<K> for Limited<N> {
    type Tracker = LruTracker<K>;
}

impl<K: Clone, const N: usize> FixedLimit<K> for Limited<N> {
    fn tracker() -> LruTracker<K> {
        let () = Self::NON_ZERO;
        LruTracker::bounded(N)
    }
}

impl<K: Clone> LimitPolicy<K> for Bounded {
    type Tracker = LruTracker<K>;
}
