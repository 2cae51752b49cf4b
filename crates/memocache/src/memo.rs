//! Memo: transparent result caching around a pure computation

use std::fmt;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::key::CacheKey;
use crate::lru::LruTracker;
use crate::policy::{Bounded, Eviction, FixedLimit, LimitPolicy, Unlimited};
use crate::stats::CacheStats;
use crate::store::{Ordered, Store, StorePolicy};

/// Type-erased wrapped computation that can be duplicated with its engine
trait Computation<A, R> {
    fn compute(&mut self, args: A) -> R;

    fn clone_box(&self) -> Box<dyn Computation<A, R>>;
}

impl<A, R, F> Computation<A, R> for F
where
    F: FnMut(A) -> R + Clone + 'static,
{
    #[inline]
    fn compute(&mut self, args: A) -> R {
        self(args)
    }

    fn clone_box(&self) -> Box<dyn Computation<A, R>> {
        Box::new(self.clone())
    }
}

/// Stored value plus the handle of its recency record
#[derive(Clone)]
struct Slot<R, H> {
    value: R,
    handle: H,
}

type HandleOf<A, L> =
    <<L as LimitPolicy<CacheKey<A>>>::Tracker as Eviction<CacheKey<A>>>::Handle;

/// Memoizing wrapper around a deterministic computation
///
/// `A` is the argument tuple, `R` the result. `O` selects the store
/// ([`Ordered`] or [`Unordered`](crate::Unordered)) and `L` the capacity
/// policy ([`Unlimited`], [`Limited<N>`](crate::Limited) or [`Bounded`]).
///
/// # Example
/// ```
/// use memocache::{Limited, Memo, Ordered};
///
/// let mut double: Memo<(u64,), u64, Ordered, Limited<2>> = Memo::new(|(x,): (u64,)| x * 2);
///
/// assert_eq!(double.call((21,)), 42);
/// assert_eq!(double.call((21,)), 42);
/// assert_eq!(double.stats().misses(), 1);
/// ```
pub struct Memo<A, R, O = Ordered, L = Unlimited>
where
    O: StorePolicy<CacheKey<A>>,
    L: LimitPolicy<CacheKey<A>>,
{
    /// Cached results keyed by arguments
    store: O::Store<Slot<R, HandleOf<A, L>>>,

    /// Recency order, zero-sized when unbounded
    tracker: L::Tracker,

    /// Wrapped computation
    func: Box<dyn Computation<A, R>>,

    /// Hit/miss statistics
    stats: CacheStats,
}

impl<A, R, O, L> Memo<A, R, O, L>
where
    O: StorePolicy<CacheKey<A>>,
    L: FixedLimit<CacheKey<A>>,
{
    /// Wrap `func` in a new, empty cache
    pub fn new<F>(func: F) -> Self
    where
        F: FnMut(A) -> R + Clone + 'static,
    {
        Self::from_parts(Box::new(func), L::tracker())
    }
}

impl<A, R, O> Memo<A, R, O, Bounded>
where
    A: Clone,
    O: StorePolicy<CacheKey<A>>,
{
    /// Wrap `func` in a cache holding at most `capacity` results
    ///
    /// # Errors
    /// * [`Error::ZeroCapacity`] if `capacity` is 0
    pub fn with_capacity<F>(func: F, capacity: usize) -> Result<Self>
    where
        F: FnMut(A) -> R + Clone + 'static,
    {
        let tracker = LruTracker::new(capacity)?;
        debug!(capacity, "created bounded memo");
        Ok(Self::from_parts(Box::new(func), tracker))
    }
}

impl<A, R, O, L> Memo<A, R, O, L>
where
    O: StorePolicy<CacheKey<A>>,
    L: LimitPolicy<CacheKey<A>>,
{
    fn from_parts(func: Box<dyn Computation<A, R>>, tracker: L::Tracker) -> Self {
        let store = match tracker.capacity() {
            Some(capacity) => O::with_capacity(capacity),
            None => Default::default(),
        };

        Self {
            store,
            tracker,
            func,
            stats: CacheStats::new(),
        }
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Maximum number of cached results, `None` when unlimited
    pub fn capacity(&self) -> Option<usize> {
        self.tracker.capacity()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Reset cache statistics (cached results remain)
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Drop every cached result (statistics remain)
    pub fn clear(&mut self) {
        self.store.clear();
        self.tracker.clear();
        debug!("memo cleared");
    }

    /// Arguments of every cached result
    ///
    /// Sorted with [`Ordered`], arbitrary order with
    /// [`Unordered`](crate::Unordered).
    pub fn cached_keys(&self) -> impl Iterator<Item = &A> + '_ {
        self.store.keys().map(CacheKey::args)
    }

    /// Verify that store and recency tracker agree
    ///
    /// # Errors
    /// * [`Error::Invariant`] describing the first mismatch found
    pub fn check_invariants(&self) -> Result<()> {
        let Some(capacity) = self.tracker.capacity() else {
            return Ok(());
        };

        let stored = self.store.len();
        let tracked = self.tracker.len();
        if stored != tracked {
            return Err(Error::Invariant(format!(
                "store has {} entries, tracker has {}",
                stored, tracked
            )));
        }
        if stored > capacity {
            return Err(Error::Invariant(format!(
                "store has {} entries, capacity is {}",
                stored, capacity
            )));
        }
        if let Some(pos) = self
            .tracker
            .tracked()
            .position(|key| self.store.lookup(key).is_none())
        {
            return Err(Error::Invariant(format!(
                "tracked key at recency position {} is not in the store",
                pos
            )));
        }

        Ok(())
    }
}

impl<A, R, O, L> Memo<A, R, O, L>
where
    A: Clone,
    R: Clone,
    O: StorePolicy<CacheKey<A>>,
    L: LimitPolicy<CacheKey<A>>,
{
    /// Call the wrapped computation, or return its cached result
    ///
    /// On a miss the computation runs exactly once and its result is cached.
    /// A panic inside the computation propagates and leaves the cache as it
    /// was.
    ///
    /// Whatever the computation returns is cached, an `Err` included. Use
    /// [`Memo::try_call`] when failures must be retried on the next call.
    pub fn call(&mut self, args: A) -> R {
        let key = CacheKey::new(args.clone());
        if let Some(value) = self.hit(&key) {
            return value;
        }

        let value = self.func.compute(args);
        self.admit(key, value.clone());
        value
    }

    /// Check if a result for `args` is cached.
    ///
    /// Does not count as a use for LRU purposes.
    pub fn contains(&self, args: &A) -> bool {
        self.store.lookup(&CacheKey::new(args.clone())).is_some()
    }

    fn hit(&mut self, key: &CacheKey<A>) -> Option<R> {
        match self.store.lookup(key) {
            Some(slot) => {
                self.tracker.touch(slot.handle);
                self.stats.record_hit();
                trace!("memo hit");
                Some(slot.value.clone())
            }
            None => {
                self.stats.record_miss();
                trace!("memo miss");
                None
            }
        }
    }

    fn admit(&mut self, key: CacheKey<A>, value: R) {
        if self.tracker.evict_if_full(&mut self.store).is_some() {
            self.stats.record_eviction();
            debug!(
                len = self.store.len(),
                capacity = ?self.tracker.capacity(),
                "evicted least-recently-used entry"
            );
        }

        let handle = self.tracker.record(&key);
        self.store.insert(key, Slot { value, handle });
        self.stats.record_insert();

        debug_assert!(
            self.tracker.capacity().is_none() || self.tracker.len() == self.store.len(),
            "tracker and store out of step"
        );
    }
}

impl<A, T, E, O, L> Memo<A, std::result::Result<T, E>, O, L>
where
    A: Clone,
    T: Clone,
    E: Clone,
    O: StorePolicy<CacheKey<A>>,
    L: LimitPolicy<CacheKey<A>>,
{
    /// Like [`call`](Self::call), but an `Err` outcome is returned without
    /// being cached, so the next call with the same arguments runs again.
    pub fn try_call(&mut self, args: A) -> std::result::Result<T, E> {
        let key = CacheKey::new(args.clone());
        if let Some(cached) = self.hit(&key) {
            return cached;
        }

        let outcome = self.func.compute(args);
        match &outcome {
            Ok(value) => self.admit(key, Ok(value.clone())),
            Err(_) => debug!("computation failed, result not cached"),
        }
        outcome
    }
}

impl<A, R, O, L> Clone for Memo<A, R, O, L>
where
    A: Clone,
    R: Clone,
    O: StorePolicy<CacheKey<A>>,
    L: LimitPolicy<CacheKey<A>>,
    L::Tracker: Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: O::duplicate(&self.store),
            tracker: self.tracker.clone(),
            func: self.func.clone_box(),
            stats: self.stats,
        }
    }
}

impl<A, R, O, L> fmt::Debug for Memo<A, R, O, L>
where
    O: StorePolicy<CacheKey<A>>,
    L: LimitPolicy<CacheKey<A>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
