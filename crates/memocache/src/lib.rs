//! # memocache
//!
//! Transparent memoization for pure, deterministic computations.
//!
//! ## Architecture
//! - **CacheKey**: the call's argument tuple, compared structurally
//! - **Store**: `BTreeMap` ([`Ordered`]) or AHash `HashMap` ([`Unordered`])
//! - **LRU Tracker**: slab-backed doubly-linked list, only for bounded caches
//! - **Memo**: build key, probe store, compute on miss, evict, insert
//!
//! ## Configuration
//! Chosen at the type level: `Memo<Args, Result, StorePolicy, LimitPolicy>`.
//! Defaults are [`Ordered`] and [`Unlimited`].
//!
//! ```
//! use memocache::{Bounded, Memo, Unordered};
//!
//! let mut add: Memo<(i64, i64), i64, Unordered, Bounded> =
//!     Memo::with_capacity(|(a, b): (i64, i64)| a + b, 128).unwrap();
//!
//! assert_eq!(add.call((2, 3)), 5);
//! assert_eq!(add.call((2, 3)), 5);
//! assert_eq!(add.stats().hits(), 1);
//! ```
//!
//! A `Memo` is single-threaded. Wrap it in a mutex to share it.

#![warn(missing_docs)]

mod error;
mod key;
mod lru;
mod memo;
mod policy;
mod stats;
mod store;

pub use error::{Error, Result};
pub use key::{combine, CacheKey, KeyHash};
pub use lru::{Iter, LruTracker, NodeHandle};
pub use memo::Memo;
pub use policy::{Bounded, Eviction, FixedLimit, LimitPolicy, Limited, NoEviction, Unlimited};
pub use stats::CacheStats;
pub use store::{Ordered, OrderedStore, Store, StorePolicy, Unordered, UnorderedStore};
