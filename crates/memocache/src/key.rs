//! Cache keys built from call arguments
//!
//! A [`CacheKey`] owns the argument tuple of one call. Equality and ordering
//! are the tuple's own (component-wise, lexicographic). Hashing folds the
//! hash of every component into a single seed with a non-commutative
//! combiner, so `(1, 2)` and `(2, 1)` land in different buckets.

use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::OnceLock;

use ahash::RandomState;

/// Golden-ratio increment used by the combiner
const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;

/// Fixed-seed hasher for individual components, so a key hashes the same in
/// every engine and every clone of an engine.
fn component_state() -> &'static RandomState {
    static STATE: OnceLock<RandomState> = OnceLock::new();
    STATE.get_or_init(|| {
        RandomState::with_seeds(
            0x243f_6a88_85a3_08d3,
            0x1319_8a2e_0370_7344,
            0xa409_3822_299f_31d0,
            0x082e_fa98_ec4e_6c89,
        )
    })
}

/// Mix `hash` into `seed`.
#[inline]
pub fn combine(seed: u64, hash: u64) -> u64 {
    seed ^ hash
        .wrapping_add(GOLDEN)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Argument lists whose components can be folded into one structural hash
pub trait KeyHash {
    /// Fold every component hash, first to last, into a single value
    fn fold_hash(&self) -> u64;
}

macro_rules! tuple_key_hash {
    ($($name:ident)*) => {
        impl<$($name: Hash),*> KeyHash for ($($name,)*) {
            #[allow(non_snake_case, unused_mut)]
            #[inline]
            fn fold_hash(&self) -> u64 {
                let ($($name,)*) = self;
                let mut seed = 0u64;
                $( seed = combine(seed, BuildHasher::hash_one(component_state(), $name)); )*
                seed
            }
        }
    };
}

tuple_key_hash!();
tuple_key_hash!(A);
tuple_key_hash!(A B);
tuple_key_hash!(A B C);
tuple_key_hash!(A B C D);
tuple_key_hash!(A B C D E);
tuple_key_hash!(A B C D E F);
tuple_key_hash!(A B C D E F G);
tuple_key_hash!(A B C D E F G H);

/// Immutable, value-comparable key for one argument list
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CacheKey<A>(A);

impl<A> CacheKey<A> {
    /// Build a key from the call's arguments
    #[inline]
    pub fn new(args: A) -> Self {
        Self(args)
    }

    /// Borrow the arguments this key was built from
    #[inline]
    pub fn args(&self) -> &A {
        &self.0
    }
}

impl<A> From<A> for CacheKey<A> {
    fn from(args: A) -> Self {
        Self(args)
    }
}

impl<A: KeyHash> Hash for CacheKey<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.fold_hash());
    }
}
