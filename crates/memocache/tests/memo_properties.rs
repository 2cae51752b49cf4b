// ==============================================
// MEMOIZATION PROPERTY TESTS (integration)
// ==============================================
//
// Behavior every configuration must share: the computation runs once per
// distinct argument list, store policies are interchangeable, and bounded
// caches evict in strict LRU order.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use memocache::{Bounded, Limited, Memo, Ordered, Unlimited, Unordered};

fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

fn counted_sum(calls: &Rc<Cell<usize>>) -> impl FnMut((u64, u64)) -> u64 + Clone + 'static {
    let calls = Rc::clone(calls);
    move |(a, b)| {
        calls.set(calls.get() + 1);
        a * 1000 + b
    }
}

// ==============================================
// Memoization correctness
// ==============================================

mod correctness {
    use super::*;

    #[test]
    fn computation_runs_once_per_distinct_arguments() {
        let calls = counter();
        let mut memo: Memo<(u64, u64), u64> = Memo::new(counted_sum(&calls));

        for _ in 0..5 {
            assert_eq!(memo.call((1, 2)), 1002);
            assert_eq!(memo.call((2, 1)), 2001);
        }

        assert_eq!(calls.get(), 2);
        assert_eq!(memo.stats().hits(), 8);
        assert_eq!(memo.stats().misses(), 2);
    }

    #[test]
    fn string_arguments_are_compared_by_value() {
        let calls = counter();
        let c = Rc::clone(&calls);
        let mut len: Memo<(String, usize), usize, Unordered> =
            Memo::new(move |(s, n): (String, usize)| {
                c.set(c.get() + 1);
                s.len() * n
            });

        let owned = String::from("memo");
        assert_eq!(len.call((owned.clone(), 2)), 8);
        assert_eq!(len.call(("memo".to_string(), 2)), 8);
        assert_eq!(len.call((owned, 3)), 12);

        assert_eq!(calls.get(), 2);
    }
}

// ==============================================
// Policy equivalence
// ==============================================

mod equivalence {
    use super::*;

    const SEQUENCE: [(u64, u64); 12] = [
        (1, 1),
        (2, 3),
        (1, 1),
        (4, 0),
        (2, 3),
        (9, 9),
        (0, 4),
        (1, 1),
        (4, 0),
        (7, 7),
        (2, 3),
        (9, 9),
    ];

    fn run<O, L>(mut memo: Memo<(u64, u64), u64, O, L>) -> Vec<u64>
    where
        O: memocache::StorePolicy<memocache::CacheKey<(u64, u64)>>,
        L: memocache::LimitPolicy<memocache::CacheKey<(u64, u64)>>,
    {
        SEQUENCE.iter().map(|&args| memo.call(args)).collect()
    }

    #[test]
    fn ordered_and_unordered_return_identical_results() {
        let calls = counter();
        let ordered: Memo<(u64, u64), u64, Ordered> = Memo::new(counted_sum(&calls));
        let unordered: Memo<(u64, u64), u64, Unordered> = Memo::new(counted_sum(&calls));

        assert_eq!(run(ordered), run(unordered));
    }

    #[test]
    fn bounded_stores_agree_on_results_and_misses() {
        let ordered_calls = counter();
        let unordered_calls = counter();
        let ordered: Memo<(u64, u64), u64, Ordered, Limited<3>> =
            Memo::new(counted_sum(&ordered_calls));
        let unordered: Memo<(u64, u64), u64, Unordered, Limited<3>> =
            Memo::new(counted_sum(&unordered_calls));

        assert_eq!(run(ordered), run(unordered));
        assert_eq!(ordered_calls.get(), unordered_calls.get());
    }
}

// ==============================================
// Capacity behavior
// ==============================================

mod capacity {
    use super::*;

    #[test]
    fn unlimited_never_evicts() {
        let mut memo: Memo<(u32,), u32, Unordered, Unlimited> = Memo::new(|(x,): (u32,)| x + 1);

        for x in 0..10_000 {
            memo.call((x,));
        }

        assert_eq!(memo.len(), 10_000);
        assert_eq!(memo.stats().evictions(), 0);
    }

    #[test]
    fn first_key_evicted_without_intervening_hits() {
        let mut memo: Memo<(u32,), u32, Ordered, Limited<4>> = Memo::new(|(x,): (u32,)| x);

        for x in 0..=4 {
            memo.call((x,));
        }

        assert!(!memo.contains(&(0,)));
        for x in 1..=4 {
            assert!(memo.contains(&(x,)));
        }
        assert_eq!(memo.stats().evictions(), 1);
    }

    #[test]
    fn touched_key_survives_eviction() {
        let mut memo: Memo<(u32,), u32, Unordered, Limited<4>> = Memo::new(|(x,): (u32,)| x);

        for x in 0..4 {
            memo.call((x,));
        }
        memo.call((0,)); // hit
        memo.call((4,));

        assert!(memo.contains(&(0,)));
        assert!(!memo.contains(&(1,)));
        assert!(memo.check_invariants().is_ok());
    }

    #[test]
    fn repeated_hits_never_evict() {
        let mut memo: Memo<(u32,), u32, Ordered, Limited<2>> = Memo::new(|(x,): (u32,)| x);

        memo.call((1,));
        memo.call((2,));
        for _ in 0..100 {
            memo.call((1,));
            memo.call((2,));
        }

        assert_eq!(memo.len(), 2);
        assert_eq!(memo.stats().evictions(), 0);
        assert_eq!(memo.stats().hits(), 200);
    }

    #[test]
    fn identity_capacity_two_scenario() {
        let mut memo: Memo<(i32,), i32, Ordered, Limited<2>> = Memo::new(|(x,): (i32,)| x);

        assert_eq!(memo.call((1,)), 1);
        assert_eq!(memo.call((2,)), 2);
        assert_eq!(memo.call((1,)), 1);
        assert_eq!(memo.call((3,)), 3);

        let keys: Vec<_> = memo.cached_keys().copied().collect();
        assert_eq!(keys, vec![(1,), (3,)]);
    }

    #[test]
    fn capacity_one_keeps_latest() {
        let calls = counter();
        let mut memo: Memo<(u64, u64), u64, Unordered, Bounded> =
            Memo::with_capacity(counted_sum(&calls), 1).unwrap();

        memo.call((1, 1));
        memo.call((2, 2));
        memo.call((2, 2));
        memo.call((1, 1));

        assert_eq!(memo.len(), 1);
        assert_eq!(calls.get(), 3);
        assert!(memo.contains(&(1, 1)));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let result = Memo::<(u32,), u32, Ordered, Bounded>::with_capacity(|(x,): (u32,)| x, 0);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("greater than 0"));
    }

    #[test]
    fn invariants_hold_under_mixed_workload() {
        let mut memo: Memo<(u32,), u32, Unordered, Bounded> =
            Memo::with_capacity(|(x,): (u32,)| x * 3, 16).unwrap();

        for i in 0..2_000u32 {
            let x = (i * 7 + i / 3) % 40;
            assert_eq!(memo.call((x,)), x * 3);
            assert!(memo.check_invariants().is_ok());
        }

        assert_eq!(memo.len(), 16);
    }
}

// ==============================================
// Copies and failures
// ==============================================

mod lifecycle {
    use super::*;

    #[test]
    fn clones_share_results_but_not_state() {
        let calls = counter();
        let mut memo: Memo<(u64, u64), u64> = Memo::new(counted_sum(&calls));
        memo.call((3, 4));

        let mut copy = memo.clone();
        assert_eq!(copy.call((3, 4)), memo.call((3, 4)));
        assert_eq!(calls.get(), 1);

        copy.call((5, 6));
        assert_eq!(copy.len(), 2);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn moved_memo_keeps_cache() {
        let calls = counter();
        let mut memo: Memo<(u64, u64), u64, Unordered, Limited<8>> =
            Memo::new(counted_sum(&calls));
        memo.call((1, 1));

        let mut moved = memo;
        moved.call((1, 1));

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn panicking_computation_is_not_cached() {
        let mut memo: Memo<(u32,), u32, Ordered, Limited<4>> = Memo::new(|(x,): (u32,)| {
            assert!(x != 13, "unlucky");
            x
        });
        memo.call((1,));

        let result = panic::catch_unwind(AssertUnwindSafe(|| memo.call((13,))));

        assert!(result.is_err());
        assert_eq!(memo.len(), 1);
        assert!(!memo.contains(&(13,)));
        assert!(memo.check_invariants().is_ok());
        assert_eq!(memo.call((2,)), 2);
    }
}
