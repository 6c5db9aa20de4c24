#![cfg(test)]

// Property tests for StatusTable kept inside the crate so they can reach the
// raw slot store behind each strategy.

use crate::embedded::Embedded;
use crate::external::External;
use crate::sentinel::{MaxValue, SentinelPolicy, Zero};
use crate::status_table::StatusTable;
use crate::strategy::{Implicit, Optional, StatusStrategy};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

#[derive(Clone, Debug)]
enum Op {
    Occupy(usize, u32, u64),
    Empty(usize),
    Resize(usize),
    // Build a larger table, copy every used slot across, move it back in.
    Rehash(usize),
    Clear,
}

fn arb_ops() -> impl Strategy<Value = (usize, Vec<Op>)> {
    // Keys stay below u32::MAX so the MaxValue sentinel is never stored.
    let op = prop_oneof![
        4 => (any::<usize>(), 0u32..u32::MAX, any::<u64>()).prop_map(|(i, k, v)| Op::Occupy(i, k, v)),
        2 => any::<usize>().prop_map(Op::Empty),
        1 => (0usize..24).prop_map(Op::Resize),
        1 => (0usize..8).prop_map(Op::Rehash),
        1 => Just(Op::Clear),
    ];
    (0usize..16, proptest::collection::vec(op, 1..60))
}

type Model = Vec<Option<(u32, u64)>>;

fn check<S: StatusStrategy<u32>>(
    t: &StatusTable<u32, u64, S>,
    model: &Model,
) -> Result<(), TestCaseError> {
    prop_assert_eq!(t.capacity(), model.len());
    for (i, slot) in model.iter().enumerate() {
        prop_assert_eq!(t.is_used(i), slot.is_some(), "slot {}", i);
        if let Some((k, v)) = slot {
            prop_assert_eq!(t.key(i), k);
            prop_assert_eq!(t.value(i), v);
        }
    }
    let used: Vec<usize> = t.used_indices().collect();
    let expected: Vec<usize> = (0..model.len()).filter(|&i| model[i].is_some()).collect();
    prop_assert_eq!(used, expected);
    Ok(())
}

// Property: state-machine equivalence against Vec<Option<(K, V)>>.
// Invariants exercised across random operation sequences:
// - A fresh table of any capacity is all empty.
// - set_as_used / set_as_empty affect exactly the addressed slot.
// - resize keeps slots by index below min(old, new) and adds empty slots.
// - copy_elem_to + shallow_move_to, used as a rehash, preserve every slot.
fn run_model<S>(capacity: usize, ops: Vec<Op>) -> Result<(), TestCaseError>
where
    S: StatusStrategy<u32>,
    S::Slot: Clone,
{
    let mut sut: StatusTable<u32, u64, S> = StatusTable::with_capacity(capacity);
    let mut model: Model = vec![None; capacity];
    check(&sut, &model)?;

    for op in ops {
        let cap = sut.capacity();
        match op {
            Op::Occupy(i, k, v) => {
                if cap > 0 {
                    let i = i % cap;
                    *sut.key_mut(i) = k;
                    *sut.value_mut(i) = v;
                    sut.set_as_used(i);
                    model[i] = Some((k, v));
                }
            }
            Op::Empty(i) => {
                if cap > 0 {
                    let i = i % cap;
                    sut.set_as_empty(i);
                    model[i] = None;
                }
            }
            Op::Resize(n) => {
                sut.resize(n, cap);
                model.resize(n, None);
            }
            Op::Rehash(extra) => {
                let mut bigger: StatusTable<u32, u64, S> = StatusTable::with_capacity(cap + extra);
                for i in sut.used_indices() {
                    sut.copy_elem_to(&mut bigger, i, i);
                }
                bigger.shallow_move_to(&mut sut);
                model.resize(cap + extra, None);
            }
            Op::Clear => {
                sut.clear();
                model.iter_mut().for_each(|s| *s = None);
            }
        }
        check(&sut, &model)?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_model_implicit((cap, ops) in arb_ops()) {
        run_model::<Implicit<MaxValue>>(cap, ops)?;
    }

    #[test]
    fn prop_model_external((cap, ops) in arb_ops()) {
        run_model::<External>(cap, ops)?;
    }

    #[test]
    fn prop_model_embedded((cap, ops) in arb_ops()) {
        run_model::<Embedded>(cap, ops)?;
    }

    #[test]
    fn prop_model_optional((cap, ops) in arb_ops()) {
        run_model::<Optional>(cap, ops)?;
    }
}

// Property: with the implicit strategy any non-sentinel key written into a
// slot reads as used, and writing the sentinel never does.
proptest! {
    #[test]
    fn prop_sentinel_never_reads_used(key in any::<u32>(), slot in 0usize..8) {
        let mut t: StatusTable<u32, (), Implicit<Zero>> = StatusTable::with_capacity(8);
        *t.key_mut(slot) = key;
        if key != 0 {
            t.set_as_used(slot);
        }
        prop_assert_eq!(t.is_used(slot), key != 0);

        *t.key_mut(slot) = <Zero as SentinelPolicy<u32>>::sentinel();
        prop_assert!(!t.is_used(slot));
        prop_assert_eq!(t.count_used(), 0);
    }
}
