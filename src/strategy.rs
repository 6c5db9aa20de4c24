//! Status strategies: where a slot's used/empty bit physically lives.
//!
//! A strategy picks the key representation stored in the [`SlotStore`]
//! (`Slot`) and an optional side structure (`Status`). [`StatusTable`]
//! drives both through this trait, so the container above sees one
//! contract whatever the layout.
//!
//! Strategies are zero-sized markers and never instantiated.
//!
//! [`SlotStore`]: crate::SlotStore
//! [`StatusTable`]: crate::StatusTable

use crate::sentinel::SentinelPolicy;
use core::marker::PhantomData;
use std::collections::TryReserveError;

pub trait StatusStrategy<K> {
    /// Per-slot key representation held by the slot store.
    type Slot;
    /// Side structure parallel to the slots, `()` when there is none.
    type Status;

    /// Human-readable strategy name for logs.
    const NAME: &'static str;

    fn new_status(capacity: usize) -> Self::Status;

    /// Key representation of an empty slot.
    fn empty_slot() -> Self::Slot;

    fn key(slot: &Self::Slot) -> &K;
    fn key_mut(slot: &mut Self::Slot) -> &mut K;

    fn is_used(status: &Self::Status, slot: &Self::Slot, i: usize) -> bool;
    fn set_used(status: &mut Self::Status, slot: &mut Self::Slot, i: usize);
    fn set_empty(status: &mut Self::Status, slot: &mut Self::Slot, i: usize);

    /// Called after the slot store has been resized from `old_size` to
    /// `new_size`.
    #[inline]
    fn resize_status(_status: &mut Self::Status, _new_size: usize, _old_size: usize) {}

    #[inline]
    fn try_reserve_status(
        _status: &mut Self::Status,
        _additional: usize,
    ) -> Result<(), TryReserveError> {
        Ok(())
    }

    /// Called on the destination before an occupied slot is copied into
    /// `loc`. Strategies whose status travels with the key do nothing.
    #[inline]
    fn mark_copied(_dest: &mut Self::Status, _loc: usize) {}

    #[inline]
    fn prefetch_status(_status: &Self::Status, _i: usize) {}
}

/// Occupancy derived from the key itself: a slot is empty iff it holds the
/// sentinel chosen by `P`.
#[derive(Debug)]
pub struct Implicit<P>(PhantomData<P>);

impl<K, P> StatusStrategy<K> for Implicit<P>
where
    P: SentinelPolicy<K>,
{
    type Slot = K;
    type Status = ();

    const NAME: &'static str = "implicit";

    #[inline]
    fn new_status(_capacity: usize) {}

    #[inline]
    fn empty_slot() -> K {
        P::sentinel()
    }

    #[inline]
    fn key(slot: &K) -> &K {
        slot
    }

    #[inline]
    fn key_mut(slot: &mut K) -> &mut K {
        slot
    }

    #[inline]
    fn is_used(_status: &(), slot: &K, _i: usize) -> bool {
        !P::is_sentinel(slot)
    }

    #[inline]
    fn set_used(_status: &mut (), slot: &mut K, i: usize) {
        debug_assert!(
            !P::is_sentinel(slot),
            "slot {i} marked used while holding the sentinel key"
        );
    }

    #[inline]
    fn set_empty(_status: &mut (), slot: &mut K, _i: usize) {
        *slot = P::sentinel();
    }
}

/// Occupancy as the discriminant of `Option<K>`. Same zero side storage as
/// [`Implicit`] without reserving any key value.
#[derive(Debug)]
pub struct Optional;

impl<K> StatusStrategy<K> for Optional
where
    K: Default,
{
    type Slot = Option<K>;
    type Status = ();

    const NAME: &'static str = "optional";

    #[inline]
    fn new_status(_capacity: usize) {}

    #[inline]
    fn empty_slot() -> Option<K> {
        None
    }

    #[inline]
    fn key(slot: &Option<K>) -> &K {
        match slot {
            Some(k) => k,
            None => panic!("key read from an empty slot"),
        }
    }

    /// Projecting an empty slot fills it with `K::default()`, which makes
    /// it used.
    #[inline]
    fn key_mut(slot: &mut Option<K>) -> &mut K {
        slot.get_or_insert_with(K::default)
    }

    #[inline]
    fn is_used(_status: &(), slot: &Option<K>, _i: usize) -> bool {
        slot.is_some()
    }

    #[inline]
    fn set_used(_status: &mut (), slot: &mut Option<K>, i: usize) {
        debug_assert!(slot.is_some(), "slot {i} marked used without a key");
    }

    #[inline]
    fn set_empty(_status: &mut (), slot: &mut Option<K>, _i: usize) {
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentinel::{EmptyString, MaxValue};

    type Imp = Implicit<MaxValue>;

    #[test]
    fn implicit_empty_slot_is_sentinel() {
        let slot = <Imp as StatusStrategy<u32>>::empty_slot();
        assert_eq!(slot, u32::MAX);
        assert!(!<Imp as StatusStrategy<u32>>::is_used(&(), &slot, 0));
    }

    #[test]
    fn implicit_set_empty_rewrites_key() {
        let mut slot = 5u32;
        assert!(<Imp as StatusStrategy<u32>>::is_used(&(), &slot, 0));
        <Imp as StatusStrategy<u32>>::set_empty(&mut (), &mut slot, 0);
        assert_eq!(slot, u32::MAX);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn implicit_marking_sentinel_used_panics_in_debug() {
        let res = std::panic::catch_unwind(|| {
            let mut slot = String::new();
            <Implicit<EmptyString> as StatusStrategy<String>>::set_used(&mut (), &mut slot, 3);
        });
        assert!(res.is_err(), "expected sentinel misuse to panic in debug builds");
    }

    #[test]
    fn optional_key_mut_fills_empty_slot() {
        let mut slot = <Optional as StatusStrategy<u64>>::empty_slot();
        assert!(!<Optional as StatusStrategy<u64>>::is_used(&(), &slot, 0));
        *<Optional as StatusStrategy<u64>>::key_mut(&mut slot) = 9;
        assert_eq!(slot, Some(9));
        <Optional as StatusStrategy<u64>>::set_empty(&mut (), &mut slot, 0);
        assert_eq!(slot, None);
    }
}
