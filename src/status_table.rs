//! StatusTable: a slot store plus occupancy bookkeeping.
//!
//! The table is the only thing an open-addressing container needs from
//! this crate. It never hashes or probes; the container picks indices and
//! the table answers "is slot i used?" and keeps that answer truthful
//! across resize, relocation and storage handoff.

use crate::error::Result;
use crate::slot_store::SlotStore;
use crate::strategy::StatusStrategy;
use core::marker::PhantomData;
use log::trace;

pub struct StatusTable<K, V, S>
where
    S: StatusStrategy<K>,
{
    store: SlotStore<S::Slot, V>,
    status: S::Status,
    _pd: PhantomData<(fn() -> K, fn() -> S)>,
}

impl<K, V, S> StatusTable<K, V, S>
where
    S: StatusStrategy<K>,
    V: Default,
{
    /// An empty table with no slots.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// A table of `capacity` slots, all empty.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: SlotStore::new(capacity, S::empty_slot),
            status: S::new_status(capacity),
            _pd: PhantomData,
        }
    }

    /// Like [`StatusTable::with_capacity`], but reports allocation failure.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let mut status = S::new_status(0);
        S::try_reserve_status(&mut status, capacity)?;
        let store = SlotStore::try_new(capacity, S::empty_slot)?;
        S::resize_status(&mut status, capacity, 0);
        Ok(Self {
            store,
            status,
            _pd: PhantomData,
        })
    }

    /// Change capacity from `old_size` (the current capacity) to
    /// `new_size`.
    ///
    /// Slots below `min(old_size, new_size)` keep key, value and occupancy
    /// by index; slots added by growth are empty. Moving entries to their
    /// new home positions is the caller's job.
    pub fn resize(&mut self, new_size: usize, old_size: usize) {
        trace!("resizing {} status table: {} -> {} slots", S::NAME, old_size, new_size);
        self.store.resize(new_size, old_size, S::empty_slot);
        S::resize_status(&mut self.status, new_size, old_size);
    }

    /// Fallible [`StatusTable::resize`]. On error the table is unchanged.
    pub fn try_resize(&mut self, new_size: usize, old_size: usize) -> Result<()> {
        trace!("resizing {} status table: {} -> {} slots", S::NAME, old_size, new_size);
        if new_size > old_size {
            S::try_reserve_status(&mut self.status, new_size - old_size)?;
        }
        self.store.try_resize(new_size, old_size, S::empty_slot)?;
        S::resize_status(&mut self.status, new_size, old_size);
        Ok(())
    }
}

impl<K, V, S> Default for StatusTable<K, V, S>
where
    S: StatusStrategy<K>,
    V: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the indices of used slots, in index order.
pub struct UsedIndices<'a, K, V, S>
where
    S: StatusStrategy<K>,
{
    table: &'a StatusTable<K, V, S>,
    next: usize,
}

impl<'a, K, V, S> Iterator for UsedIndices<'a, K, V, S>
where
    S: StatusStrategy<K>,
{
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.next < self.table.capacity() {
            let i = self.next;
            self.next += 1;
            if self.table.is_used(i) {
                return Some(i);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.table.capacity() - self.next))
    }
}

impl<K, V, S> StatusTable<K, V, S>
where
    S: StatusStrategy<K>,
{
    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    #[inline]
    pub fn is_used(&self, i: usize) -> bool {
        S::is_used(&self.status, self.store.key(i), i)
    }

    /// Key of a used slot.
    #[inline]
    pub fn key(&self, i: usize) -> &K {
        debug_assert!(self.is_used(i), "key read from empty slot {i}");
        S::key(self.store.key(i))
    }

    /// Mutable key of slot `i`, typically one about to be populated.
    ///
    /// Occupancy is left alone except where the strategy derives it from
    /// the key: with `Implicit` the slot reads as used once a non-sentinel
    /// key is written, and with `Optional` projecting an empty slot fills
    /// it with `K::default()`.
    #[inline]
    pub fn key_mut(&mut self, i: usize) -> &mut K {
        S::key_mut(self.store.key_mut(i))
    }

    #[inline]
    pub fn value(&self, i: usize) -> &V {
        self.store.value(i)
    }

    #[inline]
    pub fn value_mut(&mut self, i: usize) -> &mut V {
        self.store.value_mut(i)
    }

    #[inline]
    pub fn set_as_used(&mut self, i: usize) {
        S::set_used(&mut self.status, self.store.key_mut(i), i);
    }

    /// Mark slot `i` empty. Key-derived strategies also overwrite the key;
    /// the value is never touched.
    #[inline]
    pub fn set_as_empty(&mut self, i: usize) {
        S::set_empty(&mut self.status, self.store.key_mut(i), i);
    }

    /// Mark every slot empty, keeping capacity.
    pub fn clear(&mut self) {
        for i in 0..self.capacity() {
            self.set_as_empty(i);
        }
    }

    pub fn used_indices(&self) -> UsedIndices<'_, K, V, S> {
        UsedIndices {
            table: self,
            next: 0,
        }
    }

    pub fn count_used(&self) -> usize {
        self.used_indices().count()
    }

    /// Relocate the used slot `i` of `self` into slot `loc` of `dest`.
    ///
    /// The destination is marked used before the payload lands, and the
    /// source slot is left as it was.
    pub fn copy_elem_to(&self, dest: &mut Self, loc: usize, i: usize)
    where
        S::Slot: Clone,
        V: Clone,
    {
        debug_assert!(self.is_used(i), "relocating empty slot {i}");
        S::mark_copied(&mut dest.status, loc);
        self.store.copy_elem_to(&mut dest.store, loc, i);
    }

    /// Hand all backing storage to `dest` without touching any element.
    /// Whatever `dest` held before is dropped.
    pub fn shallow_move_to(self, dest: &mut Self) {
        trace!(
            "handing off {} status table storage: {} slots replace {}",
            S::NAME,
            self.capacity(),
            dest.capacity()
        );
        self.store.shallow_move_to(&mut dest.store);
        dest.status = self.status;
    }

    /// Prefetch slot `i` in every backing store. A pure hint.
    #[inline]
    pub fn prefetch(&self, i: usize) {
        S::prefetch_status(&self.status, i);
        self.store.prefetch(i);
    }

    /// Prefetch the payload of slot `i` only if it is used.
    #[inline]
    pub fn prefetch_if_used(&self, i: usize) {
        if self.is_used(i) {
            self.store.prefetch(i);
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &SlotStore<S::Slot, V> {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> &S::Status {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedded::Embedded;
    use crate::external::External;
    use crate::sentinel::{EmptyString, MaxValue};
    use crate::strategy::{Implicit, Optional};

    type Tbl<S> = StatusTable<u32, u64, S>;

    fn occupy<S: StatusStrategy<u32>>(t: &mut Tbl<S>, i: usize, k: u32, v: u64) {
        *t.key_mut(i) = k;
        *t.value_mut(i) = v;
        t.set_as_used(i);
    }

    fn used_vec<S: StatusStrategy<u32>>(t: &Tbl<S>) -> Vec<bool> {
        (0..t.capacity()).map(|i| t.is_used(i)).collect()
    }

    macro_rules! for_each_strategy {
        ($f:ident) => {
            $f::<Implicit<MaxValue>>();
            $f::<External>();
            $f::<Embedded>();
            $f::<Optional>();
        };
    }

    fn fresh_is_empty<S: StatusStrategy<u32>>() {
        let t: Tbl<S> = StatusTable::with_capacity(8);
        assert_eq!(t.capacity(), 8);
        assert_eq!(used_vec(&t), vec![false; 8]);
        assert_eq!(t.count_used(), 0);
    }

    /// Invariant: every slot of a freshly built table is empty.
    #[test]
    fn fresh_table_is_empty() {
        for_each_strategy!(fresh_is_empty);
    }

    fn toggle<S: StatusStrategy<u32>>() {
        let mut t: Tbl<S> = StatusTable::with_capacity(4);
        occupy(&mut t, 1, 10, 100);
        assert_eq!(used_vec(&t), vec![false, true, false, false]);
        assert_eq!(*t.key(1), 10);
        assert_eq!(*t.value(1), 100);

        // Marking again changes nothing.
        t.set_as_used(1);
        assert!(t.is_used(1));

        t.set_as_empty(1);
        assert_eq!(used_vec(&t), vec![false; 4]);
        t.set_as_empty(1);
        assert!(!t.is_used(1));
    }

    /// Invariant: set_as_used / set_as_empty flip exactly one slot and are
    /// idempotent.
    #[test]
    fn toggles_are_exact_and_idempotent() {
        for_each_strategy!(toggle);
    }

    fn grow<S: StatusStrategy<u32>>() {
        let mut t: Tbl<S> = StatusTable::with_capacity(4);
        occupy(&mut t, 0, 1, 11);
        occupy(&mut t, 3, 4, 44);
        t.resize(9, 4);
        assert_eq!(t.capacity(), 9);
        assert_eq!(
            used_vec(&t),
            vec![true, false, false, true, false, false, false, false, false]
        );
        assert_eq!((*t.key(0), *t.value(0)), (1, 11));
        assert_eq!((*t.key(3), *t.value(3)), (4, 44));
    }

    /// Invariant: growth keeps existing slots by index and adds empty ones.
    #[test]
    fn growth_preserves_prefix() {
        for_each_strategy!(grow);
    }

    fn shrink_regrow<S: StatusStrategy<u32>>() {
        let mut t: Tbl<S> = StatusTable::with_capacity(4);
        occupy(&mut t, 1, 2, 22);
        occupy(&mut t, 3, 4, 44);
        t.resize(2, 4);
        assert_eq!(used_vec(&t), vec![false, true]);
        t.resize(4, 2);
        assert_eq!(used_vec(&t), vec![false, true, false, false]);
        assert_eq!(*t.key(1), 2);
    }

    /// Invariant: shrinking drops the tail; regrowing does not resurrect it.
    #[test]
    fn shrink_then_regrow_starts_tail_empty() {
        for_each_strategy!(shrink_regrow);
    }

    fn relocate<S>()
    where
        S: StatusStrategy<u32>,
        S::Slot: Clone,
    {
        let mut src: Tbl<S> = StatusTable::with_capacity(4);
        occupy(&mut src, 2, 7, 70);
        let mut dst: Tbl<S> = StatusTable::with_capacity(8);
        src.copy_elem_to(&mut dst, 5, 2);
        assert!(dst.is_used(5));
        assert_eq!((*dst.key(5), *dst.value(5)), (7, 70));
        assert_eq!(dst.count_used(), 1);
        assert!(src.is_used(2), "source slot is left as it was");
    }

    /// Invariant: copy_elem_to marks the destination used and carries the payload.
    #[test]
    fn copy_elem_to_relocates_used_slot() {
        for_each_strategy!(relocate);
    }

    fn handoff<S: StatusStrategy<u32>>() {
        let mut src: Tbl<S> = StatusTable::with_capacity(16);
        occupy(&mut src, 4, 40, 400);
        occupy(&mut src, 15, 150, 1500);
        let before = used_vec(&src);
        let ptrs = src.store().buffer_ptrs();

        let mut dst: Tbl<S> = StatusTable::with_capacity(2);
        src.shallow_move_to(&mut dst);
        assert_eq!(dst.capacity(), 16);
        assert_eq!(used_vec(&dst), before);
        assert_eq!((*dst.key(4), *dst.value(4)), (40, 400));
        assert_eq!((*dst.key(15), *dst.value(15)), (150, 1500));
        assert_eq!(dst.store().buffer_ptrs(), ptrs, "buffers moved, not copied");
    }

    /// Invariant: shallow_move_to preserves every slot and reuses the buffers.
    #[test]
    fn shallow_move_hands_off_storage() {
        for_each_strategy!(handoff);
    }

    #[test]
    fn shallow_move_hands_off_external_status_buffer() {
        let mut src: Tbl<External> = StatusTable::with_capacity(32);
        occupy(&mut src, 31, 1, 1);
        let flags = src.status().as_ptr();
        let mut dst: Tbl<External> = StatusTable::new();
        src.shallow_move_to(&mut dst);
        assert_eq!(dst.status().as_ptr(), flags);
        assert_eq!(dst.status().len(), 32);
    }

    fn clear_all<S: StatusStrategy<u32>>() {
        let mut t: Tbl<S> = StatusTable::with_capacity(5);
        for i in [0, 2, 4] {
            occupy(&mut t, i, i as u32 + 1, 0);
        }
        assert_eq!(t.used_indices().collect::<Vec<_>>(), vec![0, 2, 4]);
        t.clear();
        assert_eq!(t.count_used(), 0);
        assert_eq!(t.capacity(), 5);
    }

    /// Invariant: used_indices walks exactly the used slots; clear empties all.
    #[test]
    fn used_indices_and_clear() {
        for_each_strategy!(clear_all);
    }

    fn prefetch_all<S: StatusStrategy<u32>>() {
        let mut t: Tbl<S> = StatusTable::with_capacity(3);
        occupy(&mut t, 1, 5, 5);
        let before = used_vec(&t);
        for i in 0..3 {
            t.prefetch(i);
            t.prefetch_if_used(i);
        }
        assert_eq!(used_vec(&t), before);
    }

    /// Invariant: prefetching never changes logical state.
    #[test]
    fn prefetch_is_pure() {
        for_each_strategy!(prefetch_all);
    }

    #[test]
    fn implicit_empty_writes_sentinel_but_keeps_value() {
        let mut t: StatusTable<String, u8, Implicit<EmptyString>> = StatusTable::with_capacity(2);
        t.key_mut(0).push_str("key");
        *t.value_mut(0) = 3;
        assert!(t.is_used(0), "writing a non-sentinel key is enough");
        t.set_as_empty(0);
        assert!(!t.is_used(0));
        assert!(t.store().key(0).is_empty());
        assert_eq!(*t.value(0), 3);
    }

    #[test]
    fn external_and_embedded_empty_keep_key() {
        let mut e: StatusTable<u32, (), External> = StatusTable::with_capacity(1);
        *e.key_mut(0) = 9;
        e.set_as_used(0);
        e.set_as_empty(0);
        assert_eq!(*e.store().key(0), 9);

        let mut m: StatusTable<u32, (), Embedded> = StatusTable::with_capacity(1);
        *m.key_mut(0) = 9;
        m.set_as_used(0);
        m.set_as_empty(0);
        assert_eq!(m.store().key(0).key, 9);
    }

    #[test]
    fn try_with_capacity_and_try_resize() {
        let mut t: Tbl<External> = StatusTable::try_with_capacity(4).unwrap();
        assert_eq!(t.capacity(), 4);
        occupy(&mut t, 3, 1, 1);
        t.try_resize(6, 4).unwrap();
        assert_eq!(used_vec(&t), vec![false, false, false, true, false, false]);

        assert!(t.try_resize(usize::MAX, 6).is_err());
        assert_eq!(t.capacity(), 6);
        assert!(t.is_used(3));
    }

    #[cfg(debug_assertions)]
    #[test]
    fn reading_empty_key_panics_in_debug() {
        let t: Tbl<External> = StatusTable::with_capacity(2);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = t.key(0);
        }));
        assert!(res.is_err(), "expected empty-slot key read to panic in debug builds");
    }

    #[test]
    #[should_panic]
    fn out_of_range_index_panics() {
        let t: Tbl<Embedded> = StatusTable::with_capacity(2);
        let _ = t.is_used(2);
    }
}
