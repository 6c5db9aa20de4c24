//! External status: a boolean array parallel to the slots.
//!
//! Costs one byte per slot but places no constraint on the key type and
//! leaves every key value available to callers.

use crate::slot_store::prefetch;
use crate::strategy::StatusStrategy;
use std::collections::TryReserveError;

/// One flag per slot; `len()` always equals the owning table's capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusArray {
    flags: Vec<bool>,
}

impl StatusArray {
    /// `len` flags, all cleared.
    pub fn new(len: usize) -> Self {
        Self {
            flags: vec![false; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        self.flags[i]
    }

    #[inline]
    pub fn set(&mut self, i: usize, used: bool) {
        self.flags[i] = used;
    }

    /// Keeps flags below `min(new_size, old_size)`; new flags are cleared.
    pub fn resize(&mut self, new_size: usize, old_size: usize) {
        debug_assert_eq!(old_size, self.len(), "status resize from stale size");
        self.flags.resize(new_size, false);
        if new_size < old_size {
            self.flags.shrink_to_fit();
        }
    }

    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.flags.try_reserve_exact(additional)
    }

    #[inline]
    pub fn prefetch(&self, i: usize) {
        prefetch(self.flags.as_ptr().wrapping_add(i));
    }

    #[cfg(test)]
    pub(crate) fn as_ptr(&self) -> *const bool {
        self.flags.as_ptr()
    }
}

/// Keys are stored bare; status lives in a [`StatusArray`].
#[derive(Debug)]
pub struct External;

impl<K> StatusStrategy<K> for External
where
    K: Default,
{
    type Slot = K;
    type Status = StatusArray;

    const NAME: &'static str = "external";

    #[inline]
    fn new_status(capacity: usize) -> StatusArray {
        StatusArray::new(capacity)
    }

    #[inline]
    fn empty_slot() -> K {
        K::default()
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
    fn is_used(status: &StatusArray, _slot: &K, i: usize) -> bool {
        status.get(i)
    }

    #[inline]
    fn set_used(status: &mut StatusArray, _slot: &mut K, i: usize) {
        status.set(i, true);
    }

    #[inline]
    fn set_empty(status: &mut StatusArray, _slot: &mut K, i: usize) {
        status.set(i, false);
    }

    fn resize_status(status: &mut StatusArray, new_size: usize, old_size: usize) {
        status.resize(new_size, old_size);
    }

    fn try_reserve_status(status: &mut StatusArray, additional: usize) -> Result<(), TryReserveError> {
        status.try_reserve(additional)
    }

    #[inline]
    fn mark_copied(dest: &mut StatusArray, loc: usize) {
        dest.set(loc, true);
    }

    #[inline]
    fn prefetch_status(status: &StatusArray, i: usize) {
        status.prefetch(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_array_is_all_clear() {
        let s = StatusArray::new(5);
        assert_eq!(s.len(), 5);
        assert!((0..5).all(|i| !s.get(i)));
    }

    #[test]
    fn grow_keeps_prefix_and_clears_tail() {
        let mut s = StatusArray::new(2);
        s.set(1, true);
        s.resize(6, 2);
        assert_eq!(s.len(), 6);
        assert!(s.get(1));
        assert!((2..6).all(|i| !s.get(i)));
    }

    #[test]
    fn shrink_then_grow_does_not_resurrect_flags() {
        let mut s = StatusArray::new(4);
        s.set(3, true);
        s.resize(2, 4);
        s.resize(4, 2);
        assert!(!s.get(3));
    }
}
