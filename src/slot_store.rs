//! SlotStore: fixed-capacity key/value storage addressed by slot index.
//!
//! Keys and values live in two parallel vectors of identical length. The
//! store knows nothing about occupancy; a slot is just two cells that the
//! layer above reads and writes.

use crate::error::Result;

/// Issue a read prefetch for the cache line holding `ptr`.
///
/// Prefetching never faults, so a dangling or out-of-range pointer is
/// harmless; it is still only computed with wrapping arithmetic.
#[inline(always)]
pub(crate) fn prefetch<T>(ptr: *const T) {
    #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
    unsafe {
        use core::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
        _mm_prefetch(ptr as *const i8, _MM_HINT_T0);
    }
    #[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
    let _ = ptr;
}

#[derive(Debug, Clone)]
pub struct SlotStore<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
}

impl<K, V> SlotStore<K, V>
where
    V: Default,
{
    /// Allocate `capacity` slots, filling every key with `empty()`.
    pub fn new<F>(capacity: usize, empty: F) -> Self
    where
        F: FnMut() -> K,
    {
        let mut keys = Vec::with_capacity(capacity);
        keys.resize_with(capacity, empty);
        let mut values = Vec::with_capacity(capacity);
        values.resize_with(capacity, V::default);
        Self { keys, values }
    }

    /// Like [`SlotStore::new`], but reports allocation failure.
    pub fn try_new<F>(capacity: usize, empty: F) -> Result<Self>
    where
        F: FnMut() -> K,
    {
        let mut store = Self {
            keys: Vec::new(),
            values: Vec::new(),
        };
        store.try_resize(capacity, 0, empty)?;
        Ok(store)
    }

    /// Change capacity from `old_size` to `new_size`. Slots below
    /// `min(old_size, new_size)` keep their contents; new slots get a key
    /// from `empty()` and a default value.
    pub fn resize<F>(&mut self, new_size: usize, old_size: usize, empty: F)
    where
        F: FnMut() -> K,
    {
        debug_assert_eq!(old_size, self.capacity(), "resize from stale size");
        self.keys.resize_with(new_size, empty);
        self.values.resize_with(new_size, V::default);
        if new_size < old_size {
            self.keys.shrink_to_fit();
            self.values.shrink_to_fit();
        }
    }

    /// Fallible [`SlotStore::resize`]. On error nothing has changed.
    pub fn try_resize<F>(&mut self, new_size: usize, old_size: usize, empty: F) -> Result<()>
    where
        F: FnMut() -> K,
    {
        if new_size > old_size {
            let additional = new_size - self.capacity();
            self.keys.try_reserve_exact(additional)?;
            self.values.try_reserve_exact(additional)?;
        }
        self.resize(new_size, old_size, empty);
        Ok(())
    }
}

impl<K, V> SlotStore<K, V> {
    #[inline]
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn key(&self, i: usize) -> &K {
        &self.keys[i]
    }

    #[inline]
    pub fn key_mut(&mut self, i: usize) -> &mut K {
        &mut self.keys[i]
    }

    #[inline]
    pub fn value(&self, i: usize) -> &V {
        &self.values[i]
    }

    #[inline]
    pub fn value_mut(&mut self, i: usize) -> &mut V {
        &mut self.values[i]
    }

    /// Copy the key and value at `i` into slot `loc` of `dest`.
    #[inline]
    pub fn copy_elem_to(&self, dest: &mut Self, loc: usize, i: usize)
    where
        K: Clone,
        V: Clone,
    {
        dest.keys[loc].clone_from(&self.keys[i]);
        dest.values[loc].clone_from(&self.values[i]);
    }

    /// Hand both buffers to `dest`. Only the vector headers move; whatever
    /// `dest` held before is dropped.
    #[inline]
    pub fn shallow_move_to(self, dest: &mut Self) {
        *dest = self;
    }

    /// Prefetch the key and value cells of slot `i`.
    #[inline]
    pub fn prefetch(&self, i: usize) {
        prefetch(self.keys.as_ptr().wrapping_add(i));
        prefetch(self.values.as_ptr().wrapping_add(i));
    }

    #[cfg(test)]
    pub(crate) fn buffer_ptrs(&self) -> (*const K, *const V) {
        (self.keys.as_ptr(), self.values.as_ptr())
    }
}
