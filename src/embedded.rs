//! Embedded status: the used flag rides next to the key in one composite.
//!
//! No side allocation, and the flag shares a cache line with the key it
//! describes. The slot store is instantiated over [`Tagged<K>`], so every
//! slot grows by the flag's padded size.

use crate::strategy::StatusStrategy;

/// Key plus occupancy flag, as stored in an embedded-status table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Tagged<K> {
    pub key: K,
    pub used: bool,
}

impl<K> Tagged<K> {
    pub fn empty(key: K) -> Self {
        Self { key, used: false }
    }
}

#[derive(Debug)]
pub struct Embedded;

impl<K> StatusStrategy<K> for Embedded
where
    K: Default,
{
    type Slot = Tagged<K>;
    type Status = ();

    const NAME: &'static str = "embedded";

    #[inline]
    fn new_status(_capacity: usize) {}

    #[inline]
    fn empty_slot() -> Tagged<K> {
        Tagged::empty(K::default())
    }

    #[inline]
    fn key(slot: &Tagged<K>) -> &K {
        &slot.key
    }

    #[inline]
    fn key_mut(slot: &mut Tagged<K>) -> &mut K {
        &mut slot.key
    }

    #[inline]
    fn is_used(_status: &(), slot: &Tagged<K>, _i: usize) -> bool {
        slot.used
    }

    #[inline]
    fn set_used(_status: &mut (), slot: &mut Tagged<K>, _i: usize) {
        slot.used = true;
    }

    #[inline]
    fn set_empty(_status: &mut (), slot: &mut Tagged<K>, _i: usize) {
        slot.used = false;
    }
}
