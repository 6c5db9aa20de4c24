//! Sentinel policies for the implicit-status strategy.
//!
//! A policy names one key value that the application promises never to
//! store. The implicit strategy only accepts a key type together with a
//! policy for it, so picking it for a key domain without a reserved value
//! fails to compile instead of silently corrupting occupancy.

/// Supplies the reserved "empty" key for `K`.
pub trait SentinelPolicy<K> {
    /// The reserved key written into empty slots.
    fn sentinel() -> K;

    /// Whether `key` is the reserved value.
    fn is_sentinel(key: &K) -> bool;
}

/// Reserves the largest value of an integer key type.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxValue;

/// Reserves the smallest value of an integer key type.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinValue;

/// Reserves zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zero;

/// Reserves the empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyString;

macro_rules! int_sentinels {
    ($($t:ty),* $(,)?) => {
        $(
            impl SentinelPolicy<$t> for MaxValue {
                #[inline]
                fn sentinel() -> $t { <$t>::MAX }
                #[inline]
                fn is_sentinel(key: &$t) -> bool { *key == <$t>::MAX }
            }

            impl SentinelPolicy<$t> for MinValue {
                #[inline]
                fn sentinel() -> $t { <$t>::MIN }
                #[inline]
                fn is_sentinel(key: &$t) -> bool { *key == <$t>::MIN }
            }

            impl SentinelPolicy<$t> for Zero {
                #[inline]
                fn sentinel() -> $t { 0 }
                #[inline]
                fn is_sentinel(key: &$t) -> bool { *key == 0 }
            }
        )*
    };
}

int_sentinels!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl SentinelPolicy<String> for EmptyString {
    #[inline]
    fn sentinel() -> String {
        String::new()
    }

    #[inline]
    fn is_sentinel(key: &String) -> bool {
        key.is_empty()
    }
}

impl SentinelPolicy<&'static str> for EmptyString {
    #[inline]
    fn sentinel() -> &'static str {
        ""
    }

    #[inline]
    fn is_sentinel(key: &&'static str) -> bool {
        key.is_empty()
    }
}
