//! slot-status: occupancy bookkeeping for the fixed-capacity slot arrays
//! beneath open-addressing hash containers.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: give a probing container one cheap, truthful answer to "is slot
//!   i used?" and keep it truthful through resize, relocation during
//!   rehash, and wholesale storage handoff.
//! - Layers:
//!   - SlotStore<K, V>: two parallel vectors indexed 0..capacity. Raw key
//!     and value access, resize, element copy, O(1) handoff and prefetch.
//!     Knows nothing about occupancy.
//!   - StatusStrategy<K>: where the used bit lives. Picks the key
//!     representation stored in the SlotStore and an optional side
//!     structure.
//!   - StatusTable<K, V, S>: SlotStore + strategy, exposing the same
//!     contract for every strategy.
//!
//! Strategies
//! - `Implicit<P>`: no extra memory; a slot is empty iff its key equals
//!   the sentinel chosen by policy `P`. Emptying a slot rewrites its key.
//!   Only key types with a `SentinelPolicy` can use it, so a key domain
//!   without a reserved value is rejected at compile time.
//! - `Optional`: slots hold `Option<K>`; same footprint trade-off as an
//!   embedded flag, no reserved key.
//! - `External`: a `StatusArray` of one bool per slot next to the store.
//!   No constraint on keys; one extra byte per slot and one extra cache
//!   line touched per probe.
//! - `Embedded`: slots hold `Tagged<K>` (key + flag). No side allocation;
//!   flag and key share a cache line.
//!
//! Per-slot state machine
//! - Empty -> Used: `set_as_used` (External/Embedded), writing a
//!   non-sentinel key (Implicit), or projecting `key_mut` (Optional).
//! - Used -> Empty: `set_as_empty`.
//! - There are no tombstones here; a container that needs them builds
//!   them above this contract.
//!
//! Constraints
//! - Single-threaded; no internal synchronization.
//! - Contract breaks (reading the key of an empty slot, marking a sentinel
//!   key used, resizing from a stale size) are debug assertions.
//!   Out-of-range indices panic through slice indexing.
//! - `shallow_move_to` consumes the source table, so a moved-from table
//!   cannot be touched again.
//! - Allocation failure is only reported by the `try_*` constructors and
//!   resize (`TableError`).

mod embedded;
mod error;
mod external;
mod sentinel;
mod slot_store;
mod status_table;
mod status_table_proptest;
mod strategy;

pub use embedded::{Embedded, Tagged};
pub use error::{Result, TableError};
pub use external::{External, StatusArray};
pub use sentinel::{EmptyString, MaxValue, MinValue, SentinelPolicy, Zero};
pub use slot_store::SlotStore;
pub use status_table::{StatusTable, UsedIndices};
pub use strategy::{Implicit, Optional, StatusStrategy};

/// Table whose empty slots hold the sentinel chosen by `P`.
pub type ImplicitTable<K, V, P> = StatusTable<K, V, Implicit<P>>;
/// Table with `Option<K>` slots.
pub type OptionalTable<K, V> = StatusTable<K, V, Optional>;
/// Table with a parallel status array.
pub type ExternalTable<K, V> = StatusTable<K, V, External>;
/// Table with the status flag stored next to each key.
pub type EmbeddedTable<K, V> = StatusTable<K, V, Embedded>;
