//! Errors reported by the fallible allocation paths.
//!
//! Everything else at this layer is a caller contract: reading the key of an
//! empty slot, indexing past capacity or storing a sentinel key are checked
//! with debug assertions only and never surface here.

use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Backing storage could not be grown to the requested capacity.
    #[error("slot storage allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
}

pub type Result<T> = core::result::Result<T, TableError>;
