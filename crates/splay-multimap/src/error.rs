//! Error taxonomy.
//!
//! The only fallible path in this crate is key comparison: keys are required
//! to be totally ordered with respect to each other, and two keys that cannot
//! be ordered (heterogeneous semantics, float NaN, ...) surface immediately
//! as [`Error::KeyNotComparable`] from whichever operation compared them.
//!
//! Absence is never an error: lookups, removals, and neighbor queries report
//! a missing key or neighbor as `None` / `false`, which is a normal outcome.

use thiserror::Error;

/// Errors produced by [`crate::SplayMultimap`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Two keys could not be ordered relative to each other.
    ///
    /// This indicates misuse of the key type and is never retried; it
    /// propagates unchanged to the caller.
    #[error("keys are not comparable")]
    KeyNotComparable,
}
