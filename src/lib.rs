//! # radixvec
//!
//! A persistent (immutable) vector for Rust, based on a wide-branching
//! radix balanced tree with structural sharing.
//!
//! ## Overview
//!
//! [`PersistentVector`](persistent::PersistentVector) is a random-access
//! sequence in which every modifying operation returns a new vector and
//! leaves the original untouched. New and old versions share all subtrees
//! that the operation did not touch, so copies are cheap and memory use
//! stays proportional to the changes, not to the number of versions.
//!
//! - O(log32 N) random access (effectively O(1) for practical sizes)
//! - O(log32 N) `push_back` and `pop_back`
//! - O(log32 N) `update`
//! - Amortized one node allocation per `BRANCHING_FACTOR` values for
//!   bulk construction
//! - O(1) `len`, `is_empty`, and `Clone`
//!
//! Vectors are freely shareable across threads: nodes are frozen on
//! construction and ownership is tracked with atomic reference counts.
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` implementations
//! - `small_branch`: branching factor 4 instead of 32, for exhaustive
//!   small-tree testing
//!
//! ## Example
//!
//! ```rust
//! use radixvec::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! let updated = vector.update(50, 999).unwrap();
//!
//! assert_eq!(vector.get(50), Some(&50));    // Original unchanged
//! assert_eq!(updated.get(50), Some(&999));  // New version
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types.
///
/// # Usage
///
/// ```rust
/// use radixvec::prelude::*;
/// ```
pub mod prelude {
    pub use crate::persistent::*;
}

pub mod persistent;
