//! Persistent (immutable) data structures.
//!
//! This module provides [`PersistentVector`], an immutable random-access
//! sequence that uses structural sharing to minimize copying.
//!
//! # Structural Sharing
//!
//! Every modifying operation creates a new version that shares all
//! untouched subtrees with the original. Only the path from the root to
//! the changed leaf is reallocated, so a modification on a vector of N
//! values allocates O(log32 N) nodes.
//!
//! # Examples
//!
//! ```rust
//! use radixvec::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! assert_eq!(vector.get(50), Some(&50));
//!
//! // Structural sharing: the original vector is preserved
//! let updated = vector.update(50, 999).unwrap();
//! assert_eq!(vector.get(50), Some(&50));     // Original unchanged
//! assert_eq!(updated.get(50), Some(&999));   // New version
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// Vectors are shared across threads by value and distinct handles to the
/// same node may be dropped concurrently, so the count must be atomic;
/// this is always `std::sync::Arc`.
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

mod vector;

pub use vector::BRANCHING_FACTOR;
pub use vector::PersistentVector;
pub use vector::PersistentVectorIntoIterator;
pub use vector::PersistentVectorIterator;

// =============================================================================
// Tests
// =============================================================================
