//! Persistent (immutable) vector based on a Radix Balanced Tree.
//!
//! This module provides [`PersistentVector`], an immutable dynamic array
//! that uses structural sharing for efficient operations.
//!
//! # Overview
//!
//! `PersistentVector` is a 32-way branching trie (Radix Balanced Tree)
//! inspired by Clojure's `PersistentVector` and Scala's `Vector`. It
//! provides:
//!
//! - O(log32 N) random access (effectively O(1) for practical sizes)
//! - O(log32 N) `push_back` and `pop_back`
//! - O(log32 N) update
//! - Amortized one leaf allocation per `BRANCHING_FACTOR` values for
//!   bulk construction via [`PersistentVector::extend_from_slice`]
//! - O(1) `len`, `is_empty`, and `Clone`
//!
//! All operations return new vectors without modifying the original,
//! and structural sharing ensures memory efficiency.
//!
//! # Internal Structure
//!
//! The tree has two node kinds. Leaf nodes sit at the bottom and hold
//! exactly `BRANCHING_FACTOR` value slots; the vector's length decides how
//! many of them are observable. Inner nodes hold exactly
//! `BRANCHING_FACTOR` child handles, either all inner nodes or all leaf
//! nodes, with unused handles forming a suffix. A child handle is a
//! tagged, reference-counted pointer; cloning a handle shares the subtree,
//! and a node is freed when its last handle drops.
//!
//! Descent uses plain radix arithmetic: the child slot for index `i` at a
//! level with shift `s` is `(i >> s) & (BRANCHING_FACTOR - 1)`, and the
//! value slot inside a leaf is `i & (BRANCHING_FACTOR - 1)`. The shift of
//! the topmost level is cached on the vector so lookups can start their
//! descent without recomputing an integer logarithm.
//!
//! # Examples
//!
//! ```rust
//! use radixvec::persistent::PersistentVector;
//!
//! let vector = PersistentVector::new()
//!     .push_back(1)
//!     .push_back(2)
//!     .push_back(3);
//!
//! assert_eq!(vector.get(0), Some(&1));
//! assert_eq!(vector.get(1), Some(&2));
//! assert_eq!(vector.get(2), Some(&3));
//!
//! // Structural sharing: the original vector is preserved
//! let extended = vector.push_back(4);
//! assert_eq!(vector.len(), 3);     // Original unchanged
//! assert_eq!(extended.len(), 4);   // New vector
//! ```

use std::fmt;
use std::iter::FromIterator;
use std::ops::{Add, Index};

use crate::persistent::ReferenceCounter;

// =============================================================================
// Constants
// =============================================================================

/// Branching factor of the tree (2^5 = 32).
///
/// Every leaf holds this many value slots and every inner node holds this
/// many child slots. Block views returned by [`PersistentVector::block`]
/// are at most this long.
#[cfg(not(feature = "small_branch"))]
pub const BRANCHING_FACTOR: usize = 32;

/// Branching factor of the tree (2^2 = 4, `small_branch` build).
///
/// The reduced fan-out makes depth growth and root collapse reachable
/// with tiny inputs, which keeps exhaustive boundary tests cheap.
#[cfg(feature = "small_branch")]
pub const BRANCHING_FACTOR: usize = 4;

/// Bits of an index consumed per tree level.
#[cfg(not(feature = "small_branch"))]
const BITS_PER_LEVEL: i32 = 5;

#[cfg(feature = "small_branch")]
const BITS_PER_LEVEL: i32 = 2;

/// Bit mask for extracting the slot index within a node.
const MASK: usize = BRANCHING_FACTOR - 1;

/// Cached shift of a vector with no levels at all (the empty vector).
const EMPTY_TREE_SHIFT: i32 = -BITS_PER_LEVEL;

/// Cached shift when the root is a single leaf.
const LEAF_NODE_SHIFT: i32 = 0;

/// Shift of an inner node whose children are leaves.
const LOWEST_INNER_SHIFT: i32 = BITS_PER_LEVEL;

// =============================================================================
// Node Definitions
// =============================================================================

/// Node kind reported by [`NodeRef::kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeKind {
    Empty,
    Inner,
    Leaf,
}

/// Leaf node: exactly `BRANCHING_FACTOR` value slots.
///
/// The containing vector's length decides how many slots are observable;
/// slots past the end hold `T::default()` and are never handed out. A leaf
/// never carries a count of its own.
struct LeafNode<T> {
    values: [T; BRANCHING_FACTOR],
}

impl<T: Default> LeafNode<T> {
    /// Fresh leaf with every slot default-constructed.
    fn new() -> Self {
        LeafNode {
            values: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T> LeafNode<T> {
    fn from_values(values: [T; BRANCHING_FACTOR]) -> Self {
        LeafNode { values }
    }
}

/// Inner node: exactly `BRANCHING_FACTOR` child handles.
///
/// All non-empty children have the same kind, and empty handles form a
/// suffix. Both rules are established by the construction helpers and
/// re-checked in debug builds.
struct InnerNode<T> {
    children: [NodeRef<T>; BRANCHING_FACTOR],
}

impl<T> InnerNode<T> {
    fn new(children: [NodeRef<T>; BRANCHING_FACTOR]) -> Self {
        let node = InnerNode { children };
        debug_assert!(node.check_children());
        node
    }

    fn child(&self, index: usize) -> &NodeRef<T> {
        &self.children[index]
    }

    /// Copy of the whole child array, for clone-then-patch rebuilding.
    fn children_snapshot(&self) -> [NodeRef<T>; BRANCHING_FACTOR] {
        self.children.clone()
    }

    /// Number of leading non-empty child slots.
    fn used_children(&self) -> usize {
        self.children
            .iter()
            .take_while(|child| !child.is_empty())
            .count()
    }

    /// Kind uniformity and the empty-suffix rule.
    fn check_children(&self) -> bool {
        let used = self.used_children();
        let first_kind = self.children[0].kind();
        let uniform = self.children[..used]
            .iter()
            .all(|child| child.kind() == first_kind);
        let suffix_empty = self.children[used..].iter().all(NodeRef::is_empty);
        uniform && suffix_empty
    }
}

/// Tagged, reference-counted handle to a node.
///
/// Cloning bumps the referent's count and dropping the last handle frees
/// the node. Dropping an inner node releases its child handles
/// recursively; the recursion is bounded by tree depth (at most 13 levels
/// for 64-bit lengths at branching factor 32).
enum NodeRef<T> {
    Empty,
    Inner(ReferenceCounter<InnerNode<T>>),
    Leaf(ReferenceCounter<LeafNode<T>>),
}

impl<T> NodeRef<T> {
    fn leaf(node: LeafNode<T>) -> Self {
        NodeRef::Leaf(ReferenceCounter::new(node))
    }

    fn inner(children: [NodeRef<T>; BRANCHING_FACTOR]) -> Self {
        NodeRef::Inner(ReferenceCounter::new(InnerNode::new(children)))
    }

    fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Empty => NodeKind::Empty,
            NodeRef::Inner(_) => NodeKind::Inner,
            NodeRef::Leaf(_) => NodeKind::Leaf,
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, NodeRef::Empty)
    }

    /// Valid only on inner handles.
    fn as_inner(&self) -> &InnerNode<T> {
        match self {
            NodeRef::Inner(node) => node,
            _ => unreachable!("inner node handle expected"),
        }
    }

    /// Valid only on leaf handles.
    fn as_leaf(&self) -> &LeafNode<T> {
        match self {
            NodeRef::Leaf(node) => node,
            _ => unreachable!("leaf node handle expected"),
        }
    }

    /// Handle identity: do both handles point at the same node?
    fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeRef::Empty, NodeRef::Empty) => true,
            (NodeRef::Inner(left), NodeRef::Inner(right)) => {
                ReferenceCounter::ptr_eq(left, right)
            }
            (NodeRef::Leaf(left), NodeRef::Leaf(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }
}

// Hand-written so that sharing a handle never requires `T: Clone`.
impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        match self {
            NodeRef::Empty => NodeRef::Empty,
            NodeRef::Inner(node) => NodeRef::Inner(ReferenceCounter::clone(node)),
            NodeRef::Leaf(node) => NodeRef::Leaf(ReferenceCounter::clone(node)),
        }
    }
}

// =============================================================================
// Shift and Capacity Arithmetic
// =============================================================================

/// Cached shift consistent with a vector of `size` values: the sentinel
/// for the empty tree, `0` when the root is a single leaf, and one
/// `BITS_PER_LEVEL` step per inner level above that.
fn size_to_shift(size: usize) -> i32 {
    if size == 0 {
        return EMPTY_TREE_SHIFT;
    }
    let mut shift = LEAF_NODE_SHIFT;
    while shift_to_max_size(shift) < size {
        shift += BITS_PER_LEVEL;
    }
    shift
}

/// How many values a tree with this shift can hold without growing deeper.
#[allow(clippy::cast_sign_loss)]
fn shift_to_max_size(shift: i32) -> usize {
    debug_assert!(shift >= LEAF_NODE_SHIFT);
    1_usize
        .checked_shl((shift + BITS_PER_LEVEL) as u32)
        .unwrap_or(usize::MAX)
}

// =============================================================================
// Tree Algorithms
// =============================================================================

/// Walks from `root` down to the leaf containing `index`.
///
/// The index must be within the tree, so every child handle along the
/// path is populated.
fn find_leaf<T>(root: &NodeRef<T>, mut shift: i32, index: usize) -> &LeafNode<T> {
    let mut node = root;
    while shift > LEAF_NODE_SHIFT {
        node = node.as_inner().child((index >> shift) & MASK);
        shift -= BITS_PER_LEVEL;
    }
    node.as_leaf()
}

/// Recursive copy-on-write store.
///
/// Clones the inner nodes on the path from `node` down to the leaf
/// holding `index`, clones that leaf's value array with `value` written
/// into its slot, and returns the new subtree. Everything off the path is
/// shared by handle.
fn replace_value<T: Clone>(node: &NodeRef<T>, shift: i32, index: usize, value: T) -> NodeRef<T> {
    if shift == LEAF_NODE_SHIFT {
        let mut values = node.as_leaf().values.clone();
        values[index & MASK] = value;
        NodeRef::leaf(LeafNode::from_values(values))
    } else {
        let slot_index = (index >> shift) & MASK;
        let inner = node.as_inner();
        let child = replace_value(inner.child(slot_index), shift - BITS_PER_LEVEL, index, value);
        let mut children = inner.children_snapshot();
        children[slot_index] = child;
        NodeRef::inner(children)
    }
}

/// Same path copy as [`replace_value`], but substitutes an entire leaf in
/// one call. `leaf_base_index` is the index of the first value in the
/// target leaf.
fn replace_leaf<T>(
    node: &NodeRef<T>,
    shift: i32,
    leaf_base_index: usize,
    new_leaf: NodeRef<T>,
) -> NodeRef<T> {
    if shift == LEAF_NODE_SHIFT {
        debug_assert_eq!(node.kind(), NodeKind::Leaf);
        new_leaf
    } else {
        let slot_index = (leaf_base_index >> shift) & MASK;
        let inner = node.as_inner();
        let child = replace_leaf(
            inner.child(slot_index),
            shift - BITS_PER_LEVEL,
            leaf_base_index,
            new_leaf,
        );
        let mut children = inner.children_snapshot();
        children[slot_index] = child;
        NodeRef::inner(children)
    }
}

/// Right spine: a chain of inner nodes each holding the next as its sole
/// child in slot 0, `shift / BITS_PER_LEVEL` levels long, with `leaf` at
/// the bottom. Used to plant a brand-new rightmost path into a subtree
/// that was previously empty.
fn make_spine<T>(shift: i32, leaf: NodeRef<T>) -> NodeRef<T> {
    debug_assert_eq!(leaf.kind(), NodeKind::Leaf);
    if shift == LEAF_NODE_SHIFT {
        leaf
    } else {
        let mut children: [NodeRef<T>; BRANCHING_FACTOR] =
            std::array::from_fn(|_| NodeRef::Empty);
        children[0] = make_spine(shift - BITS_PER_LEVEL, leaf);
        NodeRef::inner(children)
    }
}

/// Splices `leaf` in as the new rightmost leaf of the tree rooted at
/// `node`. `at_index` equals the current number of values in the tree, so
/// the slot it selects at each level is the one just past the occupied
/// tail. The caller guarantees the tree has room at its current depth.
fn append_leaf<T>(node: &NodeRef<T>, shift: i32, at_index: usize, leaf: NodeRef<T>) -> NodeRef<T> {
    debug_assert_eq!(node.kind(), NodeKind::Inner);
    debug_assert_eq!(leaf.kind(), NodeKind::Leaf);

    let slot_index = (at_index >> shift) & MASK;
    let inner = node.as_inner();
    let mut children = inner.children_snapshot();
    if shift == LOWEST_INNER_SHIFT {
        // Children at this level are leaves; plant directly.
        children[slot_index] = leaf;
    } else if inner.child(slot_index).is_empty() {
        children[slot_index] = make_spine(shift - BITS_PER_LEVEL, leaf);
    } else {
        children[slot_index] = append_leaf(
            inner.child(slot_index),
            shift - BITS_PER_LEVEL,
            at_index,
            leaf,
        );
    }
    NodeRef::inner(children)
}

/// Adds a pre-filled leaf as the tree's new rightmost leaf.
///
/// The original length must be a multiple of `BRANCHING_FACTOR` and
/// `leaf_item_count` in `1..=BRANCHING_FACTOR`. Grows the tree one level
/// deeper when the root is saturated.
fn push_back_leaf<T>(
    original: &PersistentVector<T>,
    leaf: NodeRef<T>,
    leaf_item_count: usize,
) -> PersistentVector<T> {
    debug_assert_eq!(original.length & MASK, 0);
    debug_assert!((1..=BRANCHING_FACTOR).contains(&leaf_item_count));
    debug_assert_eq!(leaf.kind(), NodeKind::Leaf);

    if original.length == 0 {
        return PersistentVector::from_parts(leaf, leaf_item_count, LEAF_NODE_SHIFT);
    }

    let max_size = shift_to_max_size(original.shift);
    if original.length + leaf_item_count <= max_size {
        let root = append_leaf(&original.root, original.shift, original.length, leaf);
        PersistentVector::from_parts(root, original.length + leaf_item_count, original.shift)
    } else {
        // Root is saturated: the new root holds the old tree in slot 0 and
        // a fresh spine down to the leaf in slot 1.
        let mut children: [NodeRef<T>; BRANCHING_FACTOR] =
            std::array::from_fn(|_| NodeRef::Empty);
        children[0] = original.root.clone();
        children[1] = make_spine(original.shift, leaf);
        PersistentVector::from_parts(
            NodeRef::inner(children),
            original.length + leaf_item_count,
            original.shift + BITS_PER_LEVEL,
        )
    }
}

/// Removes the rightmost leaf (the one whose first value sits at
/// `leaf_base_index`) from the subtree, pruning inner nodes left with no
/// children. Returns the empty handle when the whole subtree is consumed.
fn drop_last_leaf<T>(node: &NodeRef<T>, shift: i32, leaf_base_index: usize) -> NodeRef<T> {
    if shift == LEAF_NODE_SHIFT {
        return NodeRef::Empty;
    }
    let slot_index = (leaf_base_index >> shift) & MASK;
    let inner = node.as_inner();
    let child = drop_last_leaf(inner.child(slot_index), shift - BITS_PER_LEVEL, leaf_base_index);
    if child.is_empty() && slot_index == 0 {
        return NodeRef::Empty;
    }
    let mut children = inner.children_snapshot();
    children[slot_index] = child;
    NodeRef::inner(children)
}

/// Collapses a root left holding a single child after the rightmost leaf
/// was dropped, shrinking the cached shift one level per collapse.
fn collapse_root<T>(mut root: NodeRef<T>, mut shift: i32) -> (NodeRef<T>, i32) {
    while shift > LEAF_NODE_SHIFT {
        let sole_child = match &root {
            NodeRef::Inner(inner) if inner.used_children() == 1 => Some(inner.child(0).clone()),
            _ => None,
        };
        match sole_child {
            Some(child) => {
                root = child;
                shift -= BITS_PER_LEVEL;
            }
            None => break,
        }
    }
    (root, shift)
}

// =============================================================================
// PersistentVector Definition
// =============================================================================

/// A persistent (immutable) vector based on a Radix Balanced Tree.
///
/// `PersistentVector` is an immutable data structure that uses structural
/// sharing to efficiently support functional programming patterns. Every
/// modifying operation returns a new vector; the operand is never changed.
///
/// # Time Complexity
///
/// | Operation           | Complexity                      |
/// |---------------------|---------------------------------|
/// | `new`               | O(1)                            |
/// | `get`               | O(log32 N)                      |
/// | `push_back`         | O(log32 N)                      |
/// | `pop_back`          | O(log32 N)                      |
/// | `update`            | O(log32 N)                      |
/// | `extend_from_slice` | O(M + (M / 32) log32 N)         |
/// | `len` / `is_empty`  | O(1)                            |
/// | `Clone`             | O(1)                            |
///
/// # Thread Safety
///
/// Vectors are shared across threads by value: `Clone` copies the root
/// handle under an atomic reference count, and nodes are never mutated
/// after construction, so concurrent readers need no synchronization.
///
/// # Examples
///
/// ```rust
/// use radixvec::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..100).collect();
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.get(50), Some(&50));
/// ```
pub struct PersistentVector<T> {
    /// Total number of observable values.
    length: usize,
    /// Bit position of the topmost radix digit for the current length.
    /// Derivable from `length`, but cached so lookups skip the integer
    /// logarithm.
    shift: i32,
    /// Root node of the trie; empty handle iff the vector is empty.
    root: NodeRef<T>,
}

impl<T> PersistentVector<T> {
    /// Creates a new empty vector.
    ///
    /// Allocates nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = PersistentVector::new();
    /// assert!(vector.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        PersistentVector {
            length: 0,
            shift: EMPTY_TREE_SHIFT,
            root: NodeRef::Empty,
        }
    }

    /// Internal constructor; the parts must already satisfy the
    /// length/shift/root-kind invariants.
    fn from_parts(root: NodeRef<T>, length: usize, shift: i32) -> Self {
        let vector = PersistentVector {
            length,
            shift,
            root,
        };
        debug_assert!(vector.check_invariant());
        vector
    }

    /// Validates the vector's internal state. Only ever invoked through
    /// `debug_assert!`.
    fn check_invariant(&self) -> bool {
        assert_eq!(self.shift, size_to_shift(self.length));
        match self.root.kind() {
            NodeKind::Empty => assert_eq!(self.length, 0),
            NodeKind::Leaf => assert_eq!(self.shift, LEAF_NODE_SHIFT),
            NodeKind::Inner => assert!(self.shift >= LOWEST_INNER_SHIFT),
        }
        true
    }

    /// Returns the number of values in the vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.len(), 5);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the vector contains no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns a reference to the value at the given index.
    ///
    /// Returns `None` if the index is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.get(0), Some(&1));
    /// assert_eq!(vector.get(4), Some(&5));
    /// assert_eq!(vector.get(10), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.length {
            return None;
        }
        let leaf = find_leaf(&self.root, self.shift, index);
        Some(&leaf.values[index & MASK])
    }

    /// Returns a reference to the first value, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a reference to the last value, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.length.checked_sub(1).and_then(|index| self.get(index))
    }

    /// Returns the number of leaf blocks backing the vector,
    /// `ceil(len / BRANCHING_FACTOR)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::{BRANCHING_FACTOR, PersistentVector};
    ///
    /// let vector: PersistentVector<usize> = (0..=BRANCHING_FACTOR).collect();
    /// assert_eq!(vector.block_count(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.length.div_ceil(BRANCHING_FACTOR)
    }

    /// Borrows the values of the `block_index`-th leaf as a slice.
    ///
    /// Every block except the last is exactly `BRANCHING_FACTOR` long; the
    /// last covers the remaining values. This is the zero-copy bulk-read
    /// path used by equality, flat conversion, and iteration.
    ///
    /// # Panics
    ///
    /// Panics if `block_index >= self.block_count()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::{BRANCHING_FACTOR, PersistentVector};
    ///
    /// let vector: PersistentVector<usize> = (0..=BRANCHING_FACTOR).collect();
    /// assert_eq!(vector.block(0).len(), BRANCHING_FACTOR);
    /// assert_eq!(vector.block(1), &[BRANCHING_FACTOR]);
    /// ```
    #[must_use]
    pub fn block(&self, block_index: usize) -> &[T] {
        assert!(
            block_index < self.block_count(),
            "block index out of bounds: the block count is {} but the index is {}",
            self.block_count(),
            block_index
        );
        let leaf_base_index = block_index * BRANCHING_FACTOR;
        let leaf = find_leaf(&self.root, self.shift, leaf_base_index);
        let observable = BRANCHING_FACTOR.min(self.length - leaf_base_index);
        &leaf.values[..observable]
    }

    /// Returns an iterator over references to the values, front to back.
    ///
    /// The iterator walks leaf blocks, so a full traversal touches each
    /// inner node once rather than once per value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let collected: Vec<&i32> = vector.iter().collect();
    /// assert_eq!(collected, vec![&1, &2, &3, &4, &5]);
    /// ```
    pub fn iter(&self) -> PersistentVectorIterator<'_, T> {
        PersistentVectorIterator {
            vector: self,
            front: &[],
            next_block_index: 0,
            yielded: 0,
        }
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Stores `value` at the given index.
    ///
    /// Returns `None` if the index is out of bounds, otherwise a new
    /// vector with the value replaced. Only the nodes on the path from the
    /// root to the target leaf are reallocated.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let updated = vector.update(2, 100).unwrap();
    ///
    /// assert_eq!(updated.get(2), Some(&100));
    /// assert_eq!(vector.get(2), Some(&3)); // Original unchanged
    /// ```
    #[must_use]
    pub fn update(&self, index: usize, value: T) -> Option<Self> {
        if index >= self.length {
            return None;
        }
        let root = replace_value(&self.root, self.shift, index, value);
        Some(Self::from_parts(root, self.length, self.shift))
    }

    /// Copies the values into a flat `Vec`, block by block.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..5).collect();
    /// assert_eq!(vector.to_vec(), vec![0, 1, 2, 3, 4]);
    /// ```
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let mut result = Vec::with_capacity(self.length);
        for block_index in 0..self.block_count() {
            result.extend_from_slice(self.block(block_index));
        }
        result
    }
}

impl<T: Default> PersistentVector<T> {
    /// Creates a vector containing a single value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::singleton(42);
    /// assert_eq!(vector.len(), 1);
    /// assert_eq!(vector.get(0), Some(&42));
    /// ```
    #[must_use]
    pub fn singleton(element: T) -> Self {
        let mut leaf = LeafNode::new();
        leaf.values[0] = element;
        Self::from_parts(NodeRef::leaf(leaf), 1, LEAF_NODE_SHIFT)
    }
}

impl<T: Clone + Default> PersistentVector<T> {
    /// Creates a vector containing the values of a slice, via the bulk
    /// append path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_slice(&[10, 20, 30]);
    /// assert_eq!(vector.to_vec(), vec![10, 20, 30]);
    /// ```
    #[must_use]
    pub fn from_slice(values: &[T]) -> Self {
        Self::new().extend_from_slice(values)
    }

    /// Appends one value to the back of the vector.
    ///
    /// When the last leaf has spare capacity this is a plain path copy
    /// down to it; when the vector's length is a multiple of
    /// `BRANCHING_FACTOR` a fresh leaf is spliced in, growing the tree one
    /// level deeper if the root was saturated.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new()
    ///     .push_back(1)
    ///     .push_back(2)
    ///     .push_back(3);
    ///
    /// assert_eq!(vector.len(), 3);
    /// assert_eq!(vector.get(2), Some(&3));
    /// ```
    #[must_use]
    pub fn push_back(&self, value: T) -> Self {
        if self.length & MASK != 0 {
            // The last leaf has a free slot: append is a store at the
            // index one past the end.
            let root = replace_value(&self.root, self.shift, self.length, value);
            Self::from_parts(root, self.length + 1, self.shift)
        } else {
            let mut leaf = LeafNode::new();
            leaf.values[0] = value;
            push_back_leaf(self, NodeRef::leaf(leaf), 1)
        }
    }

    /// Removes the last value from the vector.
    ///
    /// Returns `None` if the vector is empty, otherwise the new vector and
    /// the removed value. When the last leaf empties it is dropped, spine
    /// inner nodes left childless are pruned, and a single-child root is
    /// collapsed so the tree gets shallower again.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let (remaining, value) = vector.pop_back().unwrap();
    ///
    /// assert_eq!(value, 5);
    /// assert_eq!(remaining.len(), 4);
    /// ```
    #[must_use]
    pub fn pop_back(&self) -> Option<(Self, T)> {
        let value = self.get(self.length.checked_sub(1)?)?.clone();
        if self.length == 1 {
            return Some((Self::new(), value));
        }

        let new_length = self.length - 1;
        if new_length & MASK != 0 {
            // The last leaf keeps at least one value; clear the freed slot
            // so it holds a default again.
            let root = replace_value(&self.root, self.shift, new_length, T::default());
            Some((Self::from_parts(root, new_length, self.shift), value))
        } else {
            let root = drop_last_leaf(&self.root, self.shift, new_length);
            debug_assert!(!root.is_empty());
            let (root, shift) = collapse_root(root, self.shift);
            Some((Self::from_parts(root, new_length, shift), value))
        }
    }

    /// Appends every value of `values` to the back of the vector.
    ///
    /// This is the bulk construction primitive: it pads out a partially
    /// filled last leaf first, then streams whole leaves, allocating one
    /// leaf (plus its path) per `BRANCHING_FACTOR` values instead of a
    /// path per value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_slice(&[1, 2, 3]);
    /// let extended = vector.extend_from_slice(&[4, 5]);
    ///
    /// assert_eq!(extended.to_vec(), vec![1, 2, 3, 4, 5]);
    /// assert_eq!(vector.len(), 3); // Original unchanged
    /// ```
    #[must_use]
    pub fn extend_from_slice(&self, values: &[T]) -> Self {
        let mut result = self.clone();
        let mut source = values;

        // Pad out a partially filled last leaf.
        let last_leaf_size = result.length & MASK;
        if last_leaf_size != 0 && !source.is_empty() {
            let leaf_base_index = result.length & !MASK;
            let copy_count = (BRANCHING_FACTOR - last_leaf_size).min(source.len());
            let mut merged = LeafNode::new();
            {
                let previous = find_leaf(&result.root, result.shift, leaf_base_index);
                merged.values[..last_leaf_size]
                    .clone_from_slice(&previous.values[..last_leaf_size]);
            }
            merged.values[last_leaf_size..last_leaf_size + copy_count]
                .clone_from_slice(&source[..copy_count]);
            let root = replace_leaf(
                &result.root,
                result.shift,
                leaf_base_index,
                NodeRef::leaf(merged),
            );
            result = Self::from_parts(root, result.length + copy_count, result.shift);
            source = &source[copy_count..];
        }

        // Stream whole leaves; the final one may be partial.
        while !source.is_empty() {
            debug_assert_eq!(result.length & MASK, 0);
            let batch_count = source.len().min(BRANCHING_FACTOR);
            let mut fresh = LeafNode::new();
            fresh.values[..batch_count].clone_from_slice(&source[..batch_count]);
            result = push_back_leaf(&result, NodeRef::leaf(fresh), batch_count);
            source = &source[batch_count..];
        }

        debug_assert_eq!(result.length, self.length + values.len());
        result
    }

    /// Appends another vector to this vector.
    ///
    /// Returns a new vector containing all values from this vector
    /// followed by all values from `other`; both operands are unchanged.
    /// The values of `other` are consumed block-wise through the bulk
    /// append path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixvec::persistent::PersistentVector;
    ///
    /// let left: PersistentVector<i32> = (1..=3).collect();
    /// let right: PersistentVector<i32> = (4..=6).collect();
    /// let combined = left.append(&right);
    ///
    /// assert_eq!(combined.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    /// ```
    #[must_use]
    pub fn append(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut result = self.clone();
        for block_index in 0..other.block_count() {
            result = result.extend_from_slice(other.block(block_index));
        }
        debug_assert_eq!(result.length, self.length + other.length);
        result
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over references to the values of a [`PersistentVector`].
///
/// Walks the vector block by block, borrowing each leaf's slice once.
pub struct PersistentVectorIterator<'a, T> {
    vector: &'a PersistentVector<T>,
    front: &'a [T],
    next_block_index: usize,
    yielded: usize,
}

impl<'a, T> Iterator for PersistentVectorIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((value, rest)) = self.front.split_first() {
                self.front = rest;
                self.yielded += 1;
                return Some(value);
            }
            if self.next_block_index >= self.vector.block_count() {
                return None;
            }
            self.front = self.vector.block(self.next_block_index);
            self.next_block_index += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.length - self.yielded;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for PersistentVectorIterator<'_, T> {
    fn len(&self) -> usize {
        self.vector.length - self.yielded
    }
}

/// An owning iterator over the values of a [`PersistentVector`].
pub struct PersistentVectorIntoIterator<T> {
    vector: PersistentVector<T>,
    current_index: usize,
}

impl<T: Clone> Iterator for PersistentVectorIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.vector.get(self.current_index).cloned();
        self.current_index += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.length.saturating_sub(self.current_index);
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentVectorIntoIterator<T> {
    fn len(&self) -> usize {
        self.vector.length.saturating_sub(self.current_index)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

// Hand-written so that sharing the root never requires `T: Clone`.
impl<T> Clone for PersistentVector<T> {
    #[inline]
    fn clone(&self) -> Self {
        PersistentVector {
            length: self.length,
            shift: self.shift,
            root: self.root.clone(),
        }
    }
}

impl<T> Default for PersistentVector<T> {
    #[inline]
    fn default() -> Self {
        PersistentVector::new()
    }
}

impl<T: Default> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut result = PersistentVector::new();
        let mut iterator = iter.into_iter();
        loop {
            let mut leaf = LeafNode::new();
            let mut count = 0;
            for slot in &mut leaf.values {
                match iterator.next() {
                    Some(value) => {
                        *slot = value;
                        count += 1;
                    }
                    None => break,
                }
            }
            if count == 0 {
                break;
            }
            result = push_back_leaf(&result, NodeRef::leaf(leaf), count);
            if count < BRANCHING_FACTOR {
                break;
            }
        }
        result
    }
}

impl<T: Default> From<Vec<T>> for PersistentVector<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone + Default> From<&[T]> for PersistentVector<T> {
    fn from(values: &[T]) -> Self {
        Self::from_slice(values)
    }
}

impl<T: Default, const N: usize> From<[T; N]> for PersistentVector<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone> IntoIterator for PersistentVector<T> {
    type Item = T;
    type IntoIter = PersistentVectorIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        PersistentVectorIntoIterator {
            vector: self,
            current_index: 0,
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentVector<T> {
    type Item = &'a T;
    type IntoIter = PersistentVectorIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentVector<T> {
    /// Equal iff lengths match and every value compares equal.
    ///
    /// Fast paths first: differing lengths, both empty, and both roots
    /// being the same node. Otherwise compares block-wise, skipping blocks
    /// whose storage is shared between the two trees.
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        if self.length == 0 {
            return true;
        }
        if self.root.ptr_eq(&other.root) {
            return true;
        }
        (0..self.block_count()).all(|block_index| {
            let left = self.block(block_index);
            let right = other.block(block_index);
            std::ptr::eq(left, right) || left == right
        })
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

impl<T> Index<usize> for PersistentVector<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if the index is out of bounds; use
    /// [`PersistentVector::get`] for a fallible lookup.
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!(
                "index out of bounds: the length is {} but the index is {}",
                self.length, index
            ),
        }
    }
}

impl<T: Clone + Default> Add for PersistentVector<T> {
    type Output = Self;

    /// Concatenation: all values of `self` followed by all values of
    /// `other`.
    fn add(self, other: Self) -> Self {
        self.append(&other)
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentVector<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut sequence = serializer.serialize_seq(Some(self.length))?;
        for block_index in 0..self.block_count() {
            for value in self.block(block_index) {
                sequence.serialize_element(value)?;
            }
        }
        sequence.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentVectorVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentVectorVisitor<T>
where
    T: serde::Deserialize<'de> + Default,
{
    type Value = PersistentVector<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut sequence: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut values = Vec::with_capacity(sequence.size_hint().unwrap_or(0));
        while let Some(value) = sequence.next_element()? {
            values.push(value);
        }
        Ok(values.into_iter().collect())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentVector<T>
where
    T: serde::Deserialize<'de> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentVectorVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn numbers(count: usize) -> PersistentVector<usize> {
        (0..count).collect()
    }

    // -------------------------------------------------------------------------
    // Shift and capacity arithmetic
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_size_to_shift_size_classes() {
        assert_eq!(size_to_shift(0), EMPTY_TREE_SHIFT);
        assert_eq!(size_to_shift(1), LEAF_NODE_SHIFT);
        assert_eq!(size_to_shift(BRANCHING_FACTOR), LEAF_NODE_SHIFT);
        assert_eq!(size_to_shift(BRANCHING_FACTOR + 1), BITS_PER_LEVEL);
        assert_eq!(
            size_to_shift(BRANCHING_FACTOR * BRANCHING_FACTOR),
            BITS_PER_LEVEL
        );
        assert_eq!(
            size_to_shift(BRANCHING_FACTOR * BRANCHING_FACTOR + 1),
            2 * BITS_PER_LEVEL
        );
    }

    #[rstest]
    fn test_shift_to_max_size() {
        assert_eq!(shift_to_max_size(LEAF_NODE_SHIFT), BRANCHING_FACTOR);
        assert_eq!(
            shift_to_max_size(BITS_PER_LEVEL),
            BRANCHING_FACTOR * BRANCHING_FACTOR
        );
    }

    // -------------------------------------------------------------------------
    // Cached shift tracks the length after every operation
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_shift_cached_on_vector_matches_length() {
        let mut vector = PersistentVector::new();
        assert_eq!(vector.shift, EMPTY_TREE_SHIFT);

        for index in 0..BRANCHING_FACTOR * BRANCHING_FACTOR + 1 {
            vector = vector.push_back(index);
            assert_eq!(vector.shift, size_to_shift(vector.length));
        }
        assert_eq!(vector.shift, 2 * BITS_PER_LEVEL);

        while let Some((remaining, _)) = vector.pop_back() {
            vector = remaining;
            assert_eq!(vector.shift, size_to_shift(vector.length));
        }
        assert_eq!(vector.shift, EMPTY_TREE_SHIFT);
    }

    #[rstest]
    fn test_depth_growth_at_root_saturation() {
        // One full leaf: the root is the leaf itself.
        let full_leaf = numbers(BRANCHING_FACTOR);
        assert_eq!(full_leaf.shift, LEAF_NODE_SHIFT);
        assert_eq!(full_leaf.root.kind(), NodeKind::Leaf);

        // One more value: an inner root over two leaves.
        let two_leaves = full_leaf.push_back(BRANCHING_FACTOR);
        assert_eq!(two_leaves.shift, BITS_PER_LEVEL);
        assert_eq!(two_leaves.root.kind(), NodeKind::Inner);
        assert_eq!(two_leaves.root.as_inner().used_children(), 2);

        // Saturated two-level tree, then one more value: depth grows again
        // and the old root moves into slot 0.
        let saturated = numbers(BRANCHING_FACTOR * BRANCHING_FACTOR);
        assert_eq!(saturated.shift, BITS_PER_LEVEL);
        let grown = saturated.push_back(0);
        assert_eq!(grown.shift, 2 * BITS_PER_LEVEL);
        assert_eq!(grown.root.as_inner().used_children(), 2);
        assert!(grown.root.as_inner().child(0).ptr_eq(&saturated.root));
        for index in 0..saturated.len() {
            assert_eq!(grown.get(index), saturated.get(index));
        }
    }

    #[rstest]
    fn test_pop_back_collapses_root_across_boundary() {
        let grown = numbers(BRANCHING_FACTOR * BRANCHING_FACTOR + 1);
        assert_eq!(grown.shift, 2 * BITS_PER_LEVEL);

        let (collapsed, value) = grown.pop_back().unwrap();
        assert_eq!(value, BRANCHING_FACTOR * BRANCHING_FACTOR);
        assert_eq!(collapsed.shift, BITS_PER_LEVEL);
        assert_eq!(collapsed.len(), BRANCHING_FACTOR * BRANCHING_FACTOR);
        for index in 0..collapsed.len() {
            assert_eq!(collapsed.get(index), Some(&index));
        }
    }

    #[rstest]
    fn test_pop_back_collapses_inner_root_to_leaf() {
        let two_leaves = numbers(BRANCHING_FACTOR + 1);
        let (single_leaf, _) = two_leaves.pop_back().unwrap();
        assert_eq!(single_leaf.shift, LEAF_NODE_SHIFT);
        assert_eq!(single_leaf.root.kind(), NodeKind::Leaf);
        assert_eq!(single_leaf.len(), BRANCHING_FACTOR);
    }

    // -------------------------------------------------------------------------
    // Structural sharing observed through node identity
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_push_back_shares_all_untouched_blocks() {
        let vector = numbers(BRANCHING_FACTOR * 3 + 1);
        let extended = vector.push_back(999);
        // Appending touches only the last leaf's path; every full block's
        // storage is shared between the versions.
        for block_index in 0..vector.block_count() - 1 {
            assert!(std::ptr::eq(
                vector.block(block_index),
                extended.block(block_index)
            ));
        }
    }

    #[rstest]
    fn test_update_shares_all_other_blocks() {
        let vector = numbers(BRANCHING_FACTOR * 4);
        let updated = vector.update(0, 999).unwrap();
        assert!(!std::ptr::eq(vector.block(0), updated.block(0)));
        for block_index in 1..vector.block_count() {
            assert!(std::ptr::eq(
                vector.block(block_index),
                updated.block(block_index)
            ));
        }
    }

    #[rstest]
    fn test_clone_shares_the_root() {
        let vector = numbers(BRANCHING_FACTOR * 2);
        let copy = vector.clone();
        assert!(vector.root.ptr_eq(&copy.root));
    }

    // -------------------------------------------------------------------------
    // Every shared node is released when the owning vectors drop
    // -------------------------------------------------------------------------

    /// Payload that keeps a live handle to the anchor; padding slots
    /// default to `None` so only stored values count.
    #[derive(Clone, Debug, Default, PartialEq)]
    struct Payload(Option<std::sync::Arc<()>>);

    #[rstest]
    fn test_all_values_released_when_vectors_drop() {
        let anchor = std::sync::Arc::new(());
        {
            let vector: PersistentVector<Payload> = (0..BRANCHING_FACTOR * 2 + 3)
                .map(|_| Payload(Some(anchor.clone())))
                .collect();
            let extended = vector.push_back(Payload(Some(anchor.clone())));
            let updated = extended.update(1, Payload(Some(anchor.clone()))).unwrap();
            let (shrunk, _) = updated.pop_back().unwrap();
            assert!(std::sync::Arc::strong_count(&anchor) > BRANCHING_FACTOR * 2);
            drop((vector, extended, updated, shrunk));
        }
        assert_eq!(std::sync::Arc::strong_count(&anchor), 1);
    }

    // -------------------------------------------------------------------------
    // Inner node invariants
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_inner_children_are_kind_uniform_with_empty_suffix() {
        let vector = numbers(BRANCHING_FACTOR * 2 + 1);
        let inner = vector.root.as_inner();
        let used = inner.used_children();
        assert_eq!(used, 3);
        for index in 0..used {
            assert_eq!(inner.child(index).kind(), NodeKind::Leaf);
        }
        for index in used..BRANCHING_FACTOR {
            assert!(inner.child(index).is_empty());
        }
        assert!(inner.check_children());
    }

    // -------------------------------------------------------------------------
    // Bulk append against the one-value-at-a-time path
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_extend_from_slice_every_tail_alignment() {
        let batch_lengths = [
            0,
            1,
            BRANCHING_FACTOR - 1,
            BRANCHING_FACTOR,
            BRANCHING_FACTOR + 1,
            2 * BRANCHING_FACTOR,
            BRANCHING_FACTOR * BRANCHING_FACTOR + 1,
        ];
        for alignment in 0..BRANCHING_FACTOR {
            let base = numbers(BRANCHING_FACTOR + alignment);
            for batch_length in batch_lengths {
                let batch: Vec<usize> = (0..batch_length).collect();
                let bulk = base.extend_from_slice(&batch);

                let mut sequential = base.clone();
                for value in &batch {
                    sequential = sequential.push_back(*value);
                }

                assert_eq!(bulk.len(), base.len() + batch_length);
                assert_eq!(bulk, sequential);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Serde round-trips
    // -------------------------------------------------------------------------

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;
        use rstest::rstest;

        #[rstest]
        fn test_serialize_as_flat_sequence() {
            let vector: PersistentVector<i32> = (1..=3).collect();
            let json = serde_json::to_string(&vector).unwrap();
            assert_eq!(json, "[1,2,3]");
        }

        #[rstest]
        fn test_serialize_empty() {
            let vector: PersistentVector<i32> = PersistentVector::new();
            let json = serde_json::to_string(&vector).unwrap();
            assert_eq!(json, "[]");
        }

        #[rstest]
        fn test_deserialize_from_sequence() {
            let vector: PersistentVector<i32> = serde_json::from_str("[1,2,3]").unwrap();
            assert_eq!(vector.to_vec(), vec![1, 2, 3]);
        }

        #[rstest]
        fn test_roundtrip_across_leaf_boundary() {
            let original: PersistentVector<usize> = (0..BRANCHING_FACTOR * 2 + 5).collect();
            let json = serde_json::to_string(&original).unwrap();
            let restored: PersistentVector<usize> = serde_json::from_str(&json).unwrap();
            assert_eq!(original, restored);
        }
    }
}
