//! Heap-numbered node identifiers.
//!
//! The root is `1`; node `n` has children `2n` (left) and `2n + 1` (right).
//! An id therefore encodes its depth (`floor(log2 n)`) and its path from the
//! root (the bits below the leading one, most significant first, `1` = right).

/// Identifier of a tree node.
pub type NodeId = u32;

/// Id of the root node.
pub const ROOT: NodeId = 1;

/// Deepest level whose children still fit in a [`NodeId`].
pub const MAX_SUPPORTED_DEPTH: u32 = 30;

#[inline]
pub const fn left_child(node: NodeId) -> NodeId {
    node << 1
}

#[inline]
pub const fn right_child(node: NodeId) -> NodeId {
    (node << 1) | 1
}

/// Parent id; the root is its own parent.
#[inline]
pub const fn parent(node: NodeId) -> NodeId {
    if node <= ROOT {
        ROOT
    } else {
        node >> 1
    }
}

/// Whether the node is built directly during histogram construction.
///
/// Odd ids are right children; the root counts as right as well.
#[inline]
pub const fn is_right(node: NodeId) -> bool {
    node & 1 == 1
}

/// Depth of the node, with the root at depth 0.
#[inline]
pub const fn depth_of(node: NodeId) -> u32 {
    debug_assert!(node != 0);
    31 - node.leading_zeros()
}

/// Smallest id at `depth`; every frontier node at that depth is `>=` it.
#[inline]
pub const fn first_at_depth(depth: u32) -> NodeId {
    1 << depth
}
