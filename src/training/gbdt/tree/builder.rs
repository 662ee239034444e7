//! Mutable growth tree used while a tree is being built.

use std::collections::BTreeMap;

use super::super::split::SplitCandidate;
use super::node::{depth_of, left_child, right_child, NodeId, ROOT};

/// A node of the growth tree.
///
/// Created as a leaf; promoted to internal by [`GrowthTree::apply_split`].
/// Nodes are never removed.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthNode {
    pub id: NodeId,
    pub is_leaf: bool,
    pub prediction: f64,
    pub split: Option<SplitCandidate>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

impl GrowthNode {
    fn leaf(id: NodeId, prediction: f64) -> Self {
        Self {
            id,
            is_leaf: true,
            prediction,
            split: None,
            left: None,
            right: None,
        }
    }
}

/// Errors from mutating the growth tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrowthTreeError {
    #[error("node {0} is not a leaf of the growth tree")]
    NotALeaf(NodeId),
}

/// Arena of growth nodes addressed by [`NodeId`].
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthTree {
    nodes: BTreeMap<NodeId, GrowthNode>,
}

impl GrowthTree {
    /// A single-leaf tree.
    pub fn new(root_prediction: f64) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT, GrowthNode::leaf(ROOT, root_prediction));
        Self { nodes }
    }

    /// Build from raw nodes, without any consistency checks.
    ///
    /// Mostly useful for exercising the compiler on malformed trees.
    pub fn from_nodes(nodes: impl IntoIterator<Item = GrowthNode>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.id, n)).collect(),
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&GrowthNode> {
        self.nodes.get(&id)
    }

    #[inline]
    pub fn root(&self) -> Option<&GrowthNode> {
        self.node(ROOT)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &GrowthNode> {
        self.nodes.values()
    }

    /// Attach `split` to leaf `id` and create its two children.
    ///
    /// Returns the `(left, right)` child ids.
    pub fn apply_split(&mut self, id: NodeId, split: SplitCandidate) -> Result<(NodeId, NodeId), GrowthTreeError> {
        let node = match self.nodes.get_mut(&id) {
            Some(node) if node.is_leaf => node,
            _ => return Err(GrowthTreeError::NotALeaf(id)),
        };

        let (left, right) = (left_child(id), right_child(id));
        let (left_weight, right_weight) = (split.left_weight, split.right_weight);
        node.is_leaf = false;
        node.split = Some(split);
        node.left = Some(left);
        node.right = Some(right);

        self.nodes.insert(left, GrowthNode::leaf(left, left_weight));
        self.nodes.insert(right, GrowthNode::leaf(right, right_weight));
        Ok((left, right))
    }

    /// Leaf ids in increasing order.
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.nodes.values().filter(|n| n.is_leaf).map(|n| n.id).collect()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.values().filter(|n| n.is_leaf).count()
    }

    /// Depth of the deepest node (root = 0).
    pub fn depth(&self) -> u32 {
        self.nodes.keys().next_back().map_or(0, |&id| depth_of(id))
    }

    /// Whether the root was never split.
    pub fn is_trivial(&self) -> bool {
        self.root().map_or(true, |r| r.is_leaf)
    }
}
