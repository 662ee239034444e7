//! Immutable inference tree and the compiler that produces it.
//!
//! [`compile`] walks the growth tree depth-first. Leaves get an index equal
//! to their rank among all leaf ids (ascending), internal nodes get their
//! split feature remapped from store column to output feature id.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::data::BinVector;

use super::super::split::{goes_left, SplitKind};
use super::builder::GrowthTree;
use super::node::{left_child, right_child, NodeId, ROOT};

// ============================================================================
// Compiled nodes
// ============================================================================

/// A node of a compiled tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CompiledNode {
    Leaf {
        prediction: f64,
        leaf_index: u32,
    },
    Internal {
        /// Output feature id.
        feature: u32,
        kind: SplitKind,
        missing_go_left: bool,
        gain: f64,
        left: Box<CompiledNode>,
        right: Box<CompiledNode>,
    },
}

impl CompiledNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }
}

/// Compact tree ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompiledTree {
    pub root: CompiledNode,
    pub num_leaves: u32,
    pub depth: u32,
}

impl CompiledTree {
    /// Leaf reached by `features`, given in output feature space.
    fn route(&self, features: &BinVector) -> (f64, u32) {
        let mut node = &self.root;
        loop {
            match node {
                CompiledNode::Leaf {
                    prediction,
                    leaf_index,
                } => return (*prediction, *leaf_index),
                CompiledNode::Internal {
                    feature,
                    kind,
                    missing_go_left,
                    left,
                    right,
                    ..
                } => {
                    node = if goes_left(kind, *missing_go_left, features.get(*feature)) {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Prediction for a binned row in output feature space.
    pub fn predict_binned(&self, features: &BinVector) -> f64 {
        self.route(features).0
    }

    /// Index of the leaf a binned row lands in.
    pub fn leaf_index(&self, features: &BinVector) -> u32 {
        self.route(features).1
    }

    /// Check leaf indexing and depth bookkeeping.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let mut seen = HashSet::new();
        let mut max_depth = 0;
        let mut stack = vec![(&self.root, 0u32)];

        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            match node {
                CompiledNode::Leaf { leaf_index, .. } => {
                    if *leaf_index >= self.num_leaves {
                        return Err(TreeValidationError::LeafIndexOutOfRange {
                            index: *leaf_index,
                            num_leaves: self.num_leaves,
                        });
                    }
                    if !seen.insert(*leaf_index) {
                        return Err(TreeValidationError::DuplicateLeafIndex(*leaf_index));
                    }
                }
                CompiledNode::Internal { left, right, .. } => {
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
            }
        }

        if seen.len() != self.num_leaves as usize {
            return Err(TreeValidationError::LeafCountMismatch {
                expected: self.num_leaves,
                found: seen.len(),
            });
        }
        if max_depth != self.depth {
            return Err(TreeValidationError::DepthMismatch {
                expected: self.depth,
                found: max_depth,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Corrupted growth tree found during compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("internal node {0} has no split")]
    MissingSplit(NodeId),
    #[error("internal node {node} has no {side} child")]
    MissingChild { node: NodeId, side: &'static str },
    #[error("leaf {0} carries a split")]
    LeafWithSplit(NodeId),
    #[error("leaf {0} has children")]
    LeafWithChildren(NodeId),
    #[error("node {node} splits on column {feature} but the feature remap has {n_mapped} entries")]
    FeatureOutOfRange { node: NodeId, feature: u32, n_mapped: usize },
    #[error("node {0} is referenced but not present")]
    UnknownNode(NodeId),
    #[error("node {node} has child {child}, which is not one of its heap children")]
    MisplacedChild { node: NodeId, child: NodeId },
}

/// Structural problems of a compiled tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("leaf index {index} out of range for {num_leaves} leaves")]
    LeafIndexOutOfRange { index: u32, num_leaves: u32 },
    #[error("leaf index {0} used more than once")]
    DuplicateLeafIndex(u32),
    #[error("tree declares {expected} leaves but has {found}")]
    LeafCountMismatch { expected: u32, found: usize },
    #[error("tree declares depth {expected} but has depth {found}")]
    DepthMismatch { expected: u32, found: u32 },
}

// ============================================================================
// Compiler
// ============================================================================

/// Compile a growth tree, remapping split columns through `feature_remap`.
pub fn compile(tree: &GrowthTree, feature_remap: &[u32]) -> Result<CompiledTree, CompileError> {
    let leaf_index: BTreeMap<NodeId, u32> = tree
        .leaf_ids()
        .into_iter()
        .enumerate()
        .map(|(idx, id)| (id, idx as u32))
        .collect();

    let mut depth = 0;
    let root = compile_node(tree, ROOT, 0, feature_remap, &leaf_index, &mut depth)?;
    Ok(CompiledTree {
        root,
        num_leaves: leaf_index.len() as u32,
        depth,
    })
}

fn compile_node(
    tree: &GrowthTree,
    id: NodeId,
    depth: u32,
    feature_remap: &[u32],
    leaf_index: &BTreeMap<NodeId, u32>,
    max_depth: &mut u32,
) -> Result<CompiledNode, CompileError> {
    let node = tree.node(id).ok_or(CompileError::UnknownNode(id))?;
    *max_depth = (*max_depth).max(depth);

    if node.is_leaf {
        if node.split.is_some() {
            return Err(CompileError::LeafWithSplit(id));
        }
        if node.left.is_some() || node.right.is_some() {
            return Err(CompileError::LeafWithChildren(id));
        }
        let leaf_index = leaf_index.get(&id).copied().ok_or(CompileError::UnknownNode(id))?;
        return Ok(CompiledNode::Leaf {
            prediction: node.prediction,
            leaf_index,
        });
    }

    let split = node.split.as_ref().ok_or(CompileError::MissingSplit(id))?;
    let left = node.left.ok_or(CompileError::MissingChild { node: id, side: "left" })?;
    let right = node.right.ok_or(CompileError::MissingChild { node: id, side: "right" })?;
    for (child, expected) in [(left, left_child(id)), (right, right_child(id))] {
        if child != expected {
            return Err(CompileError::MisplacedChild { node: id, child });
        }
    }
    let feature = *feature_remap
        .get(split.feature as usize)
        .ok_or(CompileError::FeatureOutOfRange {
            node: id,
            feature: split.feature,
            n_mapped: feature_remap.len(),
        })?;

    Ok(CompiledNode::Internal {
        feature,
        kind: split.kind.clone(),
        missing_go_left: split.missing_go_left,
        gain: split.gain,
        left: Box::new(compile_node(tree, left, depth + 1, feature_remap, leaf_index, max_depth)?),
        right: Box::new(compile_node(tree, right, depth + 1, feature_remap, leaf_index, max_depth)?),
    })
}
