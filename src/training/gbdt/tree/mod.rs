//! Tree structures.
//!
//! - [`NodeId`] and heap-numbering helpers
//! - [`GrowthTree`], [`GrowthNode`]: mutable arena grown level by level
//! - [`CompiledTree`], [`CompiledNode`]: immutable inference tree
//! - [`compile`]: growth tree to compiled tree

pub mod builder;
pub mod compiled;
pub mod node;

pub use builder::{GrowthNode, GrowthTree, GrowthTreeError};
pub use compiled::{compile, CompileError, CompiledNode, CompiledTree, TreeValidationError};
pub use node::{
    depth_of, first_at_depth, is_right, left_child, parent, right_child, NodeId, MAX_SUPPORTED_DEPTH, ROOT,
};
