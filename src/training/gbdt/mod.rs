//! Level-wise GBDT tree induction.
//!
//! - [`router`] - Instance-to-leaf assignment per level
//! - [`histograms`] - Histogram building, subtraction, and pruning
//! - [`partition`] - Hash and range partitioners over `(node, feature)` keys
//! - [`split`] - Split candidates, gain evaluation, and per-level split search
//! - [`categorical`] - Category sets for categorical splits
//! - [`tree`] - Node ids, growth tree, compiled tree, and the compiler
//! - [`grower`] - Level-by-level growth state machine

pub mod categorical;
pub mod grower;
pub mod histograms;
pub mod partition;
pub mod router;
pub mod split;
pub mod tree;

// Re-export main types
pub use categorical::CatBitset;
pub use grower::{GrowerParams, GrowthStats, GrownTree, StopReason, TreeGrower};
pub use histograms::{FeatureKey, Histogram, HistogramBin, HistogramError};
pub use partition::{compute_pair_splits, PairPartitioner, RangePartitioner};
pub use split::{GainParams, GreedySplitEvaluator, SplitCandidate, SplitEvaluator, SplitKind, SplitSearch};
pub use tree::{compile, CompileError, CompiledNode, CompiledTree, GrowthNode, GrowthTree, NodeId};
