//! Configuration for growing one tree.
//!
//! Two groups, mirroring what the boosting loop hands over:
//!
//! - [`BoostConfig`]: ensemble-wide budgets, regularization, sampling and
//!   runtime settings (shared by every tree)
//! - [`TreeConfig`]: per-tree inputs (tree index, column count, column remap)
//!
//! Use struct construction with `..Default::default()` and call `validate()`
//! before training; [`train`](super::train) validates both for you.

use serde::{Deserialize, Serialize};

use super::gbdt::split::GainParams;
use super::gbdt::tree::MAX_SUPPORTED_DEPTH;
use super::logger::Verbosity;

/// Errors from configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_depth must be in 1..={max}, got {got}")]
    InvalidMaxDepth { got: u32, max: u32 },

    #[error("max_leaves must be >= 2, got {0}")]
    InvalidMaxLeaves(u32),

    #[error("min_node_hess must be finite and >= 0, got {0}")]
    InvalidMinNodeHess(f64),

    #[error("col_sample_by_level must be in (0, 1], got {0}")]
    InvalidColSampleByLevel(f64),

    #[error("reg_lambda must be finite and >= 0, got {0}")]
    InvalidLambda(f64),

    #[error("min_gain must be finite and >= 0, got {0}")]
    InvalidMinGain(f64),

    #[error("parallelism must be >= 1")]
    InvalidParallelism,

    #[error("aggregation_depth must be >= 1")]
    InvalidAggregationDepth,

    #[error("feature_remap has {got} entries but num_cols is {num_cols}")]
    ShortFeatureRemap { got: usize, num_cols: u32 },

    #[error("categorical has {got} entries but num_cols is {num_cols}")]
    CategoricalLenMismatch { got: usize, num_cols: u32 },
}

// =============================================================================
// BoostConfig
// =============================================================================

/// Ensemble-wide settings used when growing each tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoostConfig {
    // --- Budgets ---
    /// Maximum tree depth (root = depth 0).
    pub max_depth: u32,
    /// Maximum number of leaves.
    pub max_leaves: u32,

    // --- Regularization ---
    /// Minimum hessian sum per node. A (node, feature) histogram needs twice
    /// this mass to stay in the split search.
    pub min_node_hess: f64,
    /// L2 regularization on leaf weights.
    pub reg_lambda: f64,
    /// Minimum gain for a split to be kept.
    pub min_gain: f64,

    // --- Sampling ---
    /// Fraction of (node, feature) histograms searched per level.
    pub col_sample_by_level: f64,
    /// Base random seed.
    pub seed: u64,

    // --- Runtime ---
    /// Checkpoint every this many levels; `<= 0` disables checkpointing.
    pub checkpoint_interval: i32,
    /// Levels in the split-reduction tree.
    pub aggregation_depth: u32,
    /// Number of shuffle partitions.
    pub parallelism: usize,
    /// Worker threads: `0` = ambient rayon pool, `1` = sequential.
    pub n_threads: usize,

    // --- Logging ---
    pub verbosity: Verbosity,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            max_leaves: 64,
            min_node_hess: 1.0,
            reg_lambda: 1.0,
            min_gain: 0.0,
            col_sample_by_level: 1.0,
            seed: 42,
            checkpoint_interval: 10,
            aggregation_depth: 2,
            parallelism: 4,
            n_threads: 0,
            verbosity: Verbosity::default(),
        }
    }
}

impl BoostConfig {
    /// Validate every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 || self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(ConfigError::InvalidMaxDepth {
                got: self.max_depth,
                max: MAX_SUPPORTED_DEPTH,
            });
        }
        if self.max_leaves < 2 {
            return Err(ConfigError::InvalidMaxLeaves(self.max_leaves));
        }
        if !self.min_node_hess.is_finite() || self.min_node_hess < 0.0 {
            return Err(ConfigError::InvalidMinNodeHess(self.min_node_hess));
        }
        if !self.reg_lambda.is_finite() || self.reg_lambda < 0.0 {
            return Err(ConfigError::InvalidLambda(self.reg_lambda));
        }
        if !self.min_gain.is_finite() || self.min_gain < 0.0 {
            return Err(ConfigError::InvalidMinGain(self.min_gain));
        }
        if !(self.col_sample_by_level > 0.0 && self.col_sample_by_level <= 1.0) {
            return Err(ConfigError::InvalidColSampleByLevel(self.col_sample_by_level));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::InvalidParallelism);
        }
        if self.aggregation_depth == 0 {
            return Err(ConfigError::InvalidAggregationDepth);
        }
        Ok(())
    }

    /// Gain parameters for the default split evaluator.
    pub fn gain_params(&self) -> GainParams {
        GainParams {
            reg_lambda: self.reg_lambda,
            min_gain: self.min_gain,
            min_child_weight: self.min_node_hess,
        }
    }
}

// =============================================================================
// TreeConfig
// =============================================================================

/// Per-tree inputs from the boosting loop.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Index of this tree in the ensemble (seeds level sampling).
    pub tree_index: u32,
    /// Number of binned feature columns.
    pub num_cols: u32,
    /// Output feature id for each binned column.
    pub feature_remap: Vec<u32>,
    /// Categorical flag per column; empty means all ordered.
    pub categorical: Vec<bool>,
}

impl TreeConfig {
    /// Config with an identity column remap and only ordered features.
    pub fn identity(tree_index: u32, num_cols: u32) -> Self {
        Self {
            tree_index,
            num_cols,
            feature_remap: (0..num_cols).collect(),
            categorical: Vec::new(),
        }
    }

    /// Builder: mark columns as categorical.
    pub fn with_categorical(mut self, categorical: Vec<bool>) -> Self {
        self.categorical = categorical;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feature_remap.len() < self.num_cols as usize {
            return Err(ConfigError::ShortFeatureRemap {
                got: self.feature_remap.len(),
                num_cols: self.num_cols,
            });
        }
        if !self.categorical.is_empty() && self.categorical.len() != self.num_cols as usize {
            return Err(ConfigError::CategoricalLenMismatch {
                got: self.categorical.len(),
                num_cols: self.num_cols,
            });
        }
        Ok(())
    }
}
