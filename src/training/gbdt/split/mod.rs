//! Split search.
//!
//! - [`SplitCandidate`], [`SplitKind`]: the split chosen for one node
//! - [`SplitEvaluator`]: maps a feature histogram to its best candidate
//! - [`GreedySplitEvaluator`], [`GainParams`]: default XGBoost-style search
//! - [`find_splits`]: per-level search with column subsampling and a
//!   depth-bounded merge of partition-local winners

mod candidate;
mod evaluator;
mod finder;
mod gain;

pub use candidate::{SplitCandidate, SplitKind};
pub(crate) use candidate::goes_left;
pub use evaluator::{GreedySplitEvaluator, SplitEvaluator};
pub use finder::{find_splits, level_seed, SplitFinderParams, SplitSearch};
pub use gain::GainParams;
