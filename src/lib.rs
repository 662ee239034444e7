//! distboost: level-wise, histogram-based tree induction for gradient boosting
//! over partitioned, pre-binned training data.
//!
//! One call to [`train`] grows one tree of the ensemble: instances are routed
//! to leaves level by level, per-leaf feature histograms are aggregated (left
//! children by subtraction from their parent), the best split per leaf is
//! found, and the finished growth tree is compiled into a [`CompiledTree`].

pub mod data;
pub mod runtime;
pub mod training;

pub use data::{BinVector, Instance, InstanceStore};
pub use training::gbdt::{CompiledNode, CompiledTree, SplitCandidate, SplitKind};
pub use training::{train, train_with, BoostConfig, TrainError, TreeConfig, Verbosity};
