//! Training of a single boosted tree.
//!
//! - [`train`] / [`train_with`]: grow and compile one tree
//! - [`BoostConfig`], [`TreeConfig`]: ensemble-wide and per-tree settings
//! - [`Checkpointer`], [`PeriodicCheckpointer`]: bounded recomputation of per-level state
//! - [`TrainingLogger`]: verbosity-gated logging over the `log` facade
//! - [`gbdt`]: the level-wise tree induction itself

mod checkpoint;
mod config;
pub mod gbdt;
mod logger;
mod trainer;

pub use checkpoint::{Checkpointer, PeriodicCheckpointer};
pub use config::{BoostConfig, ConfigError, TreeConfig};
pub use logger::{TrainingLogger, Verbosity};
pub use trainer::{train, train_with, TrainError};
