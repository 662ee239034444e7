//! Map-reduce style worker-pool primitives.
//!
//! - [`Partitioned`]: partitioned dataset with keyed shuffles
//! - [`Partitioner`], [`HashPartitioner`]: key routing
//! - [`Parallelism`]: worker pool selection

mod parallelism;
mod partitioned;
mod partitioner;

pub use parallelism::Parallelism;
pub use partitioned::Partitioned;
pub use partitioner::{HashPartitioner, Partitioner};
