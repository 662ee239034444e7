//! Instance Store: the binned training data one tree is grown on.
//!
//! - [`BinVector`]: sparse bin indices per feature column (bin 0 implicit)
//! - [`Instance`]: `(gradient, hessian, features)` triple
//! - [`InstanceStore`]: instances spread across partitions
//!
//! Binning itself happens upstream; this crate only consumes bin indices.

mod instance;
mod store;

pub use instance::{BinVector, Instance};
pub use store::InstanceStore;
