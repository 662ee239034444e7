//! Periodic checkpointing of per-level state.
//!
//! Every level produces a fresh node assignment and histogram set derived
//! from the previous level's. A [`Checkpointer`] receives each new version so
//! that a failed level can be recomputed from a recent snapshot instead of
//! from the root.
//!
//! # Example
//!
//! ```
//! use distboost::training::{Checkpointer, PeriodicCheckpointer};
//!
//! let mut ckpt = PeriodicCheckpointer::new(2);
//! for level in 0..5u32 {
//!     ckpt.update(&vec![level; 3]);
//! }
//! // Updates 2 and 4 were checkpointed; the last two are retained.
//! assert_eq!(ckpt.total_checkpoints(), 2);
//! assert_eq!(ckpt.latest_checkpoint(), Some(&vec![3, 3, 3]));
//!
//! ckpt.delete_all();
//! ckpt.unpersist();
//! assert_eq!(ckpt.retained_checkpoints(), 0);
//! ```

use std::collections::VecDeque;

/// Receives every new version of a dataset.
pub trait Checkpointer<D> {
    /// Register the newest version of the dataset.
    fn update(&mut self, data: &D);

    /// Delete all retained checkpoints.
    fn delete_all(&mut self);

    /// Release the newest version.
    fn unpersist(&mut self);
}

/// Number of checkpoints kept; older ones are dropped.
const RETAINED: usize = 2;

/// Snapshots every `interval`-th update and keeps the last two snapshots.
///
/// With `interval <= 0` nothing is ever snapshotted; updates are only
/// counted and marked persisted.
#[derive(Clone, Debug)]
pub struct PeriodicCheckpointer<D> {
    interval: i32,
    updates: u64,
    persisted: bool,
    checkpoints: VecDeque<(u64, D)>,
    total_checkpoints: u64,
}

impl<D: Clone> PeriodicCheckpointer<D> {
    pub fn new(interval: i32) -> Self {
        Self {
            interval,
            updates: 0,
            persisted: false,
            checkpoints: VecDeque::with_capacity(RETAINED + 1),
            total_checkpoints: 0,
        }
    }

    /// Number of updates seen.
    #[inline]
    pub fn num_updates(&self) -> u64 {
        self.updates
    }

    /// Whether the newest version is still held.
    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Snapshots taken so far, including dropped ones.
    #[inline]
    pub fn total_checkpoints(&self) -> u64 {
        self.total_checkpoints
    }

    /// Snapshots currently held.
    #[inline]
    pub fn retained_checkpoints(&self) -> usize {
        self.checkpoints.len()
    }

    /// Most recent snapshot.
    pub fn latest_checkpoint(&self) -> Option<&D> {
        self.checkpoints.back().map(|(_, data)| data)
    }
}

impl<D: Clone> Checkpointer<D> for PeriodicCheckpointer<D> {
    fn update(&mut self, data: &D) {
        self.updates += 1;
        self.persisted = true;

        if self.interval > 0 && self.updates % self.interval as u64 == 0 {
            self.checkpoints.push_back((self.updates, data.clone()));
            self.total_checkpoints += 1;
            while self.checkpoints.len() > RETAINED {
                self.checkpoints.pop_front();
            }
        }
    }

    fn delete_all(&mut self) {
        self.checkpoints.clear();
    }

    fn unpersist(&mut self) {
        self.persisted = false;
    }
}
