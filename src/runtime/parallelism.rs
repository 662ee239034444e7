//! Worker pool sizing.
//!
//! [`Parallelism`] decides which rayon pool the partitioned operations run
//! in. Partition count (the shuffle width) is configured separately: a pool of
//! four threads can process sixteen partitions.

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Worker pool selection for one tree build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Run inside whatever rayon pool the caller is already in.
    #[default]
    Ambient,
    /// Run on a single worker thread.
    Sequential,
    /// Run on a dedicated pool with `n` workers.
    Parallel(usize),
}

impl Parallelism {
    /// Map a thread count to a pool selection.
    ///
    /// - `0` → the ambient (global) rayon pool
    /// - `1` → sequential
    /// - `n > 1` → dedicated pool with `n` threads
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        match n_threads {
            0 => Self::Ambient,
            1 => Self::Sequential,
            n => Self::Parallel(n),
        }
    }

    /// Number of workers this selection will use.
    #[inline]
    pub fn n_threads(self) -> usize {
        match self {
            Self::Ambient => rayon::current_num_threads(),
            Self::Sequential => 1,
            Self::Parallel(n) => n.max(1),
        }
    }

    /// Build the dedicated pool, if this selection needs one.
    pub fn build_pool(self) -> Result<Option<ThreadPool>, ThreadPoolBuildError> {
        match self {
            Self::Ambient => Ok(None),
            Self::Sequential => ThreadPoolBuilder::new().num_threads(1).build().map(Some),
            Self::Parallel(n) => ThreadPoolBuilder::new().num_threads(n.max(1)).build().map(Some),
        }
    }

    /// Run `op` on the selected pool.
    pub fn install<R, F>(self, op: F) -> Result<R, ThreadPoolBuildError>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        Ok(match self.build_pool()? {
            Some(pool) => pool.install(op),
            None => op(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_threads() {
        assert_eq!(Parallelism::from_threads(0), Parallelism::Ambient);
        assert_eq!(Parallelism::from_threads(1), Parallelism::Sequential);
        assert_eq!(Parallelism::from_threads(4), Parallelism::Parallel(4));
    }

    #[test]
    fn test_n_threads() {
        assert_eq!(Parallelism::Sequential.n_threads(), 1);
        assert_eq!(Parallelism::Parallel(3).n_threads(), 3);
        assert_eq!(Parallelism::Parallel(0).n_threads(), 1);
    }

    #[test]
    fn test_install_runs_on_requested_pool() {
        let seen = Parallelism::Sequential
            .install(rayon::current_num_threads)
            .unwrap();
        assert_eq!(seen, 1);

        let seen = Parallelism::Parallel(3)
            .install(rayon::current_num_threads)
            .unwrap();
        assert_eq!(seen, 3);
    }
}
