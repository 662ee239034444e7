//! Verbosity-gated training output.
//!
//! [`TrainingLogger`] filters by the configured [`Verbosity`] and forwards to
//! the `log` facade, so the host application picks the sink (env_logger,
//! tracing-log, ...). With `Verbosity::Silent` nothing reaches `log` at all.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How much the grower reports while building a tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Errors and warnings only.
    Warning,
    /// Stop reasons and tree summaries.
    Info,
    /// Per-level frontier and histogram statistics.
    Debug,
}

/// Logger handed to the tree grower.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrainingLogger {
    verbosity: Verbosity,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    #[inline]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Whether messages at `level` are emitted.
    #[inline]
    pub fn enabled(&self, level: Verbosity) -> bool {
        level != Verbosity::Silent && self.verbosity >= level
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        if self.enabled(Verbosity::Warning) {
            log::warn!("{args}");
        }
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        if self.enabled(Verbosity::Info) {
            log::info!("{args}");
        }
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        if self.enabled(Verbosity::Debug) {
            log::debug!("{args}");
        }
    }
}
