//! Split candidates produced by a [`SplitEvaluator`](super::SplitEvaluator).

use serde::{Deserialize, Serialize};

use crate::training::gbdt::categorical::CatBitset;

/// Shape of a split.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SplitKind {
    /// Non-missing bins `<= threshold` go left.
    Ordered { threshold: u32 },
    /// Non-missing bins in `left` go left.
    Categorical { left: CatBitset },
}

/// Best split found for one `(node, feature)` histogram.
///
/// `feature` is the column index in the binned store; the model compiler
/// remaps it to the output feature id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitCandidate {
    pub feature: u32,
    pub gain: f64,
    /// Prediction of the new left leaf.
    pub left_weight: f64,
    /// Prediction of the new right leaf.
    pub right_weight: f64,
    /// Where bin 0 (missing / default) goes.
    pub missing_go_left: bool,
    pub kind: SplitKind,
}

impl SplitCandidate {
    pub fn ordered(feature: u32, threshold: u32, missing_go_left: bool, gain: f64, weights: (f64, f64)) -> Self {
        Self {
            feature,
            gain,
            left_weight: weights.0,
            right_weight: weights.1,
            missing_go_left,
            kind: SplitKind::Ordered { threshold },
        }
    }

    pub fn categorical(feature: u32, left: CatBitset, missing_go_left: bool, gain: f64, weights: (f64, f64)) -> Self {
        Self {
            feature,
            gain,
            left_weight: weights.0,
            right_weight: weights.1,
            missing_go_left,
            kind: SplitKind::Categorical { left },
        }
    }

    /// Routing function: whether an instance with `bin` on this feature goes left.
    #[inline]
    pub fn goes_left(&self, bin: u32) -> bool {
        goes_left(&self.kind, self.missing_go_left, bin)
    }

    /// Total order used when reducing candidates: higher gain wins, ties go
    /// to the lower feature id.
    #[inline]
    pub fn beats(&self, other: &SplitCandidate) -> bool {
        self.gain > other.gain || (self.gain == other.gain && self.feature < other.feature)
    }

    /// Keep whichever of `a` and `b` [`beats`](Self::beats) the other.
    #[inline]
    pub fn better(a: SplitCandidate, b: SplitCandidate) -> SplitCandidate {
        if b.beats(&a) {
            b
        } else {
            a
        }
    }
}

/// Shared routing rule for growth-time candidates and compiled nodes.
#[inline]
pub(crate) fn goes_left(kind: &SplitKind, missing_go_left: bool, bin: u32) -> bool {
    if bin == 0 {
        return missing_go_left;
    }
    match kind {
        SplitKind::Ordered { threshold } => bin <= *threshold,
        SplitKind::Categorical { left } => left.contains(bin),
    }
}
