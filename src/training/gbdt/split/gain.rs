//! Gain computation and regularization parameters.

use serde::{Deserialize, Serialize};

// =============================================================================
// Gain Parameters
// =============================================================================

/// Parameters for split gain and leaf weight computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GainParams {
    /// L2 regularization (lambda).
    pub reg_lambda: f64,
    /// Minimum split gain (gamma), subtracted from every gain.
    pub min_gain: f64,
    /// Minimum sum of hessians per child.
    pub min_child_weight: f64,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            reg_lambda: 1.0,
            min_gain: 0.0,
            min_child_weight: 1.0,
        }
    }
}

impl GainParams {
    /// XGBoost split gain.
    ///
    /// ```text
    /// gain = 0.5 * [G_L²/(H_L + λ) + G_R²/(H_R + λ) - G_P²/(H_P + λ)] - γ
    /// ```
    ///
    /// The parent sums are `G_L + G_R` and `H_L + H_R`.
    #[inline]
    pub fn compute_gain(&self, grad_left: f64, hess_left: f64, grad_right: f64, hess_right: f64) -> f64 {
        let grad_parent = grad_left + grad_right;
        let hess_parent = hess_left + hess_right;
        let gain = 0.5
            * (self.score(grad_left, hess_left) + self.score(grad_right, hess_right)
                - self.score(grad_parent, hess_parent));
        gain - self.min_gain
    }

    /// Whether both children carry enough hessian mass.
    #[inline]
    pub fn is_valid_split(&self, hess_left: f64, hess_right: f64) -> bool {
        let lambda = self.reg_lambda;
        hess_left >= self.min_child_weight
            && hess_right >= self.min_child_weight
            && hess_left + lambda > 0.0
            && hess_right + lambda > 0.0
    }

    /// Newton step `-G / (H + λ)`; zero when the denominator vanishes.
    #[inline]
    pub fn compute_leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f64 {
        let denom = hess_sum + self.reg_lambda;
        if denom > 0.0 {
            -grad_sum / denom
        } else {
            0.0
        }
    }

    #[inline]
    fn score(&self, grad: f64, hess: f64) -> f64 {
        let denom = hess + self.reg_lambda;
        if denom > 0.0 {
            grad * grad / denom
        } else {
            0.0
        }
    }
}
