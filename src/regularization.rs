//! Regularization penalties and their gradients.
//!
//! Both the penalty and its gradient reduce the whole weight vector to a single
//! scalar. The gradient scalar is broadcast-added to every per-row residual before the
//! `X^T * residual` contraction, so it is an approximation of the true per-weight
//! L1/L2 gradient, not an exact (sub)gradient.

use ndarray::ArrayView1;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::RegularizationParams;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Regularization penalty added to the loss.
pub enum Regularization {
    /// `lambda * sum(|w_i|)`
    L1,
    /// `lambda * sum(w_i^2)`
    L2,
    /// `lambda * sum(w_i^power)`
    Ln,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Scalar gradient of a regularization penalty.
pub enum RegularizationGradient {
    /// `lambda * sum(sign(w_i))`
    L1,
    /// `2 * lambda * sum(w_i)`
    L2,
    /// `lambda * power * sum(w_i)`
    Ln,
}

impl Regularization {
    pub fn penalty(self, params: &RegularizationParams, weights: ArrayView1<'_, f32>) -> f32 {
        let RegularizationParams { lambda, power } = *params;
        let sum: f32 = match self {
            Regularization::L1 => weights.iter().map(|w| w.abs()).sum(),
            Regularization::L2 => weights.iter().map(|w| w * w).sum(),
            Regularization::Ln => weights.iter().map(|w| w.powf(power)).sum(),
        };
        lambda * sum
    }

    /// The gradient variant matching this penalty.
    #[inline]
    pub fn gradient(self) -> RegularizationGradient {
        match self {
            Regularization::L1 => RegularizationGradient::L1,
            Regularization::L2 => RegularizationGradient::L2,
            Regularization::Ln => RegularizationGradient::Ln,
        }
    }
}

impl RegularizationGradient {
    pub fn gradient(self, params: &RegularizationParams, weights: ArrayView1<'_, f32>) -> f32 {
        let RegularizationParams { lambda, power } = *params;
        match self {
            RegularizationGradient::L1 => {
                let signs: f32 = weights.iter().map(|&w| sign(w)).sum();
                lambda * signs
            }
            RegularizationGradient::L2 => 2.0 * lambda * weights.sum(),
            RegularizationGradient::Ln => lambda * power * weights.sum(),
        }
    }
}

#[inline]
fn sign(w: f32) -> f32 {
    if w > 0.0 {
        1.0
    } else if w < 0.0 {
        -1.0
    } else {
        0.0
    }
}
