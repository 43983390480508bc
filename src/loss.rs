//! Loss functions.
//!
//! A loss reduces `(Y, Yhat)` (both `(rows,)`) to a single scalar summed over rows,
//! then adds the model's regularization penalty when one is bound. Losses are pure
//! reductions: neither input is modified.
//!
//! Each loss has a matching [`crate::LossGradient`]; see [`Loss::gradient`].

use ndarray::ArrayView1;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{LinearModel, LossGradient};

/// Lower/upper clamp applied to predictions before taking logarithms.
pub(crate) const CROSS_ENTROPY_CLAMP: (f32, f32) = (0.01, 0.99);

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Supported loss functions.
pub enum Loss {
    /// `sum((y - yhat)^2)`
    Squared,
    /// `sum(-y ln(yhat) - (1 - y) ln(1 - yhat))`, with `yhat` clamped to `[0.01, 0.99]`.
    CrossEntropy,
    /// `sum(|y - yhat|)`
    Absolute,
    /// `sum(max(0, 1 - y * yhat))` with labels mapped `y > 0 -> 1`, otherwise `-1`.
    Hinge,
    /// Quadratic for `|y - yhat| <= delta`, linear beyond. `delta` comes from
    /// [`crate::ModelConfig::huber_delta`].
    Huber,
}

impl Loss {
    /// Compute the loss value, including the model's regularization penalty.
    ///
    /// Shape contract: `y.len() == yhat.len()`.
    pub fn compute(
        self,
        y: ArrayView1<'_, f32>,
        yhat: ArrayView1<'_, f32>,
        model: &LinearModel,
    ) -> f32 {
        assert_eq!(
            y.len(),
            yhat.len(),
            "y len {} does not match yhat len {}",
            y.len(),
            yhat.len()
        );

        let data_loss: f32 = match self {
            Loss::Squared => sum_pairs(y, yhat, squared),
            Loss::CrossEntropy => sum_pairs(y, yhat, cross_entropy),
            Loss::Absolute => sum_pairs(y, yhat, |t, p| (t - p).abs()),
            Loss::Hinge => sum_pairs(y, yhat, hinge),
            Loss::Huber => {
                let delta = model.config().huber_delta;
                sum_pairs(y, yhat, |t, p| huber(t - p, delta))
            }
        };

        data_loss + model.penalty()
    }

    /// The gradient variant matching this loss.
    #[inline]
    pub fn gradient(self) -> LossGradient {
        match self {
            Loss::Squared => LossGradient::Squared,
            Loss::CrossEntropy => LossGradient::CrossEntropy,
            Loss::Absolute => LossGradient::Absolute,
            Loss::Hinge => LossGradient::Hinge,
            Loss::Huber => LossGradient::Huber,
        }
    }
}

#[inline]
fn sum_pairs(
    y: ArrayView1<'_, f32>,
    yhat: ArrayView1<'_, f32>,
    f: impl Fn(f32, f32) -> f32,
) -> f32 {
    y.iter().zip(yhat.iter()).map(|(&t, &p)| f(t, p)).sum()
}

#[inline]
fn squared(y: f32, yhat: f32) -> f32 {
    let diff = y - yhat;
    diff * diff
}

#[inline]
fn cross_entropy(y: f32, yhat: f32) -> f32 {
    let (lo, hi) = CROSS_ENTROPY_CLAMP;
    let p = yhat.clamp(lo, hi);
    -y * p.ln() - (1.0 - y) * (1.0 - p).ln()
}

#[inline]
pub(crate) fn hinge_label(y: f32) -> f32 {
    if y > 0.0 { 1.0 } else { -1.0 }
}

#[inline]
fn hinge(y: f32, yhat: f32) -> f32 {
    (1.0 - hinge_label(y) * yhat).max(0.0)
}

#[inline]
fn huber(diff: f32, delta: f32) -> f32 {
    let abs = diff.abs();
    if abs <= delta {
        0.5 * diff * diff
    } else {
        delta * (abs - 0.5 * delta)
    }
}
