//! Loss gradients with respect to the weights.
//!
//! Every gradient has the form `X^T * residual / rows` for a per-row residual derived
//! from its loss. Dividing by the row count keeps the step size independent of how
//! many rows an iteration sees, so full-batch, mini-batch and single-sample training
//! share these functions unchanged.
//!
//! When regularization is bound, its scalar gradient is added to every residual before
//! the contraction.

use ndarray::{Array1, ArrayView1, ArrayView2, ArrayViewMut1};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::LinearModel;
use crate::loss::hinge_label;

/// `|y - yhat|` below this is treated as an exact fit by the absolute gradient.
const ABSOLUTE_EPS: f32 = 1e-6;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Gradient of a [`crate::Loss`] with respect to the weight vector.
pub enum LossGradient {
    /// residual `-2 (y - yhat)`
    Squared,
    /// residual `yhat - y`, scaled by the class weight inside a weighted ensemble
    CrossEntropy,
    /// residual `-sign(y - yhat)`
    Absolute,
    /// residual of the quadratically smoothed hinge
    Hinge,
    /// residual `-(y - yhat)` inside `delta`, `-delta * sign(y - yhat)` outside
    Huber,
}

impl LossGradient {
    /// Write the gradient into `out`.
    ///
    /// Overwrite semantics: `out` is fully replaced, never accumulated into.
    ///
    /// Shape contract:
    /// - `y.len() == yhat.len() == x.nrows()`
    /// - `out.len() == x.ncols()`
    pub fn compute(
        self,
        y: ArrayView1<'_, f32>,
        yhat: ArrayView1<'_, f32>,
        x: ArrayView2<'_, f32>,
        model: &LinearModel,
        mut out: ArrayViewMut1<'_, f32>,
    ) {
        assert_eq!(
            y.len(),
            yhat.len(),
            "y len {} does not match yhat len {}",
            y.len(),
            yhat.len()
        );
        assert_eq!(
            y.len(),
            x.nrows(),
            "y len {} does not match x rows {}",
            y.len(),
            x.nrows()
        );
        assert_eq!(
            out.len(),
            x.ncols(),
            "gradient len {} does not match x cols {}",
            out.len(),
            x.ncols()
        );

        let mut residual = self.residual(y, yhat, model);

        let reg = model.penalty_gradient();
        if reg != 0.0 {
            residual += reg;
        }

        let rows = x.nrows() as f32;
        out.assign(&x.t().dot(&residual));
        out /= rows;
    }

    fn residual(
        self,
        y: ArrayView1<'_, f32>,
        yhat: ArrayView1<'_, f32>,
        model: &LinearModel,
    ) -> Array1<f32> {
        match self {
            LossGradient::Squared => map_pairs(y, yhat, |t, p| -2.0 * (t - p)),
            LossGradient::CrossEntropy => map_pairs(y, yhat, |t, p| {
                let r = p - t;
                match model.class_weight_for(t) {
                    Some(w) => r * w,
                    None => r,
                }
            }),
            LossGradient::Absolute => map_pairs(y, yhat, |t, p| {
                let diff = t - p;
                if diff.abs() < ABSOLUTE_EPS {
                    0.0
                } else {
                    -diff.signum()
                }
            }),
            LossGradient::Hinge => map_pairs(y, yhat, |t, p| {
                let label = hinge_label(t);
                let margin = label * p;
                if margin >= 1.0 {
                    0.0
                } else if margin <= 0.0 {
                    -label
                } else {
                    -(1.0 - margin) * label
                }
            }),
            LossGradient::Huber => {
                let delta = model.config().huber_delta;
                map_pairs(y, yhat, |t, p| {
                    let diff = t - p;
                    if diff.abs() <= delta {
                        -diff
                    } else {
                        -delta * diff.signum()
                    }
                })
            }
        }
    }
}

#[inline]
fn map_pairs(
    y: ArrayView1<'_, f32>,
    yhat: ArrayView1<'_, f32>,
    f: impl Fn(f32, f32) -> f32,
) -> Array1<f32> {
    y.iter().zip(yhat.iter()).map(|(&t, &p)| f(t, p)).collect()
}
