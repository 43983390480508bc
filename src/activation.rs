//! Activation functions.
//!
//! A linear model computes the linear combination `z = X W` (one value per row) and
//! then applies an activation element-wise: `yhat = activation(z)`. The transform runs
//! in place on the `(rows,)` column produced by the multiply.

use ndarray::Array1;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq)]
/// Element-wise activation function.
pub enum Activation {
    /// `f(x) = x`.
    Identity,
    /// `f(x) = 1 / (1 + e^-x)`, clamped to `[0, 1]`.
    Sigmoid,
    /// Sigmoid followed by a cutoff: `1.0` when `sigmoid(x) >= threshold`, else `0.0`.
    HardSigmoid { threshold: f32 },
}

impl Activation {
    /// Validate activation parameters.
    pub fn validate(self) -> Result<()> {
        match self {
            Activation::HardSigmoid { threshold } => {
                if !(threshold.is_finite() && threshold > 0.0 && threshold < 1.0) {
                    return Err(Error::InvalidConfig(format!(
                        "hard sigmoid threshold must be finite and in (0, 1), got {threshold}"
                    )));
                }
            }
            Activation::Identity | Activation::Sigmoid => {}
        }

        Ok(())
    }

    /// Transform the linear combination in place.
    pub fn apply(self, z: &mut Array1<f32>) {
        match self {
            Activation::Identity => {}
            Activation::Sigmoid => z.mapv_inplace(sigmoid),
            Activation::HardSigmoid { threshold } => z.mapv_inplace(|x| {
                if sigmoid(x) >= threshold { 1.0 } else { 0.0 }
            }),
        }
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    // Numerically stable sigmoid.
    let s = if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    };
    s.clamp(0.0, 1.0)
}
