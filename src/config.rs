//! Training configuration.
//!
//! A [`ModelConfig`] is plain data: build it with struct syntax and
//! `..Default::default()`, or through the setters on [`crate::LinearModel`] and
//! [`crate::OneVsRest`]. Zero-valued `batch_size` / `early_stop_iterations` mean
//! "derive from the data"; those defaults are resolved at fit time and never written
//! back into the config.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which rows each training iteration looks at.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationMode {
    /// Every iteration uses the entire training set.
    #[default]
    Full,
    /// Every iteration draws `batch_size` rows without replacement.
    MiniBatch,
    /// Every iteration draws a single random row.
    SingleSample,
}

/// Coefficients shared by the regularization penalty and its gradient.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegularizationParams {
    /// Penalty strength.
    pub lambda: f32,
    /// Exponent used by the `Ln` variants.
    pub power: f32,
}

impl Default for RegularizationParams {
    fn default() -> Self {
        Self {
            lambda: 0.0,
            power: 2.0,
        }
    }
}

/// Configuration for a single [`crate::LinearModel`].
///
/// ```rust
/// use rust_linear::{ModelConfig, OptimizationMode};
///
/// let config = ModelConfig {
///     n_iterations: 5_000,
///     learning_rate: 0.05,
///     mode: OptimizationMode::MiniBatch,
///     seed: Some(7),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Iteration budget.
    pub n_iterations: usize,
    pub learning_rate: f32,
    /// Loss changes smaller than this count toward early stopping.
    pub early_stop_threshold: f32,
    /// Patience window; `0` means 10% of `n_iterations`.
    pub early_stop_iterations: usize,
    pub mode: OptimizationMode,
    /// Rows per mini-batch; `0` means 25% of the training rows.
    pub batch_size: usize,
    pub regularization_params: RegularizationParams,
    /// Threshold between the quadratic and linear regimes of the Huber loss.
    pub huber_delta: f32,
    /// Seed for weight initialization and row sampling. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Per-class weights used by the cross-entropy gradient. Shared across an ensemble.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub class_weights: Option<Arc<[f32]>>,
    /// Raw class labels `(a, b)` this model separates inside an ensemble.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub class_pair: Option<[usize; 2]>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_iterations: 1_000,
            learning_rate: 1e-2,
            early_stop_threshold: 1e-4,
            early_stop_iterations: 0,
            mode: OptimizationMode::Full,
            batch_size: 0,
            regularization_params: RegularizationParams::default(),
            huber_delta: 1.0,
            seed: None,
            class_weights: None,
            class_pair: None,
        }
    }
}

impl ModelConfig {
    /// Validate configuration values that do not depend on the data.
    pub fn validate(&self) -> Result<()> {
        if self.n_iterations == 0 {
            return Err(Error::InvalidConfig("n_iterations must be > 0".to_owned()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if !(self.early_stop_threshold.is_finite() && self.early_stop_threshold >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "early_stop_threshold must be finite and >= 0, got {}",
                self.early_stop_threshold
            )));
        }
        if !(self.huber_delta.is_finite() && self.huber_delta > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "huber_delta must be finite and > 0, got {}",
                self.huber_delta
            )));
        }

        let RegularizationParams { lambda, power } = self.regularization_params;
        if !(lambda.is_finite() && lambda >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "regularization lambda must be finite and >= 0, got {lambda}"
            )));
        }
        if !power.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "regularization power must be finite, got {power}"
            )));
        }

        if let Some(weights) = &self.class_weights {
            validate_class_weights(weights)?;
            if let Some([a, b]) = self.class_pair {
                if a.max(b) >= weights.len() {
                    return Err(Error::InvalidConfig(format!(
                        "class pair ({a}, {b}) is out of range for {} class weights",
                        weights.len()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Patience window actually used by `fit`.
    #[inline]
    pub fn resolved_early_stop_iterations(&self) -> usize {
        if self.early_stop_iterations == 0 {
            (self.n_iterations / 10).max(1)
        } else {
            self.early_stop_iterations
        }
    }

    /// Mini-batch size actually used by `fit` for a training set with `n_rows` rows.
    #[inline]
    pub fn resolved_batch_size(&self, n_rows: usize) -> usize {
        if self.batch_size == 0 {
            (n_rows / 4).max(1)
        } else {
            self.batch_size
        }
    }

    /// Distance between logging / divergence checkpoints.
    #[inline]
    pub(crate) fn checkpoint_interval(&self) -> usize {
        (self.n_iterations / 10).max(1)
    }
}

pub(crate) fn validate_class_weights(weights: &[f32]) -> Result<()> {
    for (class, &w) in weights.iter().enumerate() {
        if !(w.is_finite() && w > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "class weight for class {class} must be finite and > 0, got {w}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ModelConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_learning_rate_and_iterations() {
        let cfg = ModelConfig {
            learning_rate: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = ModelConfig {
            learning_rate: f32::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = ModelConfig {
            n_iterations: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_negative_lambda() {
        let cfg = ModelConfig {
            regularization_params: RegularizationParams {
                lambda: -0.5,
                power: 2.0,
            },
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn mini_batch_defaults_to_a_quarter_of_the_rows() {
        let cfg = ModelConfig::default();
        assert_eq!(cfg.resolved_batch_size(40), 10);
        assert_eq!(cfg.resolved_batch_size(3), 1);

        let cfg = ModelConfig {
            batch_size: 7,
            ..Default::default()
        };
        assert_eq!(cfg.resolved_batch_size(40), 7);
    }

    #[test]
    fn patience_defaults_to_a_tenth_of_the_budget() {
        let cfg = ModelConfig {
            n_iterations: 500,
            ..Default::default()
        };
        assert_eq!(cfg.resolved_early_stop_iterations(), 50);

        let tiny = ModelConfig {
            n_iterations: 5,
            ..Default::default()
        };
        assert_eq!(tiny.resolved_early_stop_iterations(), 1);
        assert_eq!(tiny.checkpoint_interval(), 1);
    }

    #[test]
    fn class_pair_must_index_into_class_weights() {
        let cfg = ModelConfig {
            class_weights: Some(Arc::from(vec![1.0_f32, 2.0])),
            class_pair: Some([0, 2]),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_reads_from_partial_json() {
        let cfg: ModelConfig =
            serde_json::from_str(r#"{"n_iterations": 250, "mode": "mini_batch", "seed": 3}"#)
                .unwrap();
        assert_eq!(cfg.n_iterations, 250);
        assert_eq!(cfg.mode, OptimizationMode::MiniBatch);
        assert_eq!(cfg.seed, Some(3));
        assert_eq!(cfg.learning_rate, ModelConfig::default().learning_rate);
    }
}
