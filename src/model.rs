//! The trainable linear model.
//!
//! A [`LinearModel`] is a strategy container: it owns one [`ModelConfig`], a weight
//! vector, and the interchangeable functions it trains with. Activation, loss and loss
//! gradient must be bound before `fit`/`predict`; regularization is optional but the
//! penalty and its gradient are bound as a pair.
//!
//! Training and prediction live in [`crate::train`].

use ndarray::{Array1, ArrayView1};

use crate::{
    Activation, Binding, Error, Loss, LossGradient, ModelConfig, OptimizationMode, Regularization,
    RegularizationGradient, RegularizationParams, Result,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Bound {
    pub(crate) activation: Activation,
    pub(crate) loss: Loss,
    pub(crate) loss_gradient: LossGradient,
}

#[derive(Debug, Clone, Default)]
pub struct LinearModel {
    pub(crate) config: ModelConfig,
    pub(crate) activation: Option<Activation>,
    pub(crate) loss: Option<Loss>,
    pub(crate) loss_gradient: Option<LossGradient>,
    pub(crate) regularization: Option<Regularization>,
    pub(crate) regularization_gradient: Option<RegularizationGradient>,
    /// Bias-augmented coefficients, `(n_features + 1,)`. `None` until `fit`.
    pub(crate) weights: Option<Array1<f32>>,
}

impl LinearModel {
    /// Create an unfitted model with the default configuration and nothing bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unfitted model with an explicit configuration.
    pub fn with_config(config: ModelConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[inline]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Fitted weights, bias first. `None` before the first `fit`.
    #[inline]
    pub fn weights(&self) -> Option<ArrayView1<'_, f32>> {
        self.weights.as_ref().map(|w| w.view())
    }

    #[inline]
    pub fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }

    #[inline]
    pub fn activation(&self) -> Option<Activation> {
        self.activation
    }

    #[inline]
    pub fn loss(&self) -> Option<Loss> {
        self.loss
    }

    #[inline]
    pub fn loss_gradient(&self) -> Option<LossGradient> {
        self.loss_gradient
    }

    #[inline]
    pub fn regularization(&self) -> Option<Regularization> {
        self.regularization
    }

    #[inline]
    pub fn regularization_gradient(&self) -> Option<RegularizationGradient> {
        self.regularization_gradient
    }

    pub fn set_config(&mut self, config: ModelConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn set_iterations(&mut self, n_iterations: usize) -> &mut Self {
        self.config.n_iterations = n_iterations;
        self
    }

    pub fn set_learning_rate(&mut self, learning_rate: f32) -> &mut Self {
        self.config.learning_rate = learning_rate;
        self
    }

    pub fn set_early_stop_threshold(&mut self, threshold: f32) -> &mut Self {
        self.config.early_stop_threshold = threshold;
        self
    }

    /// Patience window. Setting it to `n_iterations` effectively disables early stopping.
    pub fn set_early_stop_iterations(&mut self, iterations: usize) -> &mut Self {
        self.config.early_stop_iterations = iterations;
        self
    }

    pub fn set_mode(&mut self, mode: OptimizationMode) -> &mut Self {
        self.config.mode = mode;
        self
    }

    pub fn set_batch_size(&mut self, batch_size: usize) -> &mut Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn set_regularization_params(&mut self, params: RegularizationParams) -> &mut Self {
        self.config.regularization_params = params;
        self
    }

    pub fn set_huber_delta(&mut self, delta: f32) -> &mut Self {
        self.config.huber_delta = delta;
        self
    }

    pub fn set_seed(&mut self, seed: Option<u64>) -> &mut Self {
        self.config.seed = seed;
        self
    }

    pub fn set_activation(&mut self, activation: Activation) -> &mut Self {
        self.activation = Some(activation);
        self
    }

    pub fn set_loss(&mut self, loss: Loss) -> &mut Self {
        self.loss = Some(loss);
        self
    }

    pub fn set_loss_gradient(&mut self, loss_gradient: LossGradient) -> &mut Self {
        self.loss_gradient = Some(loss_gradient);
        self
    }

    /// Bind a loss and its matching gradient in one call.
    pub fn set_objective(&mut self, loss: Loss) -> &mut Self {
        self.loss = Some(loss);
        self.loss_gradient = Some(loss.gradient());
        self
    }

    pub fn set_regularization(&mut self, regularization: Regularization) -> &mut Self {
        self.regularization = Some(regularization);
        self
    }

    pub fn set_regularization_gradient(&mut self, gradient: RegularizationGradient) -> &mut Self {
        self.regularization_gradient = Some(gradient);
        self
    }

    /// Bind a regularization penalty and its matching gradient in one call.
    pub fn set_penalty(&mut self, regularization: Regularization) -> &mut Self {
        self.regularization = Some(regularization);
        self.regularization_gradient = Some(regularization.gradient());
        self
    }

    /// Remove any bound regularization (penalty and gradient).
    pub fn clear_regularization(&mut self) -> &mut Self {
        self.regularization = None;
        self.regularization_gradient = None;
        self
    }

    /// Check that every required function is bound and the configuration is valid.
    pub(crate) fn check_bindings(&self) -> Result<Bound> {
        let activation = self
            .activation
            .ok_or(Error::MissingBinding(Binding::Activation))?;
        let loss = self.loss.ok_or(Error::MissingBinding(Binding::Loss))?;
        let loss_gradient = self
            .loss_gradient
            .ok_or(Error::MissingBinding(Binding::LossGradient))?;

        match (self.regularization, self.regularization_gradient) {
            (Some(_), None) => {
                return Err(Error::MissingBinding(Binding::RegularizationGradient));
            }
            (None, Some(_)) => return Err(Error::MissingBinding(Binding::Regularization)),
            _ => {}
        }

        activation.validate()?;
        self.config.validate()?;

        Ok(Bound {
            activation,
            loss,
            loss_gradient,
        })
    }

    /// Regularization penalty over the current weights (`0.0` when unbound or unfitted).
    pub(crate) fn penalty(&self) -> f32 {
        match (self.regularization, &self.weights) {
            (Some(reg), Some(w)) => reg.penalty(&self.config.regularization_params, w.view()),
            _ => 0.0,
        }
    }

    /// Scalar regularization gradient over the current weights (`0.0` when unbound).
    pub(crate) fn penalty_gradient(&self) -> f32 {
        match (self.regularization_gradient, &self.weights) {
            (Some(grad), Some(w)) => grad.gradient(&self.config.regularization_params, w.view()),
            _ => 0.0,
        }
    }

    /// Class weight for a remapped binary label, when this model is part of a weighted
    /// ensemble.
    #[inline]
    pub(crate) fn class_weight_for(&self, label: f32) -> Option<f32> {
        let weights = self.config.class_weights.as_ref()?;
        let pair = self.config.class_pair?;
        let side = if label >= 0.5 { 1 } else { 0 };
        weights.get(pair[side]).copied()
    }

    #[cfg(test)]
    pub(crate) fn with_weights(mut self, weights: Array1<f32>) -> Self {
        self.weights = Some(weights);
        self
    }
}
