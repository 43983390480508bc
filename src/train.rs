//! Training and prediction for [`LinearModel`].
//!
//! `fit` runs plain gradient descent on the bound loss:
//!
//! 1. draw this iteration's rows (see [`RowSampler`])
//! 2. `yhat = activation(X_subset * W)`
//! 3. compute the loss, feed it to [`EarlyStopping`]; stop without updating when
//!    patience runs out
//! 4. at each of ~10 checkpoints, abort if the loss exceeds 10x its initial value
//! 5. `W -= learning_rate * gradient(Y_subset, yhat, X_subset)`
//!
//! Every call to `fit` draws fresh weights in `[-1, 1]`; previous weights are discarded.

use ndarray::{Array1, ArrayView1, ArrayView2, ArrayViewMut1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::data::{add_bias, validate_xy};
use crate::{Dataset, EarlyStopping, Error, LinearModel, Result, RowSampler};

/// Loss above this multiple of the initial loss counts as divergence.
const DIVERGENCE_FACTOR: f32 = 10.0;

/// How a call to `fit` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    /// The full iteration budget was used.
    Completed,
    /// Loss stagnated for the patience window; stopped before updating at `iteration`.
    EarlyStopped { iteration: usize },
    /// Loss blew up; training aborted at `iteration` and the weights are left as they were.
    Diverged { iteration: usize },
}

/// Loss recorded at a logging checkpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    pub iteration: usize,
    pub loss: f32,
}

#[derive(Debug, Clone)]
pub struct FitReport {
    pub outcome: FitOutcome,
    /// Iterations whose loss was evaluated.
    pub iterations: usize,
    /// Loss of the last evaluated iteration.
    pub final_loss: f32,
    pub checkpoints: Vec<Checkpoint>,
    /// Rows seen per iteration after resolving the optimization mode.
    pub rows_per_iteration: usize,
    /// Patience window after resolving defaults.
    pub early_stop_iterations: usize,
    /// The budget ran out while early stopping was enabled, so the weights may not be
    /// at a minimum.
    pub may_not_have_converged: bool,
}

impl FitReport {
    #[inline]
    pub fn diverged(&self) -> bool {
        matches!(self.outcome, FitOutcome::Diverged { .. })
    }

    #[inline]
    pub fn stopped_early(&self) -> bool {
        matches!(self.outcome, FitOutcome::EarlyStopped { .. })
    }
}

impl LinearModel {
    /// Train on features `x` `(rows, cols)` and targets `y` `(rows,)`.
    ///
    /// A bias column is prepended internally; `x` is not modified. Divergence and
    /// non-convergence are reported through [`FitReport`], not as errors.
    pub fn fit(&mut self, x: ArrayView2<'_, f32>, y: ArrayView1<'_, f32>) -> Result<FitReport> {
        self.check_bindings()?;
        validate_xy(x, y)?;

        let x = add_bias(x);
        self.fit_augmented(x.view(), y)
    }

    /// [`LinearModel::fit`] on a [`Dataset`]'s features and labels.
    pub fn fit_dataset(&mut self, data: &Dataset) -> Result<FitReport> {
        self.fit(data.features(), data.labels())
    }

    /// `fit` on features that already carry the bias column.
    pub(crate) fn fit_augmented(
        &mut self,
        x: ArrayView2<'_, f32>,
        y: ArrayView1<'_, f32>,
    ) -> Result<FitReport> {
        let bound = self.check_bindings()?;
        let cfg = self.config.clone();
        let (n_rows, n_cols) = x.dim();
        if n_rows == 0 {
            return Err(Error::InvalidData("no training rows".to_owned()));
        }
        if n_rows != y.len() {
            return Err(Error::InvalidShape(format!(
                "X has {n_rows} rows but Y has {}",
                y.len()
            )));
        }

        let sampler = RowSampler::for_config(&cfg, n_rows)?;
        let rows_per_iteration = sampler.rows_per_iteration(n_rows);
        let patience = cfg.resolved_early_stop_iterations();
        let interval = cfg.checkpoint_interval();

        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.weights = Some(Array1::from_shape_fn(n_cols, |_| rng.gen_range(-1.0..=1.0)));

        debug!(
            rows = n_rows,
            cols = n_cols,
            mode = ?cfg.mode,
            rows_per_iteration,
            n_iterations = cfg.n_iterations,
            "starting fit"
        );

        let mut stopper = EarlyStopping::new(patience, cfg.early_stop_threshold);
        let mut gradient = Array1::<f32>::zeros(n_cols);
        let mut checkpoints = Vec::with_capacity(11);
        let mut initial_loss = 0.0_f32;
        let mut final_loss = f32::NAN;
        let mut iterations = 0;
        let mut outcome = FitOutcome::Completed;

        for iter in 0..cfg.n_iterations {
            let (xs, ys) = sampler.draw(x.view(), y.view(), &mut rng);

            let mut yhat = xs.dot(self.fitted_weights()?);
            bound.activation.apply(&mut yhat);

            let loss = bound.loss.compute(ys.view(), yhat.view(), self);
            iterations = iter + 1;
            final_loss = loss;

            if stopper.should_stop(loss) {
                info!(
                    iteration = iter,
                    "no improvement in loss after {patience} consecutive iterations, stopped early"
                );
                outcome = FitOutcome::EarlyStopped { iteration: iter };
                break;
            }

            if !loss.is_finite() {
                warn!(iteration = iter, "loss is not finite, consider lowering the learning rate");
                outcome = FitOutcome::Diverged { iteration: iter };
                break;
            }

            if iter % interval == 0 {
                checkpoints.push(Checkpoint {
                    iteration: iter,
                    loss,
                });
                if iter == 0 {
                    initial_loss = loss;
                } else if loss > DIVERGENCE_FACTOR * initial_loss {
                    warn!(
                        iteration = iter,
                        loss,
                        initial_loss,
                        "loss blew up, consider lowering the learning rate"
                    );
                    outcome = FitOutcome::Diverged { iteration: iter };
                    break;
                }
                debug!(iteration = iter, loss, "checkpoint");
            }

            bound
                .loss_gradient
                .compute(ys.view(), yhat.view(), xs.view(), self, gradient.view_mut());
            if let Some(w) = self.weights.as_mut() {
                w.scaled_add(-cfg.learning_rate, &gradient);
            }
        }

        let may_not_have_converged =
            outcome == FitOutcome::Completed && patience < cfg.n_iterations;
        if may_not_have_converged {
            warn!(
                final_loss,
                "model may not have converged, consider increasing iterations or learning rate"
            );
        }

        Ok(FitReport {
            outcome,
            iterations,
            final_loss,
            checkpoints,
            rows_per_iteration,
            early_stop_iterations: patience,
            may_not_have_converged,
        })
    }

    /// Predict targets for raw features `x` `(rows, cols)`.
    ///
    /// Returns a freshly allocated `(rows,)` column.
    pub fn predict(&self, x: ArrayView2<'_, f32>) -> Result<Array1<f32>> {
        let mut out = Array1::zeros(x.nrows());
        self.predict_into(x, out.view_mut())?;
        Ok(out)
    }

    /// Shape-checked, in-place prediction into a pre-sized `(rows,)` buffer.
    pub fn predict_into(
        &self,
        x: ArrayView2<'_, f32>,
        mut out: ArrayViewMut1<'_, f32>,
    ) -> Result<()> {
        let bound = self.check_bindings()?;
        let weights = self.fitted_weights()?;
        if x.ncols() + 1 != weights.len() {
            return Err(Error::InvalidShape(format!(
                "X has {} columns but the model was fitted on {}",
                x.ncols(),
                weights.len() - 1
            )));
        }
        if out.len() != x.nrows() {
            return Err(Error::InvalidShape(format!(
                "output len {} does not match X rows {}",
                out.len(),
                x.nrows()
            )));
        }

        let mut yhat = add_bias(x).dot(weights);
        bound.activation.apply(&mut yhat);
        out.assign(&yhat);
        Ok(())
    }

    /// Predict on features that already carry the bias column.
    pub(crate) fn predict_augmented(&self, x: ArrayView2<'_, f32>) -> Result<Array1<f32>> {
        let bound = self.check_bindings()?;
        let weights = self.fitted_weights()?;
        if x.ncols() != weights.len() {
            return Err(Error::InvalidShape(format!(
                "X has {} columns (with bias) but the model has {} weights",
                x.ncols(),
                weights.len()
            )));
        }

        let mut yhat = x.dot(weights);
        bound.activation.apply(&mut yhat);
        Ok(yhat)
    }

    #[inline]
    fn fitted_weights(&self) -> Result<&Array1<f32>> {
        self.weights.as_ref().ok_or(Error::NotFitted)
    }
}
