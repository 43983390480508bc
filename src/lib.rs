//! Linear models trained by gradient descent.
//!
//! `rust-linear` fits a weight vector `W` so that `activation(X W)` approximates the
//! targets `Y`. The model is a strategy container: activation, loss, loss gradient and
//! (optionally) regularization are chosen per model and swapped freely between fits.
//! On top of the binary model, [`OneVsRest`] builds a pairwise multiclass ensemble
//! with class weights and majority voting.
//!
//! # Training
//!
//! - Three sampling modes ([`OptimizationMode`]): full batch, mini-batch, single sample.
//! - Early stopping once the loss stagnates ([`EarlyStopping`]).
//! - Divergence abort when the loss grows past 10x its initial value.
//! - A bias column is prepended internally; callers always pass raw features.
//!
//! Divergence and non-convergence are reported in [`FitReport`] and logged with
//! `tracing`; they are not errors.
//!
//! # Panics vs `Result`
//!
//! - Low-level strategy functions ([`Loss::compute`], [`LossGradient::compute`],
//!   [`Activation::apply`]) take already-validated inputs and panic via `assert!` on
//!   shape mismatches.
//! - [`LinearModel::fit`], [`LinearModel::predict`], [`OneVsRest`] and the metrics
//!   validate their inputs and return [`Result`].
//!
//! # Data layout
//!
//! - Scalars are `f32`.
//! - Features are `(rows, cols)` [`ndarray`] matrices, targets and predictions are
//!   `(rows,)` columns.
//! - Fitted weights have length `cols + 1`, bias first.
//!
//! # Quick start
//!
//! ```rust
//! use ndarray::array;
//! use rust_linear::{Activation, LinearModel, Loss};
//!
//! # fn main() -> rust_linear::Result<()> {
//! let x = array![[0.0_f32], [1.0], [2.0], [3.0]];
//! let y = array![1.0_f32, 3.0, 5.0, 7.0];
//!
//! let mut model = LinearModel::new();
//! model
//!     .set_activation(Activation::Identity)
//!     .set_objective(Loss::Squared)
//!     .set_learning_rate(0.05)
//!     .set_iterations(2_000)
//!     .set_seed(Some(0));
//!
//! let report = model.fit(x.view(), y.view())?;
//! assert!(!report.diverged());
//!
//! let yhat = model.predict(x.view())?;
//! assert_eq!(yhat.len(), 4);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod config;
pub mod data;
pub mod early_stop;
pub mod error;
pub mod gradient;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod ovr;
pub mod regularization;
pub mod sampling;
pub mod train;

pub use activation::Activation;
pub use config::{ModelConfig, OptimizationMode, RegularizationParams};
pub use data::{Dataset, add_bias, add_bias_in_place};
pub use early_stop::EarlyStopping;
pub use error::{Binding, Error, Result};
pub use gradient::LossGradient;
pub use loss::Loss;
pub use metrics::{ConfusionMatrix, Metric, confusion_matrix, mae, mse, weighted_f1};
pub use model::LinearModel;
pub use ovr::{OneVsRest, class_pairs, majority_vote};
pub use regularization::{Regularization, RegularizationGradient};
pub use sampling::RowSampler;
pub use train::{Checkpoint, FitOutcome, FitReport};
