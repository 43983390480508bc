//! Pairwise One-vs-Rest ensemble.
//!
//! A `C`-class problem is split into `C(C, 2)` binary problems, one per class pair
//! `(a, b)` with `a < b`, enumerated lexicographically. Each pair trains its own
//! [`LinearModel`] on the rows labelled `a` or `b` (remapped to `0.0` / `1.0`), and
//! prediction is a majority vote over the pairwise winners.
//!
//! Class weights are computed once from label frequency (unless supplied) and shared
//! read-only by every submodel.

use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1};
use tracing::{debug, info};

use crate::config::validate_class_weights;
use crate::data::{add_bias, class_counts, class_indices, filter_pair, validate_xy};
use crate::{
    Activation, Dataset, Error, FitReport, LinearModel, Loss, LossGradient, ModelConfig, OptimizationMode,
    Regularization, RegularizationGradient, RegularizationParams, Result,
};

/// Enumerate every class pair `(a, b)` with `a < b` in lexicographic order.
///
/// ```
/// use rust_linear::class_pairs;
///
/// assert_eq!(class_pairs(3), vec![[0, 1], [0, 2], [1, 2]]);
/// ```
pub fn class_pairs(n_classes: usize) -> Vec<[usize; 2]> {
    (0..n_classes)
        .flat_map(|a| (a + 1..n_classes).map(move |b| [a, b]))
        .collect()
}

/// Label with the most votes; ties go to the lowest class index.
///
/// Votes outside `[0, n_classes)` are ignored.
pub fn majority_vote(votes: &[usize], n_classes: usize) -> usize {
    let mut tally = vec![0usize; n_classes];
    for &v in votes {
        if let Some(t) = tally.get_mut(v) {
            *t += 1;
        }
    }

    let mut best = 0;
    for (class, &count) in tally.iter().enumerate() {
        if count > tally[best] {
            best = class;
        }
    }
    best
}

#[derive(Debug, Clone)]
pub struct OneVsRest {
    n_classes: usize,
    pairs: Vec<[usize; 2]>,
    models: Vec<LinearModel>,
    class_weights: Option<Arc<[f32]>>,
}

impl OneVsRest {
    /// Create an ensemble for `n_classes` classes.
    ///
    /// With `class_weights = None`, weights are derived from the first training set as
    /// `N / (n_classes * count[c])`.
    pub fn new(n_classes: usize, class_weights: Option<Vec<f32>>) -> Result<Self> {
        if n_classes < 2 {
            return Err(Error::InvalidConfig(format!(
                "one-vs-rest needs at least 2 classes, got {n_classes}"
            )));
        }
        let class_weights = match class_weights {
            Some(w) => {
                if w.len() != n_classes {
                    return Err(Error::InvalidConfig(format!(
                        "expected {n_classes} class weights, got {}",
                        w.len()
                    )));
                }
                validate_class_weights(&w)?;
                Some(Arc::from(w))
            }
            None => None,
        };

        let pairs = class_pairs(n_classes);
        let models = vec![LinearModel::new(); pairs.len()];
        Ok(Self {
            n_classes,
            pairs,
            models,
            class_weights,
        })
    }

    #[inline]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Number of pairwise submodels, `n_classes * (n_classes - 1) / 2`.
    #[inline]
    pub fn n_models(&self) -> usize {
        self.models.len()
    }

    #[inline]
    pub fn class_pairs(&self) -> &[[usize; 2]] {
        &self.pairs
    }

    /// Shared class weights; `None` until supplied or computed by the first `fit`.
    #[inline]
    pub fn class_weights(&self) -> Option<&[f32]> {
        self.class_weights.as_deref()
    }

    #[inline]
    pub fn models(&self) -> &[LinearModel] {
        &self.models
    }

    /// Per-submodel access, aligned with [`OneVsRest::class_pairs`].
    #[inline]
    pub fn models_mut(&mut self) -> &mut [LinearModel] {
        &mut self.models
    }

    pub fn is_fitted(&self) -> bool {
        self.models.iter().all(LinearModel::is_fitted)
    }

    fn each(&mut self, f: impl Fn(&mut LinearModel)) -> &mut Self {
        self.models.iter_mut().for_each(f);
        self
    }

    /// Apply `config` to every submodel; a configured seed `s` becomes `s + k` for
    /// submodel `k`, as with [`OneVsRest::set_seed`].
    pub fn set_config(&mut self, config: ModelConfig) -> &mut Self {
        let seed = config.seed;
        self.each(|m| {
            m.set_config(config.clone());
        })
        .set_seed(seed)
    }

    pub fn set_iterations(&mut self, n_iterations: usize) -> &mut Self {
        self.each(|m| {
            m.set_iterations(n_iterations);
        })
    }

    pub fn set_learning_rate(&mut self, learning_rate: f32) -> &mut Self {
        self.each(|m| {
            m.set_learning_rate(learning_rate);
        })
    }

    pub fn set_early_stop_threshold(&mut self, threshold: f32) -> &mut Self {
        self.each(|m| {
            m.set_early_stop_threshold(threshold);
        })
    }

    pub fn set_early_stop_iterations(&mut self, iterations: usize) -> &mut Self {
        self.each(|m| {
            m.set_early_stop_iterations(iterations);
        })
    }

    pub fn set_mode(&mut self, mode: OptimizationMode) -> &mut Self {
        self.each(|m| {
            m.set_mode(mode);
        })
    }

    pub fn set_batch_size(&mut self, batch_size: usize) -> &mut Self {
        self.each(|m| {
            m.set_batch_size(batch_size);
        })
    }

    pub fn set_regularization_params(&mut self, params: RegularizationParams) -> &mut Self {
        self.each(|m| {
            m.set_regularization_params(params);
        })
    }

    pub fn set_huber_delta(&mut self, delta: f32) -> &mut Self {
        self.each(|m| {
            m.set_huber_delta(delta);
        })
    }

    /// Seed submodel `k` with `seed + k`, or unseed all of them.
    pub fn set_seed(&mut self, seed: Option<u64>) -> &mut Self {
        for (k, model) in self.models.iter_mut().enumerate() {
            model.set_seed(seed.map(|s| s.wrapping_add(k as u64)));
        }
        self
    }

    pub fn set_activation(&mut self, activation: Activation) -> &mut Self {
        self.each(|m| {
            m.set_activation(activation);
        })
    }

    pub fn set_loss(&mut self, loss: Loss) -> &mut Self {
        self.each(|m| {
            m.set_loss(loss);
        })
    }

    pub fn set_loss_gradient(&mut self, loss_gradient: LossGradient) -> &mut Self {
        self.each(|m| {
            m.set_loss_gradient(loss_gradient);
        })
    }

    /// Bind `loss` and its matching gradient on every submodel.
    pub fn set_objective(&mut self, loss: Loss) -> &mut Self {
        self.each(|m| {
            m.set_objective(loss);
        })
    }

    pub fn set_regularization(&mut self, regularization: Regularization) -> &mut Self {
        self.each(|m| {
            m.set_regularization(regularization);
        })
    }

    pub fn set_regularization_gradient(&mut self, gradient: RegularizationGradient) -> &mut Self {
        self.each(|m| {
            m.set_regularization_gradient(gradient);
        })
    }

    /// Bind `regularization` and its matching gradient on every submodel.
    pub fn set_penalty(&mut self, regularization: Regularization) -> &mut Self {
        self.each(|m| {
            m.set_penalty(regularization);
        })
    }

    pub fn clear_regularization(&mut self) -> &mut Self {
        self.each(|m| {
            m.clear_regularization();
        })
    }

    /// Train every pairwise submodel. `y` holds class indices `0..n_classes` as floats.
    ///
    /// Returns one report per class pair, in [`OneVsRest::class_pairs`] order. On error
    /// no submodel and no class weight is changed.
    pub fn fit(
        &mut self,
        x: ArrayView2<'_, f32>,
        y: ArrayView1<'_, f32>,
    ) -> Result<Vec<FitReport>> {
        for model in &self.models {
            model.check_bindings()?;
        }
        validate_xy(x, y)?;
        let classes = class_indices(y, self.n_classes)?;

        let weights = match &self.class_weights {
            Some(w) => Arc::clone(w),
            None => {
                let w = frequency_weights(&classes, self.n_classes)?;
                debug!(weights = ?w, "computed class weights");
                Arc::from(w)
            }
        };

        // Train into copies so a failing pair leaves the ensemble as it was.
        let x = add_bias(x);
        let mut trained = self.models.clone();
        let mut reports = Vec::with_capacity(trained.len());
        for (model, &[a, b]) in trained.iter_mut().zip(&self.pairs) {
            let (xs, ys) = filter_pair(x.view(), &classes, a, b);
            info!(class_a = a, class_b = b, rows = xs.nrows(), "training pair");

            model.config.class_weights = Some(Arc::clone(&weights));
            model.config.class_pair = Some([a, b]);
            reports.push(model.fit_augmented(xs.view(), ys.view())?);
        }

        self.models = trained;
        self.class_weights = Some(weights);
        Ok(reports)
    }

    /// [`OneVsRest::fit`] on a [`Dataset`] whose labels are class indices.
    pub fn fit_dataset(&mut self, data: &Dataset) -> Result<Vec<FitReport>> {
        self.fit(data.features(), data.labels())
    }

    /// Predict a class index for every row of raw features `x`.
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
        if out.len() != x.nrows() {
            return Err(Error::InvalidShape(format!(
                "output len {} does not match X rows {}",
                out.len(),
                x.nrows()
            )));
        }

        let x = add_bias(x);
        // votes[[row, k]] is the class chosen by submodel k for that row.
        let mut votes = Array2::<usize>::zeros((x.nrows(), self.models.len()));
        for (k, (model, &[a, b])) in self.models.iter().zip(&self.pairs).enumerate() {
            let yhat = model.predict_augmented(x.view())?;
            for (vote, &p) in votes.column_mut(k).iter_mut().zip(yhat.iter()) {
                *vote = if p >= 0.5 { b } else { a };
            }
        }

        for (o, row) in out.iter_mut().zip(votes.outer_iter()) {
            *o = majority_vote(&row.to_vec(), self.n_classes) as f32;
        }
        Ok(())
    }
}

/// `weight[c] = N / (n_classes * count[c])`.
fn frequency_weights(classes: &[usize], n_classes: usize) -> Result<Vec<f32>> {
    let counts = class_counts(classes, n_classes);
    if let Some(missing) = counts.iter().position(|&c| c == 0) {
        return Err(Error::InvalidData(format!(
            "class {missing} has no training rows, cannot derive class weights"
        )));
    }

    let n = classes.len() as f32;
    Ok(counts
        .iter()
        .map(|&c| n / (n_classes as f32 * c as f32))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn pair_counts_follow_n_choose_two() {
        for (n, expected) in [(3, 3), (4, 6), (5, 10)] {
            let pairs = class_pairs(n);
            assert_eq!(pairs.len(), expected);
            assert!(pairs.iter().all(|&[a, b]| a < b && b < n));

            let mut unique = pairs.clone();
            unique.dedup();
            assert_eq!(unique.len(), pairs.len());
        }
        assert_eq!(
            class_pairs(4),
            vec![[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]]
        );
    }

    #[test]
    fn needs_two_classes() {
        assert!(matches!(OneVsRest::new(1, None), Err(Error::InvalidConfig(_))));
        let ovr = OneVsRest::new(4, None).unwrap();
        assert_eq!(ovr.n_models(), 6);
        assert!(!ovr.is_fitted());
    }

    #[test]
    fn supplied_weights_are_validated() {
        assert!(OneVsRest::new(3, Some(vec![1.0, 1.0])).is_err());
        assert!(OneVsRest::new(3, Some(vec![1.0, 0.0, 1.0])).is_err());
        let ovr = OneVsRest::new(3, Some(vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!(ovr.class_weights(), Some(&[1.0_f32, 2.0, 3.0][..]));
    }

    #[test]
    fn majority_vote_picks_the_most_common_label() {
        // votes {0: 1, 1: 2, 2: 0}
        assert_eq!(majority_vote(&[1, 0, 1], 3), 1);
    }

    #[test]
    fn majority_vote_ties_go_to_the_lowest_class() {
        assert_eq!(majority_vote(&[2, 1, 0], 3), 0);
        assert_eq!(majority_vote(&[2, 1], 3), 1);
        assert_eq!(majority_vote(&[], 3), 0);
    }

    #[test]
    fn frequency_weights_balance_class_mass() {
        let classes = [0, 0, 0, 0, 1, 1, 2, 2, 2, 2, 2, 2];
        let w = frequency_weights(&classes, 3).unwrap();
        let counts = class_counts(&classes, 3);

        let mass: f32 = w.iter().zip(&counts).map(|(w, &c)| w * c as f32).sum();
        assert_abs_diff_eq!(mass, classes.len() as f32, epsilon = 1e-4);
        assert!(w[1] > w[0] && w[0] > w[2]);

        assert!(frequency_weights(&[0, 0, 2], 3).is_err());
    }

    #[test]
    fn seeds_are_offset_per_submodel() {
        let mut ovr = OneVsRest::new(3, None).unwrap();
        ovr.set_seed(Some(10));
        let seeds: Vec<_> = ovr.models().iter().map(|m| m.config().seed).collect();
        assert_eq!(seeds, vec![Some(10), Some(11), Some(12)]);
    }

    #[test]
    fn set_config_keeps_seeds_offset_per_submodel() {
        let mut ovr = OneVsRest::new(3, None).unwrap();
        ovr.set_config(ModelConfig {
            seed: Some(7),
            n_iterations: 50,
            ..ModelConfig::default()
        });
        let seeds: Vec<_> = ovr.models().iter().map(|m| m.config().seed).collect();
        assert_eq!(seeds, vec![Some(7), Some(8), Some(9)]);
        assert!(ovr.models().iter().all(|m| m.config().n_iterations == 50));

        ovr.set_config(ModelConfig::default());
        assert!(ovr.models().iter().all(|m| m.config().seed.is_none()));
    }

    fn three_clusters(sizes: [usize; 3]) -> (Array2<f32>, Array1<f32>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for (class, &n) in sizes.iter().enumerate() {
            for i in 0..n {
                features.push(class as f32 * 3.0 + 0.01 * i as f32);
                labels.push(class as f32);
            }
        }
        let rows = features.len();
        (
            Array2::from_shape_vec((rows, 1), features).unwrap(),
            Array1::from(labels),
        )
    }

    fn sigmoid_ensemble(n_classes: usize, weights: Option<Vec<f32>>) -> OneVsRest {
        let mut ovr = OneVsRest::new(n_classes, weights).unwrap();
        ovr.set_activation(Activation::Sigmoid)
            .set_objective(Loss::CrossEntropy)
            .set_iterations(20)
            .set_seed(Some(0));
        ovr
    }

    #[test]
    fn a_pair_without_rows_fails_before_any_submodel_is_fitted() {
        // classes 2 and 3 never appear, so pair (2, 3) has no rows
        let x = array![[0.0_f32], [0.1], [1.0], [1.1]];
        let y = array![0.0_f32, 0.0, 1.0, 1.0];
        let mut ovr = sigmoid_ensemble(4, Some(vec![1.0; 4]));

        assert!(matches!(ovr.fit(x.view(), y.view()), Err(Error::InvalidData(_))));
        assert!(ovr.models().iter().all(|m| !m.is_fitted()));
        assert!(ovr.models().iter().all(|m| m.config().class_pair.is_none()));
        assert_eq!(ovr.class_weights(), Some(&[1.0_f32; 4][..]));
    }

    #[test]
    fn a_batch_larger_than_one_pair_fails_before_any_submodel_is_fitted() {
        // pair (1, 2) has 10 rows, the others 25
        let (x, y) = three_clusters([20, 5, 5]);
        let mut ovr = sigmoid_ensemble(3, None);
        ovr.set_mode(OptimizationMode::MiniBatch).set_batch_size(12);

        assert!(matches!(ovr.fit(x.view(), y.view()), Err(Error::InvalidConfig(_))));
        assert!(ovr.models().iter().all(|m| !m.is_fitted()));
        assert!(ovr.class_weights().is_none());
    }

    #[test]
    fn a_failed_refit_keeps_the_previous_ensemble() {
        let (x, y) = three_clusters([20, 5, 5]);
        let mut ovr = sigmoid_ensemble(3, None);
        ovr.fit(x.view(), y.view()).unwrap();
        let weights: Vec<f32> = ovr.class_weights().unwrap().to_vec();
        let before = ovr.predict(x.view()).unwrap();

        ovr.set_mode(OptimizationMode::MiniBatch).set_batch_size(12);
        assert!(ovr.fit(x.view(), y.view()).is_err());

        assert!(ovr.is_fitted());
        assert_eq!(ovr.class_weights(), Some(&weights[..]));
        assert_eq!(ovr.predict(x.view()).unwrap(), before);
    }

    #[test]
    fn fit_shares_one_weight_buffer() {
        let x = array![[0.0_f32], [0.1], [1.0], [1.1], [2.0], [2.1]];
        let y = array![0.0_f32, 0.0, 1.0, 1.0, 2.0, 2.0];
        let mut ovr = OneVsRest::new(3, None).unwrap();
        ovr.set_activation(Activation::Sigmoid)
            .set_objective(Loss::CrossEntropy)
            .set_iterations(20)
            .set_seed(Some(0));
        let reports = ovr.fit(x.view(), y.view()).unwrap();
        assert_eq!(reports.len(), 3);

        let shared = ovr.class_weights.clone().unwrap();
        for (model, pair) in ovr.models().iter().zip(ovr.class_pairs()) {
            let held = model.config().class_weights.as_ref().unwrap();
            assert!(Arc::ptr_eq(held, &shared));
            assert_eq!(model.config().class_pair, Some(*pair));
        }
        // balanced classes
        assert_eq!(ovr.class_weights(), Some(&[1.0_f32, 1.0, 1.0][..]));
    }

    #[test]
    fn fit_rejects_labels_that_are_not_class_indices() {
        let x = array![[0.0_f32], [1.0]];
        let mut ovr = OneVsRest::new(2, None).unwrap();
        ovr.set_activation(Activation::Sigmoid)
            .set_objective(Loss::CrossEntropy);
        assert!(matches!(
            ovr.fit(x.view(), array![0.0_f32, 0.5].view()),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            ovr.fit(x.view(), array![0.0_f32, 2.0].view()),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn predict_before_fit_fails() {
        let mut ovr = OneVsRest::new(2, None).unwrap();
        ovr.set_activation(Activation::Sigmoid)
            .set_objective(Loss::CrossEntropy);
        assert!(matches!(
            ovr.predict(array![[0.0_f32]].view()),
            Err(Error::NotFitted)
        ));
    }
}
