use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2, array};
use rstest::rstest;

use rust_linear::{
    Activation, Binding, Dataset, Error, Loss, ModelConfig, OneVsRest, Regularization,
    RegularizationGradient, class_pairs, confusion_matrix, majority_vote,
    weighted_f1,
};

/// Three tight 1-D clusters around -3, 0 and 3 with `sizes[c]` rows each.
fn clusters(sizes: [usize; 3]) -> (Array2<f32>, Array1<f32>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (class, &size) in sizes.iter().enumerate() {
        let center = 3.0 * class as f32 - 3.0;
        for i in 0..size {
            xs.push(center + 0.3 * (i as f32 / size as f32 - 0.5));
            ys.push(class as f32);
        }
    }
    let rows = xs.len();
    (Array2::from_shape_vec((rows, 1), xs).unwrap(), Array1::from(ys))
}

fn classifier(n_classes: usize, weights: Option<Vec<f32>>) -> OneVsRest {
    let mut ovr = OneVsRest::new(n_classes, weights).unwrap();
    ovr.set_activation(Activation::Sigmoid)
        .set_objective(Loss::CrossEntropy)
        .set_learning_rate(0.5)
        .set_iterations(2_000)
        .set_seed(Some(3));
    ovr
}

#[rstest]
#[case(3, 3)]
#[case(4, 6)]
#[case(5, 10)]
fn one_model_per_class_pair(#[case] n_classes: usize, #[case] n_models: usize) {
    let ovr = OneVsRest::new(n_classes, None).unwrap();
    assert_eq!(ovr.n_models(), n_models);
    assert_eq!(ovr.models().len(), n_models);
    assert_eq!(ovr.class_pairs(), class_pairs(n_classes).as_slice());

    for a in 0..n_classes {
        for b in a + 1..n_classes {
            assert!(ovr.class_pairs().contains(&[a, b]));
        }
    }
}

#[test]
fn votes_pick_the_majority_label() {
    // three submodels voting {0: 1, 1: 2, 2: 0}
    assert_eq!(majority_vote(&[0, 1, 1], 3), 1);
}

#[test]
fn separated_clusters_are_classified() {
    let (x, y) = clusters([12, 12, 12]);
    let mut ovr = classifier(3, None);

    let reports = ovr.fit(x.view(), y.view()).unwrap();
    assert_eq!(reports.len(), 3);
    assert!(ovr.is_fitted());

    let yhat = ovr.predict(x.view()).unwrap();
    let cm = confusion_matrix(y.view(), yhat.view(), 3).unwrap();
    assert!(cm.accuracy() >= 0.9, "{cm}");
    assert!(weighted_f1(y.view(), yhat.view(), 3).unwrap() >= 0.9);

    let mut out = Array1::zeros(x.nrows());
    ovr.predict_into(x.view(), out.view_mut()).unwrap();
    assert_eq!(out, yhat);
}

#[test]
fn automatic_class_weights_balance_frequencies() {
    let (x, y) = clusters([4, 10, 16]);
    let mut ovr = classifier(3, None);
    assert!(ovr.class_weights().is_none());
    ovr.fit(x.view(), y.view()).unwrap();

    let weights = ovr.class_weights().unwrap().to_vec();
    let counts = [4.0_f32, 10.0, 16.0];
    let mass: f32 = weights.iter().zip(counts).map(|(w, c)| w * c).sum();
    assert_abs_diff_eq!(mass, 30.0, epsilon = 1e-4);
    assert_abs_diff_eq!(weights[0], 30.0 / 12.0, epsilon = 1e-5);

    // Computed once: a refit on differently balanced data keeps them.
    let (x2, y2) = clusters([10, 10, 10]);
    ovr.fit(x2.view(), y2.view()).unwrap();
    assert_eq!(ovr.class_weights().unwrap(), weights.as_slice());
}

#[test]
fn supplied_class_weights_are_used_as_given() {
    let (x, y) = clusters([6, 6, 6]);
    let mut ovr = classifier(3, Some(vec![0.5, 1.0, 2.0]));
    ovr.fit(x.view(), y.view()).unwrap();
    assert_eq!(ovr.class_weights(), Some(&[0.5_f32, 1.0, 2.0][..]));
}

#[test]
fn absent_class_cannot_derive_weights() {
    let x = array![[0.0_f32], [1.0], [2.0]];
    let y = array![0.0_f32, 0.0, 2.0];
    let mut ovr = classifier(3, None);
    assert!(matches!(ovr.fit(x.view(), y.view()), Err(Error::InvalidData(_))));
}

#[test]
fn setters_reach_every_submodel() {
    let mut ovr = OneVsRest::new(4, None).unwrap();
    ovr.set_iterations(123).set_learning_rate(0.25).set_seed(Some(100));

    for (k, model) in ovr.models().iter().enumerate() {
        assert_eq!(model.config().n_iterations, 123);
        assert_eq!(model.config().learning_rate, 0.25);
        assert_eq!(model.config().seed, Some(100 + k as u64));
    }
}

#[test]
fn unbound_ensemble_fails_fast() {
    let (x, y) = clusters([3, 3, 3]);
    let mut ovr = OneVsRest::new(3, None).unwrap();
    ovr.set_objective(Loss::CrossEntropy);
    assert!(matches!(
        ovr.fit(x.view(), y.view()),
        Err(Error::MissingBinding(Binding::Activation))
    ));
    assert!(ovr.class_weights().is_none());
}

#[test]
fn predict_into_checks_the_output_length() {
    let (x, y) = clusters([5, 5, 5]);
    let mut ovr = classifier(3, None);
    ovr.set_iterations(50);
    ovr.fit(x.view(), y.view()).unwrap();

    let mut short = Array1::zeros(4);
    assert!(matches!(
        ovr.predict_into(x.view(), short.view_mut()),
        Err(Error::InvalidShape(_))
    ));
}

#[test]
fn fits_from_a_dataset() {
    let (x, y) = clusters([10, 10, 10]);
    let data = Dataset::new(x.clone(), y.clone()).unwrap();

    let mut ovr = classifier(3, None);
    let reports = ovr.fit_dataset(&data).unwrap();
    assert_eq!(reports.len(), 3);

    let yhat = ovr.predict(data.features()).unwrap();
    let cm = confusion_matrix(y.view(), yhat.view(), 3).unwrap();
    assert!(cm.accuracy() >= 0.9, "{cm}");

    let mut from_views = classifier(3, None);
    from_views.fit(x.view(), y.view()).unwrap();
    assert_eq!(from_views.predict(x.view()).unwrap(), yhat);
}

#[test]
fn config_and_penalty_reach_every_submodel() {
    let mut ovr = OneVsRest::new(3, None).unwrap();
    ovr.set_config(ModelConfig {
        n_iterations: 123,
        seed: Some(40),
        ..ModelConfig::default()
    })
    .set_penalty(Regularization::L2);

    for (k, model) in ovr.models().iter().enumerate() {
        assert_eq!(model.config().n_iterations, 123);
        assert_eq!(model.config().seed, Some(40 + k as u64));
        assert_eq!(model.regularization(), Some(Regularization::L2));
        assert_eq!(model.regularization_gradient(), Some(RegularizationGradient::L2));
    }
}
