//! Dataset helpers on top of `ndarray`.
//!
//! Feature matrices are `(rows, cols)` `f32` arrays and label columns are 1-D arrays
//! with one entry per row. Every model prepends a bias column internally, so callers
//! always work with raw features.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};
use rand::Rng;

use crate::{Error, Result};

/// Prepend a constant `1.0` column to `x`.
///
/// Returns a fresh `(rows, cols + 1)` matrix; `x` is left untouched. Applying this twice
/// yields two bias columns, so apply it at most once per raw dataset.
pub fn add_bias(x: ArrayView2<'_, f32>) -> Array2<f32> {
    let (rows, cols) = x.dim();
    let mut out = Array2::ones((rows, cols + 1));
    out.slice_mut(s![.., 1..]).assign(&x);
    out
}

/// Replace `x` with its bias-augmented version.
///
/// The old allocation is released; any previously taken view of `x` is gone by the
/// time this returns.
pub fn add_bias_in_place(x: &mut Array2<f32>) {
    *x = add_bias(x.view());
}

/// A supervised dataset: features (X) and labels (Y).
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f32>,
    labels: Array1<f32>,
}

impl Dataset {
    /// Build a dataset from owned arrays.
    pub fn new(features: Array2<f32>, labels: Array1<f32>) -> Result<Self> {
        validate_xy(features.view(), labels.view())?;
        Ok(Self { features, labels })
    }

    /// Build a dataset from per-sample rows.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(rows: &[Vec<f32>], labels: &[f32]) -> Result<Self> {
        if rows.len() != labels.len() {
            return Err(Error::InvalidShape(format!(
                "rows/labels length mismatch: {} vs {}",
                rows.len(),
                labels.len()
            )));
        }
        if rows.is_empty() {
            return Err(Error::InvalidData("rows must not be empty".to_owned()));
        }

        let n_features = rows[0].len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_features {
                return Err(Error::InvalidShape(format!(
                    "row {i} has len {}, expected {n_features}",
                    row.len()
                )));
            }
        }

        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        let features = Array2::from_shape_vec((rows.len(), n_features), flat)
            .map_err(|e| Error::InvalidShape(e.to_string()))?;
        Self::new(features, Array1::from(labels.to_vec()))
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    /// Returns the number of raw feature columns (without bias).
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    #[inline]
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    #[inline]
    pub fn labels(&self) -> ArrayView1<'_, f32> {
        self.labels.view()
    }
}

/// Check that X and Y describe the same non-empty set of finite samples.
pub(crate) fn validate_xy(x: ArrayView2<'_, f32>, y: ArrayView1<'_, f32>) -> Result<()> {
    if x.nrows() == 0 {
        return Err(Error::InvalidData("training data must not be empty".to_owned()));
    }
    if x.ncols() == 0 {
        return Err(Error::InvalidData("training data must have at least one column".to_owned()));
    }
    if x.nrows() != y.len() {
        return Err(Error::InvalidShape(format!(
            "X has {} rows but Y has {}",
            x.nrows(),
            y.len()
        )));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidData("X contains non-finite values".to_owned()));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidData("Y contains non-finite values".to_owned()));
    }
    Ok(())
}

/// Convert a label column into class indices in `[0, n_classes)`.
pub(crate) fn class_indices(y: ArrayView1<'_, f32>, n_classes: usize) -> Result<Vec<usize>> {
    y.iter()
        .enumerate()
        .map(|(row, &label)| {
            if label < 0.0 || label.fract() != 0.0 || label as usize >= n_classes {
                return Err(Error::InvalidData(format!(
                    "label {label} at row {row} is not a class index in [0, {n_classes})"
                )));
            }
            Ok(label as usize)
        })
        .collect()
}

/// Count how many rows carry each class index.
pub(crate) fn class_counts(classes: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &c in classes {
        counts[c] += 1;
    }
    counts
}

/// Keep the rows labelled `a` or `b`, relabelling them `a -> 0.0`, `b -> 1.0`.
///
/// Returns the filtered features and binary labels.
pub(crate) fn filter_pair(
    x: ArrayView2<'_, f32>,
    classes: &[usize],
    a: usize,
    b: usize,
) -> (Array2<f32>, Array1<f32>) {
    let matched: Vec<usize> = classes
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == a || c == b)
        .map(|(row, _)| row)
        .collect();

    let labels = matched
        .iter()
        .map(|&row| if classes[row] == b { 1.0 } else { 0.0 })
        .collect();
    (x.select(Axis(0), &matched), labels)
}

/// Draw `amount` distinct row indices out of `n_rows`.
pub(crate) fn sample_rows<R: Rng + ?Sized>(
    rng: &mut R,
    n_rows: usize,
    amount: usize,
) -> Vec<usize> {
    rand::seq::index::sample(rng, n_rows, amount).into_vec()
}
