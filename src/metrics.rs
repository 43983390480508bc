//! Metrics.
//!
//! Metrics are evaluation helpers; they never participate in training. Every metric
//! takes targets `y` and predictions `yhat` as `(rows,)` columns and returns
//! [`Error::InvalidShape`] when their lengths differ.

use std::fmt;

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::data::class_indices;
use crate::{Error, Result};

/// Labels closer than this are considered equal by the classification metrics.
const LABEL_EPS: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Supported evaluation metrics.
pub enum Metric {
    /// Mean absolute error.
    Mae,
    /// Mean squared error.
    Mse,
    /// Per-class F1 weighted by actual class frequency.
    WeightedF1 { n_classes: usize },
}

impl Metric {
    pub fn evaluate(self, y: ArrayView1<'_, f32>, yhat: ArrayView1<'_, f32>) -> Result<f32> {
        match self {
            Metric::Mae => mae(y, yhat),
            Metric::Mse => mse(y, yhat),
            Metric::WeightedF1 { n_classes } => weighted_f1(y, yhat, n_classes),
        }
    }
}

fn check_rows(y: ArrayView1<'_, f32>, yhat: ArrayView1<'_, f32>, metric: &str) -> Result<()> {
    if y.len() != yhat.len() {
        return Err(Error::InvalidShape(format!(
            "{metric}: y has {} rows but yhat has {}",
            y.len(),
            yhat.len()
        )));
    }
    if y.is_empty() {
        return Err(Error::InvalidData(format!("{metric}: no rows to evaluate")));
    }
    Ok(())
}

pub fn mae(y: ArrayView1<'_, f32>, yhat: ArrayView1<'_, f32>) -> Result<f32> {
    check_rows(y, yhat, "mean absolute error")?;
    let sum: f32 = y.iter().zip(yhat.iter()).map(|(t, p)| (t - p).abs()).sum();
    Ok(sum / y.len() as f32)
}

pub fn mse(y: ArrayView1<'_, f32>, yhat: ArrayView1<'_, f32>) -> Result<f32> {
    check_rows(y, yhat, "mean squared error")?;
    let sum: f32 = y
        .iter()
        .zip(yhat.iter())
        .map(|(t, p)| {
            let diff = t - p;
            diff * diff
        })
        .sum();
    Ok(sum / y.len() as f32)
}

/// Weighted F1 over classes `0..n_classes`.
///
/// Each class's F1 is `TP / (TP + (FP + FN) / 2)` (zero when the class is neither
/// present nor predicted), weighted by its share of the actual labels.
pub fn weighted_f1(
    y: ArrayView1<'_, f32>,
    yhat: ArrayView1<'_, f32>,
    n_classes: usize,
) -> Result<f32> {
    check_rows(y, yhat, "weighted f1")?;
    let rows = y.len() as f32;

    let mut total = 0.0;
    for class in 0..n_classes {
        let label = class as f32;
        let (mut tp, mut fp, mut fn_, mut support) = (0usize, 0usize, 0usize, 0usize);
        for (&t, &p) in y.iter().zip(yhat.iter()) {
            let actual = (t - label).abs() < LABEL_EPS;
            let predicted = (p - label).abs() < LABEL_EPS;
            match (actual, predicted) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
            support += actual as usize;
        }

        let denom = tp as f32 + 0.5 * (fp + fn_) as f32;
        let f1 = if denom > 0.0 { tp as f32 / denom } else { 0.0 };
        total += f1 * support as f32 / rows;
    }
    Ok(total)
}

/// Counts of `(actual, predicted)` label pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    /// `counts[[actual, predicted]]`
    counts: Array2<usize>,
}

impl ConfusionMatrix {
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.counts.nrows()
    }

    /// Rows are actual classes, columns predicted classes.
    #[inline]
    pub fn counts(&self) -> ArrayView2<'_, usize> {
        self.counts.view()
    }

    #[inline]
    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.counts[[actual, predicted]]
    }

    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    /// Fraction of rows on the diagonal.
    pub fn accuracy(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.diag().sum() as f32 / total as f32
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rows: actual, columns: predicted")?;
        write!(f, "   ")?;
        for c in 0..self.n_classes() {
            write!(f, " {c:>5}")?;
        }
        writeln!(f)?;
        for (r, row) in self.counts.outer_iter().enumerate() {
            write!(f, "{r:>3}")?;
            for count in row {
                write!(f, " {count:>5}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Tally `(y, yhat)` class-index pairs into an `n_classes x n_classes` matrix.
pub fn confusion_matrix(
    y: ArrayView1<'_, f32>,
    yhat: ArrayView1<'_, f32>,
    n_classes: usize,
) -> Result<ConfusionMatrix> {
    check_rows(y, yhat, "confusion matrix")?;
    let actual = class_indices(y, n_classes)?;
    let predicted = class_indices(yhat, n_classes)?;

    let mut counts = Array2::zeros((n_classes, n_classes));
    for (&a, &p) in actual.iter().zip(&predicted) {
        counts[[a, p]] += 1;
    }
    Ok(ConfusionMatrix { counts })
}
