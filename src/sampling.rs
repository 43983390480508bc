//! Row subsets for each training iteration.
//!
//! The optimization mode only decides which rows an iteration sees; the rest of the
//! training step is shared. [`RowSampler`] is that "subset provider": full-batch
//! training borrows the data, the sampled modes gather an owned copy of the chosen rows.

use ndarray::{ArrayView1, ArrayView2, Axis, CowArray, Ix1, Ix2};
use rand::Rng;

use crate::data::sample_rows;
use crate::{Error, ModelConfig, OptimizationMode, Result};

/// Rows chosen for one iteration.
pub(crate) type Subset<'a> = (CowArray<'a, f32, Ix2>, CowArray<'a, f32, Ix1>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSampler {
    Full,
    MiniBatch { batch_size: usize },
    SingleSample,
}

impl RowSampler {
    /// Resolve the sampler `config` asks for on a training set with `n_rows` rows.
    pub fn for_config(config: &ModelConfig, n_rows: usize) -> Result<Self> {
        match config.mode {
            OptimizationMode::Full => Ok(RowSampler::Full),
            OptimizationMode::MiniBatch => {
                let batch_size = config.resolved_batch_size(n_rows);
                if batch_size > n_rows {
                    return Err(Error::InvalidConfig(format!(
                        "batch_size {batch_size} exceeds the {n_rows} training rows"
                    )));
                }
                Ok(RowSampler::MiniBatch { batch_size })
            }
            OptimizationMode::SingleSample => Ok(RowSampler::SingleSample),
        }
    }

    /// Rows each iteration trains on.
    #[inline]
    pub fn rows_per_iteration(&self, n_rows: usize) -> usize {
        match self {
            RowSampler::Full => n_rows,
            RowSampler::MiniBatch { batch_size } => *batch_size,
            RowSampler::SingleSample => 1,
        }
    }

    /// Pick this iteration's rows.
    pub(crate) fn draw<'a, R: Rng + ?Sized>(
        &self,
        x: ArrayView2<'a, f32>,
        y: ArrayView1<'a, f32>,
        rng: &mut R,
    ) -> Subset<'a> {
        match self {
            RowSampler::Full => (CowArray::from(x), CowArray::from(y)),
            RowSampler::MiniBatch { batch_size } => {
                let rows = sample_rows(rng, x.nrows(), *batch_size);
                gather(x, y, &rows)
            }
            RowSampler::SingleSample => gather(x, y, &[rng.gen_range(0..x.nrows())]),
        }
    }
}

fn gather<'a>(x: ArrayView2<'a, f32>, y: ArrayView1<'a, f32>, rows: &[usize]) -> Subset<'a> {
    (
        CowArray::from(x.select(Axis(0), rows)),
        CowArray::from(y.select(Axis(0), rows)),
    )
}
