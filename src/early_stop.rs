//! Early stopping on loss stagnation.
//!
//! Training stops once the loss has changed by less than a tolerance for `patience`
//! consecutive observations. Stopping this way is a successful outcome, not an error.

/// Tolerance/patience tracker fed with one loss value per iteration.
///
/// ```
/// use rust_linear::EarlyStopping;
///
/// let mut stop = EarlyStopping::new(2, 1e-3);
/// assert!(!stop.should_stop(1.0)); // first value has nothing to compare against
/// assert!(!stop.should_stop(1.0)); // 1 stagnant step
/// assert!(stop.should_stop(1.0)); // 2 stagnant steps == patience
/// ```
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    /// Consecutive stagnant observations required to stop.
    patience: usize,
    /// Changes strictly below this are stagnant.
    tolerance: f32,
    previous_loss: Option<f32>,
    counter: usize,
}

impl EarlyStopping {
    /// Create a tracker.
    ///
    /// # Arguments
    ///
    /// * `patience` - Number of consecutive stagnant observations before stopping
    /// * `tolerance` - Absolute loss change below which an observation is stagnant
    pub fn new(patience: usize, tolerance: f32) -> Self {
        Self {
            patience,
            tolerance,
            previous_loss: None,
            counter: 0,
        }
    }

    /// Record `loss` and report whether training should stop now.
    pub fn should_stop(&mut self, loss: f32) -> bool {
        match self.previous_loss {
            Some(prev) if (loss - prev).abs() < self.tolerance => self.counter += 1,
            _ => self.counter = 0,
        }
        self.previous_loss = Some(loss);

        self.counter >= self.patience
    }

    #[inline]
    pub fn patience(&self) -> usize {
        self.patience
    }

    /// Current run of stagnant observations.
    #[inline]
    pub fn counter(&self) -> usize {
        self.counter
    }
}
