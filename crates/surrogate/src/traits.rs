use crate::errors::Result;
use ndarray::{Array2, ArrayView2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A trainable model mapping (normalized) inputs to (normalized) reduced
/// coefficients, giving a mean and a standard deviation for each prediction.
///
/// Inputs are given as (n, n_in) matrices and outputs as (n, n_L) matrices,
/// one row per sample.
pub trait SurrogateRegressor {
    /// Train the model on `(x_train, y_train)`, monitoring `(x_val, y_val)`
    /// which may have no rows. `epochs` bounds the number of training steps
    /// of iterative models.
    fn fit(
        &mut self,
        x_train: ArrayView2<f64>,
        y_train: ArrayView2<f64>,
        x_val: ArrayView2<f64>,
        y_val: ArrayView2<f64>,
        epochs: usize,
    ) -> Result<TrainingLog>;

    /// Predicted mean and standard deviation, both (n, n_L), at the given
    /// (n, n_in) inputs.
    fn predict(&self, x: ArrayView2<f64>) -> Result<(Array2<f64>, Array2<f64>)>;

    /// Whether [SurrogateRegressor::fit] succeeded at least once
    fn is_fitted(&self) -> bool;
}

/// One training step record
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct TrainingStep {
    /// Step index
    pub step: usize,
    /// Mean squared error on the training set
    pub train_mse: f64,
    /// Mean squared error on the validation set when not empty
    pub val_mse: Option<f64>,
    /// Log marginal likelihood of the training data for probabilistic models
    pub log_evidence: Option<f64>,
}

/// History of a training run
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct TrainingLog {
    steps: Vec<TrainingStep>,
}

impl TrainingLog {
    /// An empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step
    pub fn push(&mut self, step: TrainingStep) {
        self.steps.push(step);
    }

    /// Recorded steps in order
    pub fn steps(&self) -> &[TrainingStep] {
        &self.steps
    }

    /// Last recorded step
    pub fn last(&self) -> Option<&TrainingStep> {
        self.steps.last()
    }

    /// Number of recorded steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step was recorded
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Lowest validation error over the run
    pub fn best_val_mse(&self) -> Option<f64> {
        self.steps
            .iter()
            .filter_map(|s| s.val_mse)
            .fold(None, |best, v| match best {
                Some(b) if b <= v => Some(b),
                _ => Some(v),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_val_mse() {
        let mut log = TrainingLog::new();
        assert_eq!(log.best_val_mse(), None);
        for (i, v) in [Some(3.), None, Some(1.), Some(2.)].into_iter().enumerate() {
            log.push(TrainingStep {
                step: i,
                train_mse: 0.,
                val_mse: v,
                log_evidence: None,
            });
        }
        assert_eq!(log.len(), 4);
        assert_eq!(log.best_val_mse(), Some(1.));
        assert_eq!(log.last().map(|s| s.step), Some(3));
    }
}
