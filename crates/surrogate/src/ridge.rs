use crate::errors::{Result, SurrogateError};
use crate::features::Features;
use crate::linear::{check_data, mse, CenteredDesign};
use crate::traits::{SurrogateRegressor, TrainingLog, TrainingStep};
use linfa::ParamGuard;
use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayView2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Validated ridge regression parameters
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct RidgeValidParams {
    features: Features,
    penalties: Vec<f64>,
}

impl Default for RidgeValidParams {
    fn default() -> Self {
        RidgeValidParams {
            features: Features::default(),
            penalties: Array1::logspace(10., -8., 2., 11).to_vec(),
        }
    }
}

impl RidgeValidParams {
    /// Get feature map
    pub fn features(&self) -> Features {
        self.features
    }

    /// Get candidate penalties
    pub fn penalties(&self) -> &[f64] {
        &self.penalties
    }
}

/// Ridge regression hyperparameters
#[derive(Clone, Debug, Default)]
pub struct RidgeParams(RidgeValidParams);

impl RidgeParams {
    /// Default parameters: quadratic features, penalties from 1e-8 to 1e2
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the feature map
    pub fn features(mut self, features: Features) -> Self {
        self.0.features = features;
        self
    }

    /// Set the candidate penalties. The one giving the lowest validation
    /// error is retained, the smallest one when there is no validation data.
    pub fn penalties(mut self, penalties: &[f64]) -> Self {
        self.0.penalties = penalties.to_vec();
        self
    }

    /// Check parameters and build an untrained regressor
    pub fn build(self) -> Result<RidgeRegressor> {
        Ok(RidgeRegressor::new(self.check()?))
    }
}

impl ParamGuard for RidgeParams {
    type Checked = RidgeValidParams;
    type Error = SurrogateError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.penalties.is_empty() {
            return Err(SurrogateError::InvalidValue(
                "at least one ridge penalty is required".to_string(),
            ));
        }
        if let Some(p) = self
            .0
            .penalties
            .iter()
            .find(|p| !p.is_finite() || **p < 0.)
        {
            return Err(SurrogateError::InvalidValue(format!(
                "ridge penalty should be finite and non negative, got {p}"
            )));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
struct RidgeFit {
    phi_mean: Array1<f64>,
    y_mean: Array1<f64>,
    weights: Array2<f64>,
    penalty: f64,
    n_inputs: usize,
}

/// Deterministic surrogate: regularized least squares on polynomial features.
///
/// The solution is computed in closed form for every candidate penalty from the
/// eigen decomposition of the feature Gram matrix. Predicted standard
/// deviations are zero.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct RidgeRegressor {
    params: RidgeValidParams,
    fitted: Option<RidgeFit>,
}

impl RidgeRegressor {
    /// Ridge parameters constructor
    pub fn params() -> RidgeParams {
        RidgeParams::new()
    }

    /// Untrained regressor from validated parameters
    pub fn new(params: RidgeValidParams) -> Self {
        RidgeRegressor {
            params,
            fitted: None,
        }
    }

    /// Penalty retained by the last training
    pub fn penalty(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.penalty)
    }

    fn mean_prediction(fit: &RidgeFit, features: Features, x: &ArrayView2<f64>) -> Array2<f64> {
        let phi = features.value(x) - &fit.phi_mean;
        phi.dot(&fit.weights) + &fit.y_mean
    }
}

impl SurrogateRegressor for RidgeRegressor {
    /// Every candidate penalty is one training step: `epochs` is not used.
    fn fit(
        &mut self,
        x_train: ArrayView2<f64>,
        y_train: ArrayView2<f64>,
        x_val: ArrayView2<f64>,
        y_val: ArrayView2<f64>,
        _epochs: usize,
    ) -> Result<TrainingLog> {
        check_data(&x_train, &y_train, &x_val, &y_val)?;
        let features = self.params.features();
        let design = CenteredDesign::new(features, x_train, y_train)?;
        let has_val = x_val.nrows() > 0;
        if !has_val {
            warn!("Ridge: no validation data, the smallest penalty is used");
        }

        let mut log = TrainingLog::new();
        let mut best: Option<(f64, RidgeFit)> = None;
        for (i, &penalty) in self.params.penalties().iter().enumerate() {
            let filter = design.d.mapv(|d| if d + penalty > 0. { 1. / (d + penalty) } else { 0. });
            let fit = RidgeFit {
                phi_mean: design.phi_mean.clone(),
                y_mean: design.y_mean.clone(),
                weights: design.weights(&filter),
                penalty,
                n_inputs: x_train.ncols(),
            };
            let train_mse = mse(&design.y.view(), &design.phi.dot(&fit.weights));
            let val_mse =
                has_val.then(|| mse(&y_val, &Self::mean_prediction(&fit, features, &x_val)));
            debug!(
                "Ridge: penalty={:e} train_mse={:e} val_mse={:?}",
                penalty, train_mse, val_mse
            );
            log.push(TrainingStep {
                step: i,
                train_mse,
                val_mse,
                log_evidence: None,
            });
            let score = val_mse.unwrap_or(penalty);
            match &best {
                Some((best_score, _)) if *best_score <= score => {}
                _ => best = Some((score, fit)),
            }
        }
        // penalties are not empty
        let (_, fit) = best.ok_or_else(|| {
            SurrogateError::InvalidValue("no ridge penalty candidate".to_string())
        })?;
        info!(
            "Ridge: retained penalty {:e} on {} samples",
            fit.penalty,
            design.n_samples()
        );
        self.fitted = Some(fit);
        Ok(log)
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
        let fit = self
            .fitted
            .as_ref()
            .ok_or_else(|| SurrogateError::NotFitted("ridge regressor".to_string()))?;
        if x.ncols() != fit.n_inputs {
            return Err(SurrogateError::ShapeMismatch(format!(
                "expected {} inputs, got {}",
                fit.n_inputs,
                x.ncols()
            )));
        }
        let mean = Self::mean_prediction(fit, self.params.features(), &x);
        let std = Array2::zeros(mean.raw_dim());
        Ok((mean, std))
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, s};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;

    fn quadratic_data(n: usize, seed: u64) -> (Array2<f64>, Array2<f64>) {
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        let x = Array2::random_using((n, 2), Uniform::new(-1., 1.), &mut rng);
        let mut y = Array2::zeros((n, 2));
        for (i, row) in x.rows().into_iter().enumerate() {
            y[[i, 0]] = 1. + 2. * row[0] - row[1] + 0.5 * row[0] * row[1];
            y[[i, 1]] = row[0] * row[0] - 3.;
        }
        (x, y)
    }

    #[test]
    fn test_ridge_recovers_quadratic() {
        let (xt, yt) = quadratic_data(30, 0);
        let (xv, yv) = quadratic_data(10, 1);
        let mut ridge = RidgeRegressor::params().build().unwrap();
        let log = ridge
            .fit(xt.view(), yt.view(), xv.view(), yv.view(), 1)
            .unwrap();
        assert_eq!(log.len(), 11);
        assert!(ridge.is_fitted());
        let (xs, ys) = quadratic_data(5, 2);
        let (mean, std) = ridge.predict(xs.view()).unwrap();
        assert_abs_diff_eq!(mean, ys, epsilon = 1e-4);
        assert_abs_diff_eq!(std, Array2::zeros((5, 2)));
    }

    #[test]
    fn test_ridge_selects_penalty_on_validation() {
        let (xt, yt) = quadratic_data(20, 3);
        let (xv, yv) = quadratic_data(10, 4);
        let mut ridge = RidgeRegressor::params()
            .features(Features::Linear)
            .penalties(&[1e3, 1e-6])
            .build()
            .unwrap();
        let log = ridge
            .fit(xt.view(), yt.view(), xv.view(), yv.view(), 1)
            .unwrap();
        assert_eq!(ridge.penalty(), Some(1e-6));
        let steps = log.steps();
        assert!(steps[1].val_mse.unwrap() < steps[0].val_mse.unwrap());
    }

    #[test]
    fn test_ridge_without_validation() {
        let (xt, yt) = quadratic_data(20, 5);
        let empty = Array2::zeros((0, 2));
        let mut ridge = RidgeRegressor::params()
            .penalties(&[1., 1e-4, 1e-2])
            .build()
            .unwrap();
        let log = ridge
            .fit(xt.view(), yt.view(), empty.view(), empty.view(), 1)
            .unwrap();
        assert_eq!(ridge.penalty(), Some(1e-4));
        assert!(log.steps().iter().all(|s| s.val_mse.is_none()));
        // intercept is not penalized
        let (mean, _) = ridge
            .predict(xt.slice(s![..1, ..]))
            .unwrap();
        assert_abs_diff_eq!(mean, yt.slice(s![..1, ..]), epsilon = 1e-3);
    }

    #[test]
    fn test_ridge_errors() {
        assert!(RidgeRegressor::params().penalties(&[]).build().is_err());
        assert!(RidgeRegressor::params().penalties(&[-1.]).build().is_err());
        let ridge = RidgeRegressor::params().build().unwrap();
        assert!(matches!(
            ridge.predict(array![[0., 1.]].view()),
            Err(SurrogateError::NotFitted(_))
        ));
        let mut ridge = RidgeRegressor::params().build().unwrap();
        let x = array![[0.], [1.]];
        let y = array![[0.], [1.], [2.]];
        assert!(matches!(
            ridge.fit(x.view(), y.view(), x.view(), x.view(), 1),
            Err(SurrogateError::ShapeMismatch(_))
        ));
    }
}
