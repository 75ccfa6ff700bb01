use crate::errors::{Result, SurrogateError};
use crate::features::Features;
use crate::linear::{check_data, mse, CenteredDesign};
use crate::traits::{SurrogateRegressor, TrainingLog, TrainingStep};
use linfa::ParamGuard;
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView2, Axis};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Bounds of the precision hyperparameters
const MIN_PRECISION: f64 = 1e-10;
const MAX_PRECISION: f64 = 1e10;

/// Validated Bayesian regression parameters
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct BayesianValidParams {
    features: Features,
    alpha_init: f64,
    beta_init: f64,
    tol: f64,
}

impl Default for BayesianValidParams {
    fn default() -> Self {
        BayesianValidParams {
            features: Features::default(),
            alpha_init: 1.,
            beta_init: 1.,
            tol: 1e-6,
        }
    }
}

impl BayesianValidParams {
    /// Get feature map
    pub fn features(&self) -> Features {
        self.features
    }

    /// Get initial prior precision
    pub fn alpha_init(&self) -> f64 {
        self.alpha_init
    }

    /// Get initial noise precision
    pub fn beta_init(&self) -> f64 {
        self.beta_init
    }

    /// Get convergence tolerance
    pub fn tol(&self) -> f64 {
        self.tol
    }
}

/// Bayesian regression hyperparameters
#[derive(Clone, Debug, Default)]
pub struct BayesianParams(BayesianValidParams);

impl BayesianParams {
    /// Default parameters: quadratic features, unit initial precisions
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the feature map
    pub fn features(mut self, features: Features) -> Self {
        self.0.features = features;
        self
    }

    /// Set the initial prior precision of the weights
    pub fn alpha_init(mut self, alpha: f64) -> Self {
        self.0.alpha_init = alpha;
        self
    }

    /// Set the initial noise precision
    pub fn beta_init(mut self, beta: f64) -> Self {
        self.0.beta_init = beta;
        self
    }

    /// Set the relative change of the precisions below which training stops
    pub fn tol(mut self, tol: f64) -> Self {
        self.0.tol = tol;
        self
    }

    /// Check parameters and build an untrained regressor
    pub fn build(self) -> Result<BayesianRegressor> {
        Ok(BayesianRegressor::new(self.check()?))
    }
}

impl ParamGuard for BayesianParams {
    type Checked = BayesianValidParams;
    type Error = SurrogateError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        for (name, value) in [
            ("alpha_init", self.0.alpha_init),
            ("beta_init", self.0.beta_init),
        ] {
            if !value.is_finite() || value <= 0. {
                return Err(SurrogateError::InvalidValue(format!(
                    "`{name}` should be strictly positive, got {value}"
                )));
            }
        }
        if !self.0.tol.is_finite() || self.0.tol < 0. {
            return Err(SurrogateError::InvalidValue(format!(
                "`tol` should be non negative, got {}",
                self.0.tol
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
struct BayesianFit {
    phi_mean: Array1<f64>,
    y_mean: Array1<f64>,
    weights: Array2<f64>,
    q: Array2<f64>,
    d: Array1<f64>,
    alpha: f64,
    beta: f64,
    n_inputs: usize,
}

impl BayesianFit {
    fn mean(&self, phi: &Array2<f64>) -> Array2<f64> {
        phi.dot(&self.weights) + &self.y_mean
    }

    /// Predictive std `sqrt(1/beta + phi^T A^-1 phi)` with
    /// `A^-1 = Q diag(1 / (alpha + beta d)) Q^T`
    fn std(&self, phi: &Array2<f64>) -> Array1<f64> {
        let proj = phi.dot(&self.q);
        let inv = self.d.mapv(|d| 1. / (self.alpha + self.beta * d));
        let var = (proj.mapv(|v| v * v) * &inv).sum_axis(Axis(1)) + 1. / self.beta;
        var.mapv(f64::sqrt)
    }
}

/// Probabilistic surrogate: Bayesian linear regression on polynomial features.
///
/// Weights have an isotropic Gaussian prior of precision `alpha` and outputs a
/// Gaussian noise of precision `beta`, both shared by all outputs. The
/// precisions maximise the marginal likelihood (evidence) of the training data
/// through fixed-point updates, one update per epoch.
///
/// ```
/// use podnn_surrogate::{BayesianRegressor, Features, SurrogateRegressor};
/// use ndarray::{array, Array2};
///
/// let x = array![[0.], [0.25], [0.5], [0.75], [1.]];
/// let y = x.mapv(|v| 2. * v + 1.);
/// let mut model = BayesianRegressor::params()
///     .features(Features::Linear)
///     .build()
///     .unwrap();
/// let empty = Array2::zeros((0, 1));
/// model.fit(x.view(), y.view(), empty.view(), empty.view(), 100).unwrap();
/// let (mean, std) = model.predict(array![[0.5]].view()).unwrap();
/// assert!((mean[[0, 0]] - 2.).abs() < 1e-3);
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct BayesianRegressor {
    params: BayesianValidParams,
    fitted: Option<BayesianFit>,
}

impl BayesianRegressor {
    /// Bayesian regression parameters constructor
    pub fn params() -> BayesianParams {
        BayesianParams::new()
    }

    /// Untrained regressor from validated parameters
    pub fn new(params: BayesianValidParams) -> Self {
        BayesianRegressor {
            params,
            fitted: None,
        }
    }

    /// Fitted prior precision and noise precision
    pub fn precisions(&self) -> Option<(f64, f64)> {
        self.fitted.as_ref().map(|f| (f.alpha, f.beta))
    }
}

/// Log marginal likelihood of `k` independent outputs sharing the precisions
fn log_evidence(
    design: &CenteredDesign,
    alpha: f64,
    beta: f64,
    weights: &Array2<f64>,
    residual: f64,
) -> f64 {
    let (n, k) = design.y.dim();
    let p = design.d.len() as f64;
    let n = n as f64;
    let k = k as f64;
    let log_det = design.d.mapv(|d| (alpha + beta * d).ln()).sum();
    let m2 = weights.mapv(|w| w * w).sum();
    0.5 * k * (p * alpha.ln() + n * beta.ln() - n * (2. * std::f64::consts::PI).ln() - log_det)
        - 0.5 * beta * residual
        - 0.5 * alpha * m2
}

impl SurrogateRegressor for BayesianRegressor {
    fn fit(
        &mut self,
        x_train: ArrayView2<f64>,
        y_train: ArrayView2<f64>,
        x_val: ArrayView2<f64>,
        y_val: ArrayView2<f64>,
        epochs: usize,
    ) -> Result<TrainingLog> {
        check_data(&x_train, &y_train, &x_val, &y_val)?;
        let features = self.params.features();
        let design = CenteredDesign::new(features, x_train, y_train)?;
        let (n, k) = design.y.dim();
        let val_phi = (x_val.nrows() > 0).then(|| features.value(&x_val) - &design.phi_mean);

        let mut alpha = self.params.alpha_init();
        let mut beta = self.params.beta_init();
        let mut log = TrainingLog::new();
        let mut weights;
        let mut step = 0;
        loop {
            let filter = design.d.mapv(|d| beta / (alpha + beta * d));
            weights = design.weights(&filter);
            let pred = design.phi.dot(&weights);
            let residual = (&design.y - &pred).mapv(|v| v * v).sum();
            let val_mse = val_phi
                .as_ref()
                .map(|phi| mse(&y_val, &(phi.dot(&weights) + &design.y_mean)));
            let evidence = log_evidence(&design, alpha, beta, &weights, residual);
            debug!(
                "Bayesian: step {} alpha={:e} beta={:e} log_evidence={:e}",
                step, alpha, beta, evidence
            );
            log.push(TrainingStep {
                step,
                train_mse: residual / (n * k) as f64,
                val_mse,
                log_evidence: Some(evidence),
            });
            if step >= epochs {
                break;
            }

            // MacKay updates
            let gamma = design.d.mapv(|d| beta * d / (alpha + beta * d)).sum();
            let m2 = weights.mapv(|w| w * w).sum();
            let new_alpha = (k as f64 * gamma / m2.max(MIN_PRECISION))
                .clamp(MIN_PRECISION, MAX_PRECISION);
            let dof = (n as f64 - gamma).max(1.) * k as f64;
            let new_beta = (dof / residual.max(MIN_PRECISION)).clamp(MIN_PRECISION, MAX_PRECISION);
            let change = ((new_alpha - alpha) / alpha)
                .abs()
                .max(((new_beta - beta) / beta).abs());
            alpha = new_alpha;
            beta = new_beta;
            step += 1;
            if change < self.params.tol() {
                let filter = design.d.mapv(|d| beta / (alpha + beta * d));
                weights = design.weights(&filter);
                break;
            }
        }
        info!(
            "Bayesian: alpha={:e} beta={:e} after {} updates on {} samples",
            alpha, beta, step, n
        );
        self.fitted = Some(BayesianFit {
            phi_mean: design.phi_mean.clone(),
            y_mean: design.y_mean.clone(),
            weights,
            q: design.q.clone(),
            d: design.d.clone(),
            alpha,
            beta,
            n_inputs: x_train.ncols(),
        });
        Ok(log)
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
        let fit = self
            .fitted
            .as_ref()
            .ok_or_else(|| SurrogateError::NotFitted("bayesian regressor".to_string()))?;
        if x.ncols() != fit.n_inputs {
            return Err(SurrogateError::ShapeMismatch(format!(
                "expected {} inputs, got {}",
                fit.n_inputs,
                x.ncols()
            )));
        }
        let phi = self.params.features().value(&x) - &fit.phi_mean;
        let mean = fit.mean(&phi);
        let std = fit.std(&phi).insert_axis(Axis(1));
        let std = std
            .broadcast(mean.raw_dim())
            .map(|s| s.to_owned())
            .ok_or_else(|| SurrogateError::ShapeMismatch("predictive std".to_string()))?;
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
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::{Normal, Uniform};
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;

    fn noisy_line(n: usize, noise: f64, seed: u64) -> (Array2<f64>, Array2<f64>) {
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        let x = Array::random_using((n, 1), Uniform::new(-1., 1.), &mut rng);
        let eps = Array::random_using((n, 1), Normal::new(0., noise).unwrap(), &mut rng);
        let y = x.mapv(|v| 3. * v - 1.) + eps;
        (x, y)
    }

    #[test]
    fn test_bayesian_learns_noise_level() {
        let (xt, yt) = noisy_line(200, 0.1, 0);
        let (xv, yv) = noisy_line(50, 0.1, 1);
        let mut model = BayesianRegressor::params()
            .features(Features::Linear)
            .build()
            .unwrap();
        let log = model
            .fit(xt.view(), yt.view(), xv.view(), yv.view(), 100)
            .unwrap();
        assert!(log.len() > 1);
        let (_, beta) = model.precisions().unwrap();
        // noise std 0.1 gives beta ~ 100
        assert!((50. ..200.).contains(&beta), "beta = {beta}");

        let (mean, std) = model.predict(array![[0.], [0.5]].view()).unwrap();
        assert_abs_diff_eq!(mean, array![[-1.], [0.5]], epsilon = 0.05);
        assert!(std.iter().all(|s| (0.08..0.15).contains(s)));
        let val_mse = log.last().and_then(|s| s.val_mse).unwrap();
        assert!(val_mse < 0.02);
    }

    #[test]
    fn test_evidence_increases() {
        let (xt, yt) = noisy_line(50, 0.2, 2);
        let empty = Array2::zeros((0, 1));
        let mut model = BayesianRegressor::params()
            .features(Features::Linear)
            .tol(0.)
            .build()
            .unwrap();
        let log = model
            .fit(xt.view(), yt.view(), empty.view(), empty.view(), 10)
            .unwrap();
        assert_eq!(log.len(), 11);
        let first = log.steps()[0].log_evidence.unwrap();
        let last = log.last().and_then(|s| s.log_evidence).unwrap();
        assert!(last > first);
    }

    #[test]
    fn test_std_grows_away_from_data() {
        let (xt, yt) = noisy_line(30, 0.05, 3);
        let empty = Array2::zeros((0, 1));
        let mut model = BayesianRegressor::params()
            .features(Features::Quadratic)
            .build()
            .unwrap();
        model
            .fit(xt.view(), yt.view(), empty.view(), empty.view(), 50)
            .unwrap();
        let (_, std) = model.predict(array![[0.], [10.]].view()).unwrap();
        assert!(std[[1, 0]] > std[[0, 0]]);
    }

    #[test]
    fn test_bayesian_errors() {
        assert!(BayesianRegressor::params().alpha_init(0.).build().is_err());
        assert!(BayesianRegressor::params().tol(-1.).build().is_err());
        let model = BayesianRegressor::params().build().unwrap();
        assert!(matches!(
            model.predict(array![[0.]].view()),
            Err(SurrogateError::NotFitted(_))
        ));
        assert!(!model.is_fitted());
    }
}
