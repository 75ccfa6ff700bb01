use crate::errors::{PodnnError, Result};
use crate::normalization::NormKind;
use podnn_doe::{ParameterSpace, SamplingKind};
use serde::{Deserialize, Serialize};

fn default_one() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_ratios() -> (f64, f64, f64) {
    (0.8, 0.2, 0.)
}

fn default_re_floor() -> f64 {
    1e-12
}

/// Hyperparameters of a reduced-order model, immutable once built and passed
/// by reference through the pipeline.
///
/// Keys follow the usual POD-NN naming so a json file like
/// ```json
/// {"n_v": 1, "n_x": 256, "x_min": 0.0, "x_max": 1.5, "n_t": 100, "t_min": 1.0,
///  "t_max": 5.0, "mu_min": [0.001], "mu_max": [0.0100], "n_s": 20, "n_s_tst": 5,
///  "eps": 1e-10, "eps_init": 1e-10, "n_L": 10, "train_val_test": [0.8, 0.2, 0.0],
///  "epochs": 100, "seed": 1111}
/// ```
/// can be read with `serde_json::from_str`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    /// Number of field components
    #[serde(default = "default_one")]
    pub n_v: usize,
    /// Number of mesh points along x
    pub n_x: usize,
    /// Number of mesh points along y, 0 for 1D meshes
    #[serde(default)]
    pub n_y: usize,
    /// Number of time steps, 1 for steady problems
    #[serde(default = "default_one")]
    pub n_t: usize,
    /// Mesh lower bound along x
    #[serde(default)]
    pub x_min: f64,
    /// Mesh upper bound along x
    pub x_max: f64,
    /// Mesh lower bound along y
    #[serde(default)]
    pub y_min: f64,
    /// Mesh upper bound along y
    #[serde(default)]
    pub y_max: f64,
    /// First time step
    #[serde(default)]
    pub t_min: f64,
    /// Last time step
    #[serde(default)]
    pub t_max: f64,
    /// Parameter lower bounds
    pub mu_min: Vec<f64>,
    /// Parameter upper bounds
    pub mu_max: Vec<f64>,
    /// Number of parameter samples of the training dataset
    pub n_s: usize,
    /// Number of parameter samples of the test dataset
    #[serde(default)]
    pub n_s_tst: usize,
    /// POD truncation threshold
    pub eps: f64,
    /// First stage threshold of the two-stage POD
    #[serde(default)]
    pub eps_init: Option<f64>,
    /// Max number of POD modes
    #[serde(default, rename = "n_L")]
    pub n_l: Option<usize>,
    /// Train, validation and test ratios of the parameter samples
    #[serde(default = "default_ratios")]
    pub train_val_test: (f64, f64, f64),
    /// Training epochs given to the regressor
    #[serde(default)]
    pub epochs: usize,
    /// Learning rate, forwarded to regressors using one
    #[serde(default)]
    pub lr: f64,
    /// Relative noise added to training snapshots
    #[serde(default)]
    pub u_noise: f64,
    /// Relative noise added to training inputs
    #[serde(default)]
    pub x_noise: f64,
    /// Normalization of inputs and reduced coefficients
    #[serde(default)]
    pub norm: NormKind,
    /// Seed of every random generator of the pipeline
    #[serde(default)]
    pub seed: u64,
    /// Parameter space sampling method
    #[serde(default)]
    pub sampling: SamplingKind,
    /// Whether parameter samples are shuffled before splitting
    #[serde(default = "default_true")]
    pub shuffle: bool,
    /// Whether snapshots are regenerated when the cache cannot be used
    #[serde(default = "default_true")]
    pub regenerate: bool,
    /// Lower bound of the norms dividing relative errors
    #[serde(default = "default_re_floor")]
    pub re_floor: f64,
}

impl Default for HyperParams {
    fn default() -> Self {
        HyperParams {
            n_v: 1,
            n_x: 100,
            n_y: 0,
            n_t: 1,
            x_min: 0.,
            x_max: 1.,
            y_min: 0.,
            y_max: 0.,
            t_min: 0.,
            t_max: 0.,
            mu_min: vec![0.],
            mu_max: vec![1.],
            n_s: 100,
            n_s_tst: 0,
            eps: 1e-10,
            eps_init: None,
            n_l: None,
            train_val_test: default_ratios(),
            epochs: 100,
            lr: 0.,
            u_noise: 0.,
            x_noise: 0.,
            norm: NormKind::MeanStd,
            seed: 1111,
            sampling: SamplingKind::Lhs,
            shuffle: true,
            regenerate: true,
            re_floor: default_re_floor(),
        }
    }
}

impl HyperParams {
    /// Whether snapshots depend on time
    pub fn is_time_dependent(&self) -> bool {
        self.n_t > 1
    }

    /// Number of parameters `n_mu`
    pub fn n_mu(&self) -> usize {
        self.mu_min.len()
    }

    /// Number of mesh points `n_xyz`
    pub fn n_xyz(&self) -> usize {
        self.n_x * self.n_y.max(1)
    }

    /// Full-order dimension `n_h = n_v * n_xyz`
    pub fn n_h(&self) -> usize {
        self.n_v * self.n_xyz()
    }

    /// Number of regression inputs: the parameters, plus time when unsteady
    pub fn n_in(&self) -> usize {
        self.n_mu() + usize::from(self.is_time_dependent())
    }

    /// Parameter space of the configuration
    pub fn parameter_space(&self) -> Result<ParameterSpace<f64>> {
        Ok(ParameterSpace::new(&self.mu_min, &self.mu_max)?)
    }

    /// Checks consistency of the configuration before any computation.
    ///
    /// Fails with `InvalidDomain` on malformed parameter bounds and
    /// `RatioSumInvalid` on malformed split ratios.
    pub fn validate(&self) -> Result<()> {
        self.parameter_space()?;
        check_ratios(self.train_val_test)?;
        if self.n_v == 0 || self.n_x == 0 || self.n_t == 0 || self.n_s == 0 {
            return Err(PodnnError::InvalidValue(
                "`n_v`, `n_x`, `n_t` and `n_s` should be positive".to_string(),
            ));
        }
        if !(0. ..1.).contains(&self.eps) {
            return Err(PodnnError::InvalidValue(format!(
                "`eps` should be in [0, 1), got {}",
                self.eps
            )));
        }
        if self.n_l == Some(0) {
            return Err(PodnnError::InvalidValue("`n_L` cannot be 0".to_string()));
        }
        if !(self.u_noise >= 0. && self.x_noise >= 0.) {
            return Err(PodnnError::InvalidValue(format!(
                "noise levels should be non negative, got u_noise={} x_noise={}",
                self.u_noise, self.x_noise
            )));
        }
        if !(self.re_floor >= 0.) {
            return Err(PodnnError::InvalidValue(format!(
                "`re_floor` should be non negative, got {}",
                self.re_floor
            )));
        }
        if self.x_min > self.x_max || self.y_min > self.y_max || self.t_min > self.t_max {
            return Err(PodnnError::InvalidValue(
                "mesh and time bounds should satisfy min <= max".to_string(),
            ));
        }
        Ok(())
    }
}

/// Split ratios should be finite, non negative and sum to 1
pub(crate) fn check_ratios(ratios: (f64, f64, f64)) -> Result<()> {
    let (train, val, test) = ratios;
    if [train, val, test]
        .iter()
        .any(|r| !r.is_finite() || *r < 0.)
    {
        return Err(PodnnError::RatioSumInvalid(format!(
            "ratios should be finite and non negative, got {ratios:?}"
        )));
    }
    let sum = train + val + test;
    if (sum - 1.).abs() > 1e-6 {
        return Err(PodnnError::RatioSumInvalid(format!(
            "ratios {ratios:?} sum to {sum}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_config() {
        let json = r#"{"n_v": 1, "n_x": 256, "x_min": 0.0, "x_max": 1.5, "n_t": 100,
            "t_min": 1.0, "t_max": 5.0, "mu_min": [0.001], "mu_max": [0.01], "n_s": 20,
            "eps": 1e-10, "eps_init": 1e-10, "n_L": 10, "train_val_test": [0.6, 0.2, 0.2],
            "norm": "MinMax", "sampling": "Random", "seed": 1111}"#;
        let hp: HyperParams = serde_json::from_str(json).unwrap();
        assert_eq!(hp.n_l, Some(10));
        assert_eq!(hp.norm, NormKind::MinMax);
        assert_eq!(hp.sampling, SamplingKind::Random);
        assert!(hp.is_time_dependent());
        assert_eq!(hp.n_in(), 2);
        assert_eq!(hp.n_h(), 256);
        assert!(hp.regenerate && hp.shuffle);
        hp.validate().unwrap();

        let back: HyperParams = serde_json::from_str(&serde_json::to_string(&hp).unwrap()).unwrap();
        assert_eq!(back, hp);
    }

    #[test]
    fn test_invalid_domain() {
        let hp = HyperParams {
            mu_min: vec![1., 0.],
            mu_max: vec![0., 1.],
            ..HyperParams::default()
        };
        assert!(matches!(hp.validate(), Err(PodnnError::InvalidDomain(_))));
    }

    #[test]
    fn test_invalid_ratios() {
        for ratios in [(0.5, 0.2, 0.2), (1.2, -0.2, 0.), (f64::NAN, 0.5, 0.5)] {
            let hp = HyperParams {
                train_val_test: ratios,
                ..HyperParams::default()
            };
            assert!(matches!(hp.validate(), Err(PodnnError::RatioSumInvalid(_))));
        }
    }
}
