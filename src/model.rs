use crate::cache::{Reduction, SamplingRecord, SnapshotCache};
use crate::config::HyperParams;
use crate::dataset::{DatasetAssembler, DatasetBundle, Noise};
use crate::errors::{PodnnError, Result};
use crate::ground_truth::{GroundTruth, SnapshotSet};
use crate::mesh::Mesh;
use crate::metrics::relative_error;
use crate::reconstruct::{restruct, Reconstructor};
use log::{info, warn};
use ndarray::{Array2, Array4, ArrayBase, Axis, Data, Ix2};
use podnn_pod::PodParams;
use podnn_surrogate::{SurrogateRegressor, TrainingLog};
use std::path::Path;

/// Offset added to the seed when sampling test parameters so that they differ
/// from the training ones
const TEST_SEED_OFFSET: u64 = 1;

/// Predicted fields with their uncertainty
#[derive(Clone, Debug)]
pub struct PredictionResult {
    /// Predicted fields mean (n_h, n)
    pub u_mean: Array2<f64>,
    /// Predicted fields std (n_h, n)
    pub u_std: Array2<f64>,
    /// Normalized reduced coefficients mean (n, n_L)
    pub v_mean: Array2<f64>,
    /// Normalized reduced coefficients std (n, n_L)
    pub v_std: Array2<f64>,
}

/// A POD-based reduced-order model of a parametrized ground truth.
///
/// The model samples the parameter space, computes (or reloads) snapshots,
/// compresses them with a POD basis, trains a regressor from the inputs to
/// the reduced coefficients and reconstructs full fields from its predictions.
///
/// ```no_run
/// use podnn::{HyperParams, Mesh, PodnnModel};
/// use podnn::surrogate::BayesianRegressor;
/// use ndarray::{Array2, ArrayView1};
///
/// fn u(mesh: &Mesh, _t: Option<f64>, mu: ArrayView1<f64>) -> Array2<f64> {
///     mesh.coordinates(0).mapv(|x| (mu[0] * x).sin()).insert_axis(ndarray::Axis(0))
/// }
///
/// let hp = HyperParams { mu_min: vec![1.], mu_max: vec![3.], ..HyperParams::default() };
/// let mut model = PodnnModel::new(&hp, Mesh::from_params(&hp).unwrap(), "cache").unwrap();
/// let bundle = model.generate_dataset(&u, true).unwrap();
/// model.train(Box::new(BayesianRegressor::params().build().unwrap()), &bundle).unwrap();
/// let test_set = model.create_test_set(&u).unwrap();
/// let (re_mean, re_std) = model.evaluate(&test_set).unwrap();
/// ```
pub struct PodnnModel<'a> {
    hp: &'a HyperParams,
    mesh: Mesh,
    cache: SnapshotCache,
    reduction: Option<Reduction>,
    regressor: Option<Box<dyn SurrogateRegressor>>,
}

impl<'a> PodnnModel<'a> {
    /// Model of the given configuration on `mesh`, caching data in `cache_dir`.
    ///
    /// The configuration is validated first. A steady mesh gets the time grid
    /// of the configuration when it describes an unsteady problem.
    pub fn new<P: AsRef<Path>>(hp: &'a HyperParams, mesh: Mesh, cache_dir: P) -> Result<Self> {
        hp.validate()?;
        let mesh = if hp.is_time_dependent() && !mesh.is_time_dependent() {
            mesh.with_times(hp.t_min, hp.t_max, hp.n_t)?
        } else {
            mesh
        };
        if mesh.n_t() != hp.n_t {
            return Err(PodnnError::InvalidValue(format!(
                "mesh has {} time steps while n_t = {}",
                mesh.n_t(),
                hp.n_t
            )));
        }
        Ok(PodnnModel {
            hp,
            mesh,
            cache: SnapshotCache::new(cache_dir),
            reduction: None,
            regressor: None,
        })
    }

    /// Hyperparameters
    pub fn hyperparams(&self) -> &HyperParams {
        self.hp
    }

    /// Mesh of the snapshots
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Snapshot cache
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Fitted POD basis and normalizations
    pub fn reduction(&self) -> Option<&Reduction> {
        self.reduction.as_ref()
    }

    /// Draws `n` parameter vectors with the configured sampling method, the
    /// seed being shifted by `seed_offset`
    pub fn sample_parameters(&self, n: usize, seed_offset: u64) -> Result<Array2<f64>> {
        let space = self.hp.parameter_space()?;
        Ok(self
            .hp
            .sampling
            .sample(&space, n, self.hp.seed.wrapping_add(seed_offset)))
    }

    /// Evaluates the ground truth for every parameter vector, in parallel
    pub fn create_snapshots(
        &self,
        u: &dyn GroundTruth,
        mu: &Array2<f64>,
    ) -> Result<SnapshotSet> {
        if mu.ncols() != self.hp.n_mu() {
            return Err(PodnnError::ShapeMismatch(format!(
                "expected {} parameters, got {}",
                self.hp.n_mu(),
                mu.ncols()
            )));
        }
        SnapshotSet::generate(u, &self.mesh, mu, self.hp.n_v)
    }

    /// Snapshots of `n_s` sampled parameters and the resulting regression dataset.
    ///
    /// With `use_cache`, cached snapshots are used when consistent with the
    /// configuration. Otherwise they are computed again, unless `regenerate`
    /// is off in which case the cache error is returned. Computed snapshots
    /// are saved to the cache.
    pub fn generate_dataset(&mut self, u: &dyn GroundTruth, use_cache: bool) -> Result<DatasetBundle> {
        let cached = if use_cache {
            match self.load_snapshots() {
                Ok(snapshots) => Some(snapshots),
                Err(err) if self.hp.regenerate => {
                    warn!("Cannot use cached snapshots ({err}), computing them");
                    None
                }
                Err(err) => return Err(err),
            }
        } else {
            None
        };
        let snapshots = match cached {
            Some(snapshots) => {
                info!("Using {} cached snapshots", snapshots.u().ncols());
                snapshots
            }
            None => {
                let mu = self.sample_parameters(self.hp.n_s, 0)?;
                let snapshots = self.create_snapshots(u, &mu)?;
                let record = SamplingRecord::from_params(self.hp);
                self.cache
                    .save(&self.mesh, &snapshots, self.hp.n_v, Some(&record))?;
                snapshots
            }
        };
        self.convert_dataset(&snapshots)
    }

    fn load_snapshots(&self) -> Result<SnapshotSet> {
        let cached = self.cache.load()?;
        if cached.n_v != self.hp.n_v || cached.mesh != self.mesh {
            return Err(PodnnError::CacheCorrupt(
                "cached snapshots were computed on another mesh".to_string(),
            ));
        }
        if cached.snapshots.n_s() != self.hp.n_s || cached.snapshots.mu().ncols() != self.hp.n_mu()
        {
            return Err(PodnnError::CacheCorrupt(format!(
                "cache holds {} samples of {} parameters",
                cached.snapshots.n_s(),
                cached.snapshots.mu().ncols()
            )));
        }
        let expected = SamplingRecord::from_params(self.hp);
        match &cached.sampling {
            Some(record) if record.matches(&expected) => (),
            Some(record) => {
                return Err(PodnnError::CacheCorrupt(format!(
                    "cached samples were drawn with {record:?}, configuration asks for {expected:?}"
                )))
            }
            None => {
                return Err(PodnnError::CacheCorrupt(
                    "cache does not record how its samples were drawn".to_string(),
                ))
            }
        }
        let space = self.hp.parameter_space()?;
        if let Some(i) = cached
            .snapshots
            .mu()
            .rows()
            .into_iter()
            .position(|mu| !space.contains(&mu))
        {
            return Err(PodnnError::CacheCorrupt(format!(
                "cached sample {i} lies outside the parameter space"
            )));
        }
        Ok(cached.snapshots)
    }

    /// Computes the POD basis of the training snapshots and assembles the
    /// regression dataset. The fitted reduction is kept and saved to the cache.
    ///
    /// Validation and test snapshots are left out of the basis so that their
    /// errors measure the reduction as well as the regression.
    pub fn convert_dataset(&mut self, snapshots: &SnapshotSet) -> Result<DatasetBundle> {
        let assembler = DatasetAssembler::new(self.hp);
        let partition = assembler.partition(snapshots.n_s(), self.hp.train_val_test)?;
        let train_cols = snapshots.columns_of(partition.train());
        let pod = PodParams::new()
            .eps(self.hp.eps)
            .eps_init(self.hp.eps_init)
            .n_l(self.hp.n_l)
            .n_t(snapshots.n_t())
            .build(&snapshots.u().select(Axis(1), &train_cols))?;
        info!(
            "POD basis of rank {} holding {:.6} of the training snapshot energy",
            pod.rank(),
            pod.explained_variance_ratio()
        );
        let noise = Noise {
            u_noise: self.hp.u_noise,
            x_noise: self.hp.x_noise,
        };
        let bundle = assembler.assemble(snapshots, &pod, self.hp.train_val_test, noise)?;
        self.cache
            .save_reduction(&pod, &bundle.x_stats, &bundle.v_stats)?;
        self.reduction = Some(Reduction {
            pod,
            x_stats: bundle.x_stats.clone(),
            v_stats: bundle.v_stats.clone(),
        });
        Ok(bundle)
    }

    /// Restores the reduction saved in the cache
    pub fn load_reduction(&mut self) -> Result<()> {
        let reduction = self.cache.load_reduction()?;
        let n_h = self.hp.n_v * self.mesh.n_xyz();
        if reduction.pod.n_h() != n_h || reduction.x_stats.dim() != self.hp.n_in() {
            return Err(PodnnError::CacheCorrupt(format!(
                "cached reduction of dimension {} with {} inputs",
                reduction.pod.n_h(),
                reduction.x_stats.dim()
            )));
        }
        info!("Loaded POD basis of rank {}", reduction.pod.rank());
        self.reduction = Some(reduction);
        Ok(())
    }

    /// Trains the regressor on the dataset and keeps it for predictions
    pub fn train(
        &mut self,
        mut regressor: Box<dyn SurrogateRegressor>,
        bundle: &DatasetBundle,
    ) -> Result<TrainingLog> {
        let log = regressor.fit(
            bundle.x_train.view(),
            bundle.v_train.view(),
            bundle.x_val.view(),
            bundle.v_val.view(),
            self.hp.epochs,
        )?;
        if let Some(last) = log.last() {
            info!(
                "Training done in {} steps: train_mse={:e} val_mse={:?}",
                log.len(),
                last.train_mse,
                last.val_mse
            );
        }
        self.regressor = Some(regressor);
        Ok(log)
    }

    /// Predicted fields at the given (n, n_in) raw inputs
    pub fn predict(
        &self,
        x: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<PredictionResult> {
        let reduction = self.reduction.as_ref().ok_or_else(|| {
            PodnnError::InvalidValue("no POD basis, generate or load a dataset first".to_string())
        })?;
        let regressor = self.regressor.as_ref().ok_or_else(|| {
            PodnnError::InvalidValue("no regressor, train the model first".to_string())
        })?;
        let x_norm = reduction.x_stats.apply(x)?;
        let (v_mean, v_std) = regressor.predict(x_norm.view())?;
        let (u_mean, u_std) =
            Reconstructor::new(&reduction.pod, &reduction.v_stats)?.reconstruct(&v_mean, &v_std)?;
        Ok(PredictionResult {
            u_mean,
            u_std,
            v_mean,
            v_std,
        })
    }

    /// Snapshots of `n_s_tst` newly sampled parameters
    pub fn create_test_set(&self, u: &dyn GroundTruth) -> Result<SnapshotSet> {
        if self.hp.n_s_tst == 0 {
            return Err(PodnnError::InsufficientSamples(
                "`n_s_tst` is 0, no test sample requested".to_string(),
            ));
        }
        let mu = self.sample_parameters(self.hp.n_s_tst, TEST_SEED_OFFSET)?;
        self.create_snapshots(u, &mu)
    }

    /// Mean and std of the relative errors of the predictions on a test set
    pub fn evaluate(&self, test_set: &SnapshotSet) -> Result<(f64, f64)> {
        let prediction = self.predict(test_set.x_v())?;
        let (mean, std) = relative_error(test_set.u(), &prediction.u_mean, self.hp.re_floor)?;
        info!("Relative error on {} test snapshots: {:.4e} +/- {:.4e}", test_set.u().ncols(), mean, std);
        Ok((mean, std))
    }

    /// Reshapes snapshots into a (n_xyz, n_v, n_t, n_s) array
    pub fn restruct(&self, u: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Array4<f64>> {
        restruct(u, self.hp.n_v, self.mesh.n_xyz(), self.mesh.n_t())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::relative_error_global;
    use ndarray::ArrayView1;
    use podnn_surrogate::{BayesianRegressor, RidgeRegressor};
    use std::f64::consts::PI;

    /// Field with reduced coefficients quadratic in (t, mu)
    fn wave(mesh: &Mesh, t: Option<f64>, mu: ArrayView1<f64>) -> Array2<f64> {
        let t = t.unwrap_or(0.);
        let x = mesh.coordinates(0);
        let u = x.mapv(|x| {
            mu[0] * (PI * x).sin() + mu[0] * t * (2. * PI * x).sin() + mu[1] * mu[1] * (PI * x).cos()
        });
        let v = x.mapv(|x| mu[1] * t * x);
        ndarray::stack![ndarray::Axis(0), u, v]
    }

    /// Burgers analytic solution, smooth for viscosities above 0.05
    fn burgers(mesh: &Mesh, t: Option<f64>, mu: ArrayView1<f64>) -> Array2<f64> {
        let t = t.unwrap_or(1.);
        let nu = mu[0];
        let t0 = (1. / (8. * nu)).exp();
        mesh.coordinates(0)
            .mapv(|x| (x / t) / (1. + (t / t0).sqrt() * (x * x / (4. * nu * t)).exp()))
            .insert_axis(ndarray::Axis(0))
    }

    fn wave_params() -> HyperParams {
        HyperParams {
            n_v: 2,
            n_x: 50,
            n_t: 4,
            t_min: 0.,
            t_max: 1.,
            mu_min: vec![1., 0.5],
            mu_max: vec![2., 1.5],
            n_s: 20,
            n_s_tst: 5,
            eps: 1e-10,
            train_val_test: (0.8, 0.2, 0.),
            epochs: 50,
            seed: 42,
            ..HyperParams::default()
        }
    }

    fn clean_dir(name: &str) -> String {
        let dir = format!("target/tests/model_{name}");
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_end_to_end_wave() {
        let hp = wave_params();
        let mesh = Mesh::from_params(&hp).unwrap();
        let mut model = PodnnModel::new(&hp, mesh, clean_dir("wave")).unwrap();
        let bundle = model.generate_dataset(&wave, true).unwrap();
        assert_eq!(bundle.x_train.dim(), (16 * 4, 3));
        assert_eq!(bundle.u_val.dim(), (100, 4 * 4));

        let regressor = RidgeRegressor::params().build().unwrap();
        let log = model.train(Box::new(regressor), &bundle).unwrap();
        assert!(!log.is_empty());

        let test_set = model.create_test_set(&wave).unwrap();
        assert_eq!(test_set.u().ncols(), 5 * 4);
        let (re_mean, re_std) = model.evaluate(&test_set).unwrap();
        assert!(re_mean < 1e-3, "relative error {re_mean}");
        assert!(re_std < 1e-3);

        let prediction = model.predict(test_set.x_v()).unwrap();
        let fields = model.restruct(&prediction.u_mean).unwrap();
        assert_eq!(fields.dim(), (50, 2, 4, 5));
    }

    #[test]
    fn test_end_to_end_steady_bayesian() {
        let hp = HyperParams {
            n_t: 1,
            n_s: 30,
            epochs: 100,
            ..wave_params()
        };
        let mesh = Mesh::from_params(&hp).unwrap();
        assert!(!mesh.is_time_dependent());
        let mut model = PodnnModel::new(&hp, mesh, clean_dir("steady")).unwrap();
        let bundle = model.generate_dataset(&wave, false).unwrap();
        assert_eq!(bundle.x_train.ncols(), 2);

        let regressor = BayesianRegressor::params().build().unwrap();
        let log = model.train(Box::new(regressor), &bundle).unwrap();
        assert!(log.last().unwrap().log_evidence.is_some());

        let test_set = model.create_test_set(&wave).unwrap();
        let prediction = model.predict(test_set.x_v()).unwrap();
        let re = relative_error_global(test_set.u(), &prediction.u_mean, hp.re_floor).unwrap();
        assert!(re < 1e-2, "relative error {re}");
        assert_eq!(prediction.u_std.dim(), (100, 5));
        assert!(prediction.u_std.iter().all(|s| s.is_finite() && *s >= 0.));
    }

    #[test]
    fn test_end_to_end_burgers() {
        let hp = HyperParams {
            n_v: 1,
            n_x: 64,
            x_min: 0.,
            x_max: 1.5,
            n_t: 5,
            t_min: 1.5,
            t_max: 2.5,
            mu_min: vec![0.1],
            mu_max: vec![0.15],
            n_s: 40,
            n_s_tst: 10,
            eps: 1e-6,
            eps_init: Some(1e-8),
            train_val_test: (0.8, 0.2, 0.),
            epochs: 100,
            seed: 1111,
            ..HyperParams::default()
        };
        let mesh = Mesh::from_params(&hp).unwrap();
        let mut model = PodnnModel::new(&hp, mesh, clean_dir("burgers")).unwrap();
        let bundle = model.generate_dataset(&burgers, false).unwrap();
        let regressor = BayesianRegressor::params().build().unwrap();
        model.train(Box::new(regressor), &bundle).unwrap();

        let test_set = model.create_test_set(&burgers).unwrap();
        let prediction = model.predict(test_set.x_v()).unwrap();
        let re = relative_error_global(test_set.u(), &prediction.u_mean, hp.re_floor).unwrap();
        assert!(re < 0.05, "relative error {re}");
    }

    #[test]
    fn test_cache_reuse_and_fallback() {
        let hp = wave_params();
        let dir = clean_dir("cache_reuse");
        let mesh = Mesh::from_params(&hp).unwrap();

        let strict = HyperParams {
            regenerate: false,
            ..wave_params()
        };
        let mut model = PodnnModel::new(&strict, mesh.clone(), &dir).unwrap();
        assert!(matches!(
            model.generate_dataset(&wave, true),
            Err(PodnnError::CacheMiss(_))
        ));

        let mut model = PodnnModel::new(&hp, mesh.clone(), &dir).unwrap();
        let first = model.generate_dataset(&wave, true).unwrap();
        assert!(model.cache().has_snapshots());

        // a ground truth that must not be called
        let unused = |_: &Mesh, _: Option<f64>, _: ArrayView1<f64>| -> Array2<f64> {
            panic!("snapshots should come from the cache")
        };
        let mut model = PodnnModel::new(&strict, mesh, &dir).unwrap();
        let second = model.generate_dataset(&unused, true).unwrap();
        assert_eq!(first.partition, second.partition);
        approx::assert_abs_diff_eq!(first.v_train, second.v_train, epsilon = 1e-12);
    }

    #[test]
    fn test_cache_with_other_sampling_is_not_reused() {
        let dir = clean_dir("stale_sampling");
        let hp = HyperParams {
            mu_min: vec![1., 0.5],
            mu_max: vec![2., 1.5],
            ..wave_params()
        };
        let mesh = Mesh::from_params(&hp).unwrap();
        let mut model = PodnnModel::new(&hp, mesh.clone(), &dir).unwrap();
        model.generate_dataset(&wave, true).unwrap();

        let moved = HyperParams {
            mu_min: vec![5., 5.5],
            mu_max: vec![6., 6.5],
            ..hp.clone()
        };
        let mut model = PodnnModel::new(&moved, mesh.clone(), &dir).unwrap();
        let bundle = model.generate_dataset(&wave, true).unwrap();
        let mu = bundle.x_train_raw.column(1);
        assert!(mu.iter().all(|m| (5. ..=6.).contains(m)));

        // cache now holds the moved samples, the original bounds cannot use it
        let strict = HyperParams {
            regenerate: false,
            ..hp.clone()
        };
        let mut model = PodnnModel::new(&strict, mesh.clone(), &dir).unwrap();
        assert!(matches!(
            model.generate_dataset(&wave, true),
            Err(PodnnError::CacheCorrupt(_))
        ));

        let reseeded = HyperParams {
            seed: moved.seed + 1,
            regenerate: false,
            ..moved.clone()
        };
        let mut model = PodnnModel::new(&reseeded, mesh, &dir).unwrap();
        assert!(matches!(
            model.generate_dataset(&wave, true),
            Err(PodnnError::CacheCorrupt(_))
        ));
    }

    #[test]
    fn test_cache_without_sampling_record_is_not_reused() {
        let hp = HyperParams {
            regenerate: false,
            ..wave_params()
        };
        let dir = clean_dir("unrecorded");
        let mesh = Mesh::from_params(&hp).unwrap();
        let model = PodnnModel::new(&hp, mesh.clone(), &dir).unwrap();
        let mu = model.sample_parameters(hp.n_s, 0).unwrap();
        let snapshots = model.create_snapshots(&wave, &mu).unwrap();
        model.cache().save(&mesh, &snapshots, hp.n_v, None).unwrap();

        let mut model = PodnnModel::new(&hp, mesh, &dir).unwrap();
        assert!(matches!(
            model.generate_dataset(&wave, true),
            Err(PodnnError::CacheCorrupt(_))
        ));
    }

    #[test]
    fn test_load_reduction_on_custom_mesh() {
        let hp = HyperParams {
            n_v: 1,
            mu_min: vec![1., 0.],
            mu_max: vec![2., 1.],
            n_s: 12,
            ..HyperParams::default()
        };
        let dir = clean_dir("custom_mesh");
        // scattered points, unrelated to n_x
        let points = Array2::from_shape_fn((37, 1), |(i, _)| (i as f64 * 0.37).sin());
        let mesh = Mesh::new(points).unwrap();
        let field = |mesh: &Mesh, _t: Option<f64>, mu: ArrayView1<f64>| -> Array2<f64> {
            mesh.coordinates(0)
                .mapv(|x| mu[0] * x + mu[1] * x * x)
                .insert_axis(ndarray::Axis(0))
        };
        let mut model = PodnnModel::new(&hp, mesh.clone(), &dir).unwrap();
        model.generate_dataset(&field, false).unwrap();
        let rank = model.reduction().unwrap().pod.rank();

        let mut restored = PodnnModel::new(&hp, mesh, &dir).unwrap();
        restored.load_reduction().unwrap();
        let reduction = restored.reduction().unwrap();
        assert_eq!(reduction.pod.n_h(), 37);
        assert_eq!(reduction.pod.rank(), rank);
    }

    #[test]
    fn test_dataset_without_training_samples() {
        let hp = HyperParams {
            n_s: 10,
            train_val_test: (0., 0.5, 0.5),
            ..wave_params()
        };
        let mesh = Mesh::from_params(&hp).unwrap();
        let mut model = PodnnModel::new(&hp, mesh, clean_dir("no_training")).unwrap();
        assert!(matches!(
            model.generate_dataset(&wave, false),
            Err(PodnnError::InsufficientSamples(_))
        ));
    }

    #[test]
    fn test_basis_is_fitted_on_training_snapshots() {
        let hp = wave_params();
        let mesh = Mesh::from_params(&hp).unwrap();
        let mut model = PodnnModel::new(&hp, mesh, clean_dir("training_basis")).unwrap();
        let mu = model.sample_parameters(hp.n_s, 0).unwrap();
        let snapshots = model.create_snapshots(&wave, &mu).unwrap();
        let bundle = model.convert_dataset(&snapshots).unwrap();

        let train_cols = snapshots.columns_of(bundle.partition.train());
        let u_train = snapshots.u().select(ndarray::Axis(1), &train_cols);
        let pod = &model.reduction().unwrap().pod;
        let expected = u_train.mean_axis(ndarray::Axis(1)).unwrap();
        approx::assert_abs_diff_eq!(*pod.mean(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_load_reduction() {
        let hp = wave_params();
        let dir = clean_dir("reduction");
        let mesh = Mesh::from_params(&hp).unwrap();
        let mut model = PodnnModel::new(&hp, mesh.clone(), &dir).unwrap();
        let bundle = model.generate_dataset(&wave, false).unwrap();
        let rank = model.reduction().unwrap().pod.rank();

        let mut restored = PodnnModel::new(&hp, mesh, &dir).unwrap();
        assert!(restored.predict(&bundle.x_train_raw).is_err());
        restored.load_reduction().unwrap();
        assert_eq!(restored.reduction().unwrap().pod.rank(), rank);
        restored
            .train(Box::new(RidgeRegressor::params().build().unwrap()), &bundle)
            .unwrap();
        let prediction = restored.predict(&bundle.x_val_raw).unwrap();
        let (re, _) = relative_error(&bundle.u_val, &prediction.u_mean, hp.re_floor).unwrap();
        assert!(re < 1e-3);
    }

    #[test]
    fn test_invalid_configuration() {
        let hp = HyperParams {
            train_val_test: (0.5, 0.2, 0.2),
            ..wave_params()
        };
        let mesh = Mesh::from_params(&wave_params()).unwrap();
        assert!(matches!(
            PodnnModel::new(&hp, mesh, clean_dir("invalid")),
            Err(PodnnError::RatioSumInvalid(_))
        ));
    }
}
