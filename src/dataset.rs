use crate::config::HyperParams;
use crate::errors::Result;
use crate::ground_truth::SnapshotSet;
use crate::normalization::{NormKind, NormalizationStats};
use crate::partition::Partition;
use log::{debug, info};
use ndarray::{Array2, Axis};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use podnn_pod::Pod;
use rand_xoshiro::Xoshiro256Plus;

/// Relative Gaussian noise levels applied to the training data
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Noise {
    /// Noise std on snapshots, relative to the std of the training snapshots
    pub u_noise: f64,
    /// Noise std on each input, relative to the std of that input
    pub x_noise: f64,
}

/// Regression tensors ready for training, normalized with statistics of the
/// training set. Rows of inputs `x_*` and reduced coefficients `v_*` match.
#[derive(Clone, Debug)]
pub struct DatasetBundle {
    /// Split of the parameter samples
    pub partition: Partition,
    /// Normalized training inputs
    pub x_train: Array2<f64>,
    /// Normalized training coefficients
    pub v_train: Array2<f64>,
    /// Normalized validation inputs
    pub x_val: Array2<f64>,
    /// Normalized validation coefficients
    pub v_val: Array2<f64>,
    /// Normalized test inputs
    pub x_test: Array2<f64>,
    /// Normalized test coefficients
    pub v_test: Array2<f64>,
    /// Training inputs as given to the regressor, before normalization
    pub x_train_raw: Array2<f64>,
    /// Validation inputs before normalization
    pub x_val_raw: Array2<f64>,
    /// Test inputs before normalization
    pub x_test_raw: Array2<f64>,
    /// Validation snapshots (n_h, n_val * n_t)
    pub u_val: Array2<f64>,
    /// Test snapshots (n_h, n_test * n_t)
    pub u_test: Array2<f64>,
    /// Input normalization
    pub x_stats: NormalizationStats,
    /// Reduced coefficients normalization
    pub v_stats: NormalizationStats,
}

/// Builds regression datasets from snapshots and a POD basis: splits parameter
/// samples, projects snapshots, perturbs the training data and normalizes.
#[derive(Clone, Debug)]
pub struct DatasetAssembler {
    norm: NormKind,
    seed: u64,
    shuffle: bool,
}

impl Default for DatasetAssembler {
    fn default() -> Self {
        DatasetAssembler {
            norm: NormKind::MeanStd,
            seed: 0,
            shuffle: true,
        }
    }
}

impl DatasetAssembler {
    /// Assembler configured from hyperparameters
    pub fn new(hp: &HyperParams) -> Self {
        DatasetAssembler {
            norm: hp.norm,
            seed: hp.seed,
            shuffle: hp.shuffle,
        }
    }

    /// Set the normalization kind
    pub fn norm(mut self, norm: NormKind) -> Self {
        self.norm = norm;
        self
    }

    /// Set the seed of the split shuffling and noise
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set whether samples are shuffled before splitting
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Split of `n` parameter samples, the one `assemble` uses for the same
    /// ratios
    pub fn partition(&self, n: usize, ratios: (f64, f64, f64)) -> Result<Partition> {
        Partition::split(n, ratios, self.shuffle.then_some(self.seed))
    }

    /// Assembles the regression dataset of the given snapshots.
    ///
    /// `pod` should be fitted on the training columns of `partition` only,
    /// otherwise validation and test coefficients come from a basis that saw
    /// those samples.
    pub fn assemble(
        &self,
        snapshots: &SnapshotSet,
        pod: &Pod,
        ratios: (f64, f64, f64),
        noise: Noise,
    ) -> Result<DatasetBundle> {
        let partition = self.partition(snapshots.n_s(), ratios)?;
        info!(
            "Dataset split: {} training, {} validation, {} test samples",
            partition.train().len(),
            partition.val().len(),
            partition.test().len()
        );
        let train_cols = snapshots.columns_of(partition.train());
        let val_cols = snapshots.columns_of(partition.val());
        let test_cols = snapshots.columns_of(partition.test());

        let mut x_train_raw = snapshots.x_v().select(Axis(0), &train_cols);
        let mut u_train = snapshots.u().select(Axis(1), &train_cols);
        let x_val_raw = snapshots.x_v().select(Axis(0), &val_cols);
        let u_val = snapshots.u().select(Axis(1), &val_cols);
        let x_test_raw = snapshots.x_v().select(Axis(0), &test_cols);
        let u_test = snapshots.u().select(Axis(1), &test_cols);

        let mut rng = Xoshiro256Plus::seed_from_u64(self.seed.wrapping_add(1));
        if noise.x_noise > 0. {
            debug!("Adding {} relative noise to training inputs", noise.x_noise);
            let std = x_train_raw.std_axis(Axis(0), 0.);
            let perturbation =
                Array2::<f64>::random_using(x_train_raw.raw_dim(), StandardNormal, &mut rng);
            x_train_raw = x_train_raw + perturbation * &std * noise.x_noise;
        }
        if noise.u_noise > 0. {
            debug!("Adding {} relative noise to training snapshots", noise.u_noise);
            let std = u_train.std(0.);
            let perturbation =
                Array2::<f64>::random_using(u_train.raw_dim(), StandardNormal, &mut rng);
            u_train = u_train + perturbation * (std * noise.u_noise);
        }

        let v_train_raw = pod.project(&u_train)?.reversed_axes();
        let v_val_raw = pod.project(&u_val)?.reversed_axes();
        let v_test_raw = pod.project(&u_test)?.reversed_axes();

        let x_stats = NormalizationStats::fit(self.norm, &x_train_raw)?;
        let v_stats = NormalizationStats::fit(self.norm, &v_train_raw)?;

        Ok(DatasetBundle {
            x_train: x_stats.apply(&x_train_raw)?,
            v_train: v_stats.apply(&v_train_raw)?,
            x_val: x_stats.apply(&x_val_raw)?,
            v_val: v_stats.apply(&v_val_raw)?,
            x_test: x_stats.apply(&x_test_raw)?,
            v_test: v_stats.apply(&v_test_raw)?,
            partition,
            x_train_raw,
            x_val_raw,
            x_test_raw,
            u_val,
            u_test,
            x_stats,
            v_stats,
        })
    }
}
