use crate::config::check_ratios;
use crate::errors::{PodnnError, Result};
use ndarray_rand::rand::seq::SliceRandom;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

/// Disjoint train, validation and test sets of parameter sample indices
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    train: Vec<usize>,
    val: Vec<usize>,
    test: Vec<usize>,
}

impl Partition {
    /// Splits `n` parameter samples according to `(train, val, test)` ratios.
    ///
    /// `n_val = round(val * n)`, `n_test = round(test * n)` and training gets
    /// the remaining samples. A null validation or test ratio means the set is
    /// not requested and stays empty. The training set and requested sets
    /// ending up empty is an error.
    /// Samples are shuffled with the given seed, otherwise taken in order.
    pub fn split(n: usize, ratios: (f64, f64, f64), seed: Option<u64>) -> Result<Partition> {
        check_ratios(ratios)?;
        let (r_train, r_val, r_test) = ratios;
        let n_val = (r_val * n as f64).round() as usize;
        let n_test = (r_test * n as f64).round() as usize;
        let n_train = n.saturating_sub(n_val + n_test);
        if n_val + n_test > n {
            return Err(PodnnError::InsufficientSamples(format!(
                "{n} samples cannot hold {n_val} validation and {n_test} test samples"
            )));
        }
        for (name, ratio, count) in [
            ("training", r_train, n_train),
            ("validation", r_val, n_val),
            ("test", r_test, n_test),
        ] {
            let required = ratio > 0. || name == "training";
            if required && count == 0 {
                return Err(PodnnError::InsufficientSamples(format!(
                    "{n} samples leave the {name} set empty with ratio {ratio}"
                )));
            }
        }

        let mut indices: Vec<usize> = (0..n).collect();
        if let Some(seed) = seed {
            let mut rng = Xoshiro256Plus::seed_from_u64(seed);
            indices.shuffle(&mut rng);
        }
        let test = indices.split_off(n_train + n_val);
        let val = indices.split_off(n_train);
        Ok(Partition {
            train: indices,
            val,
            test,
        })
    }

    /// Rebuilds a partition from index sets, checking they are disjoint
    pub fn from_indices(train: Vec<usize>, val: Vec<usize>, test: Vec<usize>) -> Result<Self> {
        let mut all: Vec<usize> = train.iter().chain(&val).chain(&test).cloned().collect();
        all.sort_unstable();
        if all.windows(2).any(|w| w[0] == w[1]) {
            return Err(PodnnError::InvalidValue(
                "partition index sets should be disjoint".to_string(),
            ));
        }
        Ok(Partition { train, val, test })
    }

    /// Training sample indices
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    /// Validation sample indices
    pub fn val(&self) -> &[usize] {
        &self.val
    }

    /// Test sample indices
    pub fn test(&self) -> &[usize] {
        &self.test
    }

    /// Total number of samples
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    /// Whether the partition holds no sample
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
