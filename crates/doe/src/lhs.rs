use crate::space::ParameterSpace;
use crate::utils::pdist;
use crate::SamplingMethod;
use linfa::Float;
use ndarray::{Array, Array1, Array2};
use ndarray_rand::{
    rand::seq::SliceRandom, rand::Rng, rand::SeedableRng, rand_distr::Uniform, RandomExt,
};
use ndarray_stats::QuantileExt;
use rand_xoshiro::Xoshiro256Plus;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Number of candidate designs drawn by maximin variants
const MAXIMIN_CANDIDATES: usize = 5;

/// Kinds of Latin Hypercube Design
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum LhsKind {
    /// sample is choosen randomly within its latin hypercube intervals
    #[default]
    Classic,
    /// sample is the middle of its latin hypercube intervals
    Centered,
    /// best of several classic designs wrt the minimal distance between points
    Maximin,
    /// best of several centered designs wrt the minimal distance between points
    CenteredMaximin,
}

/// The LHS design is built as follows: each parameter range is divided into ns sections
/// where ns is the number of samples, and one point is selected in each section,
/// sections being randomly paired across parameters.
/// The selection method gives different kind of LHS (see [LhsKind])
///
/// The random generator is cloned at each sampling call: a seeded [Lhs]
/// always returns the same design.
#[derive(Clone, Debug)]
pub struct Lhs<F: Float, R: Rng + Clone> {
    space: ParameterSpace<F>,
    kind: LhsKind,
    rng: R,
}

/// LHS with default random generator
impl<F: Float> Lhs<F, Xoshiro256Plus> {
    /// Constructor given a parameter space
    ///
    /// ```
    /// use podnn_doe::{Lhs, ParameterSpace};
    ///
    /// let space = ParameterSpace::new(&[0.0, 5.0], &[1.0, 10.0]).unwrap();
    /// let doe = Lhs::new(&space);
    /// ```
    pub fn new(space: &ParameterSpace<F>) -> Self {
        Self::new_with_rng(space, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng + Clone> SamplingMethod<F> for Lhs<F, R> {
    fn space(&self) -> &ParameterSpace<F> {
        &self.space
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let mut rng = self.rng.clone();
        match self.kind {
            LhsKind::Classic => self.classic_lhs(ns, &mut rng),
            LhsKind::Centered => self.centered_lhs(ns, &mut rng),
            LhsKind::Maximin => self.maximin_lhs(ns, false, &mut rng),
            LhsKind::CenteredMaximin => self.maximin_lhs(ns, true, &mut rng),
        }
    }
}

impl<F: Float, R: Rng + Clone> Lhs<F, R> {
    /// Constructor with given parameter space and random generator.
    pub fn new_with_rng(space: &ParameterSpace<F>, rng: R) -> Self {
        Lhs {
            space: space.clone(),
            kind: LhsKind::default(),
            rng,
        }
    }

    /// Sets the kind of LHS
    pub fn kind(mut self, kind: LhsKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the random generator
    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> Lhs<F, R2> {
        Lhs {
            space: self.space,
            kind: self.kind,
            rng,
        }
    }

    /// Uses the default random generator seeded with `seed`
    pub fn seed(self, seed: u64) -> Lhs<F, Xoshiro256Plus> {
        self.with_rng(Xoshiro256Plus::seed_from_u64(seed))
    }

    /// Lower bounds of the ns latin hypercube intervals of `[0, 1]`
    fn cuts(ns: usize) -> (Array1<f64>, f64) {
        let width = 1. / ns.max(1) as f64;
        (Array::range(0., ns as f64, 1.) * width, width)
    }

    fn classic_lhs(&self, ns: usize, rng: &mut R) -> Array2<F> {
        let nx = self.space.dim();
        let (lower, width) = Self::cuts(ns);
        let jitter = Array::random_using((ns, nx), Uniform::new(0., 1.), rng);
        let mut lhs = Array2::zeros((ns, nx));
        for j in 0..nx {
            let mut colj: Vec<f64> = lower
                .iter()
                .zip(jitter.column(j))
                .map(|(a, r)| a + r * width)
                .collect();
            colj.shuffle(rng);
            lhs.column_mut(j).assign(&Array1::from(colj).mapv(F::cast));
        }
        lhs
    }

    fn centered_lhs(&self, ns: usize, rng: &mut R) -> Array2<F> {
        let nx = self.space.dim();
        let (lower, width) = Self::cuts(ns);
        let mut centers = (lower + width / 2.).to_vec();
        let mut lhs = Array2::zeros((ns, nx));
        for j in 0..nx {
            centers.shuffle(rng);
            lhs.column_mut(j)
                .assign(&Array1::from(centers.clone()).mapv(F::cast));
        }
        lhs
    }

    fn maximin_lhs(&self, ns: usize, centered: bool, rng: &mut R) -> Array2<F> {
        let draw = |rng: &mut R| {
            if centered {
                self.centered_lhs(ns, rng)
            } else {
                self.classic_lhs(ns, rng)
            }
        };
        let mut best = draw(rng);
        if ns < 2 {
            return best;
        }
        let mut best_dist = *pdist(&best).min().unwrap();
        for _ in 1..MAXIMIN_CANDIDATES {
            let candidate = draw(rng);
            let d_min = *pdist(&candidate).min().unwrap();
            if d_min > best_dist {
                best_dist = d_min;
                best = candidate;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn space() -> ParameterSpace<f64> {
        ParameterSpace::new(&[5., 0.], &[10., 1.]).unwrap()
    }

    /// Each of the ns intervals of each parameter holds exactly one sample
    fn assert_latin(doe: &Array2<f64>) {
        let ns = doe.nrows();
        for col in doe.columns() {
            let mut bins: Vec<usize> = col
                .iter()
                .map(|v| ((v * ns as f64).floor() as usize).min(ns - 1))
                .collect();
            bins.sort_unstable();
            assert_eq!(bins, (0..ns).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_classic_lhs_is_latin() {
        let doe = Lhs::new(&space()).seed(42).normalized_sample(10);
        assert_eq!(doe.dim(), (10, 2));
        assert_latin(&doe);
    }

    #[test]
    fn test_maximin_lhs_is_latin() {
        let doe = Lhs::new(&space())
            .kind(LhsKind::Maximin)
            .seed(42)
            .normalized_sample(12);
        assert_latin(&doe);
    }

    #[test]
    fn test_centered_lhs() {
        let doe = Lhs::new(&space())
            .kind(LhsKind::CenteredMaximin)
            .seed(0)
            .sample(5);
        let mut first: Vec<f64> = doe.column(0).to_vec();
        first.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(
            Array1::from(first),
            ndarray::array![5.5, 6.5, 7.5, 8.5, 9.5],
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_seeded_lhs_is_deterministic() {
        let lhs = Lhs::new(&space()).seed(42);
        assert_eq!(lhs.sample(6), lhs.sample(6));
        assert_ne!(lhs.sample(6), Lhs::new(&space()).seed(43).sample(6));
    }

    #[test]
    fn test_single_sample() {
        let doe = Lhs::new(&space())
            .kind(LhsKind::Maximin)
            .seed(1)
            .sample(1);
        assert_eq!(doe.dim(), (1, 2));
        assert!(space().contains(&doe.row(0)));
    }
}
