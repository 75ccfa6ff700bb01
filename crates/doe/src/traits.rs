use crate::space::ParameterSpace;
use crate::{FullFactorial, Lhs, LhsKind, Random};
use linfa::Float;
use ndarray::Array2;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Sampling method allowing to draw parameter vectors in a given parameter space
///
/// A sampling method is able to generate a set of `ns` samples in the box
/// `[mu_min_j, mu_max_j]^n_mu` defined by a [ParameterSpace].
pub trait SamplingMethod<F: Float> {
    /// Returns the parameter space the samples are drawn from
    fn space(&self) -> &ParameterSpace<F>;

    /// Generates a (ns, n_mu)-shaped array of samples belonging to `[0., 1.]^n_mu`
    fn normalized_sample(&self, ns: usize) -> Array2<F>;

    /// Generates a (ns, n_mu)-shaped array of samples belonging to the parameter space.
    ///
    /// Each row is a parameter vector `mu_i`.
    fn sample(&self, ns: usize) -> Array2<F> {
        let mut doe = self.normalized_sample(ns);
        for (mut col, b) in doe
            .columns_mut()
            .into_iter()
            .zip(self.space().bounds().rows())
        {
            let (lo, up) = (b[0], b[1]);
            // clamped as lo + 1 * (up - lo) may round past up
            col.mapv_inplace(|u| (lo + u * (up - lo)).max(lo).min(up));
        }
        doe
    }
}

/// Available sampling methods, used to pick a method from configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum SamplingKind {
    /// Maximin Latin Hypercube sampling
    #[default]
    Lhs,
    /// Uniform random sampling
    Random,
    /// Deterministic full factorial grid
    Grid,
}

impl SamplingKind {
    /// Draws `ns` samples in `space` with the selected method seeded with `seed`.
    pub fn sample<F: Float>(&self, space: &ParameterSpace<F>, ns: usize, seed: u64) -> Array2<F> {
        match self {
            SamplingKind::Lhs => Lhs::new(space)
                .kind(LhsKind::Maximin)
                .seed(seed)
                .sample(ns),
            SamplingKind::Random => Random::new(space).seed(seed).sample(ns),
            SamplingKind::Grid => FullFactorial::new(space).sample(ns),
        }
    }
}
