use crate::space::ParameterSpace;
use crate::SamplingMethod;
use linfa::Float;
use ndarray::{Array, Array2};
use ndarray_rand::{rand::Rng, rand::SeedableRng, rand_distr::Uniform, RandomExt};
use rand_xoshiro::Xoshiro256Plus;

/// The Random design consists in drawing samples uniformly in the parameter space.
///
/// It is the fallback when a space-filling design is not wanted.
#[derive(Clone, Debug)]
pub struct Random<F: Float, R: Rng + Clone> {
    space: ParameterSpace<F>,
    rng: R,
}

impl<F: Float> Random<F, Xoshiro256Plus> {
    /// Constructor given a parameter space
    ///
    /// ```
    /// use podnn_doe::{ParameterSpace, Random};
    ///
    /// let space = ParameterSpace::new(&[0.0, 5.0], &[1.0, 10.0]).unwrap();
    /// let doe = Random::new(&space);
    /// ```
    pub fn new(space: &ParameterSpace<F>) -> Self {
        Self::new_with_rng(space, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng + Clone> Random<F, R> {
    /// Constructor given a parameter space and a random generator for reproducibility
    pub fn new_with_rng(space: &ParameterSpace<F>, rng: R) -> Self {
        Random {
            space: space.clone(),
            rng,
        }
    }

    /// Set random generator
    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> Random<F, R2> {
        Random {
            space: self.space,
            rng,
        }
    }

    /// Uses the default random generator seeded with `seed`
    pub fn seed(self, seed: u64) -> Random<F, Xoshiro256Plus> {
        self.with_rng(Xoshiro256Plus::seed_from_u64(seed))
    }
}

impl<F: Float, R: Rng + Clone> SamplingMethod<F> for Random<F, R> {
    fn space(&self) -> &ParameterSpace<F> {
        &self.space
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let mut rng = self.rng.clone();
        let nx = self.space.dim();
        Array::random_using((ns, nx), Uniform::new(0., 1.), &mut rng).mapv(|v: f64| F::cast(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random() {
        let space = ParameterSpace::new(&[5., 0.], &[10., 1.]).unwrap();
        let doe = Random::new(&space).seed(42);
        let mu = doe.sample(9);
        assert_eq!(mu.dim(), (9, 2));
        assert!(mu.rows().into_iter().all(|row| space.contains(&row)));
        assert_eq!(mu, doe.sample(9));
    }
}
