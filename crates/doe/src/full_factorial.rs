use crate::space::ParameterSpace;
use crate::SamplingMethod;
use linfa::Float;
use ndarray::Array2;

/// The FullFactorial design is the deterministic grid made of all combinations
/// of levels of every parameter.
///
/// Levels are distributed as evenly as possible among parameters so that the grid
/// holds at least `ns` points; the first `ns` points in lexicographic order
/// (first parameter varying slowest) are returned.
#[derive(Clone, Debug)]
pub struct FullFactorial<F: Float> {
    space: ParameterSpace<F>,
}

impl<F: Float> FullFactorial<F> {
    /// Constructor given a parameter space
    ///
    /// ```
    /// use podnn_doe::{FullFactorial, ParameterSpace};
    ///
    /// let space = ParameterSpace::new(&[0.0, 5.0], &[1.0, 10.0]).unwrap();
    /// let doe = FullFactorial::new(&space);
    /// ```
    pub fn new(space: &ParameterSpace<F>) -> Self {
        FullFactorial {
            space: space.clone(),
        }
    }

    /// Number of levels per parameter needed to hold `ns` points
    fn levels(&self, ns: usize) -> Vec<usize> {
        let mut levels = vec![1; self.space.dim()];
        while levels.iter().product::<usize>() < ns {
            // first parameter with the fewest levels gets one more
            let (j, _) = levels
                .iter()
                .enumerate()
                .min_by_key(|(_, n)| **n)
                .unwrap();
            levels[j] += 1;
        }
        levels
    }
}

impl<F: Float> SamplingMethod<F> for FullFactorial<F> {
    fn space(&self) -> &ParameterSpace<F> {
        &self.space
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let levels = self.levels(ns);
        let nx = levels.len();
        let mut doe = Array2::zeros((ns, nx));
        for (i, mut row) in doe.rows_mut().into_iter().enumerate() {
            let mut rest = i;
            for j in (0..nx).rev() {
                let n = levels[j];
                let level = rest % n;
                rest /= n;
                row[j] = if n > 1 {
                    F::cast(level) / F::cast(n - 1)
                } else {
                    F::zero()
                };
            }
        }
        doe
    }
}
