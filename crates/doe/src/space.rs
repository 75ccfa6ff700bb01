use crate::errors::{DoeError, Result};
use linfa::Float;
use ndarray::{Array2, ArrayBase, ArrayView1, Data, Ix1, Ix2};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A box-shaped parameter domain `[mu_min_j, mu_max_j]^n_mu`.
///
/// Bounds are stored as a (n_mu, 2) matrix where the jth row is
/// the `[lower_bound, upper_bound]` interval of the jth parameter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct ParameterSpace<F: Float> {
    bounds: Array2<F>,
}

impl<F: Float> ParameterSpace<F> {
    /// Constructor from lower and upper bound vectors.
    ///
    /// ```
    /// use podnn_doe::ParameterSpace;
    ///
    /// let space = ParameterSpace::new(&[0., 5.], &[1., 10.]).unwrap();
    /// assert_eq!(space.dim(), 2);
    /// ```
    ///
    /// Fails with [DoeError::InvalidDomain] when lengths differ, bounds are empty,
    /// not finite or when `mu_min[j] > mu_max[j]` for some `j`.
    pub fn new(mu_min: &[F], mu_max: &[F]) -> Result<Self> {
        if mu_min.len() != mu_max.len() {
            return Err(DoeError::InvalidDomain(format!(
                "mu_min has {} components while mu_max has {}",
                mu_min.len(),
                mu_max.len()
            )));
        }
        let mut bounds = Array2::zeros((mu_min.len(), 2));
        for (j, (lo, up)) in mu_min.iter().zip(mu_max).enumerate() {
            bounds[[j, 0]] = *lo;
            bounds[[j, 1]] = *up;
        }
        Self::from_bounds(&bounds)
    }

    /// Constructor from a (n_mu, 2) matrix \[\[lower bound, upper bound\], ...\]
    pub fn from_bounds(bounds: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Self> {
        if bounds.ncols() != 2 {
            return Err(DoeError::InvalidDomain(format!(
                "bounds must have 2 columns (lower, upper), got {}",
                bounds.ncols()
            )));
        }
        if bounds.nrows() == 0 {
            return Err(DoeError::InvalidDomain(
                "parameter space has no dimension".to_string(),
            ));
        }
        for (j, row) in bounds.rows().into_iter().enumerate() {
            let (lo, up) = (row[0], row[1]);
            if !lo.is_finite() || !up.is_finite() {
                return Err(DoeError::InvalidDomain(format!(
                    "bounds of parameter {j} are not finite"
                )));
            }
            if lo > up {
                return Err(DoeError::InvalidDomain(format!(
                    "lower bound {lo} is greater than upper bound {up} for parameter {j}"
                )));
            }
        }
        Ok(ParameterSpace {
            bounds: bounds.to_owned(),
        })
    }

    /// Number of parameters `n_mu`
    pub fn dim(&self) -> usize {
        self.bounds.nrows()
    }

    /// The (n_mu, 2) bounds matrix
    pub fn bounds(&self) -> &Array2<F> {
        &self.bounds
    }

    /// Lower bounds `mu_min`
    pub fn lower(&self) -> ArrayView1<'_, F> {
        self.bounds.column(0)
    }

    /// Upper bounds `mu_max`
    pub fn upper(&self) -> ArrayView1<'_, F> {
        self.bounds.column(1)
    }

    /// Whether the given parameter vector lies within the bounds
    pub fn contains(&self, mu: &ArrayBase<impl Data<Elem = F>, Ix1>) -> bool {
        mu.len() == self.dim()
            && mu
                .iter()
                .zip(self.bounds.rows())
                .all(|(v, b)| *v >= b[0] && *v <= b[1])
    }
}
