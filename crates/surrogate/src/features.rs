//! Polynomial features used by the linear-in-parameters regressors.
//!
//! The constant term is not part of the features: regressors center
//! features and outputs and recover the intercept from the means.

use ndarray::{concatenate, s, Array2, ArrayBase, Axis, Data, Ix2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Polynomial feature map applied to the (n, nx) regression inputs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum Features {
    /// `phi(x) = [x_1, ..., x_n]`
    Linear,
    /// `phi(x) = [{x_i}, {x_i * x_j, j >= i}]`
    #[default]
    Quadratic,
}

impl Features {
    /// Number of features for inputs of dimension `nx`
    pub fn dim(&self, nx: usize) -> usize {
        match self {
            Features::Linear => nx,
            Features::Quadratic => nx + nx * (nx + 1) / 2,
        }
    }

    /// Feature matrix (n, dim(nx)) of the given inputs
    pub fn value(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array2<f64> {
        match self {
            Features::Linear => x.to_owned(),
            Features::Quadratic => {
                let mut parts = vec![x.to_owned()];
                for k in 0..x.ncols() {
                    parts.push(&x.slice(s![.., k..]) * &x.slice(s![.., k..k + 1]));
                }
                let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
                // all parts have x.nrows() rows
                concatenate(Axis(1), &views).unwrap()
            }
        }
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Features::Linear => write!(f, "Linear"),
            Features::Quadratic => write!(f, "Quadratic"),
        }
    }
}
