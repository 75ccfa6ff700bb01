//! Centered design matrix shared by the linear-in-parameters regressors.

use crate::errors::{Result, SurrogateError};
use crate::features::Features;
use linfa_linalg::eigh::*;
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Training data mapped to centered features, with the eigen decomposition
/// `Phi^T Phi = Q diag(d) Q^T` of the centered Gram matrix.
pub(crate) struct CenteredDesign {
    pub phi_mean: Array1<f64>,
    pub y_mean: Array1<f64>,
    pub phi: Array2<f64>,
    pub y: Array2<f64>,
    pub q: Array2<f64>,
    pub d: Array1<f64>,
    /// `Q^T Phi^T Y`
    pub qty: Array2<f64>,
}

impl CenteredDesign {
    pub fn new(features: Features, x: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<Self> {
        let phi = features.value(&x);
        let phi_mean = mean_rows(&phi);
        let y_mean = mean_rows(&y.to_owned());
        let phi = phi - &phi_mean;
        let y = &y - &y_mean;
        let (d, q) = phi.t().dot(&phi).eigh_into()?;
        // round-off can make null eigenvalues slightly negative
        let d = d.mapv(|v| v.max(0.));
        let qty = q.t().dot(&phi.t().dot(&y));
        Ok(CenteredDesign {
            phi_mean,
            y_mean,
            phi,
            y,
            q,
            d,
            qty,
        })
    }

    /// Solution `Q diag(w) Q^T Phi^T Y` of a spectrally filtered system
    pub fn weights(&self, filter: &Array1<f64>) -> Array2<f64> {
        self.q.dot(&(&self.qty * &filter.view().insert_axis(Axis(1))))
    }

    pub fn n_samples(&self) -> usize {
        self.phi.nrows()
    }
}

fn mean_rows(a: &Array2<f64>) -> Array1<f64> {
    a.mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(a.ncols()))
}

/// Mean squared error between two matrices of same shape
pub(crate) fn mse(y: &ArrayView2<f64>, pred: &Array2<f64>) -> f64 {
    let n = y.len().max(1) as f64;
    (y - pred).mapv(|v| v * v).sum() / n
}

/// Checks training (and validation) data consistency
pub(crate) fn check_data(
    x_train: &ArrayView2<f64>,
    y_train: &ArrayView2<f64>,
    x_val: &ArrayView2<f64>,
    y_val: &ArrayView2<f64>,
) -> Result<()> {
    if x_train.nrows() == 0 {
        return Err(SurrogateError::InvalidValue(
            "no training sample".to_string(),
        ));
    }
    if x_train.nrows() != y_train.nrows() {
        return Err(SurrogateError::ShapeMismatch(format!(
            "{} training inputs for {} training outputs",
            x_train.nrows(),
            y_train.nrows()
        )));
    }
    if x_val.nrows() != y_val.nrows() {
        return Err(SurrogateError::ShapeMismatch(format!(
            "{} validation inputs for {} validation outputs",
            x_val.nrows(),
            y_val.nrows()
        )));
    }
    if x_val.nrows() > 0 && (x_val.ncols() != x_train.ncols() || y_val.ncols() != y_train.ncols())
    {
        return Err(SurrogateError::ShapeMismatch(format!(
            "validation data ({}, {}) inconsistent with training data ({}, {})",
            x_val.ncols(),
            y_val.ncols(),
            x_train.ncols(),
            y_train.ncols()
        )));
    }
    if x_train.iter().chain(y_train.iter()).any(|v| !v.is_finite()) {
        return Err(SurrogateError::InvalidValue(
            "training data contains non finite values".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_centered_design() {
        let x = array![[0.], [1.], [2.], [3.]];
        let y = array![[1.], [3.], [5.], [7.]];
        let design = CenteredDesign::new(Features::Linear, x.view(), y.view()).unwrap();
        assert_abs_diff_eq!(design.phi_mean, array![1.5]);
        assert_abs_diff_eq!(design.y_mean, array![4.]);
        // least squares slope
        let w = design.weights(&design.d.mapv(|d| 1. / d));
        assert_abs_diff_eq!(w, array![[2.]], epsilon = 1e-10);
    }

    #[test]
    fn test_check_data() {
        let x = array![[0.], [1.]];
        let y = array![[1.], [3.]];
        let empty = Array2::<f64>::zeros((0, 1));
        assert!(check_data(&x.view(), &y.view(), &empty.view(), &empty.view()).is_ok());
        assert!(check_data(&x.view(), &y.view(), &x.view(), &empty.view()).is_err());
        assert!(check_data(&empty.view(), &empty.view(), &x.view(), &y.view()).is_err());
        let bad = array![[f64::NAN], [1.]];
        assert!(check_data(&bad.view(), &y.view(), &empty.view(), &empty.view()).is_err());
    }
}
