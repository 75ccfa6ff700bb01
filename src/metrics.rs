//! Relative error statistics between true and predicted snapshots.

use crate::errors::{PodnnError, Result};
use ndarray::{Array1, ArrayBase, Data, Ix2, Zip};

fn check_shapes(
    u_true: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    u_pred: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Result<()> {
    if u_true.dim() != u_pred.dim() {
        return Err(PodnnError::ShapeMismatch(format!(
            "true snapshots {:?} and predictions {:?} differ",
            u_true.dim(),
            u_pred.dim()
        )));
    }
    Ok(())
}

/// Per-snapshot relative errors `||u_true_i - u_pred_i|| / max(||u_true_i||, floor)`
/// over the columns of (n_h, n) matrices
pub fn relative_errors(
    u_true: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    u_pred: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    floor: f64,
) -> Result<Array1<f64>> {
    check_shapes(u_true, u_pred)?;
    Ok(Zip::from(u_true.columns())
        .and(u_pred.columns())
        .map_collect(|t, p| {
            let diff = t
                .iter()
                .zip(p.iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt();
            let norm = t.dot(&t).sqrt().max(floor);
            if diff == 0. {
                0.
            } else {
                diff / norm
            }
        }))
}

/// Mean and population std of the per-snapshot relative errors.
///
/// Identical inputs give exactly `(0., 0.)`.
pub fn relative_error(
    u_true: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    u_pred: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    floor: f64,
) -> Result<(f64, f64)> {
    let errors = relative_errors(u_true, u_pred, floor)?;
    let mean = errors.mean().ok_or_else(|| {
        PodnnError::InvalidValue("relative error of empty snapshot sets".to_string())
    })?;
    Ok((mean, errors.std(0.)))
}

/// Relative error `||U_true - U_pred||_F / max(||U_true||_F, floor)` over
/// all snapshots at once
pub fn relative_error_global(
    u_true: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    u_pred: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    floor: f64,
) -> Result<f64> {
    check_shapes(u_true, u_pred)?;
    let diff = (u_true - u_pred).mapv(|v| v * v).sum().sqrt();
    if diff == 0. {
        return Ok(0.);
    }
    let norm = u_true.mapv(|v| v * v).sum().sqrt().max(floor);
    Ok(diff / norm)
}
