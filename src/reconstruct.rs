use crate::errors::{PodnnError, Result};
use crate::normalization::NormalizationStats;
use ndarray::{Array2, Array4, ArrayBase, Data, Ix2};
use podnn_pod::Pod;

/// Maps normalized reduced coefficients back to full-order fields.
#[derive(Clone, Copy, Debug)]
pub struct Reconstructor<'a> {
    pod: &'a Pod,
    v_stats: &'a NormalizationStats,
}

impl<'a> Reconstructor<'a> {
    /// Reconstructor of fields reduced by `pod`, coefficients being normalized
    /// with `v_stats`
    pub fn new(pod: &'a Pod, v_stats: &'a NormalizationStats) -> Result<Self> {
        if pod.rank() != v_stats.dim() {
            return Err(PodnnError::ShapeMismatch(format!(
                "POD rank {} differs from the {} normalized coefficients",
                pod.rank(),
                v_stats.dim()
            )));
        }
        Ok(Reconstructor { pod, v_stats })
    }

    /// Fields mean and std (n_h, n) from the normalized coefficients mean and
    /// std (n, n_L).
    ///
    /// Coefficients are assumed independent, so the field variance is
    /// `(V o V) Var(coeffs)`.
    pub fn reconstruct(
        &self,
        v_mean: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        v_std: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<(Array2<f64>, Array2<f64>)> {
        if v_mean.dim() != v_std.dim() {
            return Err(PodnnError::ShapeMismatch(format!(
                "coefficients mean {:?} and std {:?} differ",
                v_mean.dim(),
                v_std.dim()
            )));
        }
        let coeffs = self.v_stats.inverse(v_mean)?;
        let std = self.v_stats.inverse_std(v_std)?;
        let u_mean = self.pod.lift(&coeffs.reversed_axes())?;
        let basis_sq = self.pod.basis().mapv(|v| v * v);
        let u_var = basis_sq.dot(&std.mapv(|s| s * s).reversed_axes());
        Ok((u_mean, u_var.mapv(f64::sqrt)))
    }
}

/// Reshapes (n_v * n_xyz, n_s * n_t) snapshots into a (n_xyz, n_v, n_t, n_s)
/// array indexed by point, component, time step and sample.
pub fn restruct(
    u: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    n_v: usize,
    n_xyz: usize,
    n_t: usize,
) -> Result<Array4<f64>> {
    let (n_h, n_cols) = u.dim();
    if n_h != n_v * n_xyz || n_t == 0 || n_cols % n_t != 0 {
        return Err(PodnnError::ShapeMismatch(format!(
            "snapshots ({n_h}, {n_cols}) cannot be split in {n_v} components on \
             {n_xyz} points and {n_t} time steps"
        )));
    }
    let n_s = n_cols / n_t;
    Ok(Array4::from_shape_fn((n_xyz, n_v, n_t, n_s), |(p, v, k, s)| {
        u[[v * n_xyz + p, s * n_t + k]]
    }))
}
