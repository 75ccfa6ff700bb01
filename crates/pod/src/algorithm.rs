use crate::errors::{PodError, Result};
use crate::parameters::{PodParams, PodValidParams};
use linfa::ParamGuard;
use linfa_linalg::svd::*;
use log::{debug, info, warn};
use ndarray::{concatenate, s, Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2};
use std::cmp::Ordering;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Centered energy below this fraction of the snapshot energy means all
/// snapshots are the same field
const DEGENERATE_TOL: f64 = f64::EPSILON;

/// A Proper Orthogonal Decomposition of a snapshot matrix.
///
/// Given snapshots `U` of shape (n_h, n) where each column is a field,
/// the POD is `U ~ mean + V . V^T (U - mean)` where `V` is the (n_h, n_L)
/// orthonormal matrix of the `n_L` dominant left singular vectors of the
/// centered snapshots.
///
/// ```
/// use podnn_pod::Pod;
/// use ndarray::array;
///
/// let u = array![[1., 2., 3.], [2., 4., 6.1], [0., 0., 0.]];
/// let pod = Pod::params().eps(1e-3).build(&u).unwrap();
/// assert_eq!(pod.rank(), 1);
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Pod {
    /// Orthonormal reduced basis (n_h, n_L)
    basis: Array2<f64>,
    /// Mean snapshot (n_h,)
    mean: Array1<f64>,
    /// Singular values of the centered snapshots, in descending order
    singular_values: Array1<f64>,
}

impl Pod {
    /// POD parameters constructor
    pub fn params() -> PodParams {
        PodParams::new()
    }

    /// Rebuilds a POD from its components, checking their consistency.
    pub fn from_parts(
        basis: Array2<f64>,
        mean: Array1<f64>,
        singular_values: Array1<f64>,
    ) -> Result<Pod> {
        if basis.nrows() != mean.len() {
            return Err(PodError::ShapeMismatch(format!(
                "basis has {} rows while mean has {} components",
                basis.nrows(),
                mean.len()
            )));
        }
        if basis.ncols() == 0 || basis.ncols() > singular_values.len() {
            return Err(PodError::ShapeMismatch(format!(
                "basis rank {} inconsistent with {} singular values",
                basis.ncols(),
                singular_values.len()
            )));
        }
        Ok(Pod {
            basis,
            mean,
            singular_values,
        })
    }

    /// Reduced basis `V` (n_h, n_L)
    pub fn basis(&self) -> &Array2<f64> {
        &self.basis
    }

    /// Mean snapshot (n_h,)
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// All singular values of the centered snapshot matrix in descending order
    pub fn singular_values(&self) -> &Array1<f64> {
        &self.singular_values
    }

    /// Truncation rank `n_L`
    pub fn rank(&self) -> usize {
        self.basis.ncols()
    }

    /// Dimension of the full-order fields `n_h`
    pub fn n_h(&self) -> usize {
        self.basis.nrows()
    }

    /// Fraction of the snapshot energy held by the retained modes
    pub fn explained_variance_ratio(&self) -> f64 {
        let energy = self.singular_values.mapv(|s| s * s);
        let total = energy.sum();
        if total == 0. {
            1.
        } else {
            energy.slice(s![..self.rank()]).sum() / total
        }
    }

    /// Reduced coefficients `V^T (U - mean)` of shape (n_L, n)
    pub fn project(&self, u: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Array2<f64>> {
        self.check_rows(u.nrows())?;
        let centered = u - &self.mean.view().insert_axis(Axis(1));
        Ok(self.basis.t().dot(&centered))
    }

    /// Full-order fields `V . v + mean` of shape (n_h, n) from coefficients (n_L, n)
    pub fn lift(&self, v: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Array2<f64>> {
        if v.nrows() != self.rank() {
            return Err(PodError::ShapeMismatch(format!(
                "expected {} reduced coefficients, got {}",
                self.rank(),
                v.nrows()
            )));
        }
        Ok(self.basis.dot(v) + &self.mean.view().insert_axis(Axis(1)))
    }

    fn check_rows(&self, n_h: usize) -> Result<()> {
        if n_h != self.n_h() {
            return Err(PodError::ShapeMismatch(format!(
                "expected snapshots with {} dofs, got {}",
                self.n_h(),
                n_h
            )));
        }
        Ok(())
    }
}

impl PodParams {
    /// Computes the POD of the given (n_h, n) snapshot matrix
    pub fn build(&self, snapshots: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Pod> {
        self.check_ref()?.build(snapshots)
    }
}

impl PodValidParams {
    /// Computes the POD of the given (n_h, n) snapshot matrix
    pub fn build(&self, snapshots: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Pod> {
        let (n_h, n) = snapshots.dim();
        if n_h == 0 || n == 0 {
            return Err(PodError::ShapeMismatch(format!(
                "snapshot matrix ({n_h}, {n}) is empty"
            )));
        }
        let mean = snapshots.mean_axis(Axis(1)).unwrap();
        let centered = snapshots - &mean.view().insert_axis(Axis(1));

        let total = snapshots.iter().map(|v| v * v).sum::<f64>();
        let centered_energy = centered.iter().map(|v| v * v).sum::<f64>();
        if centered_energy <= DEGENERATE_TOL * total.max(1.) {
            if self.strict() {
                return Err(PodError::DegenerateSnapshotSet(format!(
                    "the {n} snapshots have zero variance"
                )));
            }
            warn!("POD: the {n} snapshots have zero variance, falling back to a rank-1 basis");
            let mut basis = Array2::zeros((n_h, 1));
            basis[[0, 0]] = 1.;
            return Ok(Pod {
                basis,
                mean,
                singular_values: Array1::zeros(1),
            });
        }

        let (modes, sigma) = match self.eps_init() {
            Some(eps_init) if self.n_t() > 1 => {
                let compressed = self.first_stage(&centered, eps_init)?;
                sorted_svd(&compressed.view())?
            }
            _ => sorted_svd(&centered.view())?,
        };
        let n_l = truncation_rank(&sigma, self.eps(), self.n_l());
        info!(
            "POD: constructing the reduced basis with n_L={} out of {} modes",
            n_l,
            sigma.len()
        );
        Ok(Pod {
            basis: modes.slice(s![.., ..n_l]).to_owned(),
            mean,
            singular_values: sigma,
        })
    }

    /// First stage of a two-stage POD: each block of `n_t` consecutive columns is
    /// compressed by its own truncated POD, the resulting modes weighted by their
    /// singular values are concatenated.
    fn first_stage(&self, centered: &Array2<f64>, eps_init: f64) -> Result<Array2<f64>> {
        let n_t = self.n_t();
        let n = centered.ncols();
        if n % n_t != 0 {
            return Err(PodError::InvalidValue(format!(
                "{n} snapshots cannot be split in blocks of {n_t} columns"
            )));
        }
        let blocks = (0..n / n_t)
            .map(|b| {
                let block = centered.slice(s![.., b * n_t..(b + 1) * n_t]);
                let (modes, sigma) = sorted_svd(&block)?;
                let r = truncation_rank(&sigma, eps_init, None);
                Ok(&modes.slice(s![.., ..r]) * &sigma.slice(s![..r]))
            })
            .collect::<Result<Vec<_>>>()?;
        let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
        let compressed = concatenate(Axis(1), &views).map_err(|e| {
            PodError::ShapeMismatch(format!("first stage POD blocks mismatch: {e}"))
        })?;
        debug!(
            "POD: first stage reduced {} snapshots to {} weighted modes",
            n,
            compressed.ncols()
        );
        Ok(compressed)
    }
}

/// Thin SVD `x = U S V^T` returning `(U, S)` with singular values in descending
/// order, ties kept in ascending index order.
fn sorted_svd(x: &ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
    let (u, sigma) = if x.nrows() >= x.ncols() {
        let (u, sigma, _) = x.svd(true, false)?;
        (u, sigma)
    } else {
        // left singular vectors of x are the right ones of x^T
        let (_, sigma, vt) = x.t().svd(false, true)?;
        (vt.map(|vt| vt.reversed_axes()), sigma)
    };
    let u = u.ok_or_else(|| PodError::InvalidValue("SVD without singular vectors".to_string()))?;

    let k = sigma.len().min(u.ncols());
    let mut order: Vec<usize> = (0..k).collect();
    // stable sort
    order.sort_by(|&i, &j| sigma[j].partial_cmp(&sigma[i]).unwrap_or(Ordering::Equal));
    Ok((u.select(Axis(1), &order), sigma.select(Axis(0), &order)))
}

/// Smallest rank `r` such that the `r` first singular values hold at least
/// `1 - eps` of the energy (all of them when `eps = 0`), capped by `n_l`.
/// Always at least 1.
pub fn truncation_rank(sigma: &Array1<f64>, eps: f64, n_l: Option<usize>) -> usize {
    let n = sigma.len();
    let mut rank = n;
    if eps > 0. {
        let energy = sigma.mapv(|s| s * s);
        let total = energy.sum();
        if total > 0. {
            let mut cumulated = 0.;
            for (i, e) in energy.iter().enumerate() {
                cumulated += e;
                if cumulated / total >= 1. - eps {
                    rank = i + 1;
                    break;
                }
            }
        }
    }
    if let Some(n_l) = n_l {
        rank = rank.min(n_l);
    }
    rank.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;

    fn random_snapshots(n_h: usize, n: usize) -> Array2<f64> {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        Array::random_using((n_h, n), Uniform::new(-1., 1.), &mut rng)
    }

    /// Snapshots u(x; mu) = sum_k mu^k sin(k pi x) / k^2 with fast decaying modes
    fn smooth_snapshots(n_h: usize, n: usize) -> Array2<f64> {
        let x = Array::linspace(0f64, 1., n_h);
        let mu = Array::linspace(0.5f64, 1.5, n);
        Array2::from_shape_fn((n_h, n), |(i, j)| {
            (1..=8)
                .map(|k| {
                    let k = k as f64;
                    mu[j].powf(k) * (k * std::f64::consts::PI * x[i]).sin() / (k * k)
                })
                .sum()
        })
    }

    #[test]
    fn test_basis_orthonormality() {
        let u = random_snapshots(100, 20);
        let pod = Pod::params().build(&u).unwrap();
        let vtv = pod.basis().t().dot(pod.basis());
        let err = (&vtv - &Array2::<f64>::eye(pod.rank()))
            .iter()
            .fold(0f64, |acc, v| acc.max(v.abs()));
        assert!(err < 1e-8, "max |V^T V - I| = {err}");
    }

    #[test]
    fn test_no_truncation_rank() {
        let u = random_snapshots(30, 12);
        let pod = Pod::params().build(&u).unwrap();
        assert_eq!(pod.rank(), 12);
        let u = random_snapshots(5, 12);
        let pod = Pod::params().build(&u).unwrap();
        assert_eq!(pod.rank(), 5);
    }

    #[test]
    fn test_singular_values_descending() {
        let u = random_snapshots(40, 15);
        let pod = Pod::params().build(&u).unwrap();
        let sigma = pod.singular_values();
        assert!(sigma.windows(2).into_iter().all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_round_trip_without_truncation() {
        let u = random_snapshots(50, 10);
        let pod = Pod::params().eps(0.).n_l(Some(10)).build(&u).unwrap();
        let rebuilt = pod.lift(&pod.project(&u).unwrap()).unwrap();
        for (orig, rec) in u.columns().into_iter().zip(rebuilt.columns()) {
            let err = (&orig - &rec).mapv(|v| v * v).sum().sqrt();
            let norm = orig.mapv(|v| v * v).sum().sqrt();
            assert!(err / norm < 1e-6);
        }
    }

    #[test]
    fn test_energy_truncation_is_minimal() {
        let u = smooth_snapshots(100, 20);
        let eps = 0.01;
        let pod = Pod::params().eps(eps).build(&u).unwrap();
        let energy = pod.singular_values().mapv(|s| s * s);
        let total = energy.sum();
        let n_l = pod.rank();
        assert!(energy.slice(s![..n_l]).sum() / total >= 1. - eps);
        assert!(energy.slice(s![..n_l - 1]).sum() / total < 1. - eps);
        assert!(n_l < 20);
        assert_abs_diff_eq!(
            pod.explained_variance_ratio(),
            energy.slice(s![..n_l]).sum() / total,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rank_cap() {
        let u = random_snapshots(30, 12);
        let pod = Pod::params().n_l(Some(4)).build(&u).unwrap();
        assert_eq!(pod.rank(), 4);
        assert_eq!(pod.singular_values().len(), 12);
    }

    #[test]
    fn test_truncation_rank() {
        let sigma = array![3., 2., 1., 0.];
        // energies 9, 4, 1, 0 over 14
        assert_eq!(truncation_rank(&sigma, 0., None), 4);
        assert_eq!(truncation_rank(&sigma, 0.1, None), 2);
        assert_eq!(truncation_rank(&sigma, 0.5, None), 1);
        assert_eq!(truncation_rank(&sigma, 0.01, Some(1)), 1);
        assert_eq!(truncation_rank(&array![0., 0.], 0.1, None), 2);
    }

    #[test]
    fn test_wide_snapshot_matrix() {
        // two modes with the same energy and a null one
        let u = array![[1., -1., 0., 0.], [0., 0., 1., -1.], [0., 0., 0., 0.]];
        let pod = Pod::params().build(&u).unwrap();
        assert_eq!(pod.rank(), 3);
        let sigma = pod.singular_values();
        assert_abs_diff_eq!(sigma[0], 2f64.sqrt(), epsilon = 1e-10);
        assert_abs_diff_eq!(sigma[1], 2f64.sqrt(), epsilon = 1e-10);
        assert_abs_diff_eq!(sigma[2], 0., epsilon = 1e-10);
        let rebuilt = pod.lift(&pod.project(&u).unwrap()).unwrap();
        assert_abs_diff_eq!(rebuilt, u, epsilon = 1e-10);
    }

    #[test]
    fn test_degenerate_snapshots() {
        let u = Array2::from_shape_fn((6, 4), |(i, _)| i as f64);
        let pod = Pod::params().eps(0.01).build(&u).unwrap();
        assert_eq!(pod.rank(), 1);
        assert_abs_diff_eq!(pod.basis().t().dot(pod.basis())[[0, 0]], 1.);
        let v = pod.project(&u).unwrap();
        assert_abs_diff_eq!(v, Array2::zeros((1, 4)));
        assert_abs_diff_eq!(pod.lift(&v).unwrap(), u);

        let err = Pod::params().strict(true).build(&u).unwrap_err();
        assert!(matches!(err, PodError::DegenerateSnapshotSet(_)));
    }

    #[test]
    fn test_two_stage_pod() {
        // 6 samples of 5 time steps each
        let u = smooth_snapshots(60, 30);
        let full = Pod::params().eps(1e-4).build(&u).unwrap();
        let two_stage = Pod::params()
            .eps(1e-4)
            .eps_init(Some(1e-8))
            .n_t(5)
            .build(&u)
            .unwrap();
        assert!(full.rank().abs_diff(two_stage.rank()) <= 1);
        let vtv = two_stage.basis().t().dot(two_stage.basis());
        assert_abs_diff_eq!(vtv, Array2::eye(two_stage.rank()), epsilon = 1e-8);
        // same reconstruction quality
        let rebuilt = two_stage.lift(&two_stage.project(&u).unwrap()).unwrap();
        let err = (&rebuilt - &u).mapv(|v| v * v).sum().sqrt() / u.mapv(|v| v * v).sum().sqrt();
        assert!(err < 1e-2);

        let err = Pod::params()
            .eps_init(Some(1e-3))
            .n_t(7)
            .build(&u)
            .unwrap_err();
        assert!(matches!(err, PodError::InvalidValue(_)));
    }

    #[test]
    fn test_shape_mismatch() {
        let u = random_snapshots(10, 5);
        let pod = Pod::params().build(&u).unwrap();
        assert!(pod.project(&random_snapshots(9, 5)).is_err());
        assert!(pod.lift(&Array2::zeros((pod.rank() + 1, 2))).is_err());
        assert!(Pod::from_parts(Array2::zeros((3, 1)), Array1::zeros(4), Array1::ones(1)).is_err());
    }
}
