use crate::errors::{PodnnError, Result};
use crate::mesh::Mesh;
use log::info;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

/// A high-fidelity model giving the solution field of a parametrized problem.
///
/// `evaluate` returns the (n_v, n_xyz) field values at the mesh points for the
/// parameter vector `mu`, at time `t` for unsteady problems.
/// Evaluations run in parallel over parameter samples.
pub trait GroundTruth: Sync {
    /// Solution field (n_v, n_xyz)
    fn evaluate(&self, mesh: &Mesh, t: Option<f64>, mu: ArrayView1<f64>) -> Array2<f64>;
}

impl<F> GroundTruth for F
where
    F: Fn(&Mesh, Option<f64>, ArrayView1<f64>) -> Array2<f64> + Sync,
{
    fn evaluate(&self, mesh: &Mesh, t: Option<f64>, mu: ArrayView1<f64>) -> Array2<f64> {
        self(mesh, t, mu)
    }
}

/// Snapshots of a ground truth over parameter samples, with the matching
/// regression inputs.
///
/// Column `s * n_t + k` of `u` is the flattened field of sample `s` at time
/// step `k`, the value of component `v` at point `p` being at row
/// `v * n_xyz + p`. Row `s * n_t + k` of `x_v` is `[t_k, mu_s...]` for unsteady
/// problems, `[mu_s...]` otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotSet {
    mu: Array2<f64>,
    x_v: Array2<f64>,
    u: Array2<f64>,
    n_t: usize,
}

impl SnapshotSet {
    /// Evaluates `ground_truth` on `mesh` for every (n_s, n_mu) parameter sample
    /// and every time step of the mesh.
    pub fn generate(
        ground_truth: &dyn GroundTruth,
        mesh: &Mesh,
        mu: &Array2<f64>,
        n_v: usize,
    ) -> Result<SnapshotSet> {
        let n_t = mesh.n_t();
        let n_xyz = mesh.n_xyz();
        let n_h = n_v * n_xyz;
        let times: Vec<Option<f64>> = match mesh.times() {
            Some(times) => times.iter().map(|t| Some(*t)).collect(),
            None => vec![None],
        };
        info!(
            "Computing {} snapshots ({} samples x {} time steps) of dimension {}",
            mu.nrows() * n_t,
            mu.nrows(),
            n_t,
            n_h
        );

        // collected in sample order
        let columns = mu
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|mu_s| {
                times
                    .iter()
                    .map(|&t| {
                        let field = ground_truth.evaluate(mesh, t, mu_s);
                        if field.dim() != (n_v, n_xyz) {
                            return Err(PodnnError::ShapeMismatch(format!(
                                "ground truth should return a ({n_v}, {n_xyz}) field, got {:?}",
                                field.dim()
                            )));
                        }
                        Ok(field.iter().cloned().collect::<Array1<f64>>())
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let mut u = Array2::zeros((n_h, mu.nrows() * n_t));
        for (mut col, field) in u
            .columns_mut()
            .into_iter()
            .zip(columns.iter().flatten())
        {
            col.assign(field);
        }
        let x_v = inputs(mu, mesh.times());
        Ok(SnapshotSet { mu: mu.to_owned(), x_v, u, n_t })
    }

    /// Rebuilds a snapshot set from its parts, checking consistency
    pub fn from_parts(
        mu: Array2<f64>,
        x_v: Array2<f64>,
        u: Array2<f64>,
        n_t: usize,
    ) -> Result<SnapshotSet> {
        let n_cols = mu.nrows() * n_t;
        if n_t == 0 || u.ncols() != n_cols || x_v.nrows() != n_cols {
            return Err(PodnnError::ShapeMismatch(format!(
                "{} samples with {} time steps inconsistent with {} snapshots and {} inputs",
                mu.nrows(),
                n_t,
                u.ncols(),
                x_v.nrows()
            )));
        }
        Ok(SnapshotSet { mu, x_v, u, n_t })
    }

    /// Parameter samples (n_s, n_mu)
    pub fn mu(&self) -> &Array2<f64> {
        &self.mu
    }

    /// Regression inputs (n_s * n_t, n_in)
    pub fn x_v(&self) -> &Array2<f64> {
        &self.x_v
    }

    /// Snapshot matrix (n_h, n_s * n_t)
    pub fn u(&self) -> &Array2<f64> {
        &self.u
    }

    /// Number of parameter samples
    pub fn n_s(&self) -> usize {
        self.mu.nrows()
    }

    /// Number of time steps per sample
    pub fn n_t(&self) -> usize {
        self.n_t
    }

    /// Full-order dimension
    pub fn n_h(&self) -> usize {
        self.u.nrows()
    }

    /// Snapshot columns of the given parameter samples, time-minor
    pub fn columns_of(&self, samples: &[usize]) -> Vec<usize> {
        samples
            .iter()
            .flat_map(|s| s * self.n_t..(s + 1) * self.n_t)
            .collect()
    }

    /// Snapshots (n_h, n_t) of one parameter sample
    pub fn sample_snapshots(&self, s: usize) -> ArrayView2<'_, f64> {
        self.u.slice(s![.., s * self.n_t..(s + 1) * self.n_t])
    }
}

/// Regression inputs `[t_k, mu_s...]` (or `[mu_s...]` when steady) with time
/// varying fastest
pub(crate) fn inputs(mu: &Array2<f64>, times: Option<&Array1<f64>>) -> Array2<f64> {
    match times {
        None => mu.to_owned(),
        Some(times) => {
            let n_t = times.len();
            let n_mu = mu.ncols();
            Array2::from_shape_fn((mu.nrows() * n_t, n_mu + 1), |(i, j)| {
                if j == 0 {
                    times[i % n_t]
                } else {
                    mu[[i / n_t, j - 1]]
                }
            })
        }
    }
}
