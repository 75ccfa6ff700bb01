use crate::config::HyperParams;
use crate::errors::{PodnnError, Result};
use ndarray::{Array, Array1, Array2, ArrayView1, Axis};

/// Spatial points of a simulation, with an optional time grid.
///
/// Points are stored as a (n_xyz, n_d) matrix. Snapshots computed on a mesh
/// hold the values of each field component at every point, in the order of
/// the mesh points.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    points: Array2<f64>,
    times: Option<Array1<f64>>,
}

impl Mesh {
    /// Mesh made of the given (n_xyz, n_d) points
    pub fn new(points: Array2<f64>) -> Result<Self> {
        if points.nrows() == 0 || points.ncols() == 0 {
            return Err(PodnnError::InvalidValue(format!(
                "mesh points should be a non empty (n_xyz, n_d) matrix, got {:?}",
                points.dim()
            )));
        }
        Ok(Mesh {
            points,
            times: None,
        })
    }

    /// Regular mesh described by the hyperparameters: 2D when `n_y > 0`,
    /// with a time grid when `n_t > 1`
    pub fn from_params(hp: &HyperParams) -> Result<Self> {
        let mesh = if hp.n_y > 0 {
            Self::linear_2d(hp.x_min, hp.x_max, hp.n_x, hp.y_min, hp.y_max, hp.n_y)?
        } else {
            Self::linear_1d(hp.x_min, hp.x_max, hp.n_x)?
        };
        if hp.is_time_dependent() {
            mesh.with_times(hp.t_min, hp.t_max, hp.n_t)
        } else {
            Ok(mesh)
        }
    }

    /// Regular 1D mesh of `n_x` points on `[x_min, x_max]`
    pub fn linear_1d(x_min: f64, x_max: f64, n_x: usize) -> Result<Self> {
        let x = Array::linspace(x_min, x_max, n_x);
        Self::new(x.insert_axis(Axis(1)))
    }

    /// Regular 2D mesh of `n_x * n_y` points, enumerated along y first:
    /// point `i * n_y + j` is `(x_i, y_j)`.
    pub fn linear_2d(
        x_min: f64,
        x_max: f64,
        n_x: usize,
        y_min: f64,
        y_max: f64,
        n_y: usize,
    ) -> Result<Self> {
        let x = Array::linspace(x_min, x_max, n_x);
        let y = Array::linspace(y_min, y_max, n_y);
        let points = Array2::from_shape_fn((n_x * n_y, 2), |(k, d)| {
            if d == 0 {
                x[k / n_y]
            } else {
                y[k % n_y]
            }
        });
        Self::new(points)
    }

    /// Attaches a regular time grid of `n_t` steps on `[t_min, t_max]`
    pub fn with_times(self, t_min: f64, t_max: f64, n_t: usize) -> Result<Self> {
        self.with_time_grid(Array::linspace(t_min, t_max, n_t))
    }

    /// Attaches the given time steps
    pub fn with_time_grid(mut self, times: Array1<f64>) -> Result<Self> {
        if times.is_empty() {
            return Err(PodnnError::InvalidValue(
                "time grid should not be empty".to_string(),
            ));
        }
        self.times = Some(times);
        Ok(self)
    }

    /// Mesh points (n_xyz, n_d)
    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }

    /// Coordinates of the mesh points along the `d`th axis
    pub fn coordinates(&self, d: usize) -> ArrayView1<'_, f64> {
        self.points.column(d)
    }

    /// Time steps when time dependent
    pub fn times(&self) -> Option<&Array1<f64>> {
        self.times.as_ref()
    }

    /// Number of points `n_xyz`
    pub fn n_xyz(&self) -> usize {
        self.points.nrows()
    }

    /// Space dimension `n_d`
    pub fn n_d(&self) -> usize {
        self.points.ncols()
    }

    /// Number of time steps, 1 when steady
    pub fn n_t(&self) -> usize {
        self.times.as_ref().map_or(1, |t| t.len())
    }

    /// Whether the mesh carries a time grid
    pub fn is_time_dependent(&self) -> bool {
        self.times.is_some()
    }
}
