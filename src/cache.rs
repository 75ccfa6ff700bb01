use crate::config::HyperParams;
use crate::errors::{PodnnError, Result};
use crate::ground_truth::SnapshotSet;
use crate::mesh::Mesh;
use crate::normalization::{NormKind, NormalizationStats};
use log::{debug, info};
use ndarray::{Array, Array1, Array2, Dimension};
use ndarray_npy::{read_npy, write_npy};
use podnn_doe::SamplingKind;
use podnn_pod::Pod;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Mesh points blob
pub const X_MESH_FILE: &str = "x_mesh.npy";
/// Time steps blob, only for unsteady problems
pub const T_MESH_FILE: &str = "t_mesh.npy";
/// Parameter samples blob
pub const MU_FILE: &str = "mu.npy";
/// Regression inputs blob
pub const X_V_FILE: &str = "X_v.npy";
/// Snapshot matrix blob
pub const U_FILE: &str = "U.npy";
/// POD basis blob
pub const POD_BASIS_FILE: &str = "pod_basis.npy";
/// POD mean snapshot blob
pub const POD_MEAN_FILE: &str = "pod_mean.npy";
/// POD singular values blob
pub const POD_SIGMA_FILE: &str = "pod_sigma.npy";
/// Input normalization shift blob
pub const X_SHIFT_FILE: &str = "x_shift.npy";
/// Input normalization scale blob
pub const X_SCALE_FILE: &str = "x_scale.npy";
/// Coefficient normalization shift blob
pub const V_SHIFT_FILE: &str = "v_shift.npy";
/// Coefficient normalization scale blob
pub const V_SCALE_FILE: &str = "v_scale.npy";
/// Cache descriptor
pub const DESCRIPTOR_FILE: &str = "cache.json";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct CacheDescriptor {
    n_v: Option<usize>,
    norm: Option<NormKind>,
    #[serde(default)]
    sampling: Option<SamplingRecord>,
}

/// How the cached parameter samples were drawn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplingRecord {
    /// Parameter lower bounds
    pub mu_min: Vec<f64>,
    /// Parameter upper bounds
    pub mu_max: Vec<f64>,
    /// Sampling seed
    pub seed: u64,
    /// Sampling method
    pub sampling: SamplingKind,
}

impl SamplingRecord {
    /// Sampling settings of the given configuration
    pub fn from_params(hp: &HyperParams) -> Self {
        SamplingRecord {
            mu_min: hp.mu_min.clone(),
            mu_max: hp.mu_max.clone(),
            seed: hp.seed,
            sampling: hp.sampling,
        }
    }

    /// Whether both records describe the same draw, bounds being compared up
    /// to json float round trip
    pub fn matches(&self, other: &SamplingRecord) -> bool {
        let close = |a: &[f64], b: &[f64]| {
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b)
                    .all(|(x, y)| (x - y).abs() <= 1e-12 * x.abs().max(1.))
        };
        self.seed == other.seed
            && self.sampling == other.sampling
            && close(&self.mu_min, &other.mu_min)
            && close(&self.mu_max, &other.mu_max)
    }
}

/// Snapshots stored in a cache
#[derive(Clone, Debug, PartialEq)]
pub struct CachedSnapshots {
    /// Mesh the snapshots are computed on
    pub mesh: Mesh,
    /// Snapshots with their parameters and inputs
    pub snapshots: SnapshotSet,
    /// Number of field components
    pub n_v: usize,
    /// How the parameter samples were drawn, when recorded
    pub sampling: Option<SamplingRecord>,
}

/// A fitted reduction: POD basis and normalization statistics
#[derive(Clone, Debug)]
pub struct Reduction {
    /// POD basis
    pub pod: Pod,
    /// Input normalization
    pub x_stats: NormalizationStats,
    /// Reduced coefficients normalization
    pub v_stats: NormalizationStats,
}

/// Directory storing snapshots and fitted reductions as `.npy` blobs.
///
/// A cache directory is meant to be written by a single process at a time,
/// there is no locking.
#[derive(Clone, Debug)]
pub struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    /// Cache in the given directory, created on first save
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        SnapshotCache {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether snapshot blobs are present
    pub fn has_snapshots(&self) -> bool {
        [X_MESH_FILE, MU_FILE, X_V_FILE, U_FILE, DESCRIPTOR_FILE]
            .iter()
            .all(|f| self.dir.join(f).exists())
    }

    /// Stores mesh, parameter samples, inputs and snapshots.
    ///
    /// `sampling` records how the parameter samples were drawn, `None` for
    /// samples coming from elsewhere.
    pub fn save(
        &self,
        mesh: &Mesh,
        snapshots: &SnapshotSet,
        n_v: usize,
        sampling: Option<&SamplingRecord>,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        info!("Saving {} snapshots to {:?}", snapshots.u().ncols(), self.dir);
        write_npy(self.dir.join(X_MESH_FILE), mesh.points())?;
        match mesh.times() {
            Some(times) => write_npy(self.dir.join(T_MESH_FILE), times)?,
            None => {
                // a stale time grid would change the layout on load
                let path = self.dir.join(T_MESH_FILE);
                if path.exists() {
                    fs::remove_file(path)?;
                }
            }
        }
        write_npy(self.dir.join(MU_FILE), snapshots.mu())?;
        write_npy(self.dir.join(X_V_FILE), snapshots.x_v())?;
        write_npy(self.dir.join(U_FILE), snapshots.u())?;
        let mut descriptor = self.read_descriptor().unwrap_or_default();
        descriptor.n_v = Some(n_v);
        descriptor.sampling = sampling.cloned();
        self.write_descriptor(&descriptor)
    }

    /// Loads mesh, parameter samples, inputs and snapshots.
    ///
    /// Fails with `CacheMiss` when a blob is absent and `CacheCorrupt` when
    /// blobs are inconsistent.
    pub fn load(&self) -> Result<CachedSnapshots> {
        let descriptor = self.read_descriptor()?;
        let n_v = descriptor
            .n_v
            .ok_or_else(|| PodnnError::CacheMiss(self.dir.join(U_FILE)))?;
        let points: Array2<f64> = self.read(X_MESH_FILE)?;
        let times: Option<Array1<f64>> = if self.dir.join(T_MESH_FILE).exists() {
            Some(self.read(T_MESH_FILE)?)
        } else {
            None
        };
        let mu: Array2<f64> = self.read(MU_FILE)?;
        let x_v: Array2<f64> = self.read(X_V_FILE)?;
        let u: Array2<f64> = self.read(U_FILE)?;

        let mut mesh = Mesh::new(points).map_err(|e| corrupt(&e.to_string()))?;
        if let Some(times) = times {
            mesh = mesh
                .with_time_grid(times)
                .map_err(|e| corrupt(&e.to_string()))?;
        }
        let n_t = mesh.n_t();
        if u.nrows() != n_v * mesh.n_xyz() {
            return Err(corrupt(&format!(
                "{} snapshot rows for {} components on {} points",
                u.nrows(),
                n_v,
                mesh.n_xyz()
            )));
        }
        if u.ncols() != mu.nrows() * n_t || x_v.nrows() != u.ncols() {
            return Err(corrupt(&format!(
                "{} snapshots and {} inputs for {} samples with {} time steps",
                u.ncols(),
                x_v.nrows(),
                mu.nrows(),
                n_t
            )));
        }
        if x_v.ncols() != mu.ncols() + usize::from(mesh.is_time_dependent()) {
            return Err(corrupt(&format!(
                "{} inputs for {} parameters",
                x_v.ncols(),
                mu.ncols()
            )));
        }
        let snapshots =
            SnapshotSet::from_parts(mu, x_v, u, n_t).map_err(|e| corrupt(&e.to_string()))?;
        debug!("Loaded {} snapshots from {:?}", snapshots.u().ncols(), self.dir);
        Ok(CachedSnapshots {
            mesh,
            snapshots,
            n_v,
            sampling: descriptor.sampling,
        })
    }

    /// Stores a fitted reduction
    pub fn save_reduction(
        &self,
        pod: &Pod,
        x_stats: &NormalizationStats,
        v_stats: &NormalizationStats,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        info!("Saving POD basis of rank {} to {:?}", pod.rank(), self.dir);
        write_npy(self.dir.join(POD_BASIS_FILE), pod.basis())?;
        write_npy(self.dir.join(POD_MEAN_FILE), pod.mean())?;
        write_npy(self.dir.join(POD_SIGMA_FILE), pod.singular_values())?;
        write_npy(self.dir.join(X_SHIFT_FILE), x_stats.shift())?;
        write_npy(self.dir.join(X_SCALE_FILE), x_stats.scale())?;
        write_npy(self.dir.join(V_SHIFT_FILE), v_stats.shift())?;
        write_npy(self.dir.join(V_SCALE_FILE), v_stats.scale())?;
        let mut descriptor = self.read_descriptor().unwrap_or_default();
        descriptor.norm = Some(v_stats.kind());
        self.write_descriptor(&descriptor)
    }

    /// Loads a fitted reduction
    pub fn load_reduction(&self) -> Result<Reduction> {
        let descriptor = self.read_descriptor()?;
        let norm = descriptor
            .norm
            .ok_or_else(|| PodnnError::CacheMiss(self.dir.join(POD_BASIS_FILE)))?;
        let basis: Array2<f64> = self.read(POD_BASIS_FILE)?;
        let mean: Array1<f64> = self.read(POD_MEAN_FILE)?;
        let sigma: Array1<f64> = self.read(POD_SIGMA_FILE)?;
        let x_shift: Array1<f64> = self.read(X_SHIFT_FILE)?;
        let x_scale: Array1<f64> = self.read(X_SCALE_FILE)?;
        let v_shift: Array1<f64> = self.read(V_SHIFT_FILE)?;
        let v_scale: Array1<f64> = self.read(V_SCALE_FILE)?;

        let pod = Pod::from_parts(basis, mean, sigma).map_err(|e| corrupt(&e.to_string()))?;
        let x_stats = NormalizationStats::from_parts(norm, x_shift, x_scale)
            .map_err(|e| corrupt(&e.to_string()))?;
        let v_stats = NormalizationStats::from_parts(norm, v_shift, v_scale)
            .map_err(|e| corrupt(&e.to_string()))?;
        if v_stats.dim() != pod.rank() {
            return Err(corrupt(&format!(
                "{} coefficient statistics for a POD basis of rank {}",
                v_stats.dim(),
                pod.rank()
            )));
        }
        Ok(Reduction {
            pod,
            x_stats,
            v_stats,
        })
    }

    fn read<D: Dimension>(&self, name: &str) -> Result<Array<f64, D>> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(PodnnError::CacheMiss(path));
        }
        read_npy(&path).map_err(|e| corrupt(&format!("{name}: {e}")))
    }

    fn read_descriptor(&self) -> Result<CacheDescriptor> {
        let path = self.dir.join(DESCRIPTOR_FILE);
        if !path.exists() {
            return Err(PodnnError::CacheMiss(path));
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| corrupt(&format!("{DESCRIPTOR_FILE}: {e}")))
    }

    fn write_descriptor(&self, descriptor: &CacheDescriptor) -> Result<()> {
        let content = serde_json::to_string_pretty(descriptor)?;
        fs::write(self.dir.join(DESCRIPTOR_FILE), content)?;
        Ok(())
    }
}

fn corrupt(msg: &str) -> PodnnError {
    PodnnError::CacheCorrupt(msg.to_string())
}
