use crate::errors::{PodnnError, Result};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
use serde::{Deserialize, Serialize};

/// Per-feature normalization scheme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormKind {
    /// `(x - mean) / std` with the population standard deviation
    #[default]
    MeanStd,
    /// `(x - min) / (max - min)`
    MinMax,
}

/// Per-feature affine normalization `(x - shift) / scale` fitted on
/// training data, one feature per column.
///
/// Null scales (constant features) are replaced by 1.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizationStats {
    kind: NormKind,
    shift: Array1<f64>,
    scale: Array1<f64>,
}

impl NormalizationStats {
    /// Statistics of the (n, d) data `x` for the given kind
    pub fn fit(kind: NormKind, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(PodnnError::InvalidValue(
                "cannot fit normalization on empty data".to_string(),
            ));
        }
        let (shift, scale) = match kind {
            NormKind::MeanStd => {
                let mean = x.mean_axis(Axis(0)).ok_or_else(|| {
                    PodnnError::InvalidValue("cannot fit normalization on empty data".to_string())
                })?;
                (mean, x.std_axis(Axis(0), 0.))
            }
            NormKind::MinMax => {
                let min = x.fold_axis(Axis(0), f64::INFINITY, |m, &v| m.min(v));
                let max = x.fold_axis(Axis(0), f64::NEG_INFINITY, |m, &v| m.max(v));
                let range = &max - &min;
                (min, range)
            }
        };
        let scale = scale.mapv(|s| if s == 0. || !s.is_finite() { 1. } else { s });
        Ok(NormalizationStats { kind, shift, scale })
    }

    /// Rebuilds statistics from stored vectors
    pub fn from_parts(kind: NormKind, shift: Array1<f64>, scale: Array1<f64>) -> Result<Self> {
        if shift.len() != scale.len() {
            return Err(PodnnError::ShapeMismatch(format!(
                "shift has {} components while scale has {}",
                shift.len(),
                scale.len()
            )));
        }
        if scale.iter().any(|s| *s == 0. || !s.is_finite()) {
            return Err(PodnnError::InvalidValue(
                "normalization scales should be finite and non zero".to_string(),
            ));
        }
        Ok(NormalizationStats { kind, shift, scale })
    }

    /// Normalization kind
    pub fn kind(&self) -> NormKind {
        self.kind
    }

    /// Per-feature shift
    pub fn shift(&self) -> &Array1<f64> {
        &self.shift
    }

    /// Per-feature scale
    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Number of features
    pub fn dim(&self) -> usize {
        self.shift.len()
    }

    /// `(x - shift) / scale`
    pub fn apply(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Array2<f64>> {
        self.check_cols(x.ncols())?;
        Ok((x - &self.shift) / &self.scale)
    }

    /// `x * scale + shift`
    pub fn inverse(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Array2<f64>> {
        self.check_cols(x.ncols())?;
        Ok(x * &self.scale + &self.shift)
    }

    /// `std * scale`, the de-normalized standard deviation
    pub fn inverse_std(&self, std: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Array2<f64>> {
        self.check_cols(std.ncols())?;
        Ok(std * &self.scale)
    }

    fn check_cols(&self, ncols: usize) -> Result<()> {
        if ncols != self.dim() {
            return Err(PodnnError::ShapeMismatch(format!(
                "expected {} features, got {}",
                self.dim(),
                ncols
            )));
        }
        Ok(())
    }
}
