use crate::errors::{PodError, Result};
use linfa::ParamGuard;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A set of validated POD parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct PodValidParams {
    /// Truncation threshold: the retained modes hold at least `1 - eps`
    /// of the snapshot energy. No truncation when 0.
    pub(crate) eps: f64,
    /// Truncation threshold of the first stage of a two-stage POD
    pub(crate) eps_init: Option<f64>,
    /// Optional upper bound on the number of retained modes
    pub(crate) n_l: Option<usize>,
    /// Number of consecutive snapshot columns forming one block (time steps
    /// of one parameter sample) for the two-stage POD
    pub(crate) n_t: usize,
    /// Fail on degenerate snapshot sets instead of falling back to a rank-1 basis
    pub(crate) strict: bool,
}

impl Default for PodValidParams {
    fn default() -> PodValidParams {
        PodValidParams {
            eps: 0.,
            eps_init: None,
            n_l: None,
            n_t: 1,
            strict: false,
        }
    }
}

impl PodValidParams {
    /// Get truncation threshold
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Get first stage truncation threshold
    pub fn eps_init(&self) -> Option<f64> {
        self.eps_init
    }

    /// Get max number of modes
    pub fn n_l(&self) -> Option<usize> {
        self.n_l
    }

    /// Get block size of the two-stage POD
    pub fn n_t(&self) -> usize {
        self.n_t
    }

    /// Whether degenerate snapshot sets are errors
    pub fn strict(&self) -> bool {
        self.strict
    }
}

#[derive(Clone, Debug, Default)]
/// The set of hyperparameters that can be specified for the computation of
/// a [POD basis](crate::Pod).
pub struct PodParams(PodValidParams);

impl PodParams {
    /// A constructor for POD parameters without truncation
    pub fn new() -> PodParams {
        Self(PodValidParams::default())
    }

    /// Set the truncation threshold `eps` in `[0, 1)`.
    pub fn eps(mut self, eps: f64) -> Self {
        self.0.eps = eps;
        self
    }

    /// Set the first stage threshold, enabling two-stage POD when the
    /// block size is greater than 1.
    pub fn eps_init(mut self, eps_init: Option<f64>) -> Self {
        self.0.eps_init = eps_init;
        self
    }

    /// Set the max number of retained modes.
    /// With `eps = 0` it gives a fixed rank.
    pub fn n_l(mut self, n_l: Option<usize>) -> Self {
        self.0.n_l = n_l;
        self
    }

    /// Set the number of consecutive columns processed together by the
    /// first stage of a two-stage POD.
    pub fn n_t(mut self, n_t: usize) -> Self {
        self.0.n_t = n_t;
        self
    }

    /// Set whether degenerate snapshot sets are errors
    pub fn strict(mut self, strict: bool) -> Self {
        self.0.strict = strict;
        self
    }
}

impl From<PodValidParams> for PodParams {
    fn from(valid: PodValidParams) -> Self {
        PodParams(valid)
    }
}

fn check_threshold(name: &str, value: f64) -> Result<()> {
    if !(0. ..1.).contains(&value) {
        return Err(PodError::InvalidValue(format!(
            "`{name}` should be in [0, 1), got {value}"
        )));
    }
    Ok(())
}

impl ParamGuard for PodParams {
    type Checked = PodValidParams;
    type Error = PodError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        check_threshold("eps", self.0.eps)?;
        if let Some(eps_init) = self.0.eps_init {
            check_threshold("eps_init", eps_init)?;
        }
        if self.0.n_l == Some(0) {
            return Err(PodError::InvalidValue(
                "`n_L` cannot be 0!".to_string(),
            ));
        }
        if self.0.n_t == 0 {
            return Err(PodError::InvalidValue(
                "`n_t` cannot be 0!".to_string(),
            ));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        let params = PodParams::new().check().unwrap();
        assert_eq!(params.eps(), 0.);
        assert_eq!(params.n_l(), None);
        assert_eq!(params.n_t(), 1);
    }

    #[test]
    fn test_invalid_params() {
        assert!(PodParams::new().eps(1.).check().is_err());
        assert!(PodParams::new().eps(-1e-3).check().is_err());
        assert!(PodParams::new().eps_init(Some(2.)).check().is_err());
        assert!(PodParams::new().n_l(Some(0)).check().is_err());
        assert!(PodParams::new().n_t(0).check().is_err());
        assert!(PodParams::new().eps(f64::NAN).check().is_err());
    }
}
