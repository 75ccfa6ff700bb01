use thiserror::Error;

/// A result type for POD algorithm
pub type Result<T> = std::result::Result<T, PodError>;

/// An error when computing a POD basis
#[derive(Error, Debug)]
pub enum PodError {
    /// When all snapshots are identical and no mode can be extracted
    #[error("Degenerate snapshot set: {0}")]
    DegenerateSnapshotSet(String),
    /// When a parameter value is invalid
    #[error("InvalidValue error: {0}")]
    InvalidValue(String),
    /// When array dimensions disagree
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    /// When linear algebra computation fails
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
}
