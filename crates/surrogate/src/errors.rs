use thiserror::Error;

/// A result type for surrogate regression
pub type Result<T> = std::result::Result<T, SurrogateError>;

/// An error when training or using a surrogate regressor
#[derive(Error, Debug)]
pub enum SurrogateError {
    /// When a parameter or data value is invalid
    #[error("InvalidValue error: {0}")]
    InvalidValue(String),
    /// When prediction is requested before training
    #[error("Regressor not fitted: {0}")]
    NotFitted(String),
    /// When array dimensions disagree
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    /// When linear algebra computation fails
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
}
