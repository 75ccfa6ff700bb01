use thiserror::Error;

/// A result type for sampling methods
pub type Result<T> = std::result::Result<T, DoeError>;

/// An error when defining a parameter space
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DoeError {
    /// When parameter bounds are malformed (lower > upper, length mismatch, ...)
    #[error("Invalid parameter domain: {0}")]
    InvalidDomain(String),
}
