use std::path::PathBuf;
use thiserror::Error;

/// A result type for the reduced-order modeling pipeline
pub type Result<T> = std::result::Result<T, PodnnError>;

/// An error of the reduced-order modeling pipeline
#[derive(Error, Debug)]
pub enum PodnnError {
    /// When the parameter domain is malformed
    #[error("Invalid domain: {0}")]
    InvalidDomain(#[from] podnn_doe::DoeError),
    /// When a cache blob is absent
    #[error("Cache miss: {0:?} not found")]
    CacheMiss(PathBuf),
    /// When cache blobs are inconsistent or cannot be decoded
    #[error("Cache corrupt: {0}")]
    CacheCorrupt(String),
    /// When all snapshots are identical in strict mode
    #[error("Degenerate snapshot set: {0}")]
    DegenerateSnapshotSet(String),
    /// When train/val/test ratios are invalid
    #[error("Invalid split ratios: {0}")]
    RatioSumInvalid(String),
    /// When a requested partition ends up empty
    #[error("Insufficient samples: {0}")]
    InsufficientSamples(String),
    /// When array dimensions disagree
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    /// When an invalid value is encountered
    #[error("Value error: {0}")]
    InvalidValue(String),
    /// When POD computation fails
    #[error("POD error: {0}")]
    PodError(podnn_pod::PodError),
    /// When surrogate training or prediction fails
    #[error("Surrogate error: {0}")]
    SurrogateError(#[from] podnn_surrogate::SurrogateError),
    /// When IO fails
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    /// When numpy array read fails
    #[error("Read npy error: {0}")]
    ReadNpyError(#[from] ndarray_npy::ReadNpyError),
    /// When numpy array write fails
    #[error("Write npy error: {0}")]
    WriteNpyError(#[from] ndarray_npy::WriteNpyError),
    /// When a json descriptor cannot be (de)serialized
    #[error("Json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<podnn_pod::PodError> for PodnnError {
    fn from(error: podnn_pod::PodError) -> PodnnError {
        match error {
            podnn_pod::PodError::DegenerateSnapshotSet(msg) => {
                PodnnError::DegenerateSnapshotSet(msg)
            }
            podnn_pod::PodError::ShapeMismatch(msg) => PodnnError::ShapeMismatch(msg),
            other => PodnnError::PodError(other),
        }
    }
}
