use std::path::PathBuf;

use crate::archive::ArchiveError;
use crate::curve::CurveError;

/// Errors that can occur while reading or writing dataset arrays
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading an `.npy` file
    #[error("NPY read error: {0}")]
    NpyReadError(#[from] ndarray_npy::ReadNpyError),

    /// Error writing an `.npy` file
    #[error("NPY write error: {0}")]
    NpyWriteError(#[from] ndarray_npy::WriteNpyError),

    /// Error serializing/deserializing JSON
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Error reading the raw archive
    #[error("Archive error: {0}")]
    ArchiveError(#[from] ArchiveError),

    /// A cycle could not be segmented or resampled
    #[error("Curve error in {key} cycle {cycle}: {source}")]
    CurveError {
        /// Cell key
        key: String,
        /// Cycle number
        cycle: usize,
        /// Underlying error
        source: CurveError,
    },

    /// An array does not have the expected shape
    #[error("Shape mismatch for {what}: expected {expected}, found {actual:?}")]
    ShapeMismatch {
        /// Which array
        what: String,
        /// Expected shape, human readable
        expected: String,
        /// Actual shape
        actual: Vec<usize>,
    },

    /// Only one of the two files of a cell exists
    #[error("Cell {key} is missing its {missing} file")]
    MissingPartner {
        /// Cell key
        key: String,
        /// Missing file kind (summary or cycle)
        missing: &'static str,
    },

    /// File name that does not parse as a cell key
    #[error("Invalid cell key: {0}")]
    InvalidKey(String),

    /// Directory expected by a stage does not exist
    #[error("Directory not found: {0}")]
    MissingDirectory(PathBuf),

    /// Invalid stage parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No cells to work on
    #[error("No cells found in {0}")]
    Empty(PathBuf),
}
