/// Errors that can occur while reading a raw archive
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// I/O error while opening a batch file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the HDF5 library
    #[cfg(feature = "mat")]
    #[error("HDF5 error: {0}")]
    Hdf5Error(#[from] hdf5::Error),

    /// A required group or dataset is missing from the batch
    #[error("Missing field '{0}' in archive")]
    MissingField(String),

    /// An object reference did not resolve to the expected object kind
    #[error("Reference '{path}' does not point to a {expected}")]
    BadReference {
        /// Path of the reference dataset
        path: String,
        /// Expected object kind (group or dataset)
        expected: &'static str,
    },

    /// Cell index beyond the number of cells in the batch
    #[error("Cell index {index} out of range (batch has {count} cells)")]
    CellOutOfRange {
        /// Requested cell index
        index: usize,
        /// Number of cells in the batch
        count: usize,
    },

    /// Cycle index beyond the recorded cycles of a cell
    #[error("Cycle index {index} out of range (cell has {count} cycles)")]
    CycleOutOfRange {
        /// Requested cycle index
        index: usize,
        /// Number of recorded cycles
        count: usize,
    },

    /// Summary series of a cell disagree in length
    #[error("Summary field '{field}' has {actual} cycles, expected {expected}")]
    InconsistentSummary {
        /// Offending summary field
        field: &'static str,
        /// Length of the charge capacity series
        expected: usize,
        /// Length of the offending series
        actual: usize,
    },

    /// Channels of a cycle disagree in length
    #[error("Cycle field '{field}' has {actual} samples, expected {expected}")]
    InconsistentCycle {
        /// Offending cycle channel
        field: &'static str,
        /// Length of the current series
        expected: usize,
        /// Length of the offending series
        actual: usize,
    },

    /// Archive support was not compiled in
    #[error("Unsupported archive: {0}")]
    Unsupported(String),
}
