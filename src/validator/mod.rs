//! # Output Validation
//!
//! Shape and integrity checks for the directories produced by the pipeline.
//! The stages already refuse to write inconsistent arrays; the validator
//! re-checks directories after the fact, e.g. before handing them to a
//! training run.
//!
//! ## Checks
//!
//! 1. **Cell directory**: files paired per cell, `(6, n)` summaries,
//!    `(cycles, 8, points)` curves with one shape across cells, finite values
//! 2. **Split directory**: row counts of features, targets and summary agree,
//!    targets are repeated per cell, manifest matches the arrays, augmented
//!    outputs (if present) carry the summary window in their first channels
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cyclife::validator::validate_dir;
//! use std::path::Path;
//!
//! let report = validate_dir(Path::new("Severson_Dataset/npdata_each_cell"))?;
//! println!("{}", report);
//! # Ok::<(), cyclife::validator::ValidationError>(())
//! ```

use std::path::Path;

pub use report::{CheckStatus, ReportKind, ValidationCheck, ValidationReport};

mod cells;
mod report;
mod split;

#[cfg(test)]
mod tests;

use crate::split::Partition;

/// Validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Path is missing or not a directory
    #[error("Structure error: {0}")]
    StructureError(String),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

fn check_directory(path: &Path, report: &mut ValidationReport) -> Result<(), ValidationError> {
    if !path.is_dir() {
        report.add_check(ValidationCheck::failed(
            "Directory exists",
            format!("Not a directory: {}", path.display()),
        ));
        return Err(ValidationError::StructureError(format!(
            "not a directory: {}",
            path.display()
        )));
    }
    report.add_check(ValidationCheck::ok("Directory exists"));
    Ok(())
}

/// Validate a directory of per-cell arrays.
pub fn validate_cell_store(path: &Path) -> Result<ValidationReport, ValidationError> {
    let mut report = ValidationReport::new(ReportKind::CellStore, path.display().to_string());
    check_directory(path, &mut report)?;
    cells::check_cells(path, &mut report);
    Ok(report)
}

/// Validate a split/augment directory.
pub fn validate_split_dir(path: &Path) -> Result<ValidationReport, ValidationError> {
    let mut report = ValidationReport::new(ReportKind::SplitDir, path.display().to_string());
    check_directory(path, &mut report)?;
    split::check_split(path, &mut report);
    Ok(report)
}

/// Validate either kind of directory, detected from its contents.
pub fn validate_dir(path: &Path) -> Result<ValidationReport, ValidationError> {
    if path.join(Partition::Train.file_name("features")).exists() {
        validate_split_dir(path)
    } else {
        validate_cell_store(path)
    }
}
