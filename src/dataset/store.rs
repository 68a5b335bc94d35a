use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use ndarray::{Array2, Array3};
use ndarray_npy::{read_npy, write_npy};

use crate::archive::SUMMARY_CHANNELS;
use crate::curve::CURVE_CHANNELS;

use super::{CellKey, DatasetError};

const SUMMARY_SUFFIX: &str = "_summary.npy";
const CYCLE_SUFFIX: &str = "_cycle.npy";

/// Summary row holding the charge time.
pub const CHARGE_TIME_ROW: usize = 5;

/// Summary row holding the discharge capacity.
pub const DISCHARGE_CAPACITY_ROW: usize = 1;

/// Directory of per-cell arrays.
///
/// Every cell is stored as two files:
///
/// - `<key>_summary.npy`: `(6, n_cycles)` per-cycle summary
/// - `<key>_cycle.npy`: `(cycles, 8, points)` resampled cycle curves
#[derive(Debug, Clone)]
pub struct CellStore {
    dir: PathBuf,
}

/// Arrays of one cell loaded from a [`CellStore`].
#[derive(Debug, Clone)]
pub struct CellRecord {
    /// Cell key
    pub key: CellKey,
    /// `(6, n_cycles)` per-cycle summary
    pub summary: Array2<f64>,
    /// `(cycles, 8, points)` cycle curves
    pub cycles: Array3<f64>,
}

impl CellRecord {
    /// End of life: number of recorded cycles.
    pub fn eol(&self) -> usize {
        self.summary.ncols()
    }

    /// Charge time of the last recorded cycle.
    pub fn charge_time_end(&self) -> f64 {
        summary_charge_time_end(&self.summary)
    }
}

pub(crate) fn summary_charge_time_end(summary: &Array2<f64>) -> f64 {
    let last = summary.ncols().saturating_sub(1);
    summary
        .get((CHARGE_TIME_ROW, last))
        .copied()
        .unwrap_or(f64::NAN)
}

impl CellStore {
    /// Create the directory (and parents) if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Open an existing directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DatasetError::MissingDirectory(dir));
        }
        Ok(Self { dir })
    }

    /// Directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a cell's summary file.
    pub fn summary_path(&self, key: &CellKey) -> PathBuf {
        self.dir.join(format!("{key}{SUMMARY_SUFFIX}"))
    }

    /// Path of a cell's cycle file.
    pub fn cycle_path(&self, key: &CellKey) -> PathBuf {
        self.dir.join(format!("{key}{CYCLE_SUFFIX}"))
    }

    /// Write both arrays of a cell.
    pub fn write_cell(
        &self,
        key: &CellKey,
        summary: &Array2<f64>,
        cycles: &Array3<f64>,
    ) -> Result<(), DatasetError> {
        check_summary(key, summary)?;
        check_cycles(key, cycles)?;
        write_npy(self.summary_path(key), summary)?;
        write_npy(self.cycle_path(key), cycles)?;
        debug!("Wrote {} ({} cycles)", key, summary.ncols());
        Ok(())
    }

    /// Keys of all stored cells, sorted.
    ///
    /// Files that do not belong to a cell are ignored; a cell with only one of
    /// its two files is an error.
    pub fn keys(&self) -> Result<Vec<CellKey>, DatasetError> {
        let mut found: BTreeMap<CellKey, (bool, bool)> = BTreeMap::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(stem) = name.strip_suffix(SUMMARY_SUFFIX) {
                found.entry(stem.parse()?).or_default().0 = true;
            } else if let Some(stem) = name.strip_suffix(CYCLE_SUFFIX) {
                found.entry(stem.parse()?).or_default().1 = true;
            }
        }

        found
            .into_iter()
            .map(|(key, files)| match files {
                (true, true) => Ok(key),
                (false, _) => Err(DatasetError::MissingPartner {
                    key: key.to_string(),
                    missing: "summary",
                }),
                (_, false) => Err(DatasetError::MissingPartner {
                    key: key.to_string(),
                    missing: "cycle",
                }),
            })
            .collect()
    }

    /// Load a cell's summary.
    pub fn load_summary(&self, key: &CellKey) -> Result<Array2<f64>, DatasetError> {
        let summary: Array2<f64> = read_npy(self.summary_path(key))?;
        check_summary(key, &summary)?;
        Ok(summary)
    }

    /// Load a cell's cycle curves.
    pub fn load_cycles(&self, key: &CellKey) -> Result<Array3<f64>, DatasetError> {
        let cycles: Array3<f64> = read_npy(self.cycle_path(key))?;
        check_cycles(key, &cycles)?;
        Ok(cycles)
    }

    /// Load both arrays of a cell.
    pub fn load_cell(&self, key: &CellKey) -> Result<CellRecord, DatasetError> {
        Ok(CellRecord {
            key: key.clone(),
            summary: self.load_summary(key)?,
            cycles: self.load_cycles(key)?,
        })
    }

    /// Load every cell in key order.
    pub fn load_all(&self) -> Result<Vec<CellRecord>, DatasetError> {
        let keys = self.keys()?;
        if keys.is_empty() {
            return Err(DatasetError::Empty(self.dir.clone()));
        }
        keys.iter().map(|key| self.load_cell(key)).collect()
    }
}

fn check_summary(key: &CellKey, summary: &Array2<f64>) -> Result<(), DatasetError> {
    if summary.nrows() != SUMMARY_CHANNELS {
        return Err(DatasetError::ShapeMismatch {
            what: format!("{key} summary"),
            expected: format!("({SUMMARY_CHANNELS}, n_cycles)"),
            actual: summary.shape().to_vec(),
        });
    }
    Ok(())
}

fn check_cycles(key: &CellKey, cycles: &Array3<f64>) -> Result<(), DatasetError> {
    if cycles.shape()[1] != CURVE_CHANNELS {
        return Err(DatasetError::ShapeMismatch {
            what: format!("{key} cycles"),
            expected: format!("(cycles, {CURVE_CHANNELS}, points)"),
            actual: cycles.shape().to_vec(),
        });
    }
    Ok(())
}
