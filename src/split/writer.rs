use std::fmt;
use std::fs;
use std::path::Path;

use log::{info, warn};
use ndarray::{s, Array2, Array3};
use ndarray_npy::write_npy;

use super::{Partition, SplitConfig, SplitManifest, SplitPlan, MANIFEST_FILE};
use crate::archive::SUMMARY_CHANNELS;
use crate::curve::CURVE_CHANNELS;
use crate::dataset::{CellKey, CellRecord, DatasetError};

/// Statistics from writing a split
#[derive(Debug, Clone, PartialEq)]
pub struct SplitStats {
    /// Training cells
    pub train_cells: usize,
    /// Validation cells
    pub validation_cells: usize,
    /// Cycles per cell
    pub window: usize,
}

impl fmt::Display for SplitStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Split: {} training cells, {} validation cells, {} cycles each",
            self.train_cells, self.validation_cells, self.window
        )
    }
}

/// Write the arrays and manifest of a split plan.
///
/// `records` must contain every cell named by the plan. Each cell contributes
/// its first `window` cycles and summary columns.
pub fn write_split(
    records: &[CellRecord],
    plan: &SplitPlan,
    config: &SplitConfig,
    out_dir: &Path,
    window: usize,
) -> Result<SplitStats, DatasetError> {
    if window == 0 {
        return Err(DatasetError::InvalidConfig(
            "window must be positive".to_string(),
        ));
    }
    let points = records
        .first()
        .map(|r| r.cycles.shape()[2])
        .ok_or_else(|| DatasetError::Empty(out_dir.to_path_buf()))?;

    fs::create_dir_all(out_dir)?;

    for partition in Partition::ALL {
        let cells = plan
            .cells(partition)
            .iter()
            .map(|info| find(records, &info.key))
            .collect::<Result<Vec<_>, _>>()?;
        if cells.is_empty() {
            warn!("{} partition is empty", partition.prefix());
        }

        let arrays = PartitionArrays::build(&cells, window, points)?;
        write_npy(out_dir.join(partition.file_name("features")), &arrays.features)?;
        write_npy(out_dir.join(partition.file_name("targets")), &arrays.targets)?;
        write_npy(out_dir.join(partition.file_name("summary")), &arrays.summary)?;
        info!(
            "{}: features {:?}, targets {:?}, summary {:?}",
            partition.prefix(),
            arrays.features.shape(),
            arrays.targets.shape(),
            arrays.summary.shape()
        );
    }

    SplitManifest::new(plan, config, window, points).write(&out_dir.join(MANIFEST_FILE))?;

    Ok(SplitStats {
        train_cells: plan.train.len(),
        validation_cells: plan.validation.len(),
        window,
    })
}

fn find<'a>(records: &'a [CellRecord], key: &CellKey) -> Result<&'a CellRecord, DatasetError> {
    records
        .iter()
        .find(|r| &r.key == key)
        .ok_or_else(|| DatasetError::InvalidConfig(format!("cell {key} is not loaded")))
}

/// Arrays of one partition.
struct PartitionArrays {
    features: Array3<f64>,
    targets: Array2<f64>,
    summary: Array3<f64>,
}

impl PartitionArrays {
    fn build(cells: &[&CellRecord], window: usize, points: usize) -> Result<Self, DatasetError> {
        let n = cells.len();
        let mut features = Array3::zeros((n * window, CURVE_CHANNELS, points));
        let mut targets = Array2::zeros((n * window, 2));
        let mut summary = Array3::zeros((n, SUMMARY_CHANNELS, window));

        for (i, cell) in cells.iter().enumerate() {
            let shape = cell.cycles.shape();
            if shape[0] < window || shape[2] != points {
                return Err(DatasetError::ShapeMismatch {
                    what: format!("{} cycles", cell.key),
                    expected: format!("(>= {window}, {CURVE_CHANNELS}, {points})"),
                    actual: shape.to_vec(),
                });
            }
            if cell.summary.ncols() < window {
                return Err(DatasetError::ShapeMismatch {
                    what: format!("{} summary", cell.key),
                    expected: format!("({SUMMARY_CHANNELS}, >= {window})"),
                    actual: cell.summary.shape().to_vec(),
                });
            }

            let rows = i * window..(i + 1) * window;
            features
                .slice_mut(s![rows.clone(), .., ..])
                .assign(&cell.cycles.slice(s![..window, .., ..]));

            let mut target_rows = targets.slice_mut(s![rows, ..]);
            target_rows.column_mut(0).fill(cell.eol() as f64);
            target_rows.column_mut(1).fill(cell.charge_time_end());

            summary
                .slice_mut(s![i, .., ..])
                .assign(&cell.summary.slice(s![.., ..window]));
        }

        Ok(Self {
            features,
            targets,
            summary,
        })
    }
}
