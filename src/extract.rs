//! # Archive Extraction
//!
//! First pipeline stage: reads every usable cell of every batch, keeps the
//! per-cycle summary whole, and reduces the first `cycle_length` cycles
//! (skipping the formation cycle 0) to resampled curves.
//!
//! ```rust,no_run
//! use cyclife::archive::synthetic::{generate, SyntheticConfig};
//! use cyclife::archive::BatchSpec;
//! use cyclife::dataset::CellStore;
//! use cyclife::extract::{extract_batch, ExtractConfig};
//!
//! let archive = generate(&SyntheticConfig::default());
//! let store = CellStore::create("cells")?;
//! let spec = BatchSpec::new("synthetic", "s0c");
//! let stats = extract_batch(&archive, &spec, &store, &ExtractConfig::default())?;
//! println!("{stats}");
//! # Ok::<(), cyclife::dataset::DatasetError>(())
//! ```

use std::fmt;

use log::{debug, info, warn};
use ndarray::{Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::archive::{ArchiveSource, BatchSpec, RawCycle};
use crate::curve::{cycle_curve, CurveError, CURVE_CHANNELS, DEFAULT_POINTS};
use crate::dataset::{CellKey, CellStore, DatasetError};

/// Default number of cycles kept per cell.
pub const DEFAULT_CYCLE_LENGTH: usize = 100;

/// Extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Number of cycles (starting at cycle 1) converted to curves
    pub cycle_length: usize,
    /// Resampled points per charge/discharge window
    pub points: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            cycle_length: DEFAULT_CYCLE_LENGTH,
            points: DEFAULT_POINTS,
        }
    }
}

/// Statistics from an extraction run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractStats {
    /// Cells written to the store
    pub cells_written: usize,
    /// Cells excluded by the batch skip list
    pub cells_skipped: usize,
    /// Cells with too few cycles for `cycle_length`
    pub cells_short: usize,
    /// Keys written, in extraction order
    pub keys: Vec<CellKey>,
}

impl ExtractStats {
    /// Fold another run's statistics into this one.
    pub fn merge(&mut self, other: ExtractStats) {
        self.cells_written += other.cells_written;
        self.cells_skipped += other.cells_skipped;
        self.cells_short += other.cells_short;
        self.keys.extend(other.keys);
    }
}

impl fmt::Display for ExtractStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Extraction: {} cells written, {} skipped, {} too short",
            self.cells_written, self.cells_skipped, self.cells_short
        )
    }
}

/// Extract every usable cell of one batch into `store`.
pub fn extract_batch<S: ArchiveSource + ?Sized>(
    source: &S,
    spec: &BatchSpec,
    store: &CellStore,
    config: &ExtractConfig,
) -> Result<ExtractStats, DatasetError> {
    let mut stats = ExtractStats::default();
    let cell_count = source.cell_count()?;
    info!(
        "Batch {}: {} cells ({} on skip list)",
        spec.prefix,
        cell_count,
        spec.skip.len()
    );

    for cell in 0..cell_count {
        if spec.is_skipped(cell) {
            info!("skip err cell: batch {}, cell_id {}", spec.prefix, cell);
            stats.cells_skipped += 1;
            continue;
        }

        let key = CellKey::new(spec.prefix.clone(), cell);
        let summary = source.summary(cell)?.to_array()?;
        if let Some(life) = source.cycle_life(cell)? {
            debug!(
                "{}: cycle life {} recorded, {} summary cycles",
                key,
                life,
                summary.ncols()
            );
        }

        let available = source.cycle_count(cell)?;
        if available <= config.cycle_length {
            warn!(
                "{}: only {} cycles recorded, need {}; skipping",
                key,
                available,
                config.cycle_length + 1
            );
            stats.cells_short += 1;
            continue;
        }

        let raw = (1..=config.cycle_length)
            .map(|cycle| source.cycle(cell, cycle))
            .collect::<Result<Vec<_>, _>>()?;
        let curves = build_curves(&key, &raw, config.points)?;

        store.write_cell(&key, &summary, &curves)?;
        info!("{} finished", key);
        stats.cells_written += 1;
        stats.keys.push(key);
    }

    Ok(stats)
}

/// Extract all batch files into `store`.
///
/// Requires the `mat` feature; without it this returns an
/// [`ArchiveError::Unsupported`](crate::archive::ArchiveError::Unsupported) error.
pub fn extract_archive(
    batches: &[BatchSpec],
    store: &CellStore,
    config: &ExtractConfig,
) -> Result<ExtractStats, DatasetError> {
    #[cfg(feature = "mat")]
    {
        let mut stats = ExtractStats::default();
        for spec in batches {
            info!("Opening {}", spec.path.display());
            let archive = crate::archive::MatArchive::open(&spec.path)?;
            stats.merge(extract_batch(&archive, spec, store, config)?);
        }
        Ok(stats)
    }

    #[cfg(not(feature = "mat"))]
    {
        let _ = (batches, store, config);
        Err(crate::archive::ArchiveError::Unsupported(
            "reading .mat batch files requires the `mat` feature".to_string(),
        )
        .into())
    }
}

/// Stack the curves of consecutive cycles (numbered from 1) into `(n, 8, points)`.
fn build_curves(key: &CellKey, raw: &[RawCycle], points: usize) -> Result<Array3<f64>, DatasetError> {
    let curve_at = |(i, cycle): (usize, &RawCycle)| -> Result<Array2<f64>, (usize, CurveError)> {
        cycle_curve(cycle, points).map_err(|e| (i + 1, e))
    };

    #[cfg(feature = "parallel")]
    let curves: Result<Vec<_>, _> = raw.par_iter().enumerate().map(curve_at).collect();
    #[cfg(not(feature = "parallel"))]
    let curves: Result<Vec<_>, _> = raw.iter().enumerate().map(curve_at).collect();

    let curves = curves.map_err(|(cycle, source)| DatasetError::CurveError {
        key: key.to_string(),
        cycle,
        source,
    })?;

    let mut out = Array3::zeros((curves.len(), CURVE_CHANNELS, points));
    for (mut slot, curve) in out.axis_iter_mut(Axis(0)).zip(&curves) {
        slot.assign(curve);
    }
    Ok(out)
}
