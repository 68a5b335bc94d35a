use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CellInfo, EolBucket, SplitConfig, SplitPlan};
use crate::dataset::DatasetError;

/// File name of the split manifest.
pub const MANIFEST_FILE: &str = "split_manifest.json";

/// One cell of a partition, in output order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Cell key
    pub key: String,
    /// End of life (cycles)
    pub eol: usize,
    /// Charge time of the last cycle, `None` when not finite
    pub charge_time_end: Option<f64>,
    /// EoL bucket
    pub bucket: EolBucket,
}

impl From<&CellInfo> for ManifestEntry {
    fn from(cell: &CellInfo) -> Self {
        Self {
            key: cell.key.to_string(),
            eol: cell.eol,
            charge_time_end: Some(cell.charge_time_end).filter(|t| t.is_finite()),
            bucket: cell.bucket(),
        }
    }
}

/// Human-readable record of how a split was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitManifest {
    /// Creation time
    pub created: DateTime<Utc>,
    /// Split parameters
    pub config: SplitConfig,
    /// Cycles per cell in the arrays
    pub window: usize,
    /// Resampled points per window
    pub points: usize,
    /// Training cells, in array order
    pub train: Vec<ManifestEntry>,
    /// Validation cells, in array order
    pub validation: Vec<ManifestEntry>,
}

impl SplitManifest {
    /// Describe a plan.
    pub fn new(plan: &SplitPlan, config: &SplitConfig, window: usize, points: usize) -> Self {
        Self {
            created: Utc::now(),
            config: config.clone(),
            window,
            points,
            train: plan.train.iter().map(ManifestEntry::from).collect(),
            validation: plan.validation.iter().map(ManifestEntry::from).collect(),
        }
    }

    /// Write as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<(), DatasetError> {
        let mut file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut file, self)?;
        file.flush()?;
        Ok(())
    }

    /// Read from JSON.
    pub fn read(path: &Path) -> Result<Self, DatasetError> {
        let file = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(file)?)
    }
}
