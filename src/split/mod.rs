//! # Train/Validation Split
//!
//! Partitions extracted cells into a training and a validation set. Cells are
//! grouped by end-of-life bucket so both sets cover short-, medium- and
//! long-lived cells in proportion:
//!
//! | Bucket | End of life |
//! |--------|-------------|
//! | short  | < 600 cycles |
//! | medium | 600 ..= 1200 cycles |
//! | long   | > 1200 cycles |
//!
//! [`plan_split`] is pure and deterministic for a given seed; [`write_split`]
//! materialises a plan into the training arrays:
//!
//! ```text
//! {split_dir}/
//! ├── trn_features.npy     (n_trn * w, 8, points)
//! ├── trn_targets.npy      (n_trn * w, 2)   [eol, charge time at eol]
//! ├── trn_summary.npy      (n_trn, 6, w)
//! ├── val_*.npy            same for validation
//! └── split_manifest.json
//! ```

mod manifest;
mod writer;

pub use manifest::{ManifestEntry, SplitManifest, MANIFEST_FILE};
pub use writer::{write_split, SplitStats};

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::dataset::{CellKey, CellRecord, DatasetError};

/// Upper bound (exclusive) of the short-life bucket.
pub const SHORT_LIFE_LIMIT: usize = 600;

/// Upper bound (inclusive) of the medium-life bucket.
pub const MEDIUM_LIFE_LIMIT: usize = 1200;

/// End-of-life bucket used for stratification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EolBucket {
    /// EoL < 600
    Short,
    /// 600 <= EoL <= 1200
    Medium,
    /// EoL > 1200
    Long,
}

impl EolBucket {
    /// All buckets in ascending life order.
    pub const ALL: [EolBucket; 3] = [EolBucket::Short, EolBucket::Medium, EolBucket::Long];

    /// Bucket of a cell with the given end of life.
    pub fn of(eol: usize) -> Self {
        if eol < SHORT_LIFE_LIMIT {
            EolBucket::Short
        } else if eol <= MEDIUM_LIFE_LIMIT {
            EolBucket::Medium
        } else {
            EolBucket::Long
        }
    }
}

impl fmt::Display for EolBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EolBucket::Short => write!(f, "short"),
            EolBucket::Medium => write!(f, "medium"),
            EolBucket::Long => write!(f, "long"),
        }
    }
}

/// How cells are assigned to partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitStrategy {
    /// Split every EoL bucket by the train ratio
    #[default]
    Stratified,
    /// Shuffle all cells once and cut at the train ratio
    Shuffle,
}

/// Split parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of cells (per bucket when stratified) used for training
    pub train_ratio: f64,
    /// RNG seed of the shuffles
    pub seed: u64,
    /// Assignment strategy
    pub strategy: SplitStrategy,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.8,
            seed: 15,
            strategy: SplitStrategy::Stratified,
        }
    }
}

/// Partition of the split output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Training set
    Train,
    /// Validation set
    Validation,
}

impl Partition {
    /// Both partitions, training first.
    pub const ALL: [Partition; 2] = [Partition::Train, Partition::Validation];

    /// File name prefix (`trn` / `val`).
    pub fn prefix(&self) -> &'static str {
        match self {
            Partition::Train => "trn",
            Partition::Validation => "val",
        }
    }

    /// File name of an array of this partition, e.g. `trn_features.npy`.
    pub fn file_name(&self, kind: &str) -> String {
        format!("{}_{}.npy", self.prefix(), kind)
    }
}

/// Per-cell facts the split needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CellInfo {
    /// Cell key
    pub key: CellKey,
    /// End of life (cycles)
    pub eol: usize,
    /// Charge time of the last cycle
    pub charge_time_end: f64,
}

impl CellInfo {
    /// EoL bucket of the cell.
    pub fn bucket(&self) -> EolBucket {
        EolBucket::of(self.eol)
    }
}

impl From<&CellRecord> for CellInfo {
    fn from(record: &CellRecord) -> Self {
        Self {
            key: record.key.clone(),
            eol: record.eol(),
            charge_time_end: record.charge_time_end(),
        }
    }
}

/// Ordered assignment of cells to partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlan {
    /// Training cells in output order
    pub train: Vec<CellInfo>,
    /// Validation cells in output order
    pub validation: Vec<CellInfo>,
}

impl SplitPlan {
    /// Cells of one partition.
    pub fn cells(&self, partition: Partition) -> &[CellInfo] {
        match partition {
            Partition::Train => &self.train,
            Partition::Validation => &self.validation,
        }
    }

    /// Number of cells of each bucket in a partition.
    pub fn bucket_counts(&self, partition: Partition) -> [usize; 3] {
        let mut counts = [0; 3];
        for cell in self.cells(partition) {
            counts[cell.bucket() as usize] += 1;
        }
        counts
    }
}

/// Assign cells to partitions.
pub fn plan_split(cells: &[CellInfo], config: &SplitConfig) -> Result<SplitPlan, DatasetError> {
    if !(0.0..=1.0).contains(&config.train_ratio) {
        return Err(DatasetError::InvalidConfig(format!(
            "train_ratio must be within [0, 1], got {}",
            config.train_ratio
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut train = Vec::new();
    let mut validation = Vec::new();

    match config.strategy {
        SplitStrategy::Shuffle => {
            let mut all = cells.to_vec();
            all.shuffle(&mut rng);
            let cut = split_point(all.len(), config.train_ratio);
            validation = all.split_off(cut);
            train = all;
        }
        SplitStrategy::Stratified => {
            for bucket in EolBucket::ALL {
                let mut members: Vec<CellInfo> = cells
                    .iter()
                    .filter(|c| c.bucket() == bucket)
                    .cloned()
                    .collect();
                members.shuffle(&mut rng);
                let cut = split_point(members.len(), config.train_ratio);
                validation.extend(members.split_off(cut));
                train.extend(members);
            }
            train.shuffle(&mut rng);
            validation.shuffle(&mut rng);
        }
    }

    Ok(SplitPlan { train, validation })
}

fn split_point(len: usize, ratio: f64) -> usize {
    ((len as f64 * ratio).floor() as usize).min(len)
}
