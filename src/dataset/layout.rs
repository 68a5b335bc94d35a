use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory layout shared by all pipeline stages.
///
/// ```text
/// {root}/
/// ├── *.mat                       # raw batch files
/// ├── {cells_dir}/                # extract output: <key>_summary.npy, <key>_cycle.npy
/// └── {split_dir}/                # split and augment output
/// {models_dir}/
/// ├── discharge/                  # selectors over discharge curves
/// └── full/                       # selectors over charge and discharge curves
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetLayout {
    /// Data set root holding the raw batch files
    pub root: PathBuf,
    /// Per-cell array directory, relative to `root`
    pub cells_dir: PathBuf,
    /// Split/augment directory, relative to `root`
    pub split_dir: PathBuf,
    /// Pretrained selector models
    pub models_dir: PathBuf,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("Severson_Dataset"),
            cells_dir: PathBuf::from("npdata_each_cell"),
            split_dir: PathBuf::from("feature_selector_discharge"),
            models_dir: PathBuf::from("models"),
        }
    }
}

impl DatasetLayout {
    /// Layout rooted at `root` with default sub-directories.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Directory of per-cell arrays.
    pub fn cells_path(&self) -> PathBuf {
        self.root.join(&self.cells_dir)
    }

    /// Directory of split and augmented arrays.
    pub fn split_path(&self) -> PathBuf {
        self.root.join(&self.split_dir)
    }

    /// Directory of pretrained selector models.
    pub fn models_path(&self) -> &Path {
        &self.models_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let layout = DatasetLayout::default();
        assert_eq!(
            layout.cells_path(),
            PathBuf::from("Severson_Dataset/npdata_each_cell")
        );
        assert_eq!(
            layout.split_path(),
            PathBuf::from("Severson_Dataset/feature_selector_discharge")
        );
        assert_eq!(layout.models_path(), Path::new("models"));
    }

    #[test]
    fn test_partial_toml() {
        let layout: DatasetLayout = toml::from_str(r#"root = "/data/lfp""#).unwrap();
        assert_eq!(layout.cells_path(), PathBuf::from("/data/lfp/npdata_each_cell"));
    }
}
