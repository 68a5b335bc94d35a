//! TOML configuration file support.
//!
//! Every stage reads its settings from an optional config file; CLI flags
//! override file values, file values override the built-in defaults:
//!
//! ```toml
//! # cyclife.toml
//! [layout]
//! root = "Severson_Dataset"
//! models_dir = "models"
//!
//! [extract]
//! cycle_length = 100
//! points = 500
//!
//! [[extract.batches]]
//! path = "Severson_Dataset/2017-05-12_batchdata_updated_struct_errorcorrect.mat"
//! prefix = "b1c"
//! skip = [0, 1, 2, 3, 4, 8, 10, 12, 13, 14, 15, 18, 22]
//!
//! [split]
//! train_ratio = 0.8
//! seed = 15
//! strategy = "stratified"
//! window = 100
//!
//! [augment]
//! model_seed = 41
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use cyclife::archive::BatchSpec;
use cyclife::dataset::DatasetLayout;
use cyclife::extract::ExtractConfig;
use cyclife::features::DEFAULT_MODEL_SEED;
use cyclife::split::{SplitConfig, SplitStrategy};

/// Root configuration structure for cyclife.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Directory layout.
    #[serde(default)]
    pub layout: LayoutSection,

    /// Extraction settings.
    #[serde(default)]
    pub extract: ExtractSection,

    /// Split settings.
    #[serde(default)]
    pub split: SplitSection,

    /// Augmentation settings.
    #[serde(default)]
    pub augment: AugmentSection,
}

/// Directory layout overrides.
#[derive(Debug, Default, Deserialize)]
pub struct LayoutSection {
    /// Data set root.
    pub root: Option<PathBuf>,

    /// Per-cell array directory, relative to the root.
    pub cells_dir: Option<PathBuf>,

    /// Split/augment directory, relative to the root.
    pub split_dir: Option<PathBuf>,

    /// Pretrained selector models.
    pub models_dir: Option<PathBuf>,
}

/// Configuration for the extract and demo commands.
#[derive(Debug, Default, Deserialize)]
pub struct ExtractSection {
    /// Cycles converted to curves per cell.
    pub cycle_length: Option<usize>,

    /// Resampled points per charge/discharge window.
    pub points: Option<usize>,

    /// Batch files; the three Severson batches under the root when omitted.
    pub batches: Option<Vec<BatchSpec>>,
}

/// Configuration for the split command.
#[derive(Debug, Default, Deserialize)]
pub struct SplitSection {
    /// Fraction of cells used for training.
    pub train_ratio: Option<f64>,

    /// Shuffle seed.
    pub seed: Option<u64>,

    /// Assignment strategy.
    pub strategy: Option<SplitStrategy>,

    /// Cycles per cell in the split arrays.
    pub window: Option<usize>,
}

/// Configuration for the augment command.
#[derive(Debug, Default, Deserialize)]
pub struct AugmentSection {
    /// Seed tag of the selector model files.
    pub model_seed: Option<u64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load the file if one was given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Layout with file values applied, then the `--root` flag.
    pub fn layout(&self, root: Option<PathBuf>) -> DatasetLayout {
        let mut layout = DatasetLayout::default();
        let section = &self.layout;
        if let Some(r) = &section.root {
            layout.root = r.clone();
        }
        if let Some(dir) = &section.cells_dir {
            layout.cells_dir = dir.clone();
        }
        if let Some(dir) = &section.split_dir {
            layout.split_dir = dir.clone();
        }
        if let Some(dir) = &section.models_dir {
            layout.models_dir = dir.clone();
        }
        if let Some(r) = root {
            layout.root = r;
        }
        layout
    }

    /// Extraction parameters with CLI overrides applied.
    pub fn extract_config(&self, cycle_length: Option<usize>, points: Option<usize>) -> ExtractConfig {
        let defaults = ExtractConfig::default();
        ExtractConfig {
            cycle_length: cycle_length
                .or(self.extract.cycle_length)
                .unwrap_or(defaults.cycle_length),
            points: points.or(self.extract.points).unwrap_or(defaults.points),
        }
    }

    /// Batch files to extract.
    pub fn batches(&self, layout: &DatasetLayout) -> Vec<BatchSpec> {
        self.extract
            .batches
            .clone()
            .unwrap_or_else(|| BatchSpec::severson(&layout.root))
    }

    /// Split parameters with CLI overrides applied.
    pub fn split_config(
        &self,
        train_ratio: Option<f64>,
        seed: Option<u64>,
        strategy: Option<SplitStrategy>,
    ) -> SplitConfig {
        let defaults = SplitConfig::default();
        SplitConfig {
            train_ratio: train_ratio
                .or(self.split.train_ratio)
                .unwrap_or(defaults.train_ratio),
            seed: seed.or(self.split.seed).unwrap_or(defaults.seed),
            strategy: strategy.or(self.split.strategy).unwrap_or(defaults.strategy),
        }
    }

    /// Split window: flag, then `[split] window`, then the extraction cycle length.
    pub fn split_window(&self, window: Option<usize>) -> usize {
        window
            .or(self.split.window)
            .unwrap_or_else(|| self.extract_config(None, None).cycle_length)
    }

    /// Selector model seed with CLI override applied.
    pub fn model_seed(&self, seed: Option<u64>) -> u64 {
        seed.or(self.augment.model_seed).unwrap_or(DEFAULT_MODEL_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [layout]
            root = "data"
            models_dir = "pretrained"

            [extract]
            cycle_length = 50
            points = 200

            [[extract.batches]]
            path = "data/b1.mat"
            prefix = "b1c"
            skip = [4, 0]

            [split]
            seed = 3
            strategy = "shuffle"

            [augment]
            model_seed = 7
        "#;

        let config = Config::from_str(toml).unwrap();
        let layout = config.layout(None);
        assert_eq!(layout.root, PathBuf::from("data"));
        assert_eq!(layout.models_dir, PathBuf::from("pretrained"));
        assert_eq!(layout.cells_path(), PathBuf::from("data/npdata_each_cell"));

        let extract = config.extract_config(None, None);
        assert_eq!(extract.cycle_length, 50);
        assert_eq!(extract.points, 200);

        let batches = config.batches(&layout);
        assert_eq!(batches.len(), 1);
        assert!(batches[0].is_skipped(4));

        let split = config.split_config(None, None, None);
        assert_eq!(split.seed, 3);
        assert_eq!(split.strategy, SplitStrategy::Shuffle);
        assert_eq!(split.train_ratio, 0.8);
        assert_eq!(config.split_window(None), 50);

        assert_eq!(config.model_seed(None), 7);
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = Config::from_str(
            r#"
            [layout]
            root = "data"

            [extract]
            points = 200

            [split]
            window = 80
        "#,
        )
        .unwrap();

        assert_eq!(
            config.layout(Some(PathBuf::from("other"))).root,
            PathBuf::from("other")
        );
        assert_eq!(config.extract_config(None, Some(64)).points, 64);
        assert_eq!(config.split_window(Some(10)), 10);
        assert_eq!(config.split_window(None), 80);
        assert_eq!(config.split_config(Some(0.5), None, None).train_ratio, 0.5);
        assert_eq!(config.model_seed(Some(1)), 1);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.layout(None), DatasetLayout::default());
        assert_eq!(config.extract_config(None, None), ExtractConfig::default());
        assert_eq!(config.split_config(None, None, None), SplitConfig::default());
        assert_eq!(config.batches(&DatasetLayout::default()).len(), 3);
        assert_eq!(config.model_seed(None), DEFAULT_MODEL_SEED);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(Config::from_str("[split]\nstrategy = \"random\"").is_err());
    }
}
