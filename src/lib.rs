//! # cyclife - Battery Cycling Archive Preprocessing
//!
//! `cyclife` turns raw battery-cycling measurement archives into fixed-size
//! numeric arrays for cycle-life prediction models, and augments them with
//! features from pretrained dimensionality-reduction models.
//!
//! ## Pipeline
//!
//! Every stage is a library entry point and a subcommand of `cyclife-prep`.
//! Stages communicate only through `.npy` files in a fixed directory layout
//! ([`dataset::DatasetLayout`]):
//!
//! 1. **extract** ([`extract`]): per-cell summary `(6, n_cycles)` and
//!    resampled cycle curves `(cycles, 8, points)`
//! 2. **plot** ([`plot`]): capacity fade of all cells, colored by end of life
//! 3. **split** ([`split`]): EoL-stratified train/validation arrays
//! 4. **augment** ([`features`]): summary window plus learned selector
//!    features, `(n, 8, w)` or `(n, 10, w)`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cyclife::archive::synthetic::{generate, SyntheticConfig};
//! use cyclife::archive::BatchSpec;
//! use cyclife::dataset::{CellStore, DatasetLayout};
//! use cyclife::extract::{extract_batch, ExtractConfig};
//! use cyclife::split::{plan_split, write_split, CellInfo, SplitConfig};
//!
//! let layout = DatasetLayout::with_root("demo_data");
//! let store = CellStore::create(layout.cells_path())?;
//!
//! // Synthetic cells stand in for the .mat batch files
//! let archive = generate(&SyntheticConfig::default());
//! let config = ExtractConfig::default();
//! extract_batch(&archive, &BatchSpec::new("synthetic", "s0c"), &store, &config)?;
//!
//! let records = store.load_all()?;
//! let cells: Vec<CellInfo> = records.iter().map(CellInfo::from).collect();
//! let split = SplitConfig::default();
//! let plan = plan_split(&cells, &split)?;
//! let stats = write_split(&records, &plan, &split, &layout.split_path(), config.cycle_length)?;
//! println!("{}", stats);
//! # Ok::<(), cyclife::dataset::DatasetError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`archive`]: raw archive access (`.mat`/HDF5, in-memory, synthetic)
//! - [`curve`]: charge/discharge segmentation and linear resampling
//! - [`dataset`]: per-cell array store and directory layout
//! - [`extract`]: archive to cell store
//! - [`plot`]: diagnostic capacity fade plot
//! - [`split`]: stratified train/validation split
//! - [`features`]: learned feature augmentation (ONNX selectors)
//! - [`validator`]: shape and integrity checks of pipeline outputs
//!
//! ## Features
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `mat` | Reading `.mat` batch files through libhdf5 |
//! | `onnx` | Running the pretrained selectors with ONNX Runtime |
//! | `parallel` | Resampling the cycles of a cell on the rayon pool |
//! | `colorized_output` | Colored validation reports (default) |

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod archive;
pub mod curve;
pub mod dataset;
pub mod extract;
pub mod features;
pub mod plot;
pub mod split;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::archive::{ArchiveError, ArchiveSource, BatchSpec, InMemoryArchive, RawCycle};
    pub use crate::curve::{cycle_curve, resample, segment, CurveError, CycleWindows};
    pub use crate::dataset::{CellKey, CellRecord, CellStore, DatasetError, DatasetLayout};
    pub use crate::extract::{extract_batch, ExtractConfig, ExtractStats};
    pub use crate::features::{
        augment_partition, run_augment, AugmentVariant, CurvePart, FeatureError,
        FeatureExtractor, Selector,
    };
    pub use crate::plot::{plot_capacity_fade, FadeStats};
    pub use crate::split::{plan_split, write_split, SplitConfig, SplitPlan, SplitStrategy};
    pub use crate::validator::{validate_dir, ValidationReport};

    #[cfg(feature = "mat")]
    pub use crate::archive::MatArchive;
    #[cfg(feature = "onnx")]
    pub use crate::features::{load_selectors, OnnxExtractor};
}
