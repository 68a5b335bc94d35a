//! # Learned Feature Augmentation
//!
//! Augments the per-cell summary window with features produced by pretrained
//! dimensionality-reduction models ("selectors"). Each selector maps the `w`
//! resampled cycles of one half of a cell's curves, shaped `(w, 4, points)`,
//! to one value per cycle. The outputs are appended as extra channels after
//! the six summary channels:
//!
//! | Variant | Output prefix | Selectors | Channels |
//! |---------|---------------|-----------|----------|
//! | [`AugmentVariant::Discharge`] | `predictor1` | 2 × discharge | 8 |
//! | [`AugmentVariant::Full`] | `predictor3` | 2 × discharge, 2 × charge | 10 |
//!
//! Selector models are loaded with ONNX Runtime (feature `onnx`); any other
//! implementation of [`FeatureExtractor`] can be plugged in.

#[cfg(feature = "onnx")]
mod onnx;

#[cfg(test)]
mod tests;

#[cfg(feature = "onnx")]
pub use onnx::{load_selectors, OnnxExtractor};

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray::{s, Array3, ArrayView3};
use ndarray_npy::{read_npy, write_npy};

use crate::archive::SUMMARY_CHANNELS;
use crate::curve::{CURVE_CHANNELS, PART_CHANNELS};
use crate::dataset::DatasetError;
use crate::split::Partition;

/// Errors that can occur during feature augmentation
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// Error reading or writing split arrays
    #[error("Dataset error: {0}")]
    DatasetError(#[from] DatasetError),

    /// Model file does not exist
    #[error("Model not found: {0}")]
    ModelNotFound(PathBuf),

    /// Model could not be loaded
    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    /// Model inference failed
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Selector returned the wrong number of values
    #[error("Selector {name} returned {actual} values, expected {expected}")]
    OutputLength {
        /// Selector name
        name: String,
        /// Expected number of values (one per cycle)
        expected: usize,
        /// Number of values returned
        actual: usize,
    },

    /// Input arrays disagree in shape
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
}

impl From<ndarray_npy::ReadNpyError> for FeatureError {
    fn from(e: ndarray_npy::ReadNpyError) -> Self {
        FeatureError::DatasetError(e.into())
    }
}

impl From<ndarray_npy::WriteNpyError> for FeatureError {
    fn from(e: ndarray_npy::WriteNpyError) -> Self {
        FeatureError::DatasetError(e.into())
    }
}

/// Half of a cycle curve fed to a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurvePart {
    /// Charge channels `[Q, V, I, T]`
    Charge,
    /// Discharge channels `[Q, V, I, T]`
    Discharge,
}

impl CurvePart {
    /// Channel range of this part within an 8-channel curve.
    pub fn channels(&self) -> Range<usize> {
        match self {
            CurvePart::Charge => 0..PART_CHANNELS,
            CurvePart::Discharge => PART_CHANNELS..CURVE_CHANNELS,
        }
    }
}

impl fmt::Display for CurvePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurvePart::Charge => write!(f, "charge"),
            CurvePart::Discharge => write!(f, "discharge"),
        }
    }
}

/// A model reducing `(w, 4, points)` curves to one value per cycle.
pub trait FeatureExtractor {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Reduce the curves of `w` cycles to `w` values.
    fn extract(&self, curves: ArrayView3<'_, f32>) -> Result<Vec<f32>, FeatureError>;
}

/// A feature extractor bound to the curve part it reads.
pub struct Selector {
    /// Curve part fed to the extractor
    pub part: CurvePart,
    /// The extractor
    pub extractor: Box<dyn FeatureExtractor>,
}

impl Selector {
    /// Bind an extractor to a curve part.
    pub fn new(part: CurvePart, extractor: impl FeatureExtractor + 'static) -> Self {
        Self {
            part,
            extractor: Box::new(extractor),
        }
    }
}

/// Where a selector model lives and which part it reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorSpec {
    /// Model file
    pub path: PathBuf,
    /// Curve part fed to the model
    pub part: CurvePart,
}

/// Default seed tag of the pretrained selector files.
pub const DEFAULT_MODEL_SEED: u64 = 41;

/// Feature augmentation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AugmentVariant {
    /// Two selectors over discharge curves
    Discharge,
    /// Two selectors over discharge and two over charge curves
    Full,
}

impl AugmentVariant {
    /// Prefix of the output files.
    pub fn output_prefix(&self) -> &'static str {
        match self {
            AugmentVariant::Discharge => "predictor1",
            AugmentVariant::Full => "predictor3",
        }
    }

    /// Sub-directory of the models directory holding this variant's selectors.
    pub fn model_dir(&self) -> &'static str {
        match self {
            AugmentVariant::Discharge => "discharge",
            AugmentVariant::Full => "full",
        }
    }

    /// Curve part of each selector, in output channel order.
    pub fn parts(&self) -> &'static [CurvePart] {
        match self {
            AugmentVariant::Discharge => &[CurvePart::Discharge, CurvePart::Discharge],
            AugmentVariant::Full => &[
                CurvePart::Discharge,
                CurvePart::Discharge,
                CurvePart::Charge,
                CurvePart::Charge,
            ],
        }
    }

    /// Number of output channels (summary plus one per selector).
    pub fn channels(&self) -> usize {
        SUMMARY_CHANNELS + self.parts().len()
    }

    /// Model files of this variant: `{models}/{dir}/Dim_Reduction_{i}_seed{seed}.onnx`.
    pub fn selector_specs(&self, models_dir: &Path, seed: u64) -> Vec<SelectorSpec> {
        self.parts()
            .iter()
            .enumerate()
            .map(|(i, &part)| SelectorSpec {
                path: models_dir
                    .join(self.model_dir())
                    .join(format!("Dim_Reduction_{}_seed{}.onnx", i + 1, seed)),
                part,
            })
            .collect()
    }

    /// Output file of a partition, e.g. `predictor1_trn_feature.npy`.
    pub fn output_file(&self, partition: Partition) -> String {
        format!("{}_{}_feature.npy", self.output_prefix(), partition.prefix())
    }
}

impl fmt::Display for AugmentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.output_prefix())
    }
}

/// Build the `(n, 6 + k, window)` augmented array of one partition.
///
/// `summary` is `(n, 6, >= window)`; `curves` is `(n * window, 8, points)`
/// with the cycles of cell `i` in rows `i * window .. (i + 1) * window`.
pub fn augment_partition(
    summary: &Array3<f64>,
    curves: &Array3<f64>,
    selectors: &[Selector],
    window: usize,
) -> Result<Array3<f64>, FeatureError> {
    let n = summary.shape()[0];
    if summary.shape()[1] != SUMMARY_CHANNELS || summary.shape()[2] < window {
        return Err(FeatureError::ShapeMismatch(format!(
            "summary {:?}, expected (n, {SUMMARY_CHANNELS}, >= {window})",
            summary.shape()
        )));
    }
    if curves.shape()[0] != n * window || curves.shape()[1] != CURVE_CHANNELS {
        return Err(FeatureError::ShapeMismatch(format!(
            "curves {:?}, expected ({}, {CURVE_CHANNELS}, points)",
            curves.shape(),
            n * window
        )));
    }

    let mut out = Array3::zeros((n, SUMMARY_CHANNELS + selectors.len(), window));
    out.slice_mut(s![.., ..SUMMARY_CHANNELS, ..])
        .assign(&summary.slice(s![.., .., ..window]));

    for i in 0..n {
        let rows = i * window..(i + 1) * window;
        for (j, selector) in selectors.iter().enumerate() {
            let input = curves
                .slice(s![rows.clone(), selector.part.channels(), ..])
                .mapv(|v| v as f32);
            let values = selector.extractor.extract(input.view())?;
            if values.len() != window {
                return Err(FeatureError::OutputLength {
                    name: selector.extractor.name().to_string(),
                    expected: window,
                    actual: values.len(),
                });
            }
            for (slot, value) in out
                .slice_mut(s![i, SUMMARY_CHANNELS + j, ..])
                .iter_mut()
                .zip(values)
            {
                *slot = f64::from(value);
            }
        }
        debug!("Augmented cell {}/{}", i + 1, n);
    }

    Ok(out)
}

/// Statistics from an augmentation run
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentStats {
    /// Variant that was run
    pub variant: AugmentVariant,
    /// Training cells augmented
    pub train_cells: usize,
    /// Validation cells augmented
    pub validation_cells: usize,
    /// Output channels per cell
    pub channels: usize,
}

impl fmt::Display for AugmentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} training cells, {} validation cells, {} channels",
            self.variant, self.train_cells, self.validation_cells, self.channels
        )
    }
}

/// Augment both partitions of a split directory and write the outputs.
///
/// The window is taken from the summary arrays written by the split stage.
pub fn run_augment(
    split_dir: &Path,
    variant: AugmentVariant,
    selectors: &[Selector],
) -> Result<AugmentStats, FeatureError> {
    if !split_dir.is_dir() {
        return Err(DatasetError::MissingDirectory(split_dir.to_path_buf()).into());
    }
    let expected_parts = variant.parts();
    let parts: Vec<CurvePart> = selectors.iter().map(|s| s.part).collect();
    if parts != expected_parts {
        return Err(FeatureError::ShapeMismatch(format!(
            "{variant} expects selectors over {expected_parts:?}, got {parts:?}"
        )));
    }

    let mut counts = [0usize; 2];
    for (slot, partition) in counts.iter_mut().zip(Partition::ALL) {
        let summary: Array3<f64> = read_npy(split_dir.join(partition.file_name("summary")))?;
        let curves: Array3<f64> = read_npy(split_dir.join(partition.file_name("features")))?;
        let window = summary.shape()[2];

        let augmented = augment_partition(&summary, &curves, selectors, window)?;
        let path = split_dir.join(variant.output_file(partition));
        write_npy(&path, &augmented)?;
        info!("Wrote {} {:?}", path.display(), augmented.shape());
        *slot = augmented.shape()[0];
    }

    Ok(AugmentStats {
        variant,
        train_cells: counts[0],
        validation_cells: counts[1],
        channels: variant.channels(),
    })
}
