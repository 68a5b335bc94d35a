use std::path::Path;
use std::sync::Mutex;

use log::info;
use ndarray::ArrayView3;
use ort::session::Session;
use ort::value::Tensor;

use super::{AugmentVariant, FeatureError, FeatureExtractor, Selector};

/// Selector model run with ONNX Runtime.
///
/// The model takes a single `(w, 4, points)` f32 input and produces `w`
/// values, in whatever shape (`(w,)` or `(w, 1)`). The session sits behind a
/// Mutex since running it needs `&mut Session`.
pub struct OnnxExtractor {
    name: String,
    session: Mutex<Session>,
}

impl OnnxExtractor {
    /// Load a selector model from an `.onnx` file.
    pub fn load(path: &Path) -> Result<Self, FeatureError> {
        if !path.exists() {
            return Err(FeatureError::ModelNotFound(path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| FeatureError::ModelInit(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e: ort::Error| FeatureError::ModelInit(e.to_string()))?
            .commit_from_file(path)
            .map_err(|e: ort::Error| FeatureError::ModelInit(format!("ONNX load failed: {e}")))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        info!("Loaded selector {} from {}", name, path.display());

        Ok(Self {
            name,
            session: Mutex::new(session),
        })
    }
}

impl FeatureExtractor for OnnxExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, curves: ArrayView3<'_, f32>) -> Result<Vec<f32>, FeatureError> {
        let (w, c, p) = curves.dim();
        let data: Vec<f32> = curves.iter().copied().collect();
        let input = Tensor::from_array(([w, c, p], data))
            .map_err(|e| FeatureError::Inference(format!("Input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| FeatureError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| FeatureError::Inference(format!("ONNX inference failed: {e}")))?;

        let (_, values) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| FeatureError::Inference(format!("Output extraction: {e}")))?;

        Ok(values.to_vec())
    }
}

/// Load the selectors of a variant from `models_dir`.
pub fn load_selectors(
    variant: AugmentVariant,
    models_dir: &Path,
    seed: u64,
) -> Result<Vec<Selector>, FeatureError> {
    variant
        .selector_specs(models_dir, seed)
        .into_iter()
        .map(|spec| Ok(Selector::new(spec.part, OnnxExtractor::load(&spec.path)?)))
        .collect()
}
