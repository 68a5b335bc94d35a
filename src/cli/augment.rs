use anyhow::Result;
use std::path::PathBuf;

use cyclife::features::AugmentVariant;

use super::CommonArgs;

/// Run a selector variant over the split directory
#[cfg(feature = "onnx")]
pub fn run(
    common: CommonArgs,
    variant: AugmentVariant,
    models: Option<PathBuf>,
    model_seed: Option<u64>,
) -> Result<()> {
    use anyhow::Context;
    use cyclife::features::{load_selectors, run_augment};
    use log::info;

    let config = common.load()?;
    let layout = config.layout(common.root.clone());
    let models = models.unwrap_or_else(|| layout.models_path().to_path_buf());
    let seed = config.model_seed(model_seed);

    info!("cyclife Augmentation ({})", variant);
    info!("Models: {}", models.join(variant.model_dir()).display());

    let selectors = load_selectors(variant, &models, seed)
        .with_context(|| format!("Failed to load {} selectors", variant))?;
    let split_dir = layout.split_path();
    let stats = run_augment(&split_dir, variant, &selectors)
        .with_context(|| format!("Augmentation failed in {}", split_dir.display()))?;

    println!("{}", stats);
    Ok(())
}

/// Run a selector variant over the split directory
#[cfg(not(feature = "onnx"))]
pub fn run(
    _common: CommonArgs,
    variant: AugmentVariant,
    _models: Option<PathBuf>,
    _model_seed: Option<u64>,
) -> Result<()> {
    anyhow::bail!(
        "{} augmentation requires the `onnx` feature; rebuild with --features onnx",
        variant
    )
}
