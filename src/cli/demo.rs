use anyhow::{Context, Result};
use log::info;

use cyclife::archive::synthetic::{generate, SyntheticConfig};
use cyclife::archive::BatchSpec;
use cyclife::dataset::CellStore;
use cyclife::extract::extract_batch;

use super::CommonArgs;

/// Generate a synthetic archive and extract it into the cell directory
pub fn run(
    common: CommonArgs,
    cells: usize,
    seed: u64,
    cycle_length: Option<usize>,
    points: Option<usize>,
) -> Result<()> {
    let config = common.load()?;
    let layout = config.layout(common.root.clone());
    let extract_config = config.extract_config(cycle_length, points);

    info!("cyclife Demo");
    info!("============");

    let synthetic = SyntheticConfig {
        cells,
        cycles: extract_config.cycle_length + 1,
        seed,
        ..Default::default()
    };
    info!(
        "Generating {} synthetic cells with {} cycles each...",
        synthetic.cells, synthetic.cycles
    );
    let archive = generate(&synthetic);

    let store = CellStore::create(layout.cells_path()).with_context(|| {
        format!(
            "Failed to create cell directory: {}",
            layout.cells_path().display()
        )
    })?;
    let spec = BatchSpec::new(layout.root.join("synthetic"), "s0c");
    let stats = extract_batch(&archive, &spec, &store, &extract_config)
        .context("Failed to extract synthetic archive")?;

    println!("{}", stats);
    println!("Output: {}", store.dir().display());
    Ok(())
}
