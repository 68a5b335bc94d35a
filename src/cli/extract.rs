use anyhow::{Context, Result};
use log::info;

use cyclife::dataset::CellStore;
use cyclife::extract::extract_archive;

use super::CommonArgs;

/// Extract the batch files into per-cell arrays
pub fn run(common: CommonArgs, cycle_length: Option<usize>, points: Option<usize>) -> Result<()> {
    let config = common.load()?;
    let layout = config.layout(common.root.clone());
    let extract_config = config.extract_config(cycle_length, points);
    let batches = config.batches(&layout);

    info!("cyclife Extraction");
    info!("==================");
    info!("Root: {}", layout.root.display());
    info!(
        "Cycles per cell: {}, points per window: {}",
        extract_config.cycle_length, extract_config.points
    );

    let store = CellStore::create(layout.cells_path()).with_context(|| {
        format!(
            "Failed to create cell directory: {}",
            layout.cells_path().display()
        )
    })?;

    let stats =
        extract_archive(&batches, &store, &extract_config).context("Extraction failed")?;

    println!("{}", stats);
    println!("Output: {}", store.dir().display());
    Ok(())
}
