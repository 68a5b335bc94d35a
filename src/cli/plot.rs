use anyhow::{Context, Result};
use std::path::PathBuf;

use cyclife::dataset::CellStore;
use cyclife::plot::plot_capacity_fade;

use super::CommonArgs;

/// Plot capacity fade of the extracted cells
pub fn run(common: CommonArgs, output: Option<PathBuf>) -> Result<()> {
    let config = common.load()?;
    let layout = config.layout(common.root.clone());
    let output = output.unwrap_or_else(|| layout.root.join("capacity_fade.svg"));

    let store = CellStore::open(layout.cells_path()).with_context(|| {
        format!("Failed to open cell directory: {}", layout.cells_path().display())
    })?;
    let stats = plot_capacity_fade(&store, &output).context("Failed to draw plot")?;

    println!("n cells: {}", stats.cells);
    println!("max EoL: {}", stats.max_eol);
    println!("min EoL: {}", stats.min_eol);
    println!("Plot: {}", output.display());
    Ok(())
}
