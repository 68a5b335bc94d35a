//! # cyclife-prep
//!
//! Command-line front end of the battery cycling preprocessing pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Extract the raw batch files under Severson_Dataset/
//! cyclife-prep extract --root Severson_Dataset
//!
//! # Or build a synthetic data set instead
//! cyclife-prep demo --root demo_data
//!
//! # Diagnostic plot, split, augmentation
//! cyclife-prep plot --root demo_data
//! cyclife-prep split --root demo_data
//! cyclife-prep augment discharge --root demo_data
//!
//! # Check the outputs
//! cyclife-prep validate demo_data/feature_selector_discharge
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
