use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use cyclife::features::AugmentVariant;
use cyclife::split::SplitStrategy;

mod augment;
mod config;
mod demo;
mod extract;
mod plot;
mod split;
mod validate;

pub use config::Config;

/// cyclife - battery cycling archive preprocessing
#[derive(Parser)]
#[command(name = "cyclife-prep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the pipeline stages.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Data set root (overrides `[layout] root`)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl CommonArgs {
    fn load(&self) -> Result<Config> {
        Config::load(self.config.as_deref())
    }
}

/// Split assignment strategy.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyArg {
    /// Split every EoL bucket by the train ratio
    Stratified,
    /// Shuffle all cells once and cut at the train ratio
    Shuffle,
}

impl From<StrategyArg> for SplitStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Stratified => SplitStrategy::Stratified,
            StrategyArg::Shuffle => SplitStrategy::Shuffle,
        }
    }
}

/// Feature augmentation variant.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum VariantArg {
    /// Two selectors over discharge curves (predictor1)
    Discharge,
    /// Discharge and charge selectors (predictor3)
    Full,
}

impl From<VariantArg> for AugmentVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Discharge => AugmentVariant::Discharge,
            VariantArg::Full => AugmentVariant::Full,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the .mat batch files into per-cell arrays
    Extract {
        #[command(flatten)]
        common: CommonArgs,

        /// Cycles converted to curves per cell
        #[arg(long)]
        cycle_length: Option<usize>,

        /// Resampled points per charge/discharge window
        #[arg(long)]
        points: Option<usize>,
    },

    /// Generate a synthetic archive and extract it
    Demo {
        #[command(flatten)]
        common: CommonArgs,

        /// Number of synthetic cells
        #[arg(long, default_value = "24")]
        cells: usize,

        /// Generator seed
        #[arg(long, default_value = "7")]
        seed: u64,

        /// Cycles converted to curves per cell
        #[arg(long)]
        cycle_length: Option<usize>,

        /// Resampled points per charge/discharge window
        #[arg(long)]
        points: Option<usize>,
    },

    /// Plot discharge capacity fade of all extracted cells
    Plot {
        #[command(flatten)]
        common: CommonArgs,

        /// Output SVG file (defaults to <root>/capacity_fade.svg)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Split extracted cells into training and validation arrays
    Split {
        #[command(flatten)]
        common: CommonArgs,

        /// Fraction of cells used for training
        #[arg(long)]
        train_ratio: Option<f64>,

        /// Shuffle seed
        #[arg(long)]
        seed: Option<u64>,

        /// Assignment strategy
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Cycles per cell in the split arrays
        #[arg(long)]
        window: Option<usize>,
    },

    /// Append learned selector features to the split summaries
    Augment {
        #[command(flatten)]
        common: CommonArgs,

        /// Augmentation variant
        #[arg(value_enum)]
        variant: VariantArg,

        /// Selector model directory (overrides `[layout] models_dir`)
        #[arg(long, value_name = "DIR")]
        models: Option<PathBuf>,

        /// Seed tag of the selector model files
        #[arg(long)]
        model_seed: Option<u64>,
    },

    /// Validate a cell directory or split directory
    Validate {
        /// Directory to check
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract {
            common,
            cycle_length,
            points,
        } => extract::run(common, cycle_length, points),
        Commands::Demo {
            common,
            cells,
            seed,
            cycle_length,
            points,
        } => demo::run(common, cells, seed, cycle_length, points),
        Commands::Plot { common, output } => plot::run(common, output),
        Commands::Split {
            common,
            train_ratio,
            seed,
            strategy,
            window,
        } => split::run(
            common,
            train_ratio,
            seed,
            strategy.map(SplitStrategy::from),
            window,
        ),
        Commands::Augment {
            common,
            variant,
            models,
            model_seed,
        } => augment::run(common, AugmentVariant::from(variant), models, model_seed),
        Commands::Validate { dir } => validate::run(dir),
    }
}
