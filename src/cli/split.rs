use anyhow::{Context, Result};
use log::{info, warn};

use cyclife::dataset::CellStore;
use cyclife::split::{plan_split, write_split, CellInfo, EolBucket, Partition, SplitStrategy};

use super::CommonArgs;

/// Split extracted cells into training and validation arrays
pub fn run(
    common: CommonArgs,
    train_ratio: Option<f64>,
    seed: Option<u64>,
    strategy: Option<SplitStrategy>,
    window: Option<usize>,
) -> Result<()> {
    let config = common.load()?;
    let layout = config.layout(common.root.clone());
    let split_config = config.split_config(train_ratio, seed, strategy);
    let window = config.split_window(window);

    let store = CellStore::open(layout.cells_path()).with_context(|| {
        format!("Failed to open cell directory: {}", layout.cells_path().display())
    })?;
    let records = store.load_all().context("Failed to load extracted cells")?;
    info!("Loaded {} cells from {}", records.len(), store.dir().display());

    let infos: Vec<CellInfo> = records.iter().map(CellInfo::from).collect();
    let plan = plan_split(&infos, &split_config).context("Invalid split configuration")?;

    for partition in Partition::ALL {
        let counts = plan.bucket_counts(partition);
        let buckets: Vec<String> = EolBucket::ALL
            .iter()
            .zip(counts)
            .map(|(bucket, n)| format!("{bucket} {n}"))
            .collect();
        info!("{}: {}", partition.prefix(), buckets.join(", "));
        if plan.cells(partition).is_empty() {
            warn!("{} partition has no cells", partition.prefix());
        }
    }

    let out_dir = layout.split_path();
    let stats = write_split(&records, &plan, &split_config, &out_dir, window)
        .with_context(|| format!("Failed to write split to {}", out_dir.display()))?;

    println!("{}", stats);
    println!("Output: {}", out_dir.display());
    Ok(())
}
