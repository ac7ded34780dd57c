use anyhow::Result;
use mlbstats::{logging, store, PipelineConfig};
use std::{env, path::PathBuf};
use tracing::{info, warn};

fn main() -> Result<()> {
    logging::init("info");

    // 1. Configuration; an optional first argument overrides the artifact dir
    let config = PipelineConfig::load()?;
    let processed_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.processed_dir.clone());

    // 2. Open (or create) the database file
    let mut conn = store::open_disk_db(&config.db_path)?;

    // 3. Replace-load each .parquet artifact as its own table
    let loads = store::load_artifacts(&mut conn, &processed_dir)?;

    let failed: Vec<_> = loads.iter().filter(|l| !l.is_loaded()).collect();
    for f in &failed {
        warn!(table = %f.table, "not imported");
    }
    info!(
        imported = loads.len() - failed.len(),
        failed = failed.len(),
        db = %config.db_path.display(),
        "all artifacts from {} imported",
        processed_dir.display()
    );
    Ok(())
}
