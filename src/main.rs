use anyhow::Result;
use mlbstats::{logging, pipeline, PipelineConfig, PipelineError};
use tracing::{error, info};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init("info,mlbstats=info");
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) configuration ────────────────────────────────────────────
    let config = PipelineConfig::load()?;
    info!(
        raw = %config.raw_dir.display(),
        processed = %config.processed_dir.display(),
        db = %config.db_path.display(),
        known_categories = config.categories.len(),
        "configured"
    );

    // ─── 3) raw → normalized → store ─────────────────────────────────
    let report = match pipeline::run(&config) {
        Ok(report) => report,
        Err(e) => {
            match e.downcast_ref::<PipelineError>() {
                Some(fatal) if fatal.is_fatal() => error!("run aborted: {}", fatal),
                _ => error!("run failed: {:#}", e),
            }
            std::process::exit(1);
        }
    };

    let skipped = report.skipped_files().count();
    info!(skipped, "all done");
    Ok(())
}
