//! Uploads files staged under the local data root in one batch, then
//! verifies what landed under each partition prefix.

use anyhow::{Context, Result};
use lakestream::config::Config;
use lakestream::inventory;
use lakestream::local::LocalFileSource;
use lakestream::logging::init_tracing;
use lakestream::runner::BatchRunner;
use lakestream::store::S3Store;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.service.log_level);

    info!(
        service = %config.service.name,
        bucket = %config.storage.bucket,
        root = %config.local.root.display(),
        "starting local file upload"
    );

    let source = LocalFileSource::new(&config.local);
    let outcome = source.scan().await.context("failed to scan local data root")?;

    let store = S3Store::new(&config.storage).await;
    let runner = BatchRunner::new(&store);

    let mut summary = runner.run_batch(outcome.records).await;
    summary.failed += outcome.failed_reads;

    // Verification pass: list what is actually in the bucket now.
    match inventory::verify_partitions(&store).await {
        Ok(report) => {
            info!(total_objects = report.total_objects(), "bucket inventory");
            if let Err(err) = inventory::publish_metadata(&store, &report).await {
                warn!(error = %err, "failed to publish partition metadata");
            }
        }
        Err(err) => warn!(error = %err, "failed to verify uploads"),
    }

    info!(%summary, "local upload finished");

    if summary.failed > 0 {
        warn!(failed = summary.failed, "exiting non-zero due to failed uploads");
        std::process::exit(1);
    }
    Ok(())
}
