//! One-time bucket setup: creation, versioning, default encryption,
//! lifecycle tiering, and partition markers. Safe to re-run.

use anyhow::{Context, Result};
use lakestream::config::Config;
use lakestream::logging::init_tracing;
use lakestream::provision::BucketProvisioner;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.service.log_level);

    info!(
        bucket = %config.storage.bucket,
        region = %config.storage.region,
        "provisioning bucket"
    );

    let provisioner = BucketProvisioner::new(&config.storage).await;
    let report = provisioner.provision_all().await;

    info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "provisioning complete"
    );

    if !report.all_succeeded() {
        error!(steps = ?report.failed, "some provisioning steps failed");
        std::process::exit(1);
    }

    info!(bucket = %config.storage.bucket, "bucket is ready for streaming data");
    Ok(())
}
