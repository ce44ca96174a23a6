//! Continuously generates synthetic CSV row sets and streams them into the
//! bucket under date partitions.

use anyhow::{Context, Result};
use lakestream::config::Config;
use lakestream::generate::CsvSource;
use lakestream::logging::init_tracing;
use lakestream::runner::{shutdown_token, BatchRunner};
use lakestream::store::S3Store;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.service.log_level);

    info!(
        service = %config.service.name,
        bucket = %config.storage.bucket,
        rows_per_file = config.stream.rows_per_file,
        "starting CSV file streaming"
    );

    let store = S3Store::new(&config.storage).await;
    let runner = BatchRunner::new(&store);
    let mut source = CsvSource::new(&config.stream);

    let summary = runner
        .run_continuous(
            &mut source,
            config.stream_interval(),
            config.stream.max_iterations,
            shutdown_token(),
        )
        .await;

    info!(%summary, "CSV streaming finished");

    if summary.failed > 0 {
        warn!(failed = summary.failed, "exiting non-zero due to failed uploads");
        std::process::exit(1);
    }
    Ok(())
}
