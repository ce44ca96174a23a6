use crate::error::SyncError;
use crate::partition::{date_partition, partition_key};
use crate::record::Record;
use crate::store::{ObjectStore, PutRequest};
use async_trait::async_trait;
use chrono::Utc;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Produces batches of records, synthetically or from local storage.
#[async_trait]
pub trait RecordSource: Send {
    /// Short name used in progress logs.
    fn name(&self) -> &'static str;

    /// Next finite batch of records to attempt.
    async fn next_batch(&mut self) -> Result<Vec<Record>, SyncError>;
}

/// Per-run upload bookkeeping.
///
/// Invariant: `uploaded + failed` equals the number of records attempted.
#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub failed: usize,
    /// Backend identifier (bucket name)
    pub bucket: String,
    /// Date partition active when the run started
    pub date_partition: String,
}

impl UploadSummary {
    fn new(bucket: &str) -> Self {
        Self {
            uploaded: 0,
            failed: 0,
            bucket: bucket.to_string(),
            date_partition: date_partition(Utc::now()),
        }
    }

    pub fn attempted(&self) -> usize {
        self.uploaded + self.failed
    }

    /// Fold another batch's counts into this run-level summary.
    pub fn absorb(&mut self, other: &UploadSummary) {
        self.uploaded += other.uploaded;
        self.failed += other.failed;
    }
}

impl fmt::Display for UploadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uploaded={} failed={} bucket={} partition={}",
            self.uploaded, self.failed, self.bucket, self.date_partition
        )
    }
}

/// Drives batches of records through the object store, counting outcomes.
///
/// Writes are sequential; one record's failure is logged and counted but
/// never aborts the rest of the batch.
pub struct BatchRunner<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> BatchRunner<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Attempt every record in the batch and return the counts.
    pub async fn run_batch(&self, records: Vec<Record>) -> UploadSummary {
        let mut summary = UploadSummary::new(self.store.bucket());

        for record in records {
            let key = partition_key(
                record.category,
                record.dimension.as_deref(),
                record.timestamp,
                &record.file_name,
            );

            match self.upload_one(&record, &key).await {
                Ok(size) => {
                    summary.uploaded += 1;
                    info!(key = %key, size_bytes = size, "uploaded");
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(
                        key = %key,
                        kind = err.kind(),
                        error = %err,
                        "upload failed, continuing"
                    );
                }
            }
        }

        summary
    }

    async fn upload_one(&self, record: &Record, key: &str) -> Result<usize, SyncError> {
        let (body, content_type) = record.serialize()?;
        let size = body.len();

        self.store
            .put(PutRequest {
                key: key.to_string(),
                body,
                content_type: content_type.to_string(),
                metadata: record.metadata(),
            })
            .await?;

        Ok(size)
    }

    /// Repeat batches from the source on a fixed interval.
    ///
    /// Stops when the iteration cap is reached or the token is cancelled;
    /// cancellation is only observed between batches, so the in-flight batch
    /// always completes. Returns the aggregated summary.
    pub async fn run_continuous(
        &self,
        source: &mut dyn RecordSource,
        interval: Duration,
        max_iterations: Option<u64>,
        shutdown: CancellationToken,
    ) -> UploadSummary {
        let mut totals = UploadSummary::new(self.store.bucket());
        let mut iterations: u64 = 0;

        info!(
            source = source.name(),
            interval_secs = interval.as_secs(),
            "starting continuous streaming"
        );

        loop {
            match source.next_batch().await {
                Ok(records) => {
                    let batch = self.run_batch(records).await;
                    info!(source = source.name(), %batch, "batch complete");
                    totals.absorb(&batch);
                }
                Err(err) => {
                    // Source errors are batch-scoped; next tick retries the source.
                    error!(source = source.name(), error = %err, "batch source failed");
                }
            }

            iterations += 1;
            if let Some(max) = max_iterations {
                if iterations >= max {
                    info!(iterations, "iteration cap reached, stopping");
                    break;
                }
            }

            if shutdown.is_cancelled() {
                info!("shutdown requested, stopping after completed batch");
                break;
            }

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("shutdown requested, stopping after completed batch");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        totals
    }
}

/// Token cancelled when Ctrl-C arrives. The runner only observes it
/// between batches, so the in-flight batch finishes first. Must be called
/// from within a Tokio runtime.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing current batch");
            child.cancel();
        }
    });
    token
}
