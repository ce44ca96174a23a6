//! One-time idempotent bucket setup: creation, versioning, default
//! encryption, lifecycle tiering, and partition marker objects.

use crate::config::StorageConfig;
use crate::error::SyncError;
use crate::partition::date_partition;
use crate::store::build_client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLifecycleConfiguration, BucketLocationConstraint, BucketVersioningStatus,
    CreateBucketConfiguration, ExpirationStatus, LifecycleExpiration, LifecycleRule,
    LifecycleRuleFilter, ServerSideEncryption, ServerSideEncryptionByDefault,
    ServerSideEncryptionConfiguration, ServerSideEncryptionRule, Transition,
    TransitionStorageClass, VersioningConfiguration,
};
use aws_sdk_s3::Client as S3Client;
use chrono::Utc;
use tracing::{error, info};

/// Day thresholds for the lifecycle policy.
const INFREQUENT_ACCESS_AFTER_DAYS: i32 = 30;
const GLACIER_AFTER_DAYS: i32 = 90;
const EXPIRE_AFTER_DAYS: i32 = 2555; // 7 years

/// Outcome of a full provisioning pass; every step is attempted.
#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub succeeded: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

impl ProvisionReport {
    fn record(&mut self, step: &'static str, result: Result<(), SyncError>) {
        match result {
            Ok(()) => {
                info!(step, "provisioning step succeeded");
                self.succeeded.push(step);
            }
            Err(err) => {
                error!(step, kind = err.kind(), error = %err, "provisioning step failed");
                self.failed.push(step);
            }
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Issues the setup calls against the bucket. Each call is independent:
/// one failing step never blocks the rest.
pub struct BucketProvisioner {
    client: S3Client,
    bucket: String,
    region: String,
}

impl BucketProvisioner {
    pub async fn new(config: &StorageConfig) -> Self {
        Self {
            client: build_client(config).await,
            bucket: config.bucket.clone(),
            region: config.region.clone(),
        }
    }

    /// Run every provisioning step and report which succeeded.
    pub async fn provision_all(&self) -> ProvisionReport {
        let mut report = ProvisionReport::default();
        report.record("create_bucket", self.ensure_bucket().await);
        report.record("versioning", self.enable_versioning().await);
        report.record("encryption", self.enable_encryption().await);
        report.record("lifecycle", self.apply_lifecycle().await);
        report.record("partition_markers", self.seed_partition_markers().await);
        report
    }

    /// Create the bucket if absent. Already-owned or already-existing
    /// buckets count as success.
    pub async fn ensure_bucket(&self) -> Result<(), SyncError> {
        let mut request = self.client.create_bucket().bucket(&self.bucket);

        // us-east-1 rejects an explicit location constraint.
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                info!(bucket = %self.bucket, "bucket created");
                Ok(())
            }
            Err(err) => {
                let classified = SyncError::from_sdk(&err);
                let service = err.into_service_error();
                if service.is_bucket_already_owned_by_you() || service.is_bucket_already_exists()
                {
                    info!(bucket = %self.bucket, "bucket already exists");
                    Ok(())
                } else {
                    Err(classified)
                }
            }
        }
    }

    pub async fn enable_versioning(&self) -> Result<(), SyncError> {
        self.client
            .put_bucket_versioning()
            .bucket(&self.bucket)
            .versioning_configuration(
                VersioningConfiguration::builder()
                    .status(BucketVersioningStatus::Enabled)
                    .build(),
            )
            .send()
            .await
            .map_err(|err| SyncError::from_sdk(&err))?;

        info!(bucket = %self.bucket, "versioning enabled");
        Ok(())
    }

    /// Default server-side encryption with SSE-S3 (AES256).
    pub async fn enable_encryption(&self) -> Result<(), SyncError> {
        let by_default = ServerSideEncryptionByDefault::builder()
            .sse_algorithm(ServerSideEncryption::Aes256)
            .build()
            .map_err(build_error)?;
        let configuration = ServerSideEncryptionConfiguration::builder()
            .rules(
                ServerSideEncryptionRule::builder()
                    .apply_server_side_encryption_by_default(by_default)
                    .build(),
            )
            .build()
            .map_err(build_error)?;

        self.client
            .put_bucket_encryption()
            .bucket(&self.bucket)
            .server_side_encryption_configuration(configuration)
            .send()
            .await
            .map_err(|err| SyncError::from_sdk(&err))?;

        info!(bucket = %self.bucket, "default encryption enabled");
        Ok(())
    }

    /// Tier `data/` objects to cheaper storage classes over time and expire
    /// them after the retention window.
    pub async fn apply_lifecycle(&self) -> Result<(), SyncError> {
        let rule = LifecycleRule::builder()
            .id("archive-old-data")
            .status(ExpirationStatus::Enabled)
            .filter(LifecycleRuleFilter::builder().prefix("data/").build())
            .transitions(
                Transition::builder()
                    .days(INFREQUENT_ACCESS_AFTER_DAYS)
                    .storage_class(TransitionStorageClass::StandardIa)
                    .build(),
            )
            .transitions(
                Transition::builder()
                    .days(GLACIER_AFTER_DAYS)
                    .storage_class(TransitionStorageClass::Glacier)
                    .build(),
            )
            .expiration(LifecycleExpiration::builder().days(EXPIRE_AFTER_DAYS).build())
            .build()
            .map_err(build_error)?;

        let configuration = BucketLifecycleConfiguration::builder()
            .rules(rule)
            .build()
            .map_err(build_error)?;

        self.client
            .put_bucket_lifecycle_configuration()
            .bucket(&self.bucket)
            .lifecycle_configuration(configuration)
            .send()
            .await
            .map_err(|err| SyncError::from_sdk(&err))?;

        info!(bucket = %self.bucket, "lifecycle policy applied");
        Ok(())
    }

    /// Zero-byte `.keep` markers so today's partitions and the auxiliary
    /// prefixes are visible before any data lands.
    pub async fn seed_partition_markers(&self) -> Result<(), SyncError> {
        let date = date_partition(Utc::now());
        let markers = [
            format!("data/text_files/{date}/.keep"),
            format!("data/csv_files/{date}/.keep"),
            format!("data/iot_data/device_id=device_001/{date}/.keep"),
            format!("data/iot_data/device_id=device_002/{date}/.keep"),
            "metadata/.keep".to_string(),
            "logs/.keep".to_string(),
        ];

        let mut first_error = None;
        for marker in &markers {
            let result = self
                .client
                .put_object()
                .bucket(&self.bucket)
                .key(marker)
                .body(ByteStream::from_static(b""))
                .send()
                .await;

            match result {
                Ok(_) => info!(key = %marker, "partition marker created"),
                Err(err) => {
                    let classified = SyncError::from_sdk(&err);
                    error!(key = %marker, error = %classified, "partition marker failed");
                    first_error.get_or_insert(classified);
                }
            }
        }

        match first_error {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

fn build_error(err: aws_sdk_s3::error::BuildError) -> SyncError {
    SyncError::Other(format!("invalid bucket configuration: {err}"))
}
