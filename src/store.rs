use crate::config::StorageConfig;
use crate::error::SyncError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::{debug, info};

/// One object write: key, body, content type, and small metadata pairs.
#[derive(Debug, Clone)]
pub struct PutRequest {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub metadata: Vec<(String, String)>,
}

/// Listing entry returned by a prefix scan.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub key: String,
    pub size: i64,
}

/// Seam over the storage backend: a single atomic put plus a paginated
/// prefix listing. The writer never retries; callers interpret the
/// [`SyncError`] taxonomy and decide.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend identifier reported in summaries
    fn bucket(&self) -> &str;

    /// Write one full object under the given key. All-or-nothing: the
    /// backend never exposes a partial object.
    async fn put(&self, request: PutRequest) -> Result<(), SyncError>;

    /// List every object under a key prefix, following pagination.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, SyncError>;
}

/// S3-backed object store.
pub struct S3Store {
    client: S3Client,
    bucket: String,
}

/// Build an S3 client from storage configuration, with optional endpoint
/// override and path-style access for MinIO/LocalStack.
pub async fn build_client(config: &StorageConfig) -> S3Client {
    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()))
        .load()
        .await;

    let mut builder = S3ConfigBuilder::from(&aws_config);

    if let Some(ref endpoint_url) = config.endpoint_url {
        builder = builder.endpoint_url(endpoint_url);
    }

    if config.force_path_style {
        builder = builder.force_path_style(true);
    }

    S3Client::from_conf(builder.build())
}

impl S3Store {
    pub async fn new(config: &StorageConfig) -> Self {
        let client = build_client(config).await;

        info!(
            bucket = %config.bucket,
            region = %config.region,
            "object store initialized"
        );

        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }

}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, request: PutRequest) -> Result<(), SyncError> {
        let mut put = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&request.key)
            .body(ByteStream::from(request.body))
            .content_type(&request.content_type);

        for (name, value) in &request.metadata {
            put = put.metadata(name, value);
        }

        put.send().await.map_err(|err| SyncError::from_sdk(&err))?;

        debug!(key = %request.key, "object written");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, SyncError> {
        let mut objects: Vec<ObjectInfo> = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| SyncError::from_sdk(&err))?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    objects.push(ObjectInfo {
                        key: key.to_string(),
                        size: object.size().unwrap_or(0),
                    });
                }
            }
        }

        Ok(objects)
    }
}
