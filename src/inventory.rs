//! Post-upload verification: per-category object counts under the
//! partition prefixes, and an optional metadata object describing them.

use crate::error::SyncError;
use crate::partition::DataCategory;
use crate::store::{ObjectStore, PutRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

pub const METADATA_KEY: &str = "metadata/partition_metadata.json";

#[derive(Debug, Clone, Serialize)]
pub struct CategoryInventory {
    pub total_objects: usize,
    pub total_bytes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub generated_at: DateTime<Utc>,
    pub bucket: String,
    pub partitions: BTreeMap<String, CategoryInventory>,
}

impl InventoryReport {
    pub fn total_objects(&self) -> usize {
        self.partitions.values().map(|c| c.total_objects).sum()
    }
}

/// List each category's prefix and report what actually landed.
pub async fn verify_partitions(store: &dyn ObjectStore) -> Result<InventoryReport, SyncError> {
    let mut partitions = BTreeMap::new();

    for category in DataCategory::all() {
        let prefix = format!("{}/", category.prefix());
        let objects = store.list(&prefix).await?;
        let total_bytes: i64 = objects.iter().map(|o| o.size).sum();

        info!(
            category = %category,
            objects = objects.len(),
            total_bytes,
            "partition verified"
        );

        partitions.insert(
            category.to_string(),
            CategoryInventory {
                total_objects: objects.len(),
                total_bytes,
            },
        );
    }

    Ok(InventoryReport {
        generated_at: Utc::now(),
        bucket: store.bucket().to_string(),
        partitions,
    })
}

/// Serialize the report and store it under the metadata prefix.
pub async fn publish_metadata(
    store: &dyn ObjectStore,
    report: &InventoryReport,
) -> Result<(), SyncError> {
    let body = serde_json::to_vec_pretty(report)?;

    store
        .put(PutRequest {
            key: METADATA_KEY.to_string(),
            body,
            content_type: "application/json".to_string(),
            metadata: vec![(
                "generated_at".to_string(),
                report.generated_at.to_rfc3339(),
            )],
        })
        .await?;

    info!(key = METADATA_KEY, "partition metadata published");
    Ok(())
}
