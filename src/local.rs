//! Local filesystem record source: originates records from files already
//! staged under a configured root directory.

use crate::config::LocalConfig;
use crate::error::SyncError;
use crate::partition::{content_type_for_extension, DataCategory};
use crate::record::{Payload, Record};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of one directory scan. Files that could not be read are counted
/// instead of aborting the scan.
#[derive(Debug)]
pub struct ScanOutcome {
    pub records: Vec<Record>,
    pub failed_reads: usize,
}

/// Enumerates `text_files/`, `csv_files/`, and `iot_data/` under a root
/// directory and turns each regular file into a raw record, preserving the
/// on-disk file name. IoT files contribute their device id (the file-name
/// prefix before `_data`) as the partition dimension.
pub struct LocalFileSource {
    root: PathBuf,
}

impl LocalFileSource {
    pub fn new(config: &LocalConfig) -> Self {
        Self {
            root: config.root.clone(),
        }
    }

    /// Scan the root once. Fails only if the root itself is missing; a
    /// missing category subdirectory or unreadable file is logged and the
    /// scan continues.
    pub async fn scan(&self) -> Result<ScanOutcome, SyncError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(SyncError::LocalIo {
                    path: self.root.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "local data root is not a directory",
                    ),
                })
            }
            Err(source) => {
                return Err(SyncError::LocalIo {
                    path: self.root.clone(),
                    source,
                })
            }
        }

        let mut outcome = ScanOutcome {
            records: Vec::new(),
            failed_reads: 0,
        };

        for (subdir, category) in [
            ("text_files", DataCategory::Text),
            ("csv_files", DataCategory::Csv),
            ("iot_data", DataCategory::Iot),
        ] {
            let dir = self.root.join(subdir);
            match tokio::fs::metadata(&dir).await {
                Ok(meta) if meta.is_dir() => {
                    self.scan_dir(&dir, category, &mut outcome).await?;
                }
                _ => {
                    warn!(dir = %dir.display(), "source directory not found, skipping");
                }
            }
        }

        info!(
            root = %self.root.display(),
            records = outcome.records.len(),
            failed_reads = outcome.failed_reads,
            "local scan complete"
        );

        Ok(outcome)
    }

    async fn scan_dir(
        &self,
        dir: &Path,
        category: DataCategory,
        outcome: &mut ScanOutcome,
    ) -> Result<(), SyncError> {
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|source| {
            SyncError::LocalIo {
                path: dir.to_path_buf(),
                source,
            }
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|source| {
            SyncError::LocalIo {
                path: dir.to_path_buf(),
                source,
            }
        })? {
            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "unreadable entry, counted as failed");
                    outcome.failed_reads += 1;
                    continue;
                }
            };
            if !file_type.is_file() {
                continue;
            }

            match tokio::fs::read(&path).await {
                Ok(bytes) => outcome.records.push(self.record_for(category, &path, bytes)),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "unreadable file, counted as failed");
                    outcome.failed_reads += 1;
                }
            }
        }

        Ok(())
    }

    fn record_for(&self, category: DataCategory, path: &Path, bytes: Vec<u8>) -> Record {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dimension = match category {
            DataCategory::Iot => Some(device_id_from_file_name(&file_name)),
            _ => None,
        };

        Record {
            id: file_name.clone(),
            category,
            timestamp: Utc::now(),
            dimension,
            file_name,
            payload: Payload::Raw {
                bytes,
                content_type: content_type_for_extension(&extension),
            },
        }
    }
}

/// Device id embedded in an IoT data file name, e.g.
/// `sensor_001_data.jsonl` → `sensor_001`. Falls back to the file stem.
fn device_id_from_file_name(file_name: &str) -> String {
    match file_name.split_once("_data") {
        Some((device, _)) => device.to_string(),
        None => file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(file_name)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn stage_root() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("text_files")).unwrap();
        fs::create_dir(root.path().join("csv_files")).unwrap();
        fs::create_dir(root.path().join("iot_data")).unwrap();
        fs::write(root.path().join("text_files/notes.txt"), "hello").unwrap();
        fs::write(root.path().join("csv_files/report.csv"), "a,b\n1,2\n").unwrap();
        fs::write(
            root.path().join("iot_data/sensor_001_data.jsonl"),
            "{\"t\":1}\n",
        )
        .unwrap();
        root
    }

    fn source_for(root: &tempfile::TempDir) -> LocalFileSource {
        LocalFileSource::new(&LocalConfig {
            root: root.path().to_path_buf(),
        })
    }

    #[tokio::test]
    async fn scans_all_category_directories() {
        let root = stage_root();
        let outcome = source_for(&root).scan().await.unwrap();

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.failed_reads, 0);

        let iot = outcome
            .records
            .iter()
            .find(|r| r.category == DataCategory::Iot)
            .unwrap();
        assert_eq!(iot.dimension.as_deref(), Some("sensor_001"));
        assert_eq!(iot.file_name, "sensor_001_data.jsonl");
        match &iot.payload {
            Payload::Raw { content_type, .. } => {
                assert_eq!(*content_type, "application/x-ndjson")
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_subdirectory_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("text_files")).unwrap();
        fs::write(root.path().join("text_files/only.txt"), "x").unwrap();

        let outcome = source_for(&root).scan().await.unwrap();
        assert_eq!(outcome.records.len(), 1);
    }

    #[tokio::test]
    async fn root_that_is_a_plain_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("not_a_dir");
        fs::write(&file_path, "x").unwrap();

        let source = LocalFileSource::new(&LocalConfig { root: file_path });
        let err = source.scan().await.unwrap_err();
        assert!(matches!(err, SyncError::LocalIo { .. }));
    }

    #[tokio::test]
    async fn missing_root_is_a_local_io_error() {
        let source = LocalFileSource::new(&LocalConfig {
            root: PathBuf::from("/nonexistent/streaming_data"),
        });
        let err = source.scan().await.unwrap_err();
        assert!(matches!(err, SyncError::LocalIo { .. }));
        assert_eq!(err.kind(), "local_io");
    }

    #[test]
    fn device_id_extraction() {
        assert_eq!(device_id_from_file_name("sensor_001_data.jsonl"), "sensor_001");
        assert_eq!(device_id_from_file_name("oddname.jsonl"), "oddname");
    }
}
