//! Lakestream
//!
//! Streams locally generated or locally stored data files into an S3-style
//! object store under a partitioned key layout, so downstream query engines
//! can prune by category, device, and date:
//!
//! ```text
//! data/text_files/year=2024/month=03/day=05/document_7_103045.txt
//! data/csv_files/year=2024/month=03/day=05/data_3_103045.csv
//! data/iot_data/device_id=sensor_001/year=2024/month=03/day=05/readings_103045_a1b2c3d4.jsonl
//! ```
//!
//! ## Components
//!
//! - **Partition key builder** ([`partition`]): pure derivation of the
//!   category/dimension/date key for one file
//! - **Object writer** ([`store`]): single atomic put plus prefix listing
//!   behind the [`store::ObjectStore`] seam
//! - **Batch runner** ([`runner`]): sequential uploads with per-record
//!   continue-on-error counting, and a continuous mode with a fixed interval
//!   and an optional iteration cap
//! - **Record sources** ([`generate`], [`local`]): synthetic text/CSV/IoT
//!   generators and a local-directory scanner
//! - **Bucket provisioner** ([`provision`]): idempotent versioning,
//!   encryption, lifecycle, and partition marker setup
//! - **Inventory** ([`inventory`]): post-upload per-category verification
//!
//! Writes are sequential and never retried; failures are classified into
//! the [`error::SyncError`] taxonomy, logged, and counted in the run's
//! [`runner::UploadSummary`].

pub mod config;
pub mod error;
pub mod generate;
pub mod inventory;
pub mod local;
pub mod logging;
pub mod partition;
pub mod provision;
pub mod record;
pub mod runner;
pub mod store;

pub use config::Config;
pub use error::SyncError;
pub use partition::{content_type_for_extension, date_partition, partition_key, DataCategory};
pub use record::{Payload, Record, SensorReading};
pub use runner::{BatchRunner, RecordSource, UploadSummary};
pub use store::{ObjectStore, PutRequest, S3Store};
