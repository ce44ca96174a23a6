use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration shared by all binaries.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Service-level settings (name, log level)
    #[serde(default)]
    pub service: ServiceConfig,
    /// Object storage backend
    #[serde(default)]
    pub storage: StorageConfig,
    /// Streaming loop settings
    #[serde(default)]
    pub stream: StreamConfig,
    /// Local file source settings
    #[serde(default)]
    pub local: LocalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// S3 storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Bucket receiving partitioned data
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint URL (for MinIO, LocalStack, etc.)
    pub endpoint_url: Option<String>,
    /// Force path-style access (required for MinIO)
    #[serde(default)]
    pub force_path_style: bool,
}

/// Batch streaming configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Sleep between batches in continuous mode
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Stop after this many batches; unset means run until interrupted
    pub max_iterations: Option<u64>,
    /// Readings per IoT record
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Lines per synthetic text document
    #[serde(default = "default_lines_per_document")]
    pub lines_per_document: usize,
    /// Rows per synthetic CSV file
    #[serde(default = "default_rows_per_file")]
    pub rows_per_file: usize,
    /// Number of simulated IoT devices
    #[serde(default = "default_device_count")]
    pub device_count: usize,
}

/// Local filesystem source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    /// Root directory holding text_files/, csv_files/, iot_data/
    #[serde(default = "default_local_root")]
    pub root: PathBuf,
}

fn default_service_name() -> String {
    "lakestream".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bucket() -> String {
    "modern-lakehouse-data".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_batch_size() -> usize {
    10
}

fn default_lines_per_document() -> usize {
    50
}

fn default_rows_per_file() -> usize {
    100
}

fn default_device_count() -> usize {
    4
}

fn default_local_root() -> PathBuf {
    PathBuf::from("streaming_data")
}

impl Config {
    /// Load configuration from defaults, optional config files, and
    /// `LAKESTREAM__`-prefixed environment variables
    /// (e.g. `LAKESTREAM__STORAGE__BUCKET`).
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/lakestream").required(false))
            .add_source(config::File::with_name("/etc/lakestream/config").required(false))
            .add_source(
                config::Environment::with_prefix("LAKESTREAM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(Into::into)
    }

    /// Inter-batch sleep as a Duration
    pub fn stream_interval(&self) -> Duration {
        Duration::from_secs(self.stream.interval_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            region: default_region(),
            endpoint_url: None,
            force_path_style: false,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_iterations: None,
            batch_size: default_batch_size(),
            lines_per_document: default_lines_per_document(),
            rows_per_file: default_rows_per_file(),
            device_count: default_device_count(),
        }
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            root: default_local_root(),
        }
    }
}
