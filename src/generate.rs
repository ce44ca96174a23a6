//! Synthetic record sources: text documents, CSV row sets, and a small
//! fleet of simulated temperature sensors.

use crate::config::StreamConfig;
use crate::error::SyncError;
use crate::partition::DataCategory;
use crate::record::{Payload, Record, SensorReading};
use crate::runner::RecordSource;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use uuid::Uuid;

const CSV_CATEGORIES: [&str; 4] = ["A", "B", "C", "D"];
const CSV_STATUSES: [&str; 3] = ["active", "inactive", "pending"];
const SENSOR_STATUSES: [&str; 3] = ["ok", "warning", "error"];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generates one text document per batch, with monotonically increasing ids.
pub struct TextSource {
    next_id: u64,
    lines_per_document: usize,
}

impl TextSource {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            next_id: 0,
            lines_per_document: config.lines_per_document,
        }
    }

    fn generate_document(&self, id: u64, now: DateTime<Utc>) -> String {
        let mut lines = Vec::with_capacity(self.lines_per_document + 3);
        lines.push(format!("Document ID: {id}"));
        lines.push(format!("Generated at: {}", now.to_rfc3339()));
        lines.push("-".repeat(50));
        for i in 0..self.lines_per_document {
            lines.push(format!(
                "Line {}: Sample text content for document streaming.",
                i + 1
            ));
        }
        lines.join("\n")
    }
}

#[async_trait]
impl RecordSource for TextSource {
    fn name(&self) -> &'static str {
        "text"
    }

    async fn next_batch(&mut self) -> Result<Vec<Record>, SyncError> {
        let id = self.next_id;
        self.next_id += 1;
        let now = Utc::now();

        Ok(vec![Record {
            id: id.to_string(),
            category: DataCategory::Text,
            timestamp: now,
            dimension: None,
            file_name: format!("document_{id}_{}.txt", now.format("%H%M%S")),
            payload: Payload::Text(self.generate_document(id, now)),
        }])
    }
}

/// Generates one CSV row set per batch.
pub struct CsvSource {
    next_id: u64,
    rows_per_file: usize,
}

impl CsvSource {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            next_id: 0,
            rows_per_file: config.rows_per_file,
        }
    }

    fn generate_rows(&self, file_id: u64, now: DateTime<Utc>) -> Vec<Vec<String>> {
        let mut rng = rand::thread_rng();
        (0..self.rows_per_file)
            .map(|i| {
                // Row timestamps step back one minute per row.
                let stamp = now - Duration::minutes(i as i64);
                vec![
                    format!("row_{file_id}_{i}"),
                    stamp.to_rfc3339(),
                    round2(rng.gen_range(10.0..1000.0)).to_string(),
                    CSV_CATEGORIES.choose(&mut rng).unwrap().to_string(),
                    CSV_STATUSES.choose(&mut rng).unwrap().to_string(),
                ]
            })
            .collect()
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn next_batch(&mut self) -> Result<Vec<Record>, SyncError> {
        let id = self.next_id;
        self.next_id += 1;
        let now = Utc::now();

        Ok(vec![Record {
            id: id.to_string(),
            category: DataCategory::Csv,
            timestamp: now,
            dimension: None,
            file_name: format!("data_{id}_{}.csv", now.format("%H%M%S")),
            payload: Payload::Csv {
                header: ["id", "timestamp", "value", "category", "status"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                rows: self.generate_rows(id, now),
            },
        }])
    }
}

/// A simulated sensor device.
#[derive(Debug, Clone)]
struct Device {
    device_id: String,
    location: String,
    sensor_type: &'static str,
}

/// Fixed fleet of temperature sensors; each batch yields one record per
/// device carrying `batch_size` readings. Readings fluctuate with gaussian
/// noise around nominal values.
pub struct IotFleet {
    devices: Vec<Device>,
    batch_size: usize,
    temperature_noise: Normal<f64>,
    humidity_noise: Normal<f64>,
    pressure_noise: Normal<f64>,
}

impl IotFleet {
    pub fn new(config: &StreamConfig) -> Self {
        let devices = (0..config.device_count)
            .map(|i| Device {
                device_id: format!("sensor_{i:03}"),
                location: format!("Zone_{}", (b'A' + (i % 4) as u8) as char),
                sensor_type: "temperature",
            })
            .collect();

        // Constant, valid standard deviations
        Self {
            devices,
            batch_size: config.batch_size,
            temperature_noise: Normal::new(0.0, 5.0).expect("valid standard deviation"),
            humidity_noise: Normal::new(0.0, 10.0).expect("valid standard deviation"),
            pressure_noise: Normal::new(0.0, 5.0).expect("valid standard deviation"),
        }
    }

    fn generate_reading(&self, device: &Device, now: DateTime<Utc>) -> SensorReading {
        let mut rng = rand::thread_rng();
        SensorReading {
            device_id: device.device_id.clone(),
            location: device.location.clone(),
            sensor_type: device.sensor_type.to_string(),
            timestamp: now,
            temperature: round2(20.0 + self.temperature_noise.sample(&mut rng)),
            humidity: round2(50.0 + self.humidity_noise.sample(&mut rng)),
            pressure: round2(1013.0 + self.pressure_noise.sample(&mut rng)),
            status: SENSOR_STATUSES.choose(&mut rng).unwrap().to_string(),
            reading_id: Uuid::new_v4(),
        }
    }
}

#[async_trait]
impl RecordSource for IotFleet {
    fn name(&self) -> &'static str {
        "iot"
    }

    async fn next_batch(&mut self) -> Result<Vec<Record>, SyncError> {
        let now = Utc::now();
        let records = self
            .devices
            .iter()
            .map(|device| {
                let readings = (0..self.batch_size)
                    .map(|_| self.generate_reading(device, now))
                    .collect();
                let suffix = Uuid::new_v4().simple().to_string();
                Record {
                    id: device.device_id.clone(),
                    category: DataCategory::Iot,
                    timestamp: now,
                    dimension: Some(device.device_id.clone()),
                    file_name: format!(
                        "readings_{}_{}.jsonl",
                        now.format("%H%M%S"),
                        &suffix[..8]
                    ),
                    payload: Payload::Readings(readings),
                }
            })
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_config() -> StreamConfig {
        StreamConfig {
            interval_secs: 1,
            max_iterations: None,
            batch_size: 10,
            lines_per_document: 5,
            rows_per_file: 8,
            device_count: 4,
        }
    }

    #[tokio::test]
    async fn text_source_increments_document_ids() {
        let mut source = TextSource::new(&stream_config());
        let first = source.next_batch().await.unwrap();
        let second = source.next_batch().await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "0");
        assert_eq!(second[0].id, "1");
        assert!(first[0].file_name.starts_with("document_0_"));
        assert!(first[0].file_name.ends_with(".txt"));

        match &first[0].payload {
            Payload::Text(body) => {
                assert!(body.starts_with("Document ID: 0"));
                assert_eq!(body.lines().count(), 5 + 3);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn csv_source_emits_requested_rows() {
        let mut source = CsvSource::new(&stream_config());
        let batch = source.next_batch().await.unwrap();

        match &batch[0].payload {
            Payload::Csv { header, rows } => {
                assert_eq!(header[0], "id");
                assert_eq!(header.len(), 5);
                assert_eq!(rows.len(), 8);
                assert_eq!(rows[0][0], "row_0_0");
                assert!(CSV_CATEGORIES.contains(&rows[0][3].as_str()));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn iot_fleet_yields_one_record_per_device() {
        let mut fleet = IotFleet::new(&stream_config());
        let batch = fleet.next_batch().await.unwrap();

        assert_eq!(batch.len(), 4);
        assert_eq!(batch[0].dimension.as_deref(), Some("sensor_000"));
        assert_eq!(batch[3].dimension.as_deref(), Some("sensor_003"));

        match &batch[0].payload {
            Payload::Readings(readings) => {
                assert_eq!(readings.len(), 10);
                assert_eq!(readings[0].location, "Zone_A");
                assert!(readings[0].temperature.is_finite());
                assert!(SENSOR_STATUSES.contains(&readings[0].status.as_str()));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn sensor_noise_is_gaussian_around_nominal_values() {
        let mut config = stream_config();
        config.batch_size = 1000;
        config.device_count = 1;
        let mut fleet = IotFleet::new(&config);
        let batch = fleet.next_batch().await.unwrap();

        let readings = match &batch[0].payload {
            Payload::Readings(readings) => readings,
            other => panic!("unexpected payload: {other:?}"),
        };

        let mean: f64 =
            readings.iter().map(|r| r.temperature).sum::<f64>() / readings.len() as f64;
        assert!(
            (15.0..25.0).contains(&mean),
            "temperature mean {mean} should center on 20"
        );

        // Normal noise with sigma 5 puts roughly a third of the samples more
        // than one sigma out; a bounded distribution would produce none.
        let outside_one_sigma = readings
            .iter()
            .filter(|r| (r.temperature - 20.0).abs() > 5.0)
            .count();
        assert!(
            outside_one_sigma > 0,
            "expected some readings beyond one sigma, got none in {}",
            readings.len()
        );
    }

    #[tokio::test]
    async fn iot_file_names_carry_a_random_suffix() {
        let mut fleet = IotFleet::new(&stream_config());
        let a = fleet.next_batch().await.unwrap();
        let b = fleet.next_batch().await.unwrap();
        assert_ne!(a[0].file_name, b[0].file_name);
    }
}
