use crate::error::SyncError;
use crate::partition::DataCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;

/// One temperature sensor reading, written as a single NDJSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub device_id: String,
    pub location: String,
    pub sensor_type: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub status: String,
    pub reading_id: Uuid,
}

/// Payload of a logical record, one variant per serialization format.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Plain text document body
    Text(String),
    /// CSV row set; the header is written as the first line
    Csv {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// IoT readings, one NDJSON line each
    Readings(Vec<SensorReading>),
    /// Bytes read from a local file, uploaded verbatim
    Raw {
        bytes: Vec<u8>,
        content_type: &'static str,
    },
}

/// A logical unit of data to persist: one object in the bucket.
///
/// Transient; used once to derive a partition key and issue one write, then
/// discarded.
#[derive(Debug, Clone)]
pub struct Record {
    /// Document id, file id, or device id, depending on category
    pub id: String,
    pub category: DataCategory,
    pub timestamp: DateTime<Utc>,
    /// Extra partition dimension (device id for IoT)
    pub dimension: Option<String>,
    /// Final path segment of the object key; the source guarantees it is
    /// unique within the partition
    pub file_name: String,
    pub payload: Payload,
}

impl Record {
    /// Serialize the payload into body bytes plus content type.
    pub fn serialize(&self) -> Result<(Vec<u8>, &'static str), SyncError> {
        match &self.payload {
            Payload::Text(body) => Ok((body.clone().into_bytes(), "text/plain")),
            Payload::Csv { header, rows } => {
                let mut out = String::new();
                out.push_str(&csv_line(header));
                for row in rows {
                    out.push_str(&csv_line(row));
                }
                Ok((out.into_bytes(), "text/csv"))
            }
            Payload::Readings(readings) => {
                let mut out = Vec::new();
                for reading in readings {
                    let line = serde_json::to_string(reading)?;
                    out.extend_from_slice(line.as_bytes());
                    out.push(b'\n');
                }
                Ok((out, "application/x-ndjson"))
            }
            Payload::Raw { bytes, content_type } => Ok((bytes.clone(), content_type)),
        }
    }

    /// Object metadata attached to the write. Small, ASCII-safe pairs.
    pub fn metadata(&self) -> Vec<(String, String)> {
        let stamp = self.timestamp.to_rfc3339();
        match &self.payload {
            Payload::Text(_) => vec![
                ("document_id".into(), self.id.clone()),
                ("generated_at".into(), stamp),
            ],
            Payload::Csv { rows, .. } => vec![
                ("file_id".into(), self.id.clone()),
                ("num_rows".into(), rows.len().to_string()),
                ("generated_at".into(), stamp),
            ],
            Payload::Readings(readings) => {
                let mut meta = vec![("batch_size".into(), readings.len().to_string())];
                if let Some(device) = &self.dimension {
                    meta.push(("device_id".into(), device.clone()));
                }
                meta.push(("generated_at".into(), stamp));
                meta
            }
            Payload::Raw { .. } => {
                let mut meta = vec![("source".into(), "local_streaming".to_string())];
                if let Some(device) = &self.dimension {
                    meta.push(("device_id".into(), device.clone()));
                }
                meta.push(("uploaded_at".into(), stamp));
                meta
            }
        }
    }
}

fn csv_line(fields: &[String]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap()
    }

    #[test]
    fn text_serializes_as_plain_text() {
        let record = Record {
            id: "7".into(),
            category: DataCategory::Text,
            timestamp: now(),
            dimension: None,
            file_name: "document_7_103045.txt".into(),
            payload: Payload::Text("Document ID: 7\nline".into()),
        };
        let (bytes, content_type) = record.serialize().unwrap();
        assert_eq!(content_type, "text/plain");
        assert!(bytes.starts_with(b"Document ID: 7"));
    }

    #[test]
    fn csv_serializes_with_header_row() {
        let record = Record {
            id: "3".into(),
            category: DataCategory::Csv,
            timestamp: now(),
            dimension: None,
            file_name: "data_3_103045.csv".into(),
            payload: Payload::Csv {
                header: vec!["id".into(), "value".into()],
                rows: vec![
                    vec!["row_3_0".into(), "42.5".into()],
                    vec!["row_3_1".into(), "17.0".into()],
                ],
            },
        };
        let (bytes, content_type) = record.serialize().unwrap();
        assert_eq!(content_type, "text/csv");
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,value");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_fields_with_commas_are_quoted() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn readings_serialize_as_ndjson() {
        let reading = SensorReading {
            device_id: "sensor_001".into(),
            location: "Zone_B".into(),
            sensor_type: "temperature".into(),
            timestamp: now(),
            temperature: 21.4,
            humidity: 48.2,
            pressure: 1012.7,
            status: "ok".into(),
            reading_id: Uuid::new_v4(),
        };
        let record = Record {
            id: "sensor_001".into(),
            category: DataCategory::Iot,
            timestamp: now(),
            dimension: Some("sensor_001".into()),
            file_name: "readings_103045_deadbeef.jsonl".into(),
            payload: Payload::Readings(vec![reading.clone(), reading]),
        };
        let (bytes, content_type) = record.serialize().unwrap();
        assert_eq!(content_type, "application/x-ndjson");
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 2);
        let parsed: SensorReading = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(parsed.device_id, "sensor_001");
    }

    #[test]
    fn metadata_reports_row_and_batch_counts() {
        let record = Record {
            id: "1".into(),
            category: DataCategory::Csv,
            timestamp: now(),
            dimension: None,
            file_name: "data_1_103045.csv".into(),
            payload: Payload::Csv {
                header: vec!["id".into()],
                rows: vec![vec!["a".into()], vec!["b".into()]],
            },
        };
        let meta = record.metadata();
        assert!(meta.contains(&("num_rows".to_string(), "2".to_string())));
    }
}
