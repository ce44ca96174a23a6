use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Data category determining the partition prefix and serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    Text,
    Csv,
    Iot,
}

impl DataCategory {
    /// Fixed key prefix for the category, without a trailing slash.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Text => "data/text_files",
            Self::Csv => "data/csv_files",
            Self::Iot => "data/iot_data",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
            Self::Iot => "jsonl",
        }
    }

    /// Name of the extra dimension segment, for categories that carry one.
    pub fn dimension_name(&self) -> Option<&'static str> {
        match self {
            Self::Iot => Some("device_id"),
            _ => None,
        }
    }

    pub fn all() -> [DataCategory; 3] {
        [Self::Text, Self::Csv, Self::Iot]
    }
}

impl std::fmt::Display for DataCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Iot => "iot",
        };
        f.write_str(name)
    }
}

/// Build the partitioned object key for one file.
///
/// Layout: `data/<type>/[<dim>=<value>/]year=YYYY/month=MM/day=DD/<file_name>`
/// with month and day always zero-padded to two digits. Pure function: the
/// same inputs always derive the same key, and uniqueness within a partition
/// comes from the caller's `file_name`.
///
/// The dimension value is escaped before embedding; see
/// [`sanitize_path_component`].
pub fn partition_key(
    category: DataCategory,
    dimension: Option<&str>,
    now: DateTime<Utc>,
    file_name: &str,
) -> String {
    let mut key = String::with_capacity(96);
    key.push_str(category.prefix());
    key.push('/');

    if let (Some(dim_name), Some(dim_value)) = (category.dimension_name(), dimension) {
        key.push_str(dim_name);
        key.push('=');
        key.push_str(&sanitize_path_component(dim_value));
        key.push('/');
    }

    key.push_str(&date_partition(now));
    key.push('/');
    key.push_str(file_name);
    key
}

/// The `year=YYYY/month=MM/day=DD` fragment for a timestamp.
pub fn date_partition(now: DateTime<Utc>) -> String {
    format!(
        "year={:04}/month={:02}/day={:02}",
        now.year(),
        now.month(),
        now.day()
    )
}

/// Escape a value embedded in a key path: every character outside
/// `[A-Za-z0-9_-]` becomes `_`. Keeps slashes and `..` out of the key.
pub fn sanitize_path_component(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

/// MIME type for a file extension (leading dot not included).
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "jsonl" | "ndjson" => "application/x-ndjson",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 10, 30, 45).unwrap()
    }

    #[test]
    fn month_and_day_are_zero_padded() {
        let key = partition_key(DataCategory::Text, None, ts(2024, 3, 5), "doc.txt");
        assert_eq!(key, "data/text_files/year=2024/month=03/day=05/doc.txt");
    }

    #[test]
    fn iot_dimension_precedes_year_segment() {
        let key = partition_key(
            DataCategory::Iot,
            Some("sensor_001"),
            ts(2024, 3, 5),
            "readings.jsonl",
        );
        assert_eq!(
            key,
            "data/iot_data/device_id=sensor_001/year=2024/month=03/day=05/readings.jsonl"
        );
        let device_pos = key.find("device_id=sensor_001/").unwrap();
        let year_pos = key.find("year=").unwrap();
        assert!(device_pos < year_pos);
    }

    #[test]
    fn non_iot_categories_ignore_dimension() {
        let key = partition_key(DataCategory::Csv, Some("sensor_001"), ts(2024, 3, 5), "a.csv");
        assert!(!key.contains("device_id="));
    }

    #[test]
    fn derivation_is_idempotent() {
        let now = ts(2023, 12, 31);
        let a = partition_key(DataCategory::Iot, Some("dev-1"), now, "r.jsonl");
        let b = partition_key(DataCategory::Iot, Some("dev-1"), now, "r.jsonl");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_file_names_never_collide() {
        let now = ts(2024, 1, 1);
        let a = partition_key(DataCategory::Text, None, now, "doc_1.txt");
        let b = partition_key(DataCategory::Text, None, now, "doc_2.txt");
        assert_ne!(a, b);
    }

    #[test]
    fn dimension_values_are_escaped() {
        assert_eq!(sanitize_path_component("sensor_001"), "sensor_001");
        assert_eq!(sanitize_path_component("dev/../etc"), "dev____etc");
        assert_eq!(sanitize_path_component("hello world"), "hello_world");

        let key = partition_key(
            DataCategory::Iot,
            Some("a/b"),
            ts(2024, 6, 7),
            "r.jsonl",
        );
        assert!(key.contains("device_id=a_b/"));
    }

    #[test]
    fn date_partition_fragment() {
        assert_eq!(date_partition(ts(2024, 3, 5)), "year=2024/month=03/day=05");
    }

    #[test]
    fn content_type_mapping() {
        assert_eq!(content_type_for_extension("txt"), "text/plain");
        assert_eq!(content_type_for_extension("csv"), "text/csv");
        assert_eq!(content_type_for_extension("json"), "application/json");
        assert_eq!(content_type_for_extension("jsonl"), "application/x-ndjson");
        assert_eq!(content_type_for_extension("NDJSON"), "application/x-ndjson");
        assert_eq!(content_type_for_extension("xml"), "application/xml");
        assert_eq!(content_type_for_extension("parquet"), "application/octet-stream");
    }
}
