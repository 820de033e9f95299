//! Wire types for the maintenance log API.
//!
//! The API has been seen answering in two shapes: records with their fields
//! at the top level, and records with the same fields nested under an
//! `attributes` key. Both deserialize into [`ApiResponse`] and are mapped to
//! a single [`MaintenanceRecord`] shape by [`ApiResponse::normalize`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::data::format::parse_date;
use crate::data::{MaintenanceRecord, RecordId};

/// Top-level response body: `{ "data": [ ... ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub data: Vec<ApiEntry>,
}

/// One entry of the `data` array, in either known layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiEntry {
    /// `{ "id": 1, "attributes": { "date": ..., ... } }`
    Nested {
        id: RecordId,
        attributes: ApiFields,
    },
    /// `{ "id": 1, "date": ..., "odometer": ..., ... }`
    Flat {
        id: RecordId,
        #[serde(flatten)]
        fields: ApiFields,
    },
    /// Anything else, e.g. a missing or null id. Dropped on normalize.
    Malformed(Value),
}

/// The record fields shared by both layouts.
///
/// Every field is optional on the wire; numbers may also arrive as strings.
/// Values of an unexpected JSON type read as missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiFields {
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub odometer: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub oil: Option<f64>,
}

impl ApiEntry {
    fn into_parts(self) -> Option<(RecordId, ApiFields)> {
        match self {
            ApiEntry::Nested { id, attributes } => Some((id, attributes)),
            ApiEntry::Flat { id, fields } => Some((id, fields)),
            ApiEntry::Malformed(raw) => {
                tracing::warn!(entry = %raw, "dropping malformed record");
                None
            }
        }
    }

    /// Convert to a record, or `None` when the entry has no usable id or date.
    pub fn into_record(self) -> Option<MaintenanceRecord> {
        let (id, fields) = self.into_parts()?;

        let Some(raw_date) = fields.date.as_deref() else {
            tracing::warn!(%id, "dropping record without a date");
            return None;
        };
        let date = match parse_date(raw_date) {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!(%id, error = %e, "dropping record with unparseable date");
                return None;
            }
        };

        Some(MaintenanceRecord {
            id,
            date,
            odometer: fields.odometer,
            distance: fields.distance,
            oil: fields.oil,
        })
    }
}

impl ApiResponse {
    /// Map every entry to a [`MaintenanceRecord`] in ascending date order.
    ///
    /// The sort is stable: records sharing a date keep the order the API
    /// sent them in, so the last of them is the latest.
    pub fn normalize(self) -> Vec<MaintenanceRecord> {
        let mut records: Vec<MaintenanceRecord> =
            self.data.into_iter().filter_map(ApiEntry::into_record).collect();
        records.sort_by_key(|r| r.date);
        records
    }
}

/// Accept a JSON number, a numeric string, or null. Anything else is `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

/// Accept a string, or a number rendered as text. Anything else is `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Build the records endpoint URL from the configured base URL.
pub fn records_url(base_url: &str) -> String {
    format!("{}/api/oils?populate=*", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_deserialize_flat_response() {
        let json = r#"{
            "data": [
                { "id": 1, "date": "2024-01-01", "odometer": 1000, "distance": 0, "oil": 0 },
                { "id": 2, "date": "2024-01-11", "odometer": 1500, "distance": 500, "oil": 2500 }
            ]
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.len(), 2);
        assert!(matches!(response.data[0], ApiEntry::Flat { .. }));

        let records = response.normalize();
        assert_eq!(records[1].id, RecordId::Number(2));
        assert_eq!(records[1].odometer, Some(1500.0));
        assert_eq!(records[1].distance, Some(500.0));
        assert_eq!(records[1].oil, Some(2500.0));
    }

    #[test]
    fn test_deserialize_nested_response() {
        let json = r#"{
            "data": [
                { "id": 9, "attributes": { "date": "2024-06-01", "odometer": 52000, "distance": 1200, "oil": 300 } }
            ]
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.data[0], ApiEntry::Nested { .. }));

        let records = response.normalize();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, RecordId::Number(9));
        assert_eq!(records[0].date, date("2024-06-01"));
        assert_eq!(records[0].oil, Some(300.0));
    }

    #[test]
    fn test_normalize_sorts_ascending_and_keeps_tie_order() {
        let json = r#"{
            "data": [
                { "id": 3, "date": "2024-03-01", "oil": 100 },
                { "id": 1, "date": "2024-01-01", "oil": 100 },
                { "id": "a", "date": "2024-02-01", "oil": 100 },
                { "id": "b", "date": "2024-02-01", "oil": 200 }
            ]
        }"#;

        let records = serde_json::from_str::<ApiResponse>(json).unwrap().normalize();
        let ids: Vec<String> = records.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "a", "b", "3"]);
    }

    #[test]
    fn test_missing_and_string_numbers() {
        let json = r#"{
            "data": [
                { "id": 1, "date": "2024-01-01", "odometer": null, "distance": "120.5", "oil": "n/a" }
            ]
        }"#;

        let records = serde_json::from_str::<ApiResponse>(json).unwrap().normalize();
        assert_eq!(records[0].odometer, None);
        assert_eq!(records[0].distance, Some(120.5));
        assert_eq!(records[0].oil, None);
    }

    #[test]
    fn test_entries_without_usable_date_are_dropped() {
        let json = r#"{
            "data": [
                { "id": 1, "odometer": 100 },
                { "id": 2, "date": "someday", "odometer": 200 },
                { "id": 3, "date": "2024-01-01T08:00:00Z", "odometer": 300 }
            ]
        }"#;

        let records = serde_json::from_str::<ApiResponse>(json).unwrap().normalize();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, RecordId::Number(3));
    }

    #[test]
    fn test_bad_entries_do_not_discard_good_ones() {
        let json = r#"{
            "data": [
                { "id": 1, "date": "2024-01-01", "odometer": 1000, "distance": 0, "oil": 0 },
                { "date": "2024-01-02", "oil": 100 },
                { "id": null, "date": "2024-01-03", "oil": 100 },
                { "id": 4, "date": 20240104, "oil": 100 },
                { "id": 5, "date": "2024-01-05", "oil": true, "distance": [1] },
                { "id": 6, "attributes": { "date": "2024-01-06", "odometer": {}, "oil": 50 } },
                "not an object"
            ]
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.len(), 7);
        assert!(matches!(response.data[1], ApiEntry::Malformed(_)));

        let records = response.normalize();
        let ids: Vec<String> = records.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "5", "6"]);

        // Unexpected types read as missing values
        assert_eq!(records[1].oil, None);
        assert_eq!(records[1].distance, None);
        assert_eq!(records[2].odometer, None);
        assert_eq!(records[2].oil, Some(50.0));
    }

    #[test]
    fn test_empty_data() {
        let response: ApiResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(response.normalize().is_empty());
    }

    #[test]
    fn test_records_url() {
        assert_eq!(
            records_url("https://example.com"),
            "https://example.com/api/oils?populate=*"
        );
        assert_eq!(
            records_url("https://example.com/"),
            "https://example.com/api/oils?populate=*"
        );
    }
}
