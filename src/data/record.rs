//! The maintenance record model shared by every data source.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque record identifier as sent by the API.
///
/// Content APIs hand out either numeric ids or string document ids, so
/// both are accepted and displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// A single oil top-up / odometer reading.
///
/// Numeric fields stay optional so a missing value can be shown as "N/A";
/// aggregation goes through the `*_or_zero` accessors instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceRecord {
    pub id: RecordId,
    pub date: NaiveDate,
    /// Cumulative odometer reading in km.
    pub odometer: Option<f64>,
    /// Distance driven since the previous record, in km.
    pub distance: Option<f64>,
    /// Oil added at this reading, in ml.
    pub oil: Option<f64>,
}

impl MaintenanceRecord {
    pub fn odometer_or_zero(&self) -> f64 {
        finite_or_zero(self.odometer)
    }

    pub fn distance_or_zero(&self) -> f64 {
        finite_or_zero(self.distance)
    }

    pub fn oil_or_zero(&self) -> f64 {
        finite_or_zero(self.oil)
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_aggregate_as_zero() {
        let record = MaintenanceRecord {
            id: RecordId::Number(7),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            odometer: None,
            distance: Some(f64::NAN),
            oil: Some(250.0),
        };

        assert_eq!(record.odometer_or_zero(), 0.0);
        assert_eq!(record.distance_or_zero(), 0.0);
        assert_eq!(record.oil_or_zero(), 250.0);
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId::Number(42).to_string(), "42");
        assert_eq!(RecordId::Text("abc123".to_string()).to_string(), "abc123");
    }

    #[test]
    fn test_record_id_deserializes_both_forms() {
        let n: RecordId = serde_json::from_str("12").unwrap();
        let s: RecordId = serde_json::from_str("\"k9x\"").unwrap();
        assert_eq!(n, RecordId::Number(12));
        assert_eq!(s, RecordId::Text("k9x".to_string()));
    }
}
