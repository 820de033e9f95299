//! Dashboard data assembly.
//!
//! Turns a normalized record list into everything the views render, and
//! models the lifecycle of a single load attempt.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use super::metrics::{instant_consumption, ConsumptionUnit, DerivedMetrics, TrendPoint};
use super::record::MaintenanceRecord;
use crate::source::ApiResponse;

/// Records plus their derived metrics, ready for display.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// Ascending by date. Views that show newest first reverse locally.
    pub records: Vec<MaintenanceRecord>,
    pub metrics: DerivedMetrics,
    pub last_updated: Instant,
}

impl DashboardData {
    /// Load a saved API response from disk.
    pub fn load(path: &Path, unit: ConsumptionUnit) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, unit)
    }

    /// Parse a raw API response body.
    pub fn parse(content: &str, unit: ConsumptionUnit) -> Result<Self> {
        let response: ApiResponse = serde_json::from_str(content)?;
        Ok(Self::from_records(response.normalize(), unit))
    }

    /// Build dashboard data from records already in ascending order.
    pub fn from_records(records: Vec<MaintenanceRecord>, unit: ConsumptionUnit) -> Self {
        let metrics = DerivedMetrics::compute(&records, unit);
        Self {
            records,
            metrics,
            last_updated: Instant::now(),
        }
    }

    /// Recompute metrics for a different consumption unit.
    pub fn set_unit(&mut self, unit: ConsumptionUnit) {
        if self.metrics.unit != unit {
            self.metrics = DerivedMetrics::compute(&self.records, unit);
        }
    }

    pub fn unit(&self) -> ConsumptionUnit {
        self.metrics.unit
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Instant consumption of the record at `index`, in the current unit.
    pub fn consumption_at(&self, index: usize) -> Option<f64> {
        let record = self.records.get(index)?;
        instant_consumption(record.oil, record.distance, self.metrics.unit)
    }

    /// Running efficiency point for the record at `index`.
    pub fn trend_at(&self, index: usize) -> Option<&TrendPoint> {
        self.metrics.trend.get(index)
    }

    /// Build the JSON export document: summary figures, records and trend.
    pub fn export_json(&self) -> serde_json::Value {
        let metrics = &self.metrics;

        let summary = serde_json::json!({
            "records": self.records.len(),
            "unit": metrics.unit.label(),
            "total_distance_km": metrics.totals.total_distance,
            "total_oil_ml": metrics.totals.total_oil_ml,
            "monitoring_period_days": metrics.period_days,
            "daily_distance_km": metrics.daily_distance,
            "efficiency_km_per_l": metrics.efficiency,
            "consumption_l_per_1000km": metrics.consumption,
            "latest": metrics.latest.as_ref().map(|r| serde_json::json!({
                "id": r.id,
                "date": r.date,
                "odometer": r.odometer,
                "oil": r.oil,
                "consumption": metrics.latest_consumption,
            })),
        });

        let records: Vec<serde_json::Value> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                serde_json::json!({
                    "id": r.id,
                    "date": r.date,
                    "odometer": r.odometer,
                    "distance": r.distance,
                    "oil": r.oil,
                    "consumption": self.consumption_at(i),
                })
            })
            .collect();

        serde_json::json!({
            "summary": summary,
            "records": records,
            "trend": metrics.trend,
        })
    }
}

/// Outcome of the most recent load attempt.
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded(DashboardData),
    Failed(String),
}

impl LoadState {
    pub fn data(&self) -> Option<&DashboardData> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut DashboardData> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RecordId;

    const NESTED: &str = r#"{
        "data": [
            { "id": 2, "attributes": { "date": "2024-01-11", "odometer": 1500, "distance": 500, "oil": 2500 } },
            { "id": 1, "attributes": { "date": "2024-01-01", "odometer": 1000, "distance": 0, "oil": 0 } }
        ]
    }"#;

    #[test]
    fn test_parse_sorts_and_computes() {
        let data = DashboardData::parse(NESTED, ConsumptionUnit::MlPer100Km).unwrap();

        assert_eq!(data.records.len(), 2);
        assert_eq!(data.records[0].id, RecordId::Number(1));
        assert_eq!(data.metrics.period_days, 10);
        assert_eq!(data.metrics.efficiency, Some(200.0));
        assert_eq!(data.consumption_at(1), Some(500.0));
        assert_eq!(data.consumption_at(0), None);
        assert_eq!(data.trend_at(1).and_then(|p| p.efficiency), Some(200.0));
    }

    #[test]
    fn test_parse_empty_response() {
        let data = DashboardData::parse(r#"{"data": []}"#, ConsumptionUnit::MlPer100Km).unwrap();
        assert!(data.is_empty());
        assert!(data.metrics.latest.is_none());
        assert!(data.metrics.trend.is_empty());
    }

    #[test]
    fn test_parse_malformed_response() {
        assert!(DashboardData::parse("<html>502</html>", ConsumptionUnit::MlPer100Km).is_err());
    }

    #[test]
    fn test_set_unit_recomputes() {
        let mut data = DashboardData::parse(NESTED, ConsumptionUnit::MlPer100Km).unwrap();
        data.set_unit(ConsumptionUnit::LitresPer1000Km);

        assert_eq!(data.unit(), ConsumptionUnit::LitresPer1000Km);
        assert_eq!(data.metrics.latest_consumption, Some(50.0));
        assert_eq!(data.consumption_at(1), Some(50.0));
    }

    #[test]
    fn test_export_json() {
        let data = DashboardData::parse(NESTED, ConsumptionUnit::MlPer100Km).unwrap();
        let export = data.export_json();

        assert_eq!(export["summary"]["records"], 2);
        assert_eq!(export["summary"]["unit"], "ml/100km");
        assert_eq!(export["summary"]["monitoring_period_days"], 10);
        assert_eq!(export["summary"]["efficiency_km_per_l"], 200.0);
        assert_eq!(export["summary"]["latest"]["id"], 2);
        assert_eq!(export["records"][0]["date"], "2024-01-01");
        assert!(export["records"][0]["consumption"].is_null());
        assert_eq!(export["records"][1]["consumption"], 500.0);
        assert_eq!(export["trend"].as_array().map(|t| t.len()), Some(2));
    }

    #[test]
    fn test_export_json_empty() {
        let data = DashboardData::from_records(Vec::new(), ConsumptionUnit::MlPer100Km);
        let export = data.export_json();

        assert_eq!(export["summary"]["records"], 0);
        assert!(export["summary"]["latest"].is_null());
        assert!(export["summary"]["efficiency_km_per_l"].is_null());
    }

    #[test]
    fn test_load_state_accessors() {
        let state = LoadState::default();
        assert!(state.is_loading());
        assert!(state.data().is_none());

        let failed = LoadState::Failed("boom".to_string());
        assert_eq!(failed.error(), Some("boom"));
        assert!(failed.data().is_none());
    }
}
