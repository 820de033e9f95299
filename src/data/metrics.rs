//! Derived oil-consumption metrics.
//!
//! Every function here is pure and expects records in ascending date order,
//! which is the order the data sources hand them out in. "Latest" always
//! means the last record of that order.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::MaintenanceRecord;

/// Unit used for per-record consumption figures.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum ConsumptionUnit {
    /// Millilitres of oil per 100 km.
    #[default]
    #[serde(rename = "ml-per-100km")]
    #[value(name = "ml-per-100km")]
    MlPer100Km,
    /// Litres of oil per 1000 km.
    #[serde(rename = "l-per-1000km")]
    #[value(name = "l-per-1000km")]
    LitresPer1000Km,
}

impl ConsumptionUnit {
    pub fn label(&self) -> &'static str {
        match self {
            ConsumptionUnit::MlPer100Km => "ml/100km",
            ConsumptionUnit::LitresPer1000Km => "L/1000km",
        }
    }

    /// The other unit.
    pub fn toggle(self) -> Self {
        match self {
            ConsumptionUnit::MlPer100Km => ConsumptionUnit::LitresPer1000Km,
            ConsumptionUnit::LitresPer1000Km => ConsumptionUnit::MlPer100Km,
        }
    }
}

impl fmt::Display for ConsumptionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Summed distance and oil over a set of records.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AggregateTotals {
    pub total_distance: f64,
    pub total_oil_ml: f64,
}

/// Running efficiency up to and including one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub cumulative_distance: f64,
    pub cumulative_oil_ml: f64,
    /// km per litre; `None` until some oil has been added.
    pub efficiency: Option<f64>,
}

/// Everything the dashboard shows, computed once per loaded snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub totals: AggregateTotals,
    pub period_days: i64,
    /// km per day over the monitoring period.
    pub daily_distance: f64,
    /// km per litre over all records.
    pub efficiency: Option<f64>,
    /// Litres per 1000 km over all records.
    pub consumption: Option<f64>,
    pub latest: Option<MaintenanceRecord>,
    /// Instant consumption of the latest record, in `unit`.
    pub latest_consumption: Option<f64>,
    pub unit: ConsumptionUnit,
    pub trend: Vec<TrendPoint>,
}

impl DerivedMetrics {
    /// Compute all metrics for an ascending-ordered record list.
    pub fn compute(records: &[MaintenanceRecord], unit: ConsumptionUnit) -> Self {
        let latest = records.last().cloned();
        let latest_consumption = latest
            .as_ref()
            .and_then(|r| instant_consumption(r.oil, r.distance, unit));

        Self {
            totals: aggregate_totals(records),
            period_days: monitoring_period_days(records),
            daily_distance: daily_distance(records),
            efficiency: overall_efficiency(records),
            consumption: overall_consumption(records),
            latest,
            latest_consumption,
            unit,
            trend: running_efficiency_trend(records),
        }
    }
}

/// Oil consumption of a single reading, rounded to two decimals.
///
/// Returns `None` when either value is missing or the distance is zero,
/// so nothing non-finite ever reaches the display.
pub fn instant_consumption(
    oil: Option<f64>,
    distance: Option<f64>,
    unit: ConsumptionUnit,
) -> Option<f64> {
    let oil = oil.filter(|o| o.is_finite())?;
    let distance = distance.filter(|d| d.is_finite() && *d != 0.0)?;

    let ml_per_100km = oil / distance * 100.0;
    let value = match unit {
        ConsumptionUnit::MlPer100Km => ml_per_100km,
        ConsumptionUnit::LitresPer1000Km => ml_per_100km / 10.0,
    };
    Some(round2(value))
}

pub fn aggregate_totals(records: &[MaintenanceRecord]) -> AggregateTotals {
    records.iter().fold(AggregateTotals::default(), |acc, r| AggregateTotals {
        total_distance: acc.total_distance + r.distance_or_zero(),
        total_oil_ml: acc.total_oil_ml + r.oil_or_zero(),
    })
}

/// Whole days between the earliest and latest record, never less than 1.
pub fn monitoring_period_days(records: &[MaintenanceRecord]) -> i64 {
    let earliest = records.iter().map(|r| r.date).min();
    let latest = records.iter().map(|r| r.date).max();

    match (earliest, latest) {
        (Some(first), Some(last)) => (last - first).num_days().max(1),
        _ => 1,
    }
}

/// Average km driven per day over the monitoring period.
pub fn daily_distance(records: &[MaintenanceRecord]) -> f64 {
    aggregate_totals(records).total_distance / monitoring_period_days(records) as f64
}

/// km per litre over all records.
pub fn overall_efficiency(records: &[MaintenanceRecord]) -> Option<f64> {
    let totals = aggregate_totals(records);
    efficiency(totals.total_distance, totals.total_oil_ml)
}

/// Litres per 1000 km over all records.
pub fn overall_consumption(records: &[MaintenanceRecord]) -> Option<f64> {
    let totals = aggregate_totals(records);
    if totals.total_distance == 0.0 {
        return None;
    }
    Some((totals.total_oil_ml / 1000.0) / (totals.total_distance / 1000.0))
}

/// Cumulative efficiency at every record, in a single forward pass.
pub fn running_efficiency_trend(records: &[MaintenanceRecord]) -> Vec<TrendPoint> {
    let mut cumulative_distance = 0.0;
    let mut cumulative_oil_ml = 0.0;

    records
        .iter()
        .map(|r| {
            cumulative_distance += r.distance_or_zero();
            cumulative_oil_ml += r.oil_or_zero();
            TrendPoint {
                date: r.date,
                cumulative_distance,
                cumulative_oil_ml,
                efficiency: efficiency(cumulative_distance, cumulative_oil_ml),
            }
        })
        .collect()
}

fn efficiency(distance: f64, oil_ml: f64) -> Option<f64> {
    if oil_ml == 0.0 {
        return None;
    }
    Some(distance / (oil_ml / 1000.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
