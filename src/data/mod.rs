//! Data models and metric derivation for maintenance records.
//!
//! This module turns the normalized record list handed out by a
//! [`DataSource`](crate::source::DataSource) into the figures the dashboard
//! displays.
//!
//! ## Submodules
//!
//! - [`record`]: The [`MaintenanceRecord`] model
//! - [`metrics`]: Pure consumption/efficiency formulas and [`DerivedMetrics`]
//! - [`dashboard`]: [`DashboardData`] assembly and the [`LoadState`] of a load attempt
//! - [`format`]: Date parsing and "N/A"-aware value formatting
//!
//! ## Data Flow
//!
//! ```text
//! ApiResponse (raw JSON, flat or nested)
//!        │
//!        ▼
//! ApiResponse::normalize()      ascending by date
//!        │
//!        ▼
//! DashboardData::from_records()
//!        │
//!        └──▶ DerivedMetrics::compute()  totals, rates, running trend
//! ```

pub mod dashboard;
pub mod format;
pub mod metrics;
pub mod record;

pub use dashboard::{DashboardData, LoadState};
pub use metrics::{AggregateTotals, ConsumptionUnit, DerivedMetrics, TrendPoint};
pub use record::{MaintenanceRecord, RecordId};
