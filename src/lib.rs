//! # oilwatch
//!
//! A terminal dashboard and library for tracking engine oil consumption.
//!
//! Maintenance records (date, odometer, distance since the last record, oil
//! added) are loaded from a content API or a saved response file, normalized
//! into ascending date order, and turned into consumption and efficiency
//! figures shown in an interactive terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │ (metrics)│    │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── HttpSource | FileSource                     │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with an HTTP
//!   source for the live API and a file source for saved responses
//! - **[`data`]**: Record model and pure metric computations (totals, monitoring
//!   period, efficiency, per-record consumption, running efficiency trend)
//! - **[`ui`]**: Terminal rendering using ratatui: summary cards, trend chart,
//!   records table, detail overlay and theme support
//! - **[`config`]** and **[`logging`]**: layered settings and tracing setup
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Live dashboard against the API
//! oilwatch --url https://maintenance.example.com
//!
//! # Saved response, consumption in L/1000km
//! oilwatch --file oils.json --unit l-per-1000km
//!
//! # Write the figures as JSON and exit
//! oilwatch --file oils.json --export report.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use oilwatch::{ConsumptionUnit, DashboardData};
//!
//! let body = r#"{"data": [
//!     {"id": 1, "date": "2024-01-01", "odometer": 1000, "distance": 0, "oil": 0},
//!     {"id": 2, "date": "2024-01-11", "odometer": 1500, "distance": 500, "oil": 2500}
//! ]}"#;
//!
//! let data = DashboardData::parse(body, ConsumptionUnit::MlPer100Km).unwrap();
//! assert_eq!(data.metrics.period_days, 10);
//! assert_eq!(data.metrics.efficiency, Some(200.0));
//! assert_eq!(data.metrics.latest_consumption, Some(500.0));
//! ```
//!
//! ### Driving the app with a file source
//!
//! ```
//! use oilwatch::{App, ConsumptionUnit, FileSource};
//! use oilwatch::ui::Theme;
//!
//! let source = Box::new(FileSource::new("oils.json"));
//! let app = App::with_theme(source, ConsumptionUnit::default(), Theme::dark());
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod logging;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::Settings;
pub use data::{
    ConsumptionUnit, DashboardData, DerivedMetrics, LoadState, MaintenanceRecord, RecordId,
    TrendPoint,
};
pub use source::{DataSource, FetchError, FileSource, HttpSource};
