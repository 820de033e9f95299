//! Data source abstraction for loading maintenance records.
//!
//! Sources are responsible for fetching the raw API response and
//! normalizing it, so everything downstream only ever sees
//! [`MaintenanceRecord`]s in ascending date order.

mod error;
mod file;
mod http;
mod response;

pub use error::FetchError;
pub use file::FileSource;
pub use http::{build_client, fetch_records, HttpSource};
pub use response::{records_url, ApiEntry, ApiFields, ApiResponse};

use std::fmt::Debug;

use crate::data::MaintenanceRecord;

/// Trait for loading maintenance records from various sources.
///
/// A source performs one load when created and another only when asked
/// to via [`reload`](DataSource::reload). The TUI calls
/// [`poll`](DataSource::poll) on every tick to pick up the result.
///
/// # Example
///
/// ```
/// use oilwatch::source::{DataSource, FileSource};
///
/// let mut source = FileSource::new("oils.json");
/// if let Some(records) = source.poll() {
///     println!("Got {} records", records.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Take the result of the current load, if it has completed.
    ///
    /// Returns `Some(records)` once per successful load, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<Vec<MaintenanceRecord>>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// The error from the last load attempt, if it failed.
    fn error(&self) -> Option<&str>;

    /// Whether a load has been started but not yet picked up by `poll`.
    fn is_pending(&self) -> bool;

    /// Start a new load attempt, discarding any that is still in flight.
    fn reload(&mut self);
}
