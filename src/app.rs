//! Application state and navigation logic.

use std::cell::Cell;

use anyhow::Result;

use crate::data::format::format_date;
use crate::data::{ConsumptionUnit, DashboardData, LoadState, MaintenanceRecord};
use crate::source::DataSource;
use crate::ui::records::{sort_records_by, RecordSortColumn};
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Record detail is shown as an overlay (controlled by `App::show_detail_overlay`)
/// rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Summary cards for the latest reading and overall figures.
    Summary,
    /// Oil added and running efficiency over time.
    Trend,
    /// Table of every record.
    Records,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Summary => View::Trend,
            View::Trend => View::Records,
            View::Records => View::Summary,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Summary => View::Records,
            View::Trend => View::Summary,
            View::Records => View::Trend,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Summary => "Summary",
            View::Trend => "Trend",
            View::Records => "Records",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub state: LoadState,
    pub unit: ConsumptionUnit,

    // Navigation state (Records view, visual index)
    pub selected_record_index: usize,
    /// First table row shown by the last drawn Records frame.
    pub records_offset: Cell<usize>,

    // Sorting (Records view); newest first by default
    pub sort_column: RecordSortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App with the given data source and consumption unit.
    pub fn new(source: Box<dyn DataSource>, unit: ConsumptionUnit) -> Self {
        Self::with_theme(source, unit, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme (skips terminal detection).
    pub fn with_theme(source: Box<dyn DataSource>, unit: ConsumptionUnit, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Summary,
            show_help: false,
            show_detail_overlay: false,
            source,
            state: LoadState::Loading,
            unit,
            selected_record_index: 0,
            records_offset: Cell::new(0),
            sort_column: RecordSortColumn::default(),
            sort_ascending: false,
            filter_text: String::new(),
            filter_active: false,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// The loaded data, if the last load succeeded.
    pub fn data(&self) -> Option<&DashboardData> {
        self.state.data()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Pick up the result of the current load, if it has arrived.
    ///
    /// Returns true when a new record set was installed.
    pub fn reload_data(&mut self) -> bool {
        if let Some(records) = self.source.poll() {
            self.state = LoadState::Loaded(DashboardData::from_records(records, self.unit));
            self.clamp_selection();
            return true;
        }

        if let Some(err) = self.source.error() {
            if self.state.error() != Some(err) {
                self.state = LoadState::Failed(err.to_string());
            }
        }
        false
    }

    /// Discard the current snapshot and start a new load.
    pub fn request_reload(&mut self) {
        self.source.reload();
        self.state = LoadState::Loading;
        self.close_overlay();
        self.set_status_message(format!("Reloading from {}", self.source.description()));
    }

    /// Switch to the next view (cycles through Summary → Trend → Records).
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        if self.current_view == View::Records {
            let max = self.visible_record_count().saturating_sub(1);
            self.selected_record_index = (self.selected_record_index + n).min(max);
        }
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        if self.current_view == View::Records {
            self.selected_record_index = self.selected_record_index.saturating_sub(n);
        }
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_record_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_record_index = self.visible_record_count().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let max = self.visible_record_count().saturating_sub(1);
        self.selected_record_index = self.selected_record_index.min(max);
    }

    /// Records as the Records view shows them: filtered, then sorted.
    ///
    /// Each entry carries its index into the ascending record list.
    pub fn visible_records(&self) -> Vec<(usize, &MaintenanceRecord)> {
        let Some(data) = self.data() else {
            return Vec::new();
        };

        let mut records: Vec<(usize, &MaintenanceRecord)> = data
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.matches_filter(r))
            .collect();
        sort_records_by(&mut records, data, self.sort_column, self.sort_ascending);
        records
    }

    fn visible_record_count(&self) -> usize {
        match self.data() {
            Some(data) if self.filter_text.is_empty() => data.records.len(),
            Some(data) => data.records.iter().filter(|r| self.matches_filter(r)).count(),
            None => 0,
        }
    }

    /// Index into the ascending record list for the selected visual row.
    pub fn selected_record_raw_index(&self) -> Option<usize> {
        self.visible_records().get(self.selected_record_index).map(|(idx, _)| *idx)
    }

    /// Open the detail overlay for the currently selected record.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Records && self.selected_record_raw_index().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to Summary.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        if self.current_view != View::Summary {
            self.current_view = View::Summary;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column of the Records view.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Switch between ml/100km and L/1000km and recompute figures.
    pub fn toggle_unit(&mut self) {
        self.unit = self.unit.toggle();
        if let Some(data) = self.state.data_mut() {
            data.set_unit(self.unit);
        }
        self.set_status_message(format!("Consumption shown in {}", self.unit));
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_record_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a record matches the current filter.
    ///
    /// Matches against the ISO date, the displayed date and the id.
    pub fn matches_filter(&self, record: &MaintenanceRecord) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        let search = self.filter_text.to_lowercase();
        record.date.to_string().contains(&search)
            || format_date(record.date).to_lowercase().contains(&search)
            || record.id.to_string().to_lowercase().contains(&search)
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        let Some(data) = self.data() else {
            anyhow::bail!("No data to export");
        };

        let json = serde_json::to_string_pretty(&data.export_json())?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "exported dashboard state");
        Ok(())
    }
}
