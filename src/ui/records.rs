//! Records view rendering.
//!
//! Displays every maintenance record in a sortable, filterable table.
//! Rows are newest first by default; that ordering is applied here only and
//! never changes the ascending order the metrics are computed in.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::format::{format_date, format_distance, format_value, NOT_AVAILABLE};
use crate::data::{DashboardData, MaintenanceRecord};

/// Column to sort by in the Records view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordSortColumn {
    #[default]
    Date,
    Odometer,
    Distance,
    Oil,
    Consumption,
}

impl RecordSortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            Self::Date => Self::Odometer,
            Self::Odometer => Self::Distance,
            Self::Distance => Self::Oil,
            Self::Oil => Self::Consumption,
            Self::Consumption => Self::Date,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Odometer => "odometer",
            Self::Distance => "distance",
            Self::Oil => "oil",
            Self::Consumption => "consumption",
        }
    }
}

/// Terminal rows above the first table body row: top border and header.
pub const BODY_START: u16 = 2;

/// Body rows visible when the table is drawn into `height` rows.
pub fn body_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(BODY_START + 1))
}

/// Render the Records view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(data) = app.data() else {
        super::common::render_placeholder(frame, app, area, " Records ");
        return;
    };

    let records = app.visible_records();
    let unit = data.unit();

    let header = Row::new(vec![
        Cell::from(format_header("Date", RecordSortColumn::Date, app)),
        Cell::from(format_header("Odometer (km)", RecordSortColumn::Odometer, app)),
        Cell::from(format_header("Distance (km)", RecordSortColumn::Distance, app)),
        Cell::from(format_header("Oil Added (ml)", RecordSortColumn::Oil, app)),
        Cell::from(format_header(
            &format!("Consumption ({})", unit.label()),
            RecordSortColumn::Consumption,
            app,
        )),
        Cell::from("Running km/L"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = records
        .iter()
        .map(|(idx, r)| {
            let consumption = data.consumption_at(*idx);
            let running = data.trend_at(*idx).and_then(|p| p.efficiency);

            Row::new(vec![
                Cell::from(format_date(r.date)),
                optional_cell(r.odometer.map(format_distance), app),
                optional_cell(r.distance.map(format_distance), app),
                optional_cell(r.oil.map(|o| format_value(Some(o), 0)), app),
                optional_cell(consumption.map(|c| format_value(Some(c), 2)), app)
                    .style(if consumption.is_some() {
                        Style::default().fg(app.theme.consumption)
                    } else {
                        app.theme.unavailable
                    }),
                optional_cell(running.map(|e| format_value(Some(e), 1)), app),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2), // Date
        Constraint::Fill(2), // Odometer
        Constraint::Fill(2), // Distance
        Constraint::Fill(2), // Oil
        Constraint::Fill(3), // Consumption
        Constraint::Fill(2), // Running efficiency
    ];

    let selected_visual_index = app.selected_record_index.min(records.len().saturating_sub(1));

    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !records.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, records.len())
    } else {
        String::new()
    };

    let title = format!(
        " Records ({}/{}) [s:sort {}{}]{}{} ",
        records.len(),
        data.records.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    // Start from the last frame's scroll so the table only moves when the
    // selection leaves the viewport
    let mut state = TableState::default().with_offset(app.records_offset.get());
    if !records.is_empty() {
        state.select(Some(selected_visual_index));
    }

    frame.render_stateful_widget(table, area, &mut state);
    app.records_offset.set(state.offset());
}

fn optional_cell(text: Option<String>, app: &App) -> Cell<'static> {
    match text {
        Some(text) => Cell::from(text),
        None => Cell::from(NOT_AVAILABLE).style(app.theme.unavailable),
    }
}

fn format_header(name: &str, col: RecordSortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort records by the given column and direction.
///
/// Entries are `(index into data.records, record)`. Ties fall back to that
/// index, so equal dates keep arrival order and reverse with the direction.
pub fn sort_records_by(
    records: &mut [(usize, &MaintenanceRecord)],
    data: &DashboardData,
    column: RecordSortColumn,
    ascending: bool,
) {
    records.sort_by(|a, b| {
        let primary = match column {
            RecordSortColumn::Date => a.1.date.cmp(&b.1.date),
            RecordSortColumn::Odometer => cmp_optional(a.1.odometer, b.1.odometer),
            RecordSortColumn::Distance => cmp_optional(a.1.distance, b.1.distance),
            RecordSortColumn::Oil => cmp_optional(a.1.oil, b.1.oil),
            RecordSortColumn::Consumption => {
                cmp_optional(data.consumption_at(a.0), data.consumption_at(b.0))
            }
        };

        let ordering = primary.then_with(|| a.0.cmp(&b.0));
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

/// Missing values sort before any number.
fn cmp_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ConsumptionUnit, RecordId};
    use chrono::NaiveDate;

    fn record(id: i64, date: &str, distance: Option<f64>, oil: Option<f64>) -> MaintenanceRecord {
        MaintenanceRecord {
            id: RecordId::Number(id),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            odometer: None,
            distance,
            oil,
        }
    }

    fn sample() -> DashboardData {
        DashboardData::from_records(
            vec![
                record(1, "2024-01-01", Some(0.0), Some(0.0)),
                record(2, "2024-01-10", Some(400.0), Some(200.0)),
                record(3, "2024-01-10", Some(600.0), Some(900.0)),
                record(4, "2024-01-20", None, Some(100.0)),
            ],
            ConsumptionUnit::MlPer100Km,
        )
    }

    fn sorted_ids(data: &DashboardData, column: RecordSortColumn, ascending: bool) -> Vec<i64> {
        let mut rows: Vec<(usize, &MaintenanceRecord)> = data.records.iter().enumerate().collect();
        sort_records_by(&mut rows, data, column, ascending);
        rows.iter()
            .map(|(_, r)| match r.id {
                RecordId::Number(n) => n,
                RecordId::Text(_) => -1,
            })
            .collect()
    }

    #[test]
    fn test_date_descending_is_plain_reversal() {
        let data = sample();
        assert_eq!(sorted_ids(&data, RecordSortColumn::Date, true), vec![1, 2, 3, 4]);
        assert_eq!(sorted_ids(&data, RecordSortColumn::Date, false), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_missing_values_sort_first() {
        let data = sample();
        assert_eq!(sorted_ids(&data, RecordSortColumn::Distance, true), vec![4, 1, 2, 3]);
    }

    #[test]
    fn test_consumption_sort() {
        let data = sample();
        // 1 and 4 have no consumption; 2 = 50, 3 = 150
        assert_eq!(sorted_ids(&data, RecordSortColumn::Consumption, true), vec![1, 4, 2, 3]);
    }

    #[test]
    fn test_sort_column_cycle() {
        let mut col = RecordSortColumn::default();
        for _ in 0..5 {
            col = col.next();
        }
        assert_eq!(col, RecordSortColumn::Date);
        assert_eq!(RecordSortColumn::Oil.label(), "oil");
    }
}
