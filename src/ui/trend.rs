//! Trend view rendering.
//!
//! Top half: oil added per record as a bar chart, most recent records that
//! fit the width. Bottom half: running efficiency (km/L) plotted against days
//! since the first record.

use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::format::format_date;
use crate::data::DashboardData;

/// Width of one bar plus its gap.
const BAR_SLOT: u16 = 7;

/// Render the Trend view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(data) = app.data() else {
        super::common::render_placeholder(frame, app, area, " Trend ");
        return;
    };

    if data.is_empty() {
        let block = Block::default()
            .title(" Trend ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        let empty = Paragraph::new(Line::from(Span::styled(
            "No records to chart",
            Style::default().add_modifier(Modifier::DIM),
        )))
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    let chunks =
        Layout::vertical([Constraint::Percentage(45), Constraint::Percentage(55)]).split(area);

    render_oil_bars(frame, app, data, chunks[0]);
    render_efficiency_line(frame, app, data, chunks[1]);
}

fn render_oil_bars(frame: &mut Frame, app: &App, data: &DashboardData, area: Rect) {
    let capacity = (area.width.saturating_sub(2) / BAR_SLOT).max(1) as usize;
    let points = oil_bars(data, capacity);

    let bars: Vec<Bar> = points
        .iter()
        .map(|(date, ml)| {
            Bar::default()
                .value(*ml)
                .label(Line::from(date.format("%d/%m").to_string()).alignment(Alignment::Center))
                .style(Style::default().fg(app.theme.oil))
                .value_style(
                    Style::default()
                        .fg(app.theme.oil)
                        .add_modifier(Modifier::REVERSED | Modifier::BOLD),
                )
        })
        .collect();

    let title = format!(
        " Oil Added (ml) - last {} of {} records ",
        points.len(),
        data.records.len()
    );

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .bar_width(BAR_SLOT - 1)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn render_efficiency_line(frame: &mut Frame, app: &App, data: &DashboardData, area: Rect) {
    let points = efficiency_points(data);
    let block = Block::default()
        .title(" Running Efficiency (km/L) ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if points.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No oil added yet, efficiency not available",
            app.theme.unavailable,
        )))
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    let (Some(first), Some(last)) = (data.records.first(), data.records.last()) else {
        return;
    };
    let x_max = ((last.date - first.date).num_days() as f64).max(1.0);
    let y_max = points.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max).max(1.0) * 1.1;

    let dataset = Dataset::default()
        .name("km/L")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.efficiency))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::raw(format_date(first.date)),
                    Span::raw(format_date(midpoint(first.date, last.date))),
                    Span::raw(format_date(last.date)),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", y_max / 2.0)),
                    Span::raw(format!("{:.0}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

fn midpoint(first: NaiveDate, last: NaiveDate) -> NaiveDate {
    first + (last - first) / 2
}

/// Oil added per record for the most recent `max` records, oldest first.
///
/// Missing oil is drawn as an empty bar.
pub fn oil_bars(data: &DashboardData, max: usize) -> Vec<(NaiveDate, u64)> {
    let skip = data.records.len().saturating_sub(max);
    data.records
        .iter()
        .skip(skip)
        .map(|r| (r.date, r.oil_or_zero().max(0.0).round() as u64))
        .collect()
}

/// `(days since first record, km/L)` for every record with a running efficiency.
pub fn efficiency_points(data: &DashboardData) -> Vec<(f64, f64)> {
    let Some(first) = data.records.first() else {
        return Vec::new();
    };
    data.metrics
        .trend
        .iter()
        .filter_map(|p| {
            let efficiency = p.efficiency?;
            Some(((p.date - first.date).num_days() as f64, efficiency))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ConsumptionUnit, MaintenanceRecord, RecordId};

    fn record(id: i64, date: &str, distance: f64, oil: Option<f64>) -> MaintenanceRecord {
        MaintenanceRecord {
            id: RecordId::Number(id),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            odometer: None,
            distance: Some(distance),
            oil,
        }
    }

    fn sample() -> DashboardData {
        DashboardData::from_records(
            vec![
                record(1, "2024-01-01", 100.0, Some(0.0)),
                record(2, "2024-01-11", 500.0, Some(2500.0)),
                record(3, "2024-01-21", 400.0, None),
            ],
            ConsumptionUnit::MlPer100Km,
        )
    }

    #[test]
    fn test_oil_bars_keeps_most_recent() {
        let data = sample();
        let bars = oil_bars(&data, 2);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].1, 2500);
        assert_eq!(bars[1].1, 0);

        assert_eq!(oil_bars(&data, 10).len(), 3);
    }

    #[test]
    fn test_efficiency_points_skip_until_oil_added() {
        let data = sample();
        let points = efficiency_points(&data);
        // First record has no oil yet
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], (10.0, 240.0));
        assert_eq!(points[1], (20.0, 400.0));
    }

    #[test]
    fn test_efficiency_points_empty() {
        let data = DashboardData::from_records(Vec::new(), ConsumptionUnit::MlPer100Km);
        assert!(efficiency_points(&data).is_empty());
        assert!(oil_bars(&data, 5).is_empty());
    }
}
