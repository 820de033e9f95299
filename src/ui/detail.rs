//! Detail overlay rendering.
//!
//! Displays a modal overlay with everything known about the selected record.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::format::{
    format_date, format_distance, format_value, format_with_unit, NOT_AVAILABLE,
};
use crate::data::metrics::instant_consumption;
use crate::data::ConsumptionUnit;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the record detail as a modal overlay.
///
/// Shows the raw fields of the selected record, its consumption in both
/// units, and the cumulative figures up to and including it.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(data) = app.data() else {
        return;
    };
    let Some(raw_index) = app.selected_record_raw_index() else {
        return;
    };
    let Some(record) = data.records.get(raw_index) else {
        return;
    };

    let (overlay_width, overlay_height) = overlay_size(area);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(4), // Record identity
        Constraint::Min(8),    // Figures
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== HEADER SECTION =====
    let header_lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} ", format_date(record.date)),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::raw(" Record "),
            Span::styled(record.id.to_string(), Style::default().fg(app.theme.highlight)),
            Span::raw(format!("    {} of {}", raw_index + 1, data.records.len())),
        ]),
    ];

    let header_block = Block::default()
        .title(" Record Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    // ===== FIGURES =====
    let trend = data.trend_at(raw_index);
    let ml_per_100km = instant_consumption(record.oil, record.distance, ConsumptionUnit::MlPer100Km);
    let l_per_1000km =
        instant_consumption(record.oil, record.distance, ConsumptionUnit::LitresPer1000Km);

    let rows = vec![
        figure_row(app, "Odometer", record.odometer.map(|o| format!("{} km", format_distance(o)))),
        figure_row(app, "Distance", record.distance.map(|d| format!("{} km", format_distance(d)))),
        figure_row(app, "Oil added", record.oil.map(|o| format!("{} ml", format_value(Some(o), 0)))),
        figure_row(
            app,
            "Consumption",
            ml_per_100km.map(|c| format_with_unit(Some(c), 2, ConsumptionUnit::MlPer100Km.label())),
        ),
        figure_row(
            app,
            "",
            l_per_1000km
                .map(|c| format_with_unit(Some(c), 2, ConsumptionUnit::LitresPer1000Km.label())),
        ),
        figure_row(
            app,
            "Distance so far",
            trend.map(|p| format!("{} km", format_distance(p.cumulative_distance))),
        ),
        figure_row(
            app,
            "Oil so far",
            trend.map(|p| format!("{} ml", format_value(Some(p.cumulative_oil_ml), 0))),
        ),
        figure_row(
            app,
            "Running efficiency",
            trend.and_then(|p| p.efficiency).map(|e| format_with_unit(Some(e), 1, "km/L")),
        ),
    ];

    let table = Table::new(rows, [Constraint::Length(20), Constraint::Fill(1)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(table, chunks[1]);

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

/// Overlay dimensions: 80% of the area, clamped to the usable range.
fn overlay_size(area: Rect) -> (u16, u16) {
    let percent = |len: u16| (u32::from(len) * 80 / 100) as u16;
    (
        percent(area.width).clamp(MIN_OVERLAY_WIDTH, 80),
        percent(area.height).clamp(MIN_OVERLAY_HEIGHT, 22),
    )
}

fn figure_row(app: &App, label: &'static str, value: Option<String>) -> Row<'static> {
    let value_cell = match value {
        Some(v) => Cell::from(v).style(Style::default().add_modifier(Modifier::BOLD)),
        None => Cell::from(NOT_AVAILABLE).style(app.theme.unavailable),
    };
    Row::new(vec![Cell::from(format!(" {}", label)), value_cell])
}
