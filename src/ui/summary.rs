//! Summary view rendering.
//!
//! Displays the latest reading and the overall figures as a grid of cards.
//! Any figure that cannot be computed is shown as "N/A".

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::format::{
    format_date, format_distance, format_value, format_with_unit, NOT_AVAILABLE,
};

/// One card: a title, a headline value and a caption underneath.
struct Card {
    title: &'static str,
    value: String,
    caption: String,
    color: Color,
    available: bool,
}

impl Card {
    fn new(title: &'static str, value: Option<String>, caption: String, color: Color) -> Self {
        Self {
            title,
            available: value.is_some(),
            value: value.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            caption,
            color,
        }
    }
}

/// Render the Summary view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(data) = app.data() else {
        super::common::render_placeholder(frame, app, area, " Summary ");
        return;
    };

    let metrics = &data.metrics;
    let latest = metrics.latest.as_ref();
    let latest_caption = latest
        .map(|r| format!("recorded {}", format_date(r.date)))
        .unwrap_or_else(|| "no records yet".to_string());

    let top = [
        Card::new(
            "Latest Reading",
            latest.and_then(|r| r.odometer).map(|o| format!("{} km", format_distance(o))),
            latest_caption.clone(),
            app.theme.odometer,
        ),
        Card::new(
            "Last Oil Added",
            latest.and_then(|r| r.oil).map(|o| format!("{} ml", format_value(Some(o), 0))),
            latest_caption,
            app.theme.oil,
        ),
        Card::new(
            "Consumption Rate",
            metrics
                .latest_consumption
                .map(|c| format_with_unit(Some(c), 2, metrics.unit.label())),
            format!(
                "over the last {}",
                latest
                    .and_then(|r| r.distance)
                    .map(|d| format!("{} km", format_distance(d)))
                    .unwrap_or_else(|| "interval".to_string())
            ),
            app.theme.consumption,
        ),
    ];

    let bottom = [
        Card::new(
            "Total Distance",
            Some(format!("{} km", format_distance(metrics.totals.total_distance))),
            format!("{} days monitored", metrics.period_days),
            app.theme.odometer,
        ),
        Card::new(
            "Total Oil Added",
            Some(format!("{:.2} L", metrics.totals.total_oil_ml / 1000.0)),
            format!("{} records", data.records.len()),
            app.theme.oil,
        ),
        Card::new(
            "Daily Distance",
            Some(format!("{:.1} km/day", metrics.daily_distance)),
            format!("over {} days", metrics.period_days),
            app.theme.odometer,
        ),
        Card::new(
            "Efficiency",
            metrics.efficiency.map(|e| format_with_unit(Some(e), 1, "km/L")),
            "distance per litre of oil".to_string(),
            app.theme.efficiency,
        ),
        Card::new(
            "Overall Consumption",
            metrics.consumption.map(|c| format_with_unit(Some(c), 2, "L/1000km")),
            "oil per distance travelled".to_string(),
            app.theme.consumption,
        ),
    ];

    let rows = Layout::vertical([Constraint::Length(6), Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    render_card_row(frame, app, rows[0], &top);
    render_card_row(frame, app, rows[1], &bottom);

    if data.is_empty() {
        let hint = Paragraph::new(Line::from(Span::styled(
            "No maintenance records yet",
            Style::default().add_modifier(Modifier::DIM),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(hint, rows[2]);
    }
}

fn render_card_row(frame: &mut Frame, app: &App, area: Rect, cards: &[Card]) {
    let constraints = vec![Constraint::Fill(1); cards.len()];
    let columns = Layout::horizontal(constraints).split(area);

    for (card, column) in cards.iter().zip(columns.iter()) {
        let block = Block::default()
            .title(format!(" {} ", card.title))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                card.value.clone(),
                app.theme.value_style(card.color, card.available),
            )),
            Line::from(Span::styled(
                card.caption.clone(),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];

        let paragraph = Paragraph::new(lines).block(block).alignment(Alignment::Center);
        frame.render_widget(paragraph, *column);
    }
}
