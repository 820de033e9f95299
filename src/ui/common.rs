//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, help overlay,
//! and the placeholder shown while no data is loaded.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, View};
use crate::data::format::{format_date, format_distance};
use crate::data::LoadState;

/// Render the header bar with a one-line overview of the loaded data.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" OILWATCH ", Style::default().add_modifier(Modifier::BOLD));

    let line = match &app.state {
        LoadState::Loading => Line::from(vec![
            Span::styled(" ○", Style::default().fg(app.theme.highlight)),
            title,
            Span::raw("│ Loading..."),
        ]),
        LoadState::Failed(_) => Line::from(vec![
            Span::styled(" ●", Style::default().fg(app.theme.error)),
            title,
            Span::styled("│ Load failed", Style::default().fg(app.theme.error)),
        ]),
        LoadState::Loaded(data) => {
            let metrics = &data.metrics;
            let latest = metrics
                .latest
                .as_ref()
                .map(|r| format_date(r.date))
                .unwrap_or_else(|| "N/A".to_string());

            Line::from(vec![
                Span::styled(" ●", Style::default().fg(app.theme.oil)),
                title,
                Span::raw("│ "),
                Span::styled(
                    format!("{}", data.records.len()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" records │ "),
                Span::styled(
                    format!("{} km", format_distance(metrics.totals.total_distance)),
                    Style::default().fg(app.theme.odometer),
                ),
                Span::raw(format!(" over {} days │ latest ", metrics.period_days)),
                Span::raw(latest),
                Span::raw(format!(" │ {}", data.unit())),
            ])
        }
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Summary "),
        Line::from(" 2:Trend "),
        Line::from(" 3:Records "),
    ];

    let selected = match app.current_view {
        View::Summary => 0,
        View::Trend => 1,
        View::Records => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the data source, time since the last load and the available
/// controls. Also displays temporary status messages and load errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let (status, style) = match &app.state {
        LoadState::Loaded(data) => {
            let controls = match app.current_view {
                View::Records if app.filter_active => "Type to search | Enter:apply Esc:cancel",
                View::Records => "/:search s:sort S:reverse Enter:detail u:unit ?:help q:quit",
                _ => "Tab:switch u:unit r:reload e:export ?:help q:quit",
            };
            (
                format!(
                    " {} | {} | Loaded {:.0}s ago | {}",
                    app.current_view.label(),
                    app.source_description(),
                    data.last_updated.elapsed().as_secs_f64(),
                    controls,
                ),
                Style::default().add_modifier(Modifier::DIM),
            )
        }
        LoadState::Failed(err) => (
            format!(" Error: {} | r:retry q:quit", err),
            Style::default().fg(app.theme.error),
        ),
        LoadState::Loading => (
            format!(" Loading from {}... | q:quit", app.source_description()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Render the content shown by every view while nothing is loaded.
pub fn render_placeholder(frame: &mut Frame, app: &App, area: Rect, title: &str) {
    let lines = match &app.state {
        LoadState::Failed(err) => vec![
            Line::from(Span::styled(
                "Could not load maintenance records",
                Style::default().fg(app.theme.error).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(err.as_str()),
            Line::from(""),
            Line::from(Span::styled(
                "Press r to retry",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ],
        _ => vec![Line::from(format!(
            "Loading records from {}...",
            app.source_description()
        ))],
    };

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1/2/3       Summary/Trend/Records"),
        Line::from("  ↑/↓ j/k     Navigate records"),
        Line::from("  PgUp/PgDn   Jump 10 records"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Record detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Records",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  /         Filter by date"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  u         Toggle ml/100km / L/1000km"),
        Line::from("  r         Reload data"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 28u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
