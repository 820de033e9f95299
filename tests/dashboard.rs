//! End-to-end checks: load records through a source, drive the app, and
//! render every view into an in-memory terminal.

use std::time::Duration;

use oilwatch::source::{build_client, HttpSource};
use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use oilwatch::events;
use oilwatch::ui::{self, Theme};
use oilwatch::{App, ConsumptionUnit, FileSource, View};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const NESTED_BODY: &str = r#"{"data": [
    {"id": 2, "attributes": {"date": "2024-01-11", "odometer": 1500, "distance": 500, "oil": 2500}},
    {"id": 1, "attributes": {"date": "2024-01-01", "odometer": 1000, "distance": 0, "oil": 0}}
]}"#;

fn file_app(dir: &tempfile::TempDir, body: &str) -> App {
    let path = dir.path().join("oils.json");
    std::fs::write(&path, body).unwrap();
    let mut app = App::with_theme(
        Box::new(FileSource::new(path)),
        ConsumptionUnit::MlPer100Km,
        Theme::dark(),
    );
    app.reload_data();
    app
}

fn render(app: &App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| ui::draw(frame, app)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

fn render_rows(app: &App, width: u16, height: u16) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| ui::draw(frame, app)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..height)
        .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect())
        .collect()
}

#[test]
fn summary_shows_reference_figures() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(&dir, NESTED_BODY);

    let screen = render(&app, 120, 30);
    assert!(screen.contains("Latest Reading"));
    assert!(screen.contains("1,500 km"));
    assert!(screen.contains("500.00 ml/100km"));
    assert!(screen.contains("200.0 km/L"));
    assert!(screen.contains("5.00 L/1000km"));
}

#[test]
fn every_view_renders_loaded_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = file_app(&dir, NESTED_BODY);

    app.set_view(View::Trend);
    let screen = render(&app, 120, 30);
    assert!(screen.contains("Oil Added (ml)"));
    assert!(screen.contains("Running Efficiency"));

    app.set_view(View::Records);
    let screen = render(&app, 120, 30);
    assert!(screen.contains("Records (2/2)"));
    assert!(screen.contains("11 Jan 2024"));

    app.enter_detail();
    app.toggle_unit();
    let screen = render(&app, 120, 30);
    assert!(screen.contains("Record Detail"));
    assert!(screen.contains("50.00 L/1000km"));

    app.close_overlay();
    app.toggle_help();
    let screen = render(&app, 120, 30);
    assert!(screen.contains("Keyboard Shortcuts"));
}

#[test]
fn empty_response_renders_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = file_app(&dir, r#"{"data": []}"#);
    assert!(app.data().is_some_and(|d| d.is_empty()));

    let screen = render(&app, 120, 30);
    assert!(screen.contains("N/A"));
    assert!(screen.contains("No maintenance records yet"));

    app.set_view(View::Trend);
    assert!(render(&app, 120, 30).contains("No records to chart"));

    app.set_view(View::Records);
    assert!(render(&app, 120, 30).contains("Records (0/0)"));
}

#[test]
fn failed_load_offers_retry() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::with_theme(
        Box::new(FileSource::new(dir.path().join("missing.json"))),
        ConsumptionUnit::MlPer100Km,
        Theme::dark(),
    );
    app.reload_data();
    assert!(app.state.error().is_some());

    let screen = render(&app, 120, 30);
    assert!(screen.contains("Could not load maintenance records"));
    assert!(screen.contains("Press r to retry"));

    // The file shows up and a retry succeeds
    std::fs::write(dir.path().join("missing.json"), NESTED_BODY).unwrap();
    app.request_reload();
    assert!(app.reload_data());
    assert_eq!(app.data().map(|d| d.records.len()), Some(2));
}

#[test]
fn tiny_terminal_shows_resize_hint() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(&dir, NESTED_BODY);
    assert!(render(&app, 40, 10).contains("Terminal too small"));
}

/// Single-response HTTP stub; returns the base URL.
async fn serve_once(status: u16, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(read) => buf.extend_from_slice(&chunk[..read]),
            }
        }
        let response = format!(
            "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    });

    format!("http://{}", addr)
}

async fn tick_until_settled(app: &mut App) {
    for _ in 0..200 {
        app.reload_data();
        if !app.state.is_loading() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("load did not settle");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn http_source_feeds_the_app() {
    let base_url = serve_once(200, NESTED_BODY).await;
    let client = build_client(Duration::from_secs(5)).unwrap();
    let source =
        HttpSource::spawn(tokio::runtime::Handle::current(), client, &base_url).unwrap();

    let mut app = App::with_theme(Box::new(source), ConsumptionUnit::MlPer100Km, Theme::dark());
    tick_until_settled(&mut app).await;

    let data = app.data().expect("records loaded");
    assert_eq!(data.records.len(), 2);
    assert_eq!(data.metrics.totals.total_distance, 500.0);
    assert_eq!(data.metrics.totals.total_oil_ml, 2500.0);
    assert_eq!(data.metrics.period_days, 10);
    assert!(app.source_description().starts_with("api: http://127.0.0.1"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn http_error_status_marks_load_failed() {
    let base_url = serve_once(503, "unavailable").await;
    let client = build_client(Duration::from_secs(5)).unwrap();
    let source =
        HttpSource::spawn(tokio::runtime::Handle::current(), client, &base_url).unwrap();

    let mut app = App::with_theme(Box::new(source), ConsumptionUnit::MlPer100Km, Theme::dark());
    tick_until_settled(&mut app).await;

    assert!(app.data().is_none());
    assert!(app.state.error().is_some_and(|e| e.contains("503")));
}

#[test]
fn click_after_scroll_selects_the_row_on_screen() {
    let entries: Vec<String> = (1..=30)
        .map(|day| {
            format!(
                r#"{{"id": {day}, "date": "2024-01-{day:02}", "odometer": {}, "distance": 100, "oil": 50}}"#,
                1000 + day * 100
            )
        })
        .collect();
    let body = format!(r#"{{"data": [{}]}}"#, entries.join(","));
    let dir = tempfile::tempdir().unwrap();
    let mut app = file_app(&dir, &body);
    app.set_view(View::Records);

    // Newest first; row 20 is 10 Jan and forces the 7-row table to scroll
    app.selected_record_index = 20;
    let (width, height) = (120, 13);
    render(&app, width, height);
    assert_eq!(app.records_offset.get(), 14);

    // First body row on screen: below tabs, table border and header
    let row = ui::CONTENT_START_ROW + 2;
    let click = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 10,
        row,
        modifiers: KeyModifiers::NONE,
    };
    events::handle_mouse_event(&mut app, click, ui::CONTENT_START_ROW, ui::content_height(height));
    assert_eq!(app.selected_record_index, 14);

    let rows = render_rows(&app, width, height);
    let line = &rows[usize::from(row)];
    assert!(line.contains("16 Jan 2024"), "row on screen: {line}");
    assert_eq!(app.records_offset.get(), 14);
}
