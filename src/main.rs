use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use oilwatch::config::Settings;
use oilwatch::data::{ConsumptionUnit, DashboardData};
use oilwatch::source::{build_client, fetch_records, records_url, DataSource, FileSource, HttpSource};
use oilwatch::{events, logging, ui, App};

#[derive(Parser, Debug)]
#[command(name = "oilwatch")]
#[command(about = "Terminal dashboard for engine oil consumption")]
#[command(version)]
struct Args {
    /// Base URL of the maintenance log API (e.g. https://maintenance.example.com)
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Read a saved API response from a JSON file instead of the API
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Unit for per-record consumption figures
    #[arg(long, value_enum)]
    unit: Option<ConsumptionUnit>,

    /// Request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Export the dashboard figures to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Log file for interactive sessions
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of the layered settings.
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(url) = &self.url {
            settings.api_url = Some(url.clone());
        }
        if let Some(unit) = self.unit {
            settings.unit = unit;
        }
        if let Some(timeout) = self.timeout {
            settings.request_timeout_secs = timeout;
        }
        if let Some(log_file) = &self.log_file {
            settings.log_file = log_file.clone();
        }
        settings
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref())
        .with_context(|| match &args.config {
            Some(path) => format!("failed to load configuration from {}", path.display()),
            None => "failed to load configuration".to_string(),
        })?;
    let settings = args.apply(settings);

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        logging::init_stderr_logging();
        return export_to_file(args.file.as_deref(), &settings, export_path);
    }

    let _log_guard = logging::init_file_logging(&settings.log_file);

    if let Some(ref path) = args.file {
        return run_with_file(path, settings.unit);
    }

    run_with_http(&settings)
}

fn require_url(settings: &Settings) -> Result<&str> {
    settings.api_url.as_deref().context(
        "no API URL configured: pass --url, set OILWATCH_API_URL, or set api_url in the config file",
    )
}

/// Run with a file-based data source
fn run_with_file(path: &Path, unit: ConsumptionUnit) -> Result<()> {
    tracing::info!(path = %path.display(), "starting with file source");
    let source = Box::new(FileSource::new(path));
    run_tui(source, unit)
}

/// Run against the remote API
fn run_with_http(settings: &Settings) -> Result<()> {
    let url = require_url(settings)?;

    // The fetch runs on this runtime while the TUI owns the main thread
    let rt = tokio::runtime::Runtime::new()?;
    let client = build_client(settings.request_timeout())?;
    let source = HttpSource::spawn(rt.handle().clone(), client, url)?;
    tracing::info!(url = source.url(), "starting with api source");

    let result = run_tui(Box::new(source), settings.unit);

    rt.shutdown_timeout(Duration::from_secs(1));
    result
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, unit: ConsumptionUnit) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, unit);
    let _ = app.reload_data();

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    let content_height = ui::content_height(terminal.size()?.height);
                    events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW, content_height);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Pick up a finished load, if any
        let _ = app.reload_data();
    }

    Ok(())
}

/// Load once, write the export document and exit
fn export_to_file(file: Option<&Path>, settings: &Settings, export_path: &Path) -> Result<()> {
    let data = match file {
        Some(path) => DashboardData::load(path, settings.unit)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => {
            let url = records_url(require_url(settings)?);
            let rt = tokio::runtime::Runtime::new()?;
            let client = build_client(settings.request_timeout())?;
            let records = rt
                .block_on(fetch_records(&client, &url))
                .with_context(|| format!("failed to fetch {}", url))?;
            DashboardData::from_records(records, settings.unit)
        }
    };

    let json = serde_json::to_string_pretty(&data.export_json())?;
    std::fs::write(export_path, json)
        .with_context(|| format!("failed to write {}", export_path.display()))?;

    tracing::info!(
        path = %export_path.display(),
        records = data.records.len(),
        "exported dashboard"
    );
    println!("Exported dashboard to: {}", export_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_settings() {
        let args = Args::parse_from([
            "oilwatch",
            "--url",
            "http://localhost:1337",
            "--unit",
            "l-per-1000km",
            "--timeout",
            "5",
        ]);
        let settings = args.apply(Settings::default());

        assert_eq!(settings.api_url.as_deref(), Some("http://localhost:1337"));
        assert_eq!(settings.unit, ConsumptionUnit::LitresPer1000Km);
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert_eq!(settings.log_file, PathBuf::from("oilwatch.log"));
    }

    #[test]
    fn test_url_conflicts_with_file() {
        let result =
            Args::try_parse_from(["oilwatch", "--url", "http://localhost", "--file", "oils.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_url_is_an_error() {
        assert!(require_url(&Settings::default()).is_err());
    }

    #[test]
    fn test_export_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("oils.json");
        let output = dir.path().join("export.json");
        std::fs::write(
            &input,
            r#"{"data":[{"id":1,"date":"2024-01-01","odometer":1000,"distance":0,"oil":0}]}"#,
        )
        .unwrap();

        export_to_file(Some(&input), &Settings::default(), &output).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["summary"]["records"], 1);
        assert_eq!(written["summary"]["monitoring_period_days"], 1);
    }
}
