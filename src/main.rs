// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod data;
mod error;
mod events;
mod orchestrator;
mod poller;
mod settings;
mod source;
mod store;
mod supervisor;
mod ui;

use app::App;
use data::DashboardView;
use settings::{Settings, SourceLocation};
use source::{FileFetcher, HttpFetcher, Snapshot, SnapshotFetcher};
use store::FreshnessPolicy;
use supervisor::Supervisor;
use ui::Theme;

/// How long the main loop waits for input before redrawing.
const FRAME_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "threatwatch")]
#[command(about = "Live terminal dashboard for a regional threat index snapshot")]
struct Args {
    /// Config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL of the snapshot JSON to poll
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Local snapshot file to poll
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Snapshot offered once at startup (plain JSON or `window.X = {...};`)
    #[arg(short, long)]
    bootstrap: Option<PathBuf>,

    /// Export the derived view to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Only adopt snapshots whose generated_at sorts after the current one
    #[arg(long)]
    strict_freshness: bool,

    /// Log file used while the dashboard is running
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Command-line flags override configuration.
    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.url {
            settings.source.url = Some(url.clone());
        }
        if let Some(file) = &self.file {
            settings.source.file = Some(file.clone());
            settings.source.url = None;
        }
        if let Some(bootstrap) = &self.bootstrap {
            settings.source.bootstrap = Some(bootstrap.clone());
        }
        if self.strict_freshness {
            settings.store.freshness = FreshnessPolicy::Monotonic;
        }
        if let Some(log_file) = &self.log_file {
            settings.log.file = log_file.clone();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    let export = args.export.clone();
    init_logging(&settings, export.is_some())?;

    let rt = Runtime::new().context("Failed to start async runtime")?;
    // Tasks are spawned onto the runtime while the TUI owns the main thread
    let _guard = rt.enter();

    let fetcher = build_fetcher(&settings)?;
    info!(source = fetcher.description(), freshness = ?settings.store.freshness, "Starting");

    if let Some(export_path) = export {
        let snapshot = rt.block_on(initial_snapshot(&settings, fetcher.as_ref()))?;
        return export_to_file(&snapshot, &export_path);
    }

    let supervisor = Supervisor::new(settings.store.freshness);

    match rt.block_on(initial_snapshot(&settings, fetcher.as_ref())) {
        Ok(snapshot) => {
            supervisor.bootstrap(snapshot);
        }
        Err(e) => warn!(error = %e, "No initial snapshot; waiting for the first poll"),
    }

    supervisor.start_poller(Arc::clone(&fetcher));
    supervisor.start_clock();

    let app = App::new(
        fetcher.description(),
        supervisor.views(),
        supervisor.clock(),
        supervisor.reports(),
        Theme::from_choice(settings.ui.theme),
    );

    let result = run_tui(app);

    rt.block_on(supervisor.shutdown());
    result
}

/// Log to stderr in export mode, otherwise to the log file.
fn init_logging(settings: &Settings, to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return Ok(());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log.file)
        .with_context(|| format!("Failed to open log file {}", settings.log.file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn build_fetcher(settings: &Settings) -> Result<Arc<dyn SnapshotFetcher>> {
    Ok(match settings.source_location() {
        SourceLocation::Http(url) => {
            let mut builder = HttpFetcher::builder().url(url);
            if let Some(timeout) = settings.request_timeout() {
                builder = builder.timeout(timeout);
            }
            Arc::new(builder.build()?)
        }
        SourceLocation::File(path) => Arc::new(FileFetcher::new(path)),
    })
}

/// The bootstrap file when configured, otherwise one fetch from the source.
async fn initial_snapshot(settings: &Settings, fetcher: &dyn SnapshotFetcher) -> Result<Snapshot> {
    match &settings.source.bootstrap {
        Some(path) => Snapshot::load(path)
            .with_context(|| format!("Failed to load bootstrap snapshot {}", path.display())),
        None => fetcher
            .fetch()
            .await
            .with_context(|| format!("Failed to fetch snapshot from {}", fetcher.description())),
    }
}

/// Run the TUI until the user quits
fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before printing a panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app);

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
        app.refresh();
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(event) = events::poll_event(FRAME_TIMEOUT)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW),
                // Redrawn on the next iteration
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}

/// Derive the view once and write it as pretty JSON
fn export_to_file(snapshot: &Snapshot, export_path: &Path) -> Result<()> {
    let view = DashboardView::derive(snapshot);
    app::write_export(&view, export_path)?;

    println!("Exported dashboard view to: {}", export_path.display());
    Ok(())
}
