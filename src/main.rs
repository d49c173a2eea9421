use std::fs::File;
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
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use prevenix_dashboard::{
    events, ui, App, ChannelPush, Dashboard, Framing, HttpSensorApi, LogNotifier, ModalNotifier,
    Notifier, PushChannel, SensorApi, Settings, WebSocketPush,
};

/// Inputs applied per UI tick, so a burst of push events cannot starve input.
const PUMP_BUDGET: usize = 64;

#[derive(Parser, Debug)]
#[command(name = "prevenix")]
#[command(about = "Terminal dashboard for sensor alerts and records")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the alert/record service
    #[arg(long)]
    api: Option<String>,

    /// Push channel URL
    #[arg(long)]
    push: Option<String>,

    /// Push channel framing
    #[arg(long, value_enum)]
    framing: Option<Framing>,

    /// Temperature alert threshold
    #[arg(long)]
    temperature_threshold: Option<f64>,

    /// Vibration alert threshold
    #[arg(long)]
    vibration_threshold: Option<f64>,

    /// Print notices to stdout instead of running the TUI
    #[arg(long, conflicts_with = "export")]
    headless: bool,

    /// Fetch alerts and records once, write them to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Log file used while the TUI owns the terminal
    #[arg(long, default_value = "prevenix-dashboard.log")]
    log_file: PathBuf,

    /// UI refresh interval in milliseconds
    #[arg(short, long, default_value = "100")]
    refresh: u64,
}

impl Args {
    /// Apply command-line overrides on top of loaded settings.
    fn apply(&self, settings: &mut Settings) {
        if let Some(ref api) = self.api {
            settings.api.base_url = api.clone();
        }
        if let Some(ref push) = self.push {
            settings.push.url = push.clone();
        }
        if let Some(framing) = self.framing {
            settings.push.framing = framing;
        }
        if let Some(t) = self.temperature_threshold {
            settings.thresholds.temperature = t;
        }
        if let Some(v) = self.vibration_threshold {
            settings.thresholds.vibration = v;
        }
    }

    fn is_tui(&self) -> bool {
        !self.headless && self.export.is_none()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args)?;

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    let rt = tokio::runtime::Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return rt.block_on(export_to_file(&settings, export_path));
    }

    if args.headless {
        return rt.block_on(run_headless(&settings));
    }

    // The TUI loop runs on this thread; network tasks run on the runtime.
    let _guard = rt.enter();
    run_tui(&settings, Duration::from_millis(args.refresh))
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if args.is_tui() {
        // Keep logs off the terminal while the TUI is drawing
        let file = File::create(&args.log_file)
            .with_context(|| format!("failed to create log file {}", args.log_file.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
    }
    Ok(())
}

fn sensor_api(settings: &Settings) -> Result<Arc<dyn SensorApi>> {
    let api = HttpSensorApi::new(&settings.api).context("invalid api settings")?;
    Ok(Arc::new(api))
}

/// The configured push channel, or a silent one if the endpoint is unusable.
fn push_channel(settings: &Settings) -> Box<dyn PushChannel> {
    match WebSocketPush::from_settings(&settings.push) {
        Ok(push) => Box::new(push),
        Err(e) => {
            warn!(error = %e, "push channel unavailable; continuing without live updates");
            Box::new(ChannelPush::detached(&settings.push.url))
        }
    }
}

fn build_dashboard(settings: &Settings, notifier: Box<dyn Notifier>) -> Result<Dashboard> {
    Ok(Dashboard::new(
        sensor_api(settings)?,
        push_channel(settings),
        notifier,
        settings.dashboard_options(),
    ))
}

/// Fetch once and write the dashboard state to a JSON file.
async fn export_to_file(settings: &Settings, export_path: &Path) -> Result<()> {
    let mut dashboard = Dashboard::new(
        sensor_api(settings)?,
        Box::new(ChannelPush::detached("export")),
        Box::new(LogNotifier),
        settings.dashboard_options(),
    );
    dashboard.activate();
    while dashboard.next().await {}

    for err in dashboard.failures() {
        warn!(error = err, "export contains partial data");
    }
    dashboard.snapshot().write_json(export_path)?;

    println!("Exported dashboard state to: {}", export_path.display());
    Ok(())
}

/// Run without a terminal UI, printing notices until Ctrl-C.
async fn run_headless(settings: &Settings) -> Result<()> {
    let mut dashboard = build_dashboard(settings, Box::new(LogNotifier))?;
    dashboard.activate();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            more = dashboard.next() => {
                if !more {
                    info!("push channel ended");
                    break;
                }
            }
        }
    }

    dashboard.deactivate();
    info!(
        alerts = dashboard.alerts().len(),
        records = dashboard.records().len(),
        "dashboard stopped"
    );
    Ok(())
}

/// Run the TUI. Must be called within a tokio runtime context.
fn run_tui(settings: &Settings, refresh_interval: Duration) -> Result<()> {
    let (notifier, notices) = ModalNotifier::create();
    let mut dashboard = build_dashboard(settings, Box::new(notifier))?;
    dashboard.activate();
    let mut app = App::new(dashboard, notices);

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

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.quit();
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    while app.running {
        // Pending notices hold back further events
        app.pump(PUMP_BUDGET);

        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(event) = events::poll_event(refresh_interval)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
