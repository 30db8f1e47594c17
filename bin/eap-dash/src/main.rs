//! ---
//! ems_section: "12-gui-dashboard"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Terminal dashboard and snapshot stream for simulated grid telemetry."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
mod app;
mod catalog;
mod render;
mod stream;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use eap_common::{init_tracing, AppConfig, ConsoleTarget, PanelId, VersionInfo};
use eap_metrics::{MetricsServer, SimulatorMetrics};
use eap_sim::TelemetrySimulator;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::app::{App, Tab};

const SERVICE_NAME: &str = "eap-dash";
const DEFAULT_CONFIG_PATH: &str = "configs/dashboard.toml";
const MIN_REFRESH: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(
    author,
    disable_version_flag = true,
    about = "Live grid telemetry dashboard backed by a SCADA simulator",
    propagate_version = false
)]
struct Cli {
    /// Path to the configuration file (defaults to configs/dashboard.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed the simulator for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Override the simulator tick interval in milliseconds
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,
    /// Panel to open on startup (dashboard, analytics, scada, system)
    #[arg(long)]
    tab: Option<PanelId>,

    /// Print extended version information and exit
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive terminal dashboard (default)
    Run,
    /// Print one JSON snapshot per tick to stdout
    Stream {
        /// Stop after this many snapshots; 0 streams until interrupted
        #[arg(long, default_value_t = 0)]
        ticks: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return Ok(());
    }

    let (config, source) = load_config(&cli)?;
    let console = match cli.command {
        Some(Command::Stream { .. }) => ConsoleTarget::Stderr,
        _ => ConsoleTarget::Disabled,
    };
    init_tracing(SERVICE_NAME, &config.logging, console)?;
    info!(version = %VersionInfo::current().cli_string(), "starting {}", SERVICE_NAME);
    match &source {
        Some(path) => info!(config = %path.display(), "configuration loaded"),
        None => warn!(
            inspected = DEFAULT_CONFIG_PATH,
            "no configuration file found, using defaults"
        ),
    }

    let runtime = Runtime::new().context("failed to start tokio runtime")?;
    let _guard = runtime.enter();

    let (metrics, server) = start_metrics(&config)?;
    let simulator = TelemetrySimulator::from_config(&config.simulation, metrics);
    let interval = config.simulation.tick_interval;

    let result = match cli.command {
        Some(Command::Stream { ticks }) => runtime
            .block_on(stream::run(&simulator, interval, ticks, io::stdout().lock()))
            .map(|written| info!(written, "stream finished")),
        Some(Command::Run) | None => run_dashboard(&simulator, interval, &config),
    };

    runtime.block_on(simulator.shutdown());
    if let Some(server) = server {
        runtime.block_on(server.shutdown())?;
    }
    result
}

/// Resolve the configuration file and apply command-line overrides.
///
/// A missing default file is not an error; an explicitly requested one is.
fn load_config(cli: &Cli) -> Result<(AppConfig, Option<PathBuf>)> {
    let explicit = cli.config.is_some()
        || names_config_path(std::env::var(AppConfig::ENV_CONFIG_PATH).ok().as_deref());
    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        if !path.exists() {
            bail!("config file {} not found", path.display());
        }
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from(DEFAULT_CONFIG_PATH));

    let (mut config, source) = if explicit || Path::new(DEFAULT_CONFIG_PATH).exists() {
        let loaded = AppConfig::load_with_source(&candidates)?;
        (loaded.config, Some(loaded.source))
    } else {
        (AppConfig::default(), None)
    };

    if let Some(seed) = cli.seed {
        config.simulation.random_seed = Some(seed);
    }
    if let Some(ms) = cli.interval_ms {
        config.simulation.tick_interval = Duration::from_millis(ms);
    }
    if let Some(tab) = cli.tab {
        config.dashboard.initial_tab = tab;
    }
    config.validate()?;
    Ok((config, source))
}

/// Mirrors `AppConfig::load_with_source`: a blank `EAP_CONFIG` counts as unset.
fn names_config_path(value: Option<&str>) -> bool {
    value.is_some_and(|path| !path.trim().is_empty())
}

fn start_metrics(config: &AppConfig) -> Result<(Option<SimulatorMetrics>, Option<MetricsServer>)> {
    if !config.metrics.enabled {
        return Ok((None, None));
    }
    let registry = eap_metrics::new_registry();
    let metrics = SimulatorMetrics::new(registry.clone())?;
    let server = eap_metrics::spawn_http_server(registry, config.metrics.listen)?;
    info!(listen = %server.addr(), "metrics exporter listening");
    Ok((Some(metrics), Some(server)))
}

fn run_dashboard(
    simulator: &TelemetrySimulator,
    interval: Duration,
    config: &AppConfig,
) -> Result<()> {
    simulator.start(interval)?;
    info!(interval_ms = interval.as_millis() as u64, "simulator started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, Hide)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let result = run_app(&mut terminal, simulator, config);
    cleanup_terminal(&mut terminal)?;
    simulator.stop();
    info!(ticks = simulator.ticks(), "dashboard closed");
    result
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    simulator: &TelemetrySimulator,
    config: &AppConfig,
) -> Result<()> {
    let mut updates = simulator.watch();
    let mut app = App::new(
        Tab::from(config.dashboard.initial_tab),
        updates.borrow_and_update().clone(),
    );
    let refresh = config.dashboard.refresh_interval.max(MIN_REFRESH);
    loop {
        if updates.has_changed().unwrap_or(false) {
            app.update(updates.borrow_and_update().clone());
        }
        terminal.draw(|frame| render::draw(frame, &app))?;
        if event::poll(refresh)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {
                    // redraw with new geometry
                }
                _ => {}
            }
        }
    }
    Ok(())
}
