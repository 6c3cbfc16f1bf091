//! Entry kiosk daemon: runs the scan loop against a verification service.

mod metrics_server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use kiosk_capture::SnapshotFileSource;
use kiosk_terminal::{DisplaySnapshot, KioskConfig, KioskMetrics, KioskRunner, ShutdownController};
use kiosk_utils::{format_clock, init_logging, LogFormat};
use kiosk_verification::HttpVerifier;
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "kiosk-daemon", about = "Entry kiosk scan-and-verify daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "KIOSK_CONFIG")]
    config: Option<PathBuf>,

    /// Verification endpoint URL.
    #[arg(long, env = "KIOSK_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Latest camera frame (JPEG) written by the camera service.
    #[arg(long, env = "KIOSK_FRAME_PATH")]
    frame_path: Option<PathBuf>,

    /// Verification request timeout in milliseconds.
    #[arg(long, env = "KIOSK_REQUEST_TIMEOUT_MS")]
    request_timeout_ms: Option<u64>,

    /// Log format: "human" or "json".
    #[arg(long, env = "KIOSK_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "KIOSK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable Prometheus metrics endpoint.
    #[arg(long, env = "KIOSK_ENABLE_METRICS")]
    metrics: bool,

    /// Metrics endpoint port.
    #[arg(long, env = "KIOSK_METRICS_PORT")]
    metrics_port: Option<u16>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Run the kiosk until SIGINT/SIGTERM.
    Run,
    /// Print the effective configuration as TOML and exit.
    PrintConfig,
}

fn load_config(cli: &Cli) -> anyhow::Result<KioskConfig> {
    let mut config = match &cli.config {
        Some(path) => KioskConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => KioskConfig::default(),
    };

    if let Some(endpoint_url) = &cli.endpoint_url {
        config.endpoint_url = endpoint_url.clone();
    }
    if let Some(frame_path) = &cli.frame_path {
        config.frame_path = frame_path.clone();
    }
    if let Some(timeout) = cli.request_timeout_ms {
        config.request_timeout_ms = timeout;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.enable_metrics |= cli.metrics;
    if let Some(port) = cli.metrics_port {
        config.metrics_port = port;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::PrintConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Command::Run => run(config).await,
    }
}

async fn run(config: KioskConfig) -> anyhow::Result<()> {
    init_logging(config.log_format, &config.log_level);

    let verifier = HttpVerifier::with_timeouts(
        &config.endpoint_url,
        config.request_timeout(),
        config.connect_timeout(),
    )?;
    let capture = SnapshotFileSource::new(&config.frame_path, config.max_frame_age());
    let metrics = if config.enable_metrics {
        Some(Arc::new(KioskMetrics::new()?))
    } else {
        None
    };

    let shutdown = Arc::new(ShutdownController::new());
    let (runner, display) = KioskRunner::new(capture, verifier, config.timings, metrics.clone())?;
    let runner_shutdown = shutdown.subscribe();

    let metrics_port = if config.enable_metrics {
        config.metrics_port.to_string()
    } else {
        "off".into()
    };
    tracing::info!(
        endpoint = %config.endpoint_url,
        frame = %config.frame_path.display(),
        metrics = %metrics_port,
        "starting entry kiosk"
    );

    if let Some(metrics) = metrics {
        let port = config.metrics_port;
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = metrics_server::serve(metrics, port, server_shutdown).await {
                tracing::error!(error = %e, "metrics server stopped");
            }
        });
    }

    tokio::spawn(render_display(display));

    let signals = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if let Err(e) = signals.wait_for_signal().await {
            tracing::error!(error = %e, "signal handler failed, shutting down");
            signals.shutdown();
        }
    });

    let session = runner.run(runner_shutdown).await;
    tracing::info!(
        attempts = session.attempts_started(),
        abandoned = ?session.current_attempt(),
        "entry kiosk exited cleanly"
    );
    Ok(())
}

/// Log what the screen shows. The panel is logged on change, the clock on every tick.
async fn render_display(mut display: watch::Receiver<DisplaySnapshot>) {
    let mut shown = display.borrow_and_update().clone();
    tracing::info!(lines = ?shown.status_lines(), "display");

    while display.changed().await.is_ok() {
        let snapshot = display.borrow_and_update().clone();
        if snapshot.panel_differs(&shown) {
            tracing::info!(
                phase = ?snapshot.phase,
                overlay = snapshot.scan_overlay,
                lines = ?snapshot.status_lines(),
                "display"
            );
        }
        if snapshot.clock_ticks != shown.clock_ticks {
            tracing::trace!(clock = %format_clock(&chrono::Local::now()), "clock");
        }
        shown = snapshot;
    }
}
