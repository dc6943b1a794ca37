// # halkarzd - Halka Arz Watcher Daemon
//
// Thin integration layer. All change-detection logic lives in halkarz-core;
// this binary only:
// 1. Locates and loads the TOML configuration
// 2. Initializes logging and the runtime
// 3. Wires the HTTP page source, the sinks and the seen store into the engine
// 4. Runs the engine until SIGTERM/SIGINT
//
// ## Configuration File
//
// Resolved in order:
// - First command-line argument
// - `HALKARZ_CONFIG` environment variable
// - `config.toml` in the working directory
//
// ## Example
//
// ```toml
// scrape_url = "https://halkarz.com/"
// check_interval_secs = 300
// seen_store_path = "/var/lib/halkarz/sent_halkarz.json"
// webhook_url = "https://discord.com/api/webhooks/..."
// ```
//
// ```bash
// halkarzd /etc/halkarz/config.toml
// ```

use anyhow::{Context, Result};
use halkarz_core::traits::Notifier;
use halkarz_core::{
    ConsoleNotifier, EngineEvent, FileSeenStore, ListingExtractor, PollEngine, WatcherConfig,
};
use halkarz_http::HttpPageSource;
use halkarz_webhook::WebhookNotifier;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Environment variable naming the configuration file
const CONFIG_ENV_VAR: &str = "HALKARZ_CONFIG";

/// Configuration file used when nothing else is given
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatcherExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<WatcherExitCode> for ExitCode {
    fn from(code: WatcherExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Pick the configuration file from the CLI argument, the environment, or the default
fn resolve_config_path(arg: Option<String>, env_value: Option<String>) -> PathBuf {
    arg.or_else(|| env_value.filter(|v| !v.trim().is_empty()))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> ExitCode {
    let config_path = resolve_config_path(env::args().nth(1), env::var(CONFIG_ENV_VAR).ok());

    let config = match WatcherConfig::from_file(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{} ({})", e, config_path.display());
            return WatcherExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_log_level(&config.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return WatcherExitCode::ConfigError.into();
    }

    info!("Starting halkarzd");
    info!("Configuration loaded from {}", config_path.display());

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return WatcherExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => WatcherExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                exit_code_for(&e)
            }
        }
    })
    .into()
}

/// Startup failures reported by the core as fatal are configuration errors
fn exit_code_for(err: &anyhow::Error) -> WatcherExitCode {
    match err.downcast_ref::<halkarz_core::Error>() {
        Some(core) if core.is_fatal() => WatcherExitCode::ConfigError,
        _ => WatcherExitCode::RuntimeError,
    }
}

/// Build the configured sinks in a fixed order: console, then webhook
fn build_notifiers(config: &WatcherConfig) -> Result<Vec<Box<dyn Notifier>>> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    if config.console {
        notifiers.push(Box::new(ConsoleNotifier::new()));
    }

    if let Some(url) = &config.webhook_url {
        notifiers.push(Box::new(WebhookNotifier::new(url.clone())?));
    }

    Ok(notifiers)
}

/// Run the daemon
async fn run_daemon(config: WatcherConfig) -> Result<()> {
    let store = FileSeenStore::new(&config.seen_store_path).await?;
    let source = HttpPageSource::with_timeout(config.scrape_url.clone(), config.fetch_timeout())?;
    let extractor = ListingExtractor::new(&config.selectors, Some(&config.scrape_url))?;
    let notifiers = build_notifiers(&config)?;

    let sink_names: Vec<&str> = notifiers.iter().map(|n| n.name()).collect();
    info!("Sinks: {}", sink_names.join(", "));
    info!("Seen store: {}", store.path().display());

    let (mut engine, events) = PollEngine::new(
        Box::new(source),
        extractor,
        notifiers,
        Box::new(store),
        config.engine_settings(),
    )
    .await?;

    let monitor = tokio::spawn(log_events(events));

    let shutdown = shutdown_signal()?;
    engine.run_with_shutdown(shutdown).await?;

    let stats = engine.stats();
    info!(
        "Stopped after {} check(s): {} new listing(s), {} delivery failure(s), {} fetch failure(s)",
        stats.checks, stats.new_listings, stats.delivery_failures, stats.fetch_failures
    );

    // Closing the channel ends the monitor
    drop(engine);
    monitor.await.context("Event monitor task failed")?;

    Ok(())
}

/// Drain engine events so the channel never fills
async fn log_events(mut events: mpsc::Receiver<EngineEvent>) {
    while let Some(event) = events.recv().await {
        debug!("Engine event: {:?}", event);
    }
}

/// Register SIGTERM and SIGINT handlers and return a future that resolves on either
///
/// Handlers are installed before the engine starts so a signal that arrives
/// during the first check is not lost.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Fallback implementation for non-Unix platforms (SIGINT only)
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: SIGINT"),
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    })
}
