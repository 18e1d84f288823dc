use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use snapsolve_answer::GeminiClient;
use snapsolve_capture::{XcapCapture, parse_shortcut};
use snapsolve_config::Config;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub mod console;
pub mod controller;
pub mod events;
pub mod io;
pub mod pipeline;
pub mod state;
pub mod status;

use self::console::Console;
use self::controller::AppController;
use self::pipeline::Pipeline;
use self::state::AppState;

/// Screenshot the active window on a hotkey and print the model's answer
#[derive(Parser, Debug)]
#[command(name = "snapsolve", version)]
struct Cli {
    /// Load variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Override SHORTCUT, e.g. "ctrl+shift+y"
    #[arg(long)]
    hotkey: Option<String>,

    /// Override MODEL
    #[arg(long)]
    model: Option<String>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Disable colored answers
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(hotkey) = &self.hotkey {
            config.hotkey.shortcut = hotkey.clone();
        }
        if let Some(model) = &self.model {
            config.service.model = model.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);
    load_env(cli.env_file.as_deref())?;

    let mut config = Config::from_env()?;
    cli.apply(&mut config);
    tracing::debug!("Loaded config: {:?}", config);

    parse_shortcut(&config.hotkey.shortcut)
        .with_context(|| format!("Invalid SHORTCUT {:?}", config.hotkey.shortcut))?;

    let answer = GeminiClient::new(config.api_key.clone(), &config.service)
        .context("Failed to create answer service client")?;
    let pipeline = Pipeline::new(Arc::new(XcapCapture), Arc::new(answer), &config.capture);

    let mut console = Console::stdout(cli.no_color);
    console.banner(std::env::consts::OS, &config.hotkey.shortcut, pipeline.model());

    let state = Arc::new(AppState::new(config));

    // Shutdown future (Ctrl+C)
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    run(state, pipeline, console, shutdown).await
}

pub async fn run(
    state: Arc<AppState>,
    pipeline: Pipeline,
    console: Console<std::io::Stdout>,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let controller = AppController::new(state.clone());
    let mut tasks = controller.spawn_tasks(pipeline, console).await?;

    tokio::select! {
        _ = shutdown => {
            tracing::info!("Shutdown requested");
            println!("\nTerminated by user.");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::warn!("task exited"),
                Ok(Err(e)) => tracing::error!("task failed: {e:#}"),
                Err(e) => tracing::error!("task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    tasks.shutdown().await;

    let status = state.status.read().await;
    tracing::info!(
        "Session ended: {} cycles, {} answered, {} failed, {} timed out, {} rejected",
        status.cycles,
        status.answered,
        status.failed,
        status.timed_out,
        status.rejected
    );
    Ok(())
}

/// Filter used when `RUST_LOG` is unset
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Load `.env` style variables; a missing default file is fine
fn load_env(env_file: Option<&Path>) -> anyhow::Result<()> {
    match env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::debug!("Loaded environment from {}", path.display());
        }
        None => match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => tracing::debug!("No .env file found"),
            Err(e) => tracing::warn!("Failed to load .env: {}", e),
        },
    }
    Ok(())
}
