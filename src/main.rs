use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = execute!(io::stdout(), crossterm::cursor::Show);
    }
}

mod app;
mod config;
mod errors;
mod event_loop;
mod filter;
mod input;
mod k8s;
mod models;
mod refresh;
mod relations;
mod ui;
mod utils;
mod view;

use crate::config::Config;
use crate::errors::InitializationError;
use crate::k8s::gateway::{KubeGateway, ResourceGateway};

const DEFAULT_LOG_FILTER: &str = "kgo=info,kube=warn,hyper=warn,tower=warn,h2=warn";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    #[arg(long)]
    context: Option<String>,

    #[arg(short, long)]
    namespace: Option<String>,

    /// Seconds between automatic refreshes, 0 to disable
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// tracing filter, e.g. "kgo=debug"
    #[arg(long)]
    log_filter: Option<String>,
}

fn init_tracing(level: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(level.unwrap_or(DEFAULT_LOG_FILTER))
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
    });

    let log_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kgo");
    let _ = std::fs::create_dir_all(&log_dir);
    if let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("kgo.log"))
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Folds command-line overrides into the loaded config.
fn apply_overrides(cfg: &mut Config, args: &Args) {
    if let Some(path) = &args.kubeconfig {
        cfg.kubernetes.kubeconfig = Some(path.clone());
    }
    if let Some(ctx) = &args.context {
        cfg.kubernetes.context = Some(ctx.clone());
    }
    if let Some(ns) = &args.namespace {
        cfg.kubernetes.namespace = Some(ns.clone());
    }
    if let Some(secs) = args.refresh_secs {
        cfg.ui.auto_refresh = secs;
    }
    if let Some(filter) = &args.log_filter {
        cfg.log_level = Some(filter.clone());
    }
}

/// Namespace precedence: command line or config file, then the kubeconfig
/// context, then `default`.
fn resolve_namespace(configured: Option<&str>, from_context: Option<String>) -> String {
    configured
        .map(str::to_string)
        .filter(|ns| !ns.trim().is_empty())
        .or(from_context)
        .unwrap_or_else(|| "default".to_string())
}

async fn connect(cfg: &Config) -> Result<KubeGateway, InitializationError> {
    let client = k8s::client::create_client(&cfg.kubernetes).await?;
    let gateway = KubeGateway::new(client);
    let namespaces = gateway
        .list_namespaces()
        .await
        .map_err(InitializationError::Unreachable)?;
    info!(count = namespaces.len(), "cluster reachable");
    Ok(gateway)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut cfg, cfg_path) =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    apply_overrides(&mut cfg, &args);
    init_tracing(cfg.log_level.as_deref());
    match &cfg_path {
        Some(path) => info!(path = %path.display(), "loaded config"),
        None => info!("no config file, using defaults"),
    }

    let ctx_info = k8s::config::context_info(&cfg.kubernetes);
    let namespace = resolve_namespace(cfg.kubernetes.namespace.as_deref(), ctx_info.namespace);
    let context = ctx_info.name.unwrap_or_else(|| "in-cluster".to_string());

    eprintln!("Connecting to cluster...");
    let gateway = match connect(&cfg).await {
        Ok(gateway) => gateway,
        Err(e) => {
            error!(error = %e, "startup failed");
            return Err(e).context("Could not connect to the cluster");
        }
    };

    let options = app::AppOptions::from_config(&cfg, namespace, context)
        .context("Invalid configuration")?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = execute!(io::stdout(), crossterm::cursor::Show);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (mut app, channels) = app::App::new(gateway, options);
    let generation = app.start_refresh();
    info!(namespace = %app.namespace, generation, "initial refresh");
    event_loop::run(&mut terminal, app, channels).await?;

    Ok(())
}
