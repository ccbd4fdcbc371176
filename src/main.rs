use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songsmith_server::config::{self, DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use songsmith_server::credentials::{Credentials, DeploymentMode};
use songsmith_server::history::{FileHistoryStore, HistoryStore, NoOpHistoryStore};
use songsmith_server::llm::AnthropicProvider;
use songsmith_server::server::{metrics, run_server, RequestsLoggingLevel};
use songsmith_server::songwriter::Songwriter;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3000)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// JSON file holding the song history (self-hosted mode only).
    #[clap(long, default_value = "song-history.json", value_parser = parse_path)]
    pub history_file: PathBuf,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Hosted deployments read the API key from the environment only and
    /// do not persist history.
    #[clap(long, value_enum, default_value_t = DeploymentMode::SelfHosted)]
    pub deployment_mode: DeploymentMode,

    /// Base URL of the Anthropic Messages API.
    #[clap(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Model used for every generation.
    #[clap(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Timeout in seconds for upstream generation requests. No timeout when unset.
    #[clap(long)]
    pub request_timeout_sec: Option<u64>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            history_file: args.history_file.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            deployment_mode: args.deployment_mode,
            api_base_url: args.api_base_url.clone(),
            model: args.model.clone(),
            request_timeout_sec: args.request_timeout_sec,
            api_key: config::api_key_from_env(|name| std::env::var(name).ok()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  deployment_mode: {}", app_config.deployment_mode);
    info!("  model: {}", app_config.model);
    info!("  port: {}", app_config.port);
    if app_config.api_key.is_none() {
        warn!(
            "No API key configured: {}",
            app_config.deployment_mode.missing_key_message()
        );
    }

    info!("Initializing metrics...");
    metrics::init_metrics();

    let provider = Arc::new(AnthropicProvider::new(
        app_config.api_base_url.clone(),
        app_config.model.clone(),
    ));
    let songwriter =
        Arc::new(Songwriter::new(provider).with_request_timeout(app_config.request_timeout()));
    let credentials = Arc::new(Credentials::new(
        app_config.deployment_mode,
        app_config.api_key.clone(),
    ));
    let history: Arc<dyn HistoryStore> = match app_config.deployment_mode {
        DeploymentMode::SelfHosted => {
            Arc::new(FileHistoryStore::new(app_config.history_file.clone()))
        }
        DeploymentMode::Hosted => {
            info!("Hosted mode: song history is not persisted");
            Arc::new(NoOpHistoryStore)
        }
    };

    tokio::select! {
        result = run_server(app_config.server_config(), songwriter, credentials, history) => {
            info!("HTTP server stopped: {:?}", result);
            result
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            Ok(())
        }
    }
}
