mod file_config;

pub use file_config::FileConfig;

use crate::credentials::{ApiKey, DeploymentMode};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Environment variables searched for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"];

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub history_file: PathBuf,
    pub frontend_dir_path: Option<String>,
    pub deployment_mode: DeploymentMode,
    pub api_base_url: String,
    pub model: String,
    pub request_timeout_sec: Option<u64>,
    /// Key found in the environment, if any.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub history_file: PathBuf,
    pub frontend_dir_path: Option<String>,
    pub deployment_mode: DeploymentMode,
    pub api_base_url: String,
    pub model: String,
    pub request_timeout_sec: Option<u64>,
    pub api_key: Option<ApiKey>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port {
            bail!(
                "Metrics port must differ from the main port (both are {})",
                port
            );
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let history_file = file
            .history_file
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.history_file.clone());
        if history_file.as_os_str().is_empty() {
            bail!("history_file must not be empty");
        }

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());
        if let Some(dir) = &frontend_dir_path {
            if !PathBuf::from(dir).is_dir() {
                bail!("Frontend directory does not exist: {:?}", dir);
            }
        }

        let deployment_mode = file.deployment_mode.unwrap_or(cli.deployment_mode);

        let api_base_url = file
            .api_base_url
            .unwrap_or_else(|| cli.api_base_url.clone());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            bail!("api_base_url must be an http(s) URL, got {:?}", api_base_url);
        }

        let model = file.model.unwrap_or_else(|| cli.model.clone());
        if model.trim().is_empty() {
            bail!("model must not be empty");
        }

        let request_timeout_sec = file.request_timeout_sec.or(cli.request_timeout_sec);
        if request_timeout_sec == Some(0) {
            bail!("request_timeout_sec must be greater than zero");
        }

        let api_key = file
            .api_key
            .and_then(ApiKey::new)
            .or_else(|| cli.api_key.clone().and_then(ApiKey::new));

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            history_file,
            frontend_dir_path,
            deployment_mode,
            api_base_url,
            model,
            request_timeout_sec,
            api_key,
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_sec.map(Duration::from_secs)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            frontend_dir_path: self.frontend_dir_path.clone(),
            deployment_mode: self.deployment_mode,
        }
    }
}

/// First non-blank value among [`API_KEY_ENV_VARS`], read through `lookup`.
pub fn api_key_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|&name| lookup(name))
        .find(|value| !value.trim().is_empty())
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
