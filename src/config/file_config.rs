use crate::credentials::DeploymentMode;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings read from the optional TOML file. Every field overrides its CLI
/// counterpart when present.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub history_file: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub deployment_mode: Option<DeploymentMode>,

    // Upstream model
    pub api_base_url: Option<String>,
    pub model: Option<String>,
    pub request_timeout_sec: Option<u64>,
    pub api_key: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
