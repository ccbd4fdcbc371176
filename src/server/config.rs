use super::RequestsLoggingLevel;
use crate::credentials::DeploymentMode;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    /// Directory with the single-page frontend. When unset, `/` serves a
    /// small JSON status document instead.
    pub frontend_dir_path: Option<String>,
    pub deployment_mode: DeploymentMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3000,
            metrics_port: 9091,
            frontend_dir_path: None,
            deployment_mode: DeploymentMode::SelfHosted,
        }
    }
}
