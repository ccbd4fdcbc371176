//! Upstream API credential handling.
//!
//! The credential is an explicit value owned by the server state and handed
//! to each generation call as a snapshot. Whether it can be replaced at
//! runtime depends on the [`DeploymentMode`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::info;

/// Where the server is deployed.
///
/// Self-hosted instances keep history on disk and accept key updates from the
/// UI. Hosted instances treat the environment as the only source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentMode {
    #[default]
    SelfHosted,
    Hosted,
}

impl DeploymentMode {
    pub fn is_hosted(&self) -> bool {
        matches!(self, DeploymentMode::Hosted)
    }

    /// Message shown to the caller when a generation is attempted without a key.
    pub fn missing_key_message(&self) -> &'static str {
        match self {
            DeploymentMode::SelfHosted => "API key not set. Please add your key in Settings.",
            DeploymentMode::Hosted => {
                "API key not found. Please set CLAUDE_API_KEY in the deployment environment variables."
            }
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::SelfHosted => write!(f, "self-hosted"),
            DeploymentMode::Hosted => write!(f, "hosted"),
        }
    }
}

/// Opaque API key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank input.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***{} chars)", self.0.len())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("API keys must be set as environment variables in hosted mode")]
    ReadOnly,

    #[error("No API key provided")]
    EmptyKey,
}

/// The process' view of the upstream credential.
pub struct Credentials {
    mode: DeploymentMode,
    key: RwLock<Option<ApiKey>>,
}

impl Credentials {
    pub fn new(mode: DeploymentMode, key: Option<ApiKey>) -> Self {
        Self {
            mode,
            key: RwLock::new(key),
        }
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    /// Snapshot of the current key for a single request.
    pub fn current(&self) -> Option<ApiKey> {
        self.key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_key(&self) -> bool {
        self.current().is_some()
    }

    /// Replaces the key. Only self-hosted deployments may do this.
    pub fn update(&self, raw_key: &str) -> Result<(), CredentialError> {
        if self.mode.is_hosted() {
            return Err(CredentialError::ReadOnly);
        }
        let key = ApiKey::new(raw_key).ok_or(CredentialError::EmptyKey)?;
        // The slot only ever holds a complete value, so a poisoned lock is safe to reuse.
        *self.key.write().unwrap_or_else(PoisonError::into_inner) = Some(key);
        info!("API key updated at runtime");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_are_rejected() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
        assert_eq!(ApiKey::new(" sk-1 ").unwrap().expose(), "sk-1");
    }

    #[test]
    fn debug_output_hides_the_key() {
        let key = ApiKey::new("sk-secret-value").unwrap();
        let printed = format!("{:?}", key);
        assert!(!printed.contains("secret"));
    }

    #[test]
    fn self_hosted_credentials_can_be_updated() {
        let credentials = Credentials::new(DeploymentMode::SelfHosted, None);
        assert!(!credentials.has_key());

        credentials.update("sk-new").unwrap();
        assert_eq!(credentials.current().unwrap().expose(), "sk-new");

        assert_eq!(credentials.update("  "), Err(CredentialError::EmptyKey));
        assert_eq!(credentials.current().unwrap().expose(), "sk-new");
    }

    #[test]
    fn update_survives_a_poisoned_lock() {
        let credentials = std::sync::Arc::new(Credentials::new(
            DeploymentMode::SelfHosted,
            ApiKey::new("sk-old"),
        ));
        let poisoner = credentials.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.key.write().unwrap();
            panic!("poison the key lock");
        })
        .join();
        assert!(credentials.key.is_poisoned());

        credentials.update("sk-new").unwrap();
        assert_eq!(credentials.current().unwrap().expose(), "sk-new");
    }

    #[test]
    fn hosted_credentials_are_read_only() {
        let credentials = Credentials::new(DeploymentMode::Hosted, ApiKey::new("sk-env"));
        assert_eq!(credentials.update("sk-other"), Err(CredentialError::ReadOnly));
        assert_eq!(credentials.current().unwrap().expose(), "sk-env");
    }

    #[test]
    fn missing_key_message_depends_on_mode() {
        assert!(DeploymentMode::SelfHosted
            .missing_key_message()
            .contains("Settings"));
        assert!(DeploymentMode::Hosted
            .missing_key_message()
            .contains("CLAUDE_API_KEY"));
    }
}
