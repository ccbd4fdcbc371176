//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own history file and its own
//! LLM provider.

#![allow(dead_code)]

use super::constants::*;
use super::fake_llm::FakeLlmProvider;
use songsmith_server::credentials::{ApiKey, Credentials, DeploymentMode};
use songsmith_server::history::{FileHistoryStore, HistoryStore, NoOpHistoryStore};
use songsmith_server::llm::LlmProvider;
use songsmith_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use songsmith_server::songwriter::Songwriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// How a test server should be set up
pub struct TestServerOptions {
    pub deployment_mode: DeploymentMode,
    pub api_key: Option<String>,
    /// Replaces the recording fake when set (e.g. a real provider pointed at
    /// a [`super::FakeUpstream`]).
    pub provider: Option<Arc<dyn LlmProvider>>,
    pub fake_reply: String,
    pub frontend_dir_path: Option<String>,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            deployment_mode: DeploymentMode::SelfHosted,
            api_key: Some(TEST_API_KEY.to_string()),
            provider: None,
            fake_reply: FENCED_SONG_REPLY.to_string(),
            frontend_dir_path: None,
        }
    }
}

/// Test server instance with an isolated history file
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// The recording provider behind the server
    pub llm: Arc<FakeLlmProvider>,

    /// Where the self-hosted history is stored
    pub history_path: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Self-hosted server with a configured key
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// Self-hosted server without any key
    pub async fn spawn_without_key() -> Self {
        Self::spawn_with(TestServerOptions {
            api_key: None,
            ..TestServerOptions::default()
        })
        .await
    }

    /// Hosted server, optionally with a key from the "environment"
    pub async fn spawn_hosted(api_key: Option<&str>) -> Self {
        Self::spawn_with(TestServerOptions {
            deployment_mode: DeploymentMode::Hosted,
            api_key: api_key.map(|k| k.to_string()),
            ..TestServerOptions::default()
        })
        .await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound or the server doesn't become
    /// ready within [`SERVER_READY_TIMEOUT_MS`].
    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let history_path = temp_dir.path().join("song-history.json");

        let llm = Arc::new(FakeLlmProvider::new(&options.fake_reply));
        let provider: Arc<dyn LlmProvider> = match options.provider {
            Some(provider) => provider,
            None => llm.clone(),
        };

        let history: Arc<dyn HistoryStore> = match options.deployment_mode {
            DeploymentMode::SelfHosted => Arc::new(FileHistoryStore::new(history_path.clone())),
            DeploymentMode::Hosted => Arc::new(NoOpHistoryStore),
        };
        let credentials = Arc::new(Credentials::new(
            options.deployment_mode,
            options.api_key.and_then(ApiKey::new),
        ));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            metrics_port: 0,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: options.frontend_dir_path,
            deployment_mode: options.deployment_mode,
        };

        let app = make_app(
            config,
            Arc::new(Songwriter::new(provider)),
            credentials,
            history,
        )
        .expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            llm,
            history_path,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling `/api/check-key`
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client
                .get(format!("{}/api/check-key", self.base_url))
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
