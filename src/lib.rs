//! Songsmith Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod credentials;
pub mod history;
pub mod llm;
pub mod server;
pub mod songwriter;

// Re-export commonly used types for convenience
pub use credentials::{ApiKey, Credentials, DeploymentMode};
pub use history::{FileHistoryStore, HistoryStore, NoOpHistoryStore};
pub use server::{run_server, RequestsLoggingLevel};
pub use songwriter::{GenerationRequest, SongRecord, Songwriter};
