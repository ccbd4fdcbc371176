use axum::extract::FromRef;

use crate::credentials::Credentials;
use crate::history::HistoryStore;
use crate::songwriter::Songwriter;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedSongwriter = Arc<Songwriter>;
pub type GuardedCredentials = Arc<Credentials>;
pub type GuardedHistoryStore = Arc<dyn HistoryStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub songwriter: GuardedSongwriter,
    pub credentials: GuardedCredentials,
    pub history: GuardedHistoryStore,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        songwriter: GuardedSongwriter,
        credentials: GuardedCredentials,
        history: GuardedHistoryStore,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            songwriter,
            credentials,
            history,
        }
    }
}

impl FromRef<ServerState> for GuardedSongwriter {
    fn from_ref(input: &ServerState) -> Self {
        input.songwriter.clone()
    }
}

impl FromRef<ServerState> for GuardedCredentials {
    fn from_ref(input: &ServerState) -> Self {
        input.credentials.clone()
    }
}

impl FromRef<ServerState> for GuardedHistoryStore {
    fn from_ref(input: &ServerState) -> Self {
        input.history.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
