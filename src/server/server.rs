use anyhow::{Context, Result};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::credentials::DeploymentMode;
use crate::songwriter::{GenerationRequest, HistoryEntry, HookIngredients, HookRequest};
use tower_http::{cors::CorsLayer, services::ServeDir};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{
    log_requests,
    metrics::{self, metrics_handler},
    state::*,
    ApiError, ServerConfig,
};

const HOSTED_HISTORY_MESSAGE: &str = "History not persisted in hosted mode";
const HOSTED_KEY_HINT: &str = "Please set CLAUDE_API_KEY in the deployment environment variables";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
    pub mode: DeploymentMode,
    pub model: String,
    pub has_key: bool,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Serialize)]
struct ThemeResponse {
    theme: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckKeyResponse {
    has_key: bool,
    hosted: bool,
    message: Option<&'static str>,
}

#[derive(Deserialize, Debug, Default)]
struct SetKeyBody {
    #[serde(default)]
    pub key: String,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
        mode: state.config.deployment_mode,
        model: state.songwriter.model().to_string(),
        has_key: state.credentials.has_key(),
    };
    Json(stats)
}

/// Undecodable bodies are treated as empty, so the credential and theme
/// checks still decide the response.
fn body_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            debug!("Treating undecodable body as empty: {}", rejection.body_text());
            T::default()
        }
    }
}

async fn generate_theme(
    State(state): State<ServerState>,
    body: Result<Json<HookRequest>, JsonRejection>,
) -> Result<Json<ThemeResponse>, ApiError> {
    let body = body_or_default(body);
    // ThreadRng is not Send, so it must not live across the await below.
    let ingredients = {
        let mut rng = rand::rng();
        HookIngredients::draw(&mut rng)
    };
    let api_key = state.credentials.current();

    let theme = state
        .songwriter
        .generate_hook(api_key.as_ref(), body.style_level, &ingredients)
        .await
        .map_err(|e| ApiError::from_generation(e, state.config.deployment_mode, "theme"))?;

    Ok(Json(ThemeResponse { theme }))
}

async fn generate_song(
    State(state): State<ServerState>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Response {
    let request = body_or_default(body);
    let api_key = state.credentials.current();

    match state
        .songwriter
        .generate_song(api_key.as_ref(), &request)
        .await
    {
        Ok(song) => Json(song).into_response(),
        Err(e) => ApiError::from_generation(e, state.config.deployment_mode, "song").into_response(),
    }
}

async fn check_key(State(credentials): State<GuardedCredentials>) -> impl IntoResponse {
    let has_key = credentials.has_key();
    let hosted = credentials.mode().is_hosted();
    Json(CheckKeyResponse {
        has_key,
        hosted,
        message: if hosted && !has_key {
            Some(HOSTED_KEY_HINT)
        } else {
            None
        },
    })
}

async fn set_key(
    State(credentials): State<GuardedCredentials>,
    body: Result<Json<SetKeyBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body_or_default(body);
    credentials.update(&body.key).inspect_err(|e| {
        warn!("Rejected API key update: {}", e);
    })?;
    metrics::set_credential_present(true);
    Ok(Json(json!({ "success": true })))
}

async fn get_history(State(history): State<GuardedHistoryStore>) -> impl IntoResponse {
    Json(history.list())
}

fn history_mutation_response(
    history: &GuardedHistoryStore,
    result: Result<()>,
    failure: &str,
) -> Result<Json<serde_json::Value>, ApiError> {
    match result {
        Ok(()) if history.is_persistent() => Ok(Json(json!({ "success": true }))),
        Ok(()) => Ok(Json(
            json!({ "success": true, "message": HOSTED_HISTORY_MESSAGE }),
        )),
        Err(e) => {
            debug!("{}: {:#}", failure, e);
            Err(ApiError::HistoryWrite(failure.to_string()))
        }
    }
}

/// Fills in `id` and `date` when the client left them out.
fn stamp_entry(mut entry: HistoryEntry, now: chrono::DateTime<chrono::Utc>) -> HistoryEntry {
    if entry.id == 0 {
        entry.id = now.timestamp_millis();
    }
    if entry.date.trim().is_empty() {
        entry.date = now.to_rfc3339();
    }
    entry
}

async fn add_history(
    State(history): State<GuardedHistoryStore>,
    body: Result<Json<HistoryEntry>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(entry) = body?;
    let entry = stamp_entry(entry, chrono::Utc::now());
    let result = history.append(entry);
    history_mutation_response(&history, result, "Failed to save history")
}

async fn delete_history_entry(
    State(history): State<GuardedHistoryStore>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = history.delete(id);
    history_mutation_response(&history, result, "Failed to delete from history")
}

async fn clear_history(
    State(history): State<GuardedHistoryStore>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = history.clear();
    history_mutation_response(&history, result, "Failed to clear history")
}

pub fn make_app(
    config: ServerConfig,
    songwriter: GuardedSongwriter,
    credentials: GuardedCredentials,
    history: GuardedHistoryStore,
) -> Result<Router> {
    if credentials.mode() != config.deployment_mode {
        anyhow::bail!(
            "Credentials are configured for {} mode but the server runs in {} mode",
            credentials.mode(),
            config.deployment_mode
        );
    }
    metrics::set_credential_present(credentials.has_key());
    let state = ServerState::new(config.clone(), songwriter, credentials, history);

    let api_routes: Router = Router::new()
        .route("/generate-theme", post(generate_theme))
        .route("/generate-song", post(generate_song))
        .route("/check-key", get(check_key))
        .route("/set-key", post(set_key))
        .route(
            "/history",
            get(get_history).post(add_history).delete(clear_history),
        )
        .route("/history/{id}", delete(delete_history_entry))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(
    config: ServerConfig,
    songwriter: GuardedSongwriter,
    credentials: GuardedCredentials,
    history: GuardedHistoryStore,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, songwriter, credentials, history)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    tokio::try_join!(
        async { axum::serve(listener, app).await },
        async { axum::serve(metrics_listener, make_metrics_app()).await },
    )?;
    Ok(())
}
