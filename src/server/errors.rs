use crate::credentials::{CredentialError, DeploymentMode};
use crate::songwriter::GenerationError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

const READ_ONLY_INSTRUCTIONS: &str =
    "Please add CLAUDE_API_KEY to the environment variables of your deployment";

/// Failures surfaced to HTTP callers as `{"error": ...}` JSON bodies.
#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    /// No credential configured; carries the mode specific hint.
    Unauthorized(String),
    BadRequest(String),
    /// Key update attempted on a deployment whose credential is read-only.
    ReadOnlyCredential,
    Internal(String),
    /// History mutation failed; answered with `success: false`.
    HistoryWrite(String),
}

impl ApiError {
    /// Maps a generation failure. `what` names the artifact in the 500 message.
    pub fn from_generation(err: GenerationError, mode: DeploymentMode, what: &str) -> Self {
        match err {
            GenerationError::MissingCredential => {
                ApiError::Unauthorized(mode.missing_key_message().to_string())
            }
            GenerationError::MissingTheme => ApiError::BadRequest(err.to_string()),
            GenerationError::Upstream(_) => ApiError::Internal(format!("Failed to generate {}", what)),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::ReadOnly => ApiError::ReadOnlyCredential,
            CredentialError::EmptyKey => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::ReadOnlyCredential => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": CredentialError::ReadOnly.to_string(),
                    "instructions": READ_ONLY_INSTRUCTIONS,
                })),
            )
                .into_response(),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::HistoryWrite(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": message })),
            )
                .into_response(),
        }
    }
}
