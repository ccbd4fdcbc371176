//! Request logging middleware

use super::super::state::ServerState;
use crate::server::metrics::record_http_request;
use axum::extract::State;
use axum::{
    body::Body,
    http::{header::HeaderMap, Request, Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use std::time::Instant;
use tracing::{error, info};

#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
    Body,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

const MAX_LOGGABLE_BODY_LENGTH: usize = 1024;

enum ContentLengthParseResult {
    Ok(usize),
    No(&'static str),
}

fn parse_content_length(headers: &HeaderMap) -> ContentLengthParseResult {
    let value = match headers.get("content-length") {
        Some(x) => x,
        None => return ContentLengthParseResult::No("Content-length not set."),
    };

    let str_value = match value.to_str() {
        Ok(x) => x,
        Err(_) => {
            return ContentLengthParseResult::No("Could not get Content-length string value.")
        }
    };

    match str_value.parse::<usize>() {
        Ok(x) => ContentLengthParseResult::Ok(x),
        Err(_) => ContentLengthParseResult::No("Could not parse Content-length numeric value."),
    }
}

/// Headers never printed verbatim, even at `Headers` level.
const REDACTED_HEADERS: [&str; 3] = ["x-api-key", "authorization", "cookie"];

fn log_headers(title: &str, headers: &HeaderMap) {
    info!("  {}:", title);
    for (name, value) in headers.iter() {
        if REDACTED_HEADERS.contains(&name.as_str()) {
            info!("    {:?}: <redacted>", name);
        } else {
            info!("    {:?}: {:?}", name, value);
        }
    }
}

/// Request bodies on these paths carry secrets and are never logged.
fn is_sensitive_path(path: &str) -> bool {
    path == "/api/set-key"
}

fn internal_error() -> Response<Body> {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

pub async fn log_requests(
    State(state): State<ServerState>,
    mut request: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let level = state.config.requests_logging_level.clone();

    let start = Instant::now();

    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let path = request.uri().path().to_string();

    if level > RequestsLoggingLevel::None {
        info!(">>> {} {}", method, uri);
    }

    if level >= RequestsLoggingLevel::Headers {
        log_headers("Req Headers", request.headers());
    }

    if level >= RequestsLoggingLevel::Body {
        if is_sensitive_path(&path) {
            info!("  Req Body: <redacted>");
        } else {
            match parse_content_length(request.headers()) {
                ContentLengthParseResult::No(reason) => info!("  Req Body: {}", reason),
                ContentLengthParseResult::Ok(size) => {
                    if size < MAX_LOGGABLE_BODY_LENGTH {
                        let (parts, body) = request.into_parts();
                        let bytes = match axum::body::to_bytes(body, size).await {
                            Ok(bytes) => bytes,
                            Err(err) => {
                                error!("Failed to read request body: {:?}", err);
                                return internal_error();
                            }
                        };
                        info!("  Req Body:\n{}", String::from_utf8_lossy(&bytes));
                        request = Request::from_parts(parts, Body::from(bytes))
                    } else {
                        info!(
                            "  Req Body: Too big to log ({:#})",
                            byte_unit::Byte::from(size)
                        );
                    }
                }
            }
        }
    }

    let mut response = next.run(request).await;

    if level >= RequestsLoggingLevel::Headers {
        log_headers("Resp Headers", response.headers());
    }

    if level >= RequestsLoggingLevel::Body {
        match parse_content_length(response.headers()) {
            ContentLengthParseResult::No(reason) => info!("  Resp Body: {}", reason),
            ContentLengthParseResult::Ok(size) => {
                if size < MAX_LOGGABLE_BODY_LENGTH {
                    let (parts, body) = response.into_parts();
                    let bytes = match axum::body::to_bytes(body, size).await {
                        Ok(bytes) => bytes,
                        Err(err) => {
                            error!("Failed to read response body: {:?}", err);
                            return internal_error();
                        }
                    };
                    info!("  Resp Body:\n{}", String::from_utf8_lossy(&bytes));
                    response = Response::from_parts(parts, Body::from(bytes))
                } else {
                    info!(
                        "  Resp Body: Too big to log ({:#})",
                        byte_unit::Byte::from(size)
                    );
                }
            }
        }
    }

    let status = response.status().as_u16();
    let duration = start.elapsed();

    if level > RequestsLoggingLevel::None {
        info!("<<< {} ({}ms)", status, duration.as_millis());
    }

    record_http_request(&method, &metrics_path(&path), status, duration);

    response
}

/// Fixed-path API routes, labelled as-is in metrics.
const API_PATHS: [&str; 5] = [
    "/api/generate-theme",
    "/api/generate-song",
    "/api/check-key",
    "/api/set-key",
    "/api/history",
];

/// Maps a request path onto a bounded set of metrics labels.
fn metrics_path(path: &str) -> String {
    if path == "/" || API_PATHS.contains(&path) {
        path.to_string()
    } else if path.starts_with("/api/history/") {
        "/api/history/{id}".to_string()
    } else if path.starts_with("/api/") {
        "unknown".to_string()
    } else {
        "static".to_string()
    }
}
