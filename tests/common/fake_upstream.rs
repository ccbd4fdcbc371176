//! Fake Anthropic Messages API served over HTTP
//!
//! Lets tests run the real `AnthropicProvider` against a local socket.

#![allow(dead_code)]

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct UpstreamState {
    status: StatusCode,
    reply_text: String,
    requests: Arc<Mutex<Vec<UpstreamRequest>>>,
}

pub struct FakeUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<UpstreamRequest>>>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

async fn messages(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };
    state.requests.lock().unwrap().push(UpstreamRequest {
        api_key: header("x-api-key"),
        api_version: header("anthropic-version"),
        body,
    });

    if !state.status.is_success() {
        return (
            state.status,
            Json(json!({"type": "error", "error": {"type": "api_error", "message": "nope"}})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": state.reply_text}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 34}
        })),
    )
}

impl FakeUpstream {
    /// Answers every request with `reply_text` as the single text block.
    pub async fn spawn(reply_text: &str) -> Self {
        Self::spawn_with_status(StatusCode::OK, reply_text).await
    }

    pub async fn spawn_with_status(status: StatusCode, reply_text: &str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = UpstreamState {
            status,
            reply_text: reply_text.to_string(),
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/v1/messages", post(messages))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake upstream");
        let port = listener.local_addr().unwrap().port();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake upstream failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            requests,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
