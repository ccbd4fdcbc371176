//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per songsmith-server endpoint.
//! When API routes or request formats change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json(&self, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Request failed")
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    // ========================================================================
    // Home
    // ========================================================================

    pub async fn home(&self) -> Response {
        self.get("/").await
    }

    // ========================================================================
    // Generation Endpoints
    // ========================================================================

    /// POST /api/generate-theme with a numeric style value
    pub async fn generate_theme(&self, style_value: i64) -> Response {
        self.post_json("/api/generate-theme", json!({ "styleValue": style_value }))
            .await
    }

    /// POST /api/generate-theme with an arbitrary body
    pub async fn generate_theme_json(&self, body: Value) -> Response {
        self.post_json("/api/generate-theme", body).await
    }

    pub async fn generate_song(&self, theme: &str, style_value: i64) -> Response {
        self.post_json(
            "/api/generate-song",
            json!({ "theme": theme, "styleValue": style_value }),
        )
        .await
    }

    pub async fn generate_song_json(&self, body: Value) -> Response {
        self.post_json("/api/generate-song", body).await
    }

    // ========================================================================
    // Credential Endpoints
    // ========================================================================

    pub async fn check_key(&self) -> Response {
        self.get("/api/check-key").await
    }

    pub async fn set_key(&self, key: &str) -> Response {
        self.post_json("/api/set-key", json!({ "key": key })).await
    }

    // ========================================================================
    // History Endpoints
    // ========================================================================

    pub async fn get_history(&self) -> Response {
        self.get("/api/history").await
    }

    /// Fetches the history and returns it as a JSON array
    pub async fn history_entries(&self) -> Vec<Value> {
        let response = self.get_history().await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("History is not JSON");
        body.as_array().expect("History is not an array").clone()
    }

    pub async fn add_history(&self, entry: Value) -> Response {
        self.post_json("/api/history", entry).await
    }

    pub async fn delete_history_entry(&self, id: i64) -> Response {
        self.delete(&format!("/api/history/{}", id)).await
    }

    pub async fn clear_history(&self) -> Response {
        self.delete("/api/history").await
    }
}
