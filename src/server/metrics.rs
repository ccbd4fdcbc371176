use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all Songsmith metrics
const PREFIX: &str = "songsmith";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Generation Metrics
    pub static ref GENERATION_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_generation_requests_total"), "Hook and song generation requests by outcome"),
        &["kind", "outcome"]
    ).expect("Failed to create generation_requests_total metric");

    pub static ref LLM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_llm_request_duration_seconds"),
            "Upstream completion duration in seconds"
        )
        .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
        &["kind"]
    ).expect("Failed to create llm_request_duration_seconds metric");

    pub static ref NORMALIZER_STRATEGY_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_normalizer_strategy_total"), "Song replies recovered per parse strategy"),
        &["strategy"]
    ).expect("Failed to create normalizer_strategy_total metric");

    pub static ref CREDENTIAL_PRESENT: Gauge = Gauge::new(
        format!("{PREFIX}_credential_present"),
        "1 when an API key is configured, 0 otherwise"
    ).expect("Failed to create credential_present metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(GENERATION_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(LLM_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(NORMALIZER_STRATEGY_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CREDENTIAL_PRESENT.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// `kind` is "hook" or "song"; `outcome` is "success" or an error label.
pub fn record_generation(kind: &str, outcome: &str) {
    GENERATION_REQUESTS_TOTAL
        .with_label_values(&[kind, outcome])
        .inc();
}

pub fn record_llm_request(kind: &str, duration: Duration) {
    LLM_REQUEST_DURATION_SECONDS
        .with_label_values(&[kind])
        .observe(duration.as_secs_f64());
}

pub fn record_normalizer_strategy(strategy: &str) {
    NORMALIZER_STRATEGY_TOTAL
        .with_label_values(&[strategy])
        .inc();
}

pub fn set_credential_present(present: bool) {
    CREDENTIAL_PRESENT.set(if present { 1.0 } else { 0.0 });
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
