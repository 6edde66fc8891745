//! Prometheus Metrics Module
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Live WebSocket sessions
//! - Dispatch delivery outcomes per recipient
//! - Membership coordinator outcomes

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace("chat_hub"),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace("chat_hub")
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Live WebSocket sessions in the connection registry
pub static WEBSOCKET_SESSIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("websocket_sessions_active", "Number of registered WebSocket sessions")
            .namespace("chat_hub"),
    )
    .expect("Failed to create WEBSOCKET_SESSIONS_ACTIVE metric")
});

/// Per-recipient dispatch outcomes
pub static DISPATCH_DELIVERIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("dispatch_deliveries_total", "Frames handed to recipient sessions")
            .namespace("chat_hub"),
        &["outcome"], // "delivered", "backpressure", "closed"
    )
    .expect("Failed to create DISPATCH_DELIVERIES_TOTAL metric")
});

/// Membership coordinator outcomes
pub static MEMBERSHIP_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("membership_operations_total", "Chat membership operations by outcome")
            .namespace("chat_hub"),
        &["operation", "outcome"],
    )
    .expect("Failed to create MEMBERSHIP_OPERATIONS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(WEBSOCKET_SESSIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_SESSIONS_ACTIVE");
    registry
        .register(Box::new(DISPATCH_DELIVERIES_TOTAL.clone()))
        .expect("Failed to register DISPATCH_DELIVERIES_TOTAL");
    registry
        .register(Box::new(MEMBERSHIP_OPERATIONS_TOTAL.clone()))
        .expect("Failed to register MEMBERSHIP_OPERATIONS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to publish the registry size
pub fn set_websocket_sessions(count: usize) {
    Lazy::force(&REGISTRY);
    WEBSOCKET_SESSIONS_ACTIVE.set(count as i64);
}

/// Helper to count one delivery attempt
pub fn record_delivery(outcome: &str) {
    Lazy::force(&REGISTRY);
    DISPATCH_DELIVERIES_TOTAL.with_label_values(&[outcome]).inc();
}

/// Helper to count one membership operation
pub fn record_membership(operation: &str, outcome: &str) {
    Lazy::force(&REGISTRY);
    MEMBERSHIP_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}
