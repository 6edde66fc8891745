//! Request Logging and Metrics

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};
use uuid::Uuid;

use crate::infrastructure::metrics;

pub type HttpTraceLayer = TraceLayer<SharedClassifier<ServerErrorsAsFailures>, fn(&Request) -> Span>;

/// Create the tracing layer for HTTP requests
pub fn create_trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(request_span as fn(&Request) -> Span)
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// One span per request, tagged with a fresh request id.
fn request_span(request: &Request) -> Span {
    tracing::info_span!(
        "http_request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        uri = %request.uri(),
    )
}

/// Record request count and latency per matched route.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    // Label by route template, not raw path, to keep cardinality bounded.
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = request.method().clone();

    let response = next.run(request).await;

    metrics::record_http_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
