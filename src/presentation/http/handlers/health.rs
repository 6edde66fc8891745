//! Health Check Handlers
//!
//! Liveness and readiness probes.
//!
//! # Endpoints
//! - `GET /health` - Basic health check
//! - `GET /health/live` - Liveness probe (is the server running?)
//! - `GET /health/ready` - Readiness probe (can the server accept traffic?)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::time::Instant;

use crate::startup::AppState;

/// Server start time for uptime calculation
static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);
static SERVER_START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Initialize the server start time (call during startup)
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
    Lazy::force(&SERVER_START_TIME);
}

/// Basic health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed health check response
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub storage: ServiceHealth,
    pub websocket: WebSocketHealth,
}

#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WebSocketHealth {
    pub status: HealthStatus,
    pub active_connections: usize,
}

/// Overall health status
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// Readiness probe. Returns 503 when storage is unreachable or the gateway
/// is shutting down.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let storage = check_storage(&state).await;
    let websocket = WebSocketHealth {
        status: if state.gateway.registry().is_shutting_down() {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        },
        active_connections: state.gateway.session_count(),
    };

    let overall = determine_overall_status(&storage, &websocket);
    let response = DetailedHealthResponse {
        status: overall,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: SERVER_START.elapsed().as_secs(),
        started_at: SERVER_START_TIME.to_rfc3339(),
        checks: HealthChecks { storage, websocket },
    };

    let status_code = match overall {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn check_storage(state: &AppState) -> ServiceHealth {
    let start = Instant::now();
    match state.repos.users.ping().await {
        Ok(()) => {
            let latency = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            ServiceHealth {
                status: if latency < 100 {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Degraded
                },
                latency_ms: Some(latency),
                message: None,
            }
        }
        Err(e) => ServiceHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some(format!("Storage unavailable: {}", e)),
        },
    }
}

fn determine_overall_status(storage: &ServiceHealth, websocket: &WebSocketHealth) -> HealthStatus {
    if storage.status == HealthStatus::Unhealthy || websocket.status == HealthStatus::Unhealthy {
        return HealthStatus::Unhealthy;
    }
    if storage.status == HealthStatus::Degraded {
        return HealthStatus::Degraded;
    }
    HealthStatus::Healthy
}
