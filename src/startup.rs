//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;

use crate::config::{Settings, StorageBackend};
use crate::infrastructure::database;
use crate::infrastructure::repositories::{InMemoryStore, Repositories};
use crate::presentation::http::handlers::health;
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::Gateway;
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub gateway: Arc<Gateway>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings, repos: Repositories) -> Self {
        let snowflake = Arc::new(SnowflakeGenerator::new(
            u64::from(settings.snowflake.machine_id),
            settings.snowflake.epoch,
        ));
        let gateway = Arc::new(Gateway::new(&settings.websocket));

        Self {
            repos,
            snowflake,
            gateway,
            settings: Arc::new(settings),
        }
    }
}

/// Full router with the cross-cutting layers applied.
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);

    routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(logging::create_trace_layer())
            .layer(CompressionLayer::new())
            .layer(cors),
    )
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    gateway: Arc<Gateway>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let repos = match settings.storage.backend {
            StorageBackend::Postgres => {
                let pool = database::connect(&settings.database).await?;
                Repositories::postgres(pool)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Repositories::in_memory(Arc::new(InMemoryStore::new()))
            }
        };

        let addr = settings.server_addr();
        let state = AppState::new(settings, repos);
        let gateway = state.gateway.clone();
        let router = build_router(state);

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            gateway,
        })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run_until_stopped(self) -> Result<()> {
        let gateway = self.gateway;
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let closed = gateway.shutdown();
                tracing::info!(closed, "Shutting down; WebSocket sessions closed");
            })
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
