//! Health Check Server - Liveness and Readiness Probes
//!
//! Exposes /live and /ready endpoints via axum 0.7 for container
//! health checks. Readiness requires a loaded catalog and a running
//! tick engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// Shared health state polled by readiness probes.
#[derive(Debug, Clone, Default)]
pub struct HealthState {
    /// Whether the match catalog has been loaded into the registry.
    pub catalog_loaded: Arc<AtomicBool>,
    /// Whether the tick engine is running.
    pub engine_running: Arc<AtomicBool>,
}

impl HealthState {
    /// Create a new health state (not ready until both flags are set).
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the catalog as loaded.
    pub fn set_catalog_loaded(&self, loaded: bool) {
        self.catalog_loaded.store(loaded, Ordering::Relaxed);
    }

    /// Mark the tick engine as running or stopped.
    pub fn set_engine_running(&self, running: bool) {
        self.engine_running.store(running, Ordering::Relaxed);
    }

    /// Check if the lobby is ready to serve traffic.
    pub fn is_ready(&self) -> bool {
        self.catalog_loaded.load(Ordering::Relaxed) && self.engine_running.load(Ordering::Relaxed)
    }
}

/// Axum-based health check HTTP server.
pub struct HealthServer {
    /// Health state shared with all components.
    state: Arc<HealthState>,
    /// Bind port (default 8081 from config).
    port: u16,
}

impl HealthServer {
    /// Create a new health server.
    pub fn new(state: Arc<HealthState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Probe routes.
    pub fn router(state: Arc<HealthState>) -> Router {
        Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .with_state(state)
    }

    /// Serve the probes until shutdown.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = Self::router(Arc::clone(&self.state));

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(address = %addr, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness probe: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness probe: 200 only once the catalog is loaded and ticking.
    async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
        if state.is_ready() {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn status_of(state: &Arc<HealthState>, uri: &str) -> StatusCode {
        HealthServer::router(Arc::clone(state))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_routes() {
        let state = Arc::new(HealthState::new());
        assert_eq!(status_of(&state, "/live").await, StatusCode::OK);
        assert_eq!(status_of(&state, "/ready").await, StatusCode::SERVICE_UNAVAILABLE);

        state.set_catalog_loaded(true);
        state.set_engine_running(true);
        assert_eq!(status_of(&state, "/ready").await, StatusCode::OK);

        state.set_engine_running(false);
        assert_eq!(status_of(&state, "/ready").await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_ready_requires_catalog_and_engine() {
        let state = HealthState::new();
        assert!(!state.is_ready());
        state.set_catalog_loaded(true);
        assert!(!state.is_ready());
        state.set_engine_running(true);
        assert!(state.is_ready());
        state.set_engine_running(false);
        assert!(!state.is_ready());
    }
}
