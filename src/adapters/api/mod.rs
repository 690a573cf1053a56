//! Lobby API - Axum HTTP Delivery Adapter
//!
//! Exposes the registry, the tick stream and the bet controller to the
//! lobby UI as JSON endpoints plus a Server-Sent Events stream.

pub mod error;
pub mod routes;
pub mod types;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, instrument};

pub use error::ApiError;
pub use routes::{ApiState, AppState};

/// Build the lobby router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/matches", get(routes::list_matches))
        .route("/matches/stream", get(routes::stream_matches))
        .route("/matches/:id", get(routes::get_match))
        .route("/sports", get(routes::sports))
        .route("/bets", get(routes::list_bets).post(routes::place_bet))
        .route("/balance", get(routes::balance))
        .route("/deposit", post(routes::deposit))
        .route("/stakes", get(routes::stakes))
        .route("/preview", get(routes::preview))
        .layer(cors)
        .with_state(state)
}

/// Serve the lobby API until shutdown.
#[instrument(skip(state, shutdown_rx))]
pub async fn serve(
    state: AppState,
    bind_address: String,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Lobby API started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;

    Ok(())
}
