//! Lobby API route handlers.
//!
//! Handlers are thin: they parse the request, call the use case and
//! record metrics. State is shared via `Arc<ApiState>`.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::{self, Stream, StreamExt};
use prometheus::IntGauge;
use tracing::{debug, warn};

use super::error::ApiError;
use super::types::{
    BalanceResponse, BetRequest, BetResponse, DepositRequest, MatchListResponse, PreviewQuery,
    PreviewResponse, SportQuery, SportsResponse, StakesResponse,
};
use crate::adapters::metrics::MetricsRegistry;
use crate::domain::{Match, SportType, Wager};
use crate::ports::balance::BalanceProvider;
use crate::usecases::match_registry::MatchSnapshot;
use crate::usecases::{BetController, TickScheduler};

// ─────────────────────────────────────────────────────────────
// Shared state
// ─────────────────────────────────────────────────────────────

/// Shared state accessible by all route handlers.
pub struct ApiState {
    pub scheduler: TickScheduler,
    pub bets: BetController<dyn BalanceProvider>,
    /// Category served when a request names none.
    pub default_sport: SportType,
    pub metrics: Option<Arc<MetricsRegistry>>,
}

pub type AppState = Arc<ApiState>;

impl ApiState {
    fn sport(&self, query: &SportQuery) -> Result<SportType, ApiError> {
        match query.sport.as_deref() {
            None | Some("") => Ok(self.default_sport),
            Some(raw) => raw
                .parse()
                .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string())),
        }
    }

    fn record_balance(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.set_balance(self.bets.balance());
        }
    }
}

fn list_response(snapshot: &MatchSnapshot, sport: SportType) -> MatchListResponse {
    MatchListResponse {
        version: snapshot.version,
        sport,
        matches: snapshot.by_sport(sport).cloned().collect(),
    }
}

// ─────────────────────────────────────────────────────────────
// Matches
// ─────────────────────────────────────────────────────────────

pub async fn list_matches(
    State(state): State<AppState>,
    Query(query): Query<SportQuery>,
) -> Result<Json<MatchListResponse>, ApiError> {
    let sport = state.sport(&query)?;
    let snapshot = state.scheduler.registry().snapshot();
    Ok(Json(list_response(&snapshot, sport)))
}

pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Match>, ApiError> {
    state
        .scheduler
        .registry()
        .get_match(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("match {id} not found")))
}

pub async fn sports(State(state): State<AppState>) -> Json<SportsResponse> {
    Json(SportsResponse {
        sports: state.scheduler.registry().sport_counts(),
    })
}

/// Decrements the stream gauge when the SSE connection goes away.
struct StreamGauge(Option<IntGauge>);

impl StreamGauge {
    fn open(metrics: Option<&Arc<MetricsRegistry>>) -> Self {
        let gauge = metrics.map(|m| m.stream_subscribers.clone());
        if let Some(g) = &gauge {
            g.inc();
        }
        Self(gauge)
    }
}

impl Drop for StreamGauge {
    fn drop(&mut self) {
        if let Some(g) = &self.0 {
            g.dec();
        }
    }
}

/// Server-Sent Events: the current snapshot, then one per tick.
///
/// The tick subscription lives as long as the connection.
pub async fn stream_matches(
    State(state): State<AppState>,
    Query(query): Query<SportQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let sport = state.sport(&query)?;
    let current = state.scheduler.registry().snapshot();
    let ticks = state.scheduler.subscribe();
    let gauge = StreamGauge::open(state.metrics.as_ref());
    debug!(sport = %sport, "Snapshot stream opened");

    let events = stream::once(async move { current })
        .chain(ticks)
        .filter_map(move |snapshot| {
            let _open = &gauge;
            let event = Event::default()
                .event("snapshot")
                .id(snapshot.version.to_string())
                .json_data(list_response(&snapshot, sport));
            async move {
                match event {
                    Ok(event) => Some(Ok(event)),
                    Err(e) => {
                        warn!(error = %e, "Failed to encode snapshot event");
                        None
                    }
                }
            }
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

// ─────────────────────────────────────────────────────────────
// Bets and balance
// ─────────────────────────────────────────────────────────────

pub async fn place_bet(
    State(state): State<AppState>,
    Json(request): Json<BetRequest>,
) -> Result<Json<BetResponse>, ApiError> {
    let selection = request.selection();
    let outcome = state.bets.place_bet(&selection, request.stake.as_deref());
    if let Some(metrics) = &state.metrics {
        metrics.observe_bet(&selection.market, &outcome);
    }
    let receipt = outcome?;
    state.record_balance();

    Ok(Json(BetResponse {
        receipt,
        balance: state.bets.balance(),
    }))
}

pub async fn list_bets(State(state): State<AppState>) -> Json<Vec<Wager>> {
    Json(state.bets.wagers())
}

pub async fn balance(State(state): State<AppState>) -> Json<BalanceResponse> {
    Json(BalanceResponse {
        balance: state.bets.balance(),
    })
}

pub async fn deposit(
    State(state): State<AppState>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.bets.deposit(request.amount.as_deref())?;
    state.record_balance();
    Ok(Json(BalanceResponse { balance }))
}

pub async fn stakes(State(state): State<AppState>) -> Json<StakesResponse> {
    Json(StakesResponse {
        quick_stakes: state.bets.quick_stakes().to_vec(),
        min_stake: state.bets.min_stake(),
    })
}

pub async fn preview(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Json<PreviewResponse> {
    Json(PreviewResponse {
        potential_return: state.bets.preview(&query.stake, query.odd),
    })
}
