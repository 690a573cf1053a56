//! Prometheus Metrics Registry - Lobby Observability
//!
//! Registers and exposes Prometheus metrics on :9090. Covers the tick
//! engine (ticks, odds movement, live matches), bet placement outcomes,
//! the wallet balance and open snapshot streams.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::domain::{BetError, MarketRef, Receipt};
use crate::usecases::match_registry::{MatchSnapshot, RegistryHandle};

/// Centralized Prometheus metrics for the lobby.
///
/// All metrics follow the naming convention `lobby_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Published ticks.
    pub ticks: IntCounter,
    /// Latest snapshot version.
    pub snapshot_version: IntGauge,
    /// Matches currently in play.
    pub live_matches: IntGauge,
    /// Odds that changed value, by market kind (main / detailed).
    pub odds_updates: IntCounterVec,
    /// Accepted bets, by market kind.
    pub bets_accepted: IntCounterVec,
    /// Rejected bets, by reason.
    pub bets_rejected: IntCounterVec,
    /// Accepted stake sizes.
    pub stake_amount: Histogram,
    /// Current wallet balance.
    pub balance: Gauge,
    /// Open snapshot streams.
    pub stream_subscribers: IntGauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let ticks = IntCounter::new("lobby_ticks_total", "Total simulation ticks published")?;

        let snapshot_version =
            IntGauge::new("lobby_snapshot_version", "Version of the latest match snapshot")?;

        let live_matches = IntGauge::new("lobby_live_matches", "Matches currently in play")?;

        let odds_updates = IntCounterVec::new(
            Opts::new("lobby_odds_updates_total", "Odds whose value changed on a tick"),
            &["market"],
        )?;

        let bets_accepted = IntCounterVec::new(
            Opts::new("lobby_bets_accepted_total", "Total bets accepted"),
            &["market"],
        )?;

        let bets_rejected = IntCounterVec::new(
            Opts::new("lobby_bets_rejected_total", "Total bets rejected"),
            &["reason"],
        )?;

        let stake_amount = Histogram::with_opts(
            HistogramOpts::new("lobby_stake_amount", "Accepted stake sizes")
                .buckets(vec![1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 10000.0]),
        )?;

        let balance = Gauge::new("lobby_balance", "Current wallet balance")?;

        let stream_subscribers =
            IntGauge::new("lobby_stream_subscribers", "Open snapshot stream connections")?;

        // Register all metrics
        registry.register(Box::new(ticks.clone()))?;
        registry.register(Box::new(snapshot_version.clone()))?;
        registry.register(Box::new(live_matches.clone()))?;
        registry.register(Box::new(odds_updates.clone()))?;
        registry.register(Box::new(bets_accepted.clone()))?;
        registry.register(Box::new(bets_rejected.clone()))?;
        registry.register(Box::new(stake_amount.clone()))?;
        registry.register(Box::new(balance.clone()))?;
        registry.register(Box::new(stream_subscribers.clone()))?;

        Ok(Self {
            registry,
            ticks,
            snapshot_version,
            live_matches,
            odds_updates,
            bets_accepted,
            bets_rejected,
            stake_amount,
            balance,
            stream_subscribers,
        })
    }

    /// Account for one tick: `next` replaced `prev`.
    pub fn observe_tick(&self, prev: &MatchSnapshot, next: &MatchSnapshot) {
        self.ticks.inc();
        self.snapshot_version.set(i64::try_from(next.version).unwrap_or(i64::MAX));
        self.live_matches
            .set(next.matches.iter().filter(|m| m.is_live()).count() as i64);

        let (mut main, mut detailed) = (0_u64, 0_u64);
        for (before, after) in prev.matches.iter().zip(&next.matches) {
            main += before
                .main_odds
                .as_array()
                .into_iter()
                .zip(after.main_odds.as_array())
                .filter(|(a, b)| a.odd != b.odd)
                .count() as u64;
            detailed += before
                .markets
                .iter()
                .zip(&after.markets)
                .flat_map(|(a, b)| a.options().into_iter().zip(b.options()))
                .filter(|(a, b)| a.odd != b.odd)
                .count() as u64;
        }
        self.odds_updates.with_label_values(&["main"]).inc_by(main);
        self.odds_updates.with_label_values(&["detailed"]).inc_by(detailed);
    }

    /// Account for one bet placement attempt.
    pub fn observe_bet(&self, market: &MarketRef, outcome: &Result<Receipt, BetError>) {
        match outcome {
            Ok(receipt) => {
                let kind = match market {
                    MarketRef::Main => "main",
                    MarketRef::Detailed(_) => "detailed",
                };
                self.bets_accepted.with_label_values(&[kind]).inc();
                self.stake_amount
                    .observe(receipt.debit.to_f64().unwrap_or_default());
            }
            Err(e) => self.bets_rejected.with_label_values(&[e.kind()]).inc(),
        }
    }

    /// Record the wallet balance.
    pub fn set_balance(&self, balance: Decimal) {
        self.balance.set(balance.to_f64().unwrap_or_default());
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Follow registry publishes until shutdown, recording tick metrics.
    #[instrument(skip_all, name = "tick_metrics")]
    pub async fn watch_ticks(
        self: Arc<Self>,
        registry: RegistryHandle,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        let mut rx = registry.changes();
        let mut prev = registry.snapshot();
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let next = Arc::clone(&rx.borrow_and_update());
                    self.observe_tick(&prev, &next);
                    prev = next;
                }
            }
        }
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    metrics.render().map_err(|e| {
                        warn!(error = %e, "Failed to encode metrics");
                        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                    })
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::builtin;
    use rust_decimal_macros::dec;

    #[test]
    fn test_observe_tick_counts_changed_odds() {
        let metrics = MetricsRegistry::new().unwrap();
        let prev = MatchSnapshot {
            version: 0,
            matches: builtin::football(),
        };
        let mut matches = builtin::football();
        matches[0].main_odds.home.odd = dec!(2.81);
        let next = MatchSnapshot { version: 1, matches };

        metrics.observe_tick(&prev, &next);

        assert_eq!(metrics.ticks.get(), 1);
        assert_eq!(metrics.snapshot_version.get(), 1);
        assert_eq!(metrics.live_matches.get(), 2);
        assert_eq!(metrics.odds_updates.with_label_values(&["main"]).get(), 1);
        assert_eq!(metrics.odds_updates.with_label_values(&["detailed"]).get(), 0);
    }

    #[test]
    fn test_observe_bet_outcomes() {
        let metrics = MetricsRegistry::new().unwrap();
        let receipt = Receipt {
            label: "Home".to_string(),
            odd: dec!(2.00),
            debit: dec!(100),
            potential_return: dec!(200.00),
        };
        metrics.observe_bet(&MarketRef::Main, &Ok(receipt));
        metrics.observe_bet(
            &MarketRef::Main,
            &Err(BetError::MarketLocked {
                label: "0:0".to_string(),
            }),
        );

        assert_eq!(metrics.bets_accepted.with_label_values(&["main"]).get(), 1);
        assert_eq!(metrics.bets_rejected.with_label_values(&["market_locked"]).get(), 1);
        assert!(metrics.render().unwrap().contains("lobby_bets_accepted_total"));
    }
}
