//! Live Odds Lobby — Entry Point
//!
//! Initializes configuration and logging, loads the match catalog,
//! and runs the tick engine and lobby API until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate (defaults when absent)
//! 2. Init tracing (JSON structured logging)
//! 3. Load the catalog into the match registry
//! 4. Create the tick engine + scheduler and the bet controller
//! 5. Spawn health, metrics and lobby API servers
//! 6. Run the tick scheduler for the process lifetime
//! 7. Wait for SIGINT → broadcast shutdown → stop ticking → exit

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use live_odds_lobby::adapters::api::{self, ApiState};
use live_odds_lobby::adapters::catalog::StaticCatalog;
use live_odds_lobby::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use live_odds_lobby::adapters::wallet::InMemoryWallet;
use live_odds_lobby::config;
use live_odds_lobby::config::loader::ConfigSource;
use live_odds_lobby::domain::wager::WagerLimits;
use live_odds_lobby::ports::balance::BalanceProvider;
use live_odds_lobby::usecases::{BetController, MatchRegistry, TickEngine, TickScheduler};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let (config, source) = config::loader::load_or_default("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.lobby.log_level)),
        )
        .json()
        .init();

    match &source {
        ConfigSource::File(path) => info!(
            path = %path.display(),
            sport = %config.lobby.sport,
            min_stake = %config.betting.min_stake,
            "Configuration loaded successfully"
        ),
        ConfigSource::Defaults(path) => {
            warn!(path = %path.display(), "Config file not found, using defaults");
        }
    }

    info!(
        name = %config.lobby.name,
        version = env!("CARGO_PKG_VERSION"),
        sport = %config.lobby.sport,
        tick_ms = config.simulation.tick_interval_ms,
        "Starting live odds lobby"
    );

    // ── 3. Shutdown signal + health state ───────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let health = Arc::new(HealthState::new());

    // ── 4. Load the catalog into the registry ───────────────
    let catalog = StaticCatalog::from_config(&config.catalog)
        .await
        .context("Failed to open match catalog")?;
    let (registry, handle) = MatchRegistry::load(&catalog)
        .await
        .context("Failed to load match catalog")?;
    health.set_catalog_loaded(true);

    // ── 5. Tick engine, scheduler and bet controller ────────
    let model = config.simulation.odds_model();
    let limits = WagerLimits::for_model(config.betting.min_stake, &model);
    let engine = TickEngine::new(
        registry,
        model,
        config.simulation.seed,
    );
    let scheduler = TickScheduler::new(engine, config.simulation.tick_interval());

    let wallet: Arc<dyn BalanceProvider> =
        Arc::new(InMemoryWallet::new(config.betting.initial_balance));
    let bets = BetController::with_limits(
        handle.clone(),
        wallet,
        limits,
        config.betting.quick_stakes.clone(),
    );

    // ── 6. Metrics ──────────────────────────────────────────
    let metrics = if config.metrics.enabled {
        let metrics = Arc::new(MetricsRegistry::new().context("Failed to create metrics")?);
        metrics.set_balance(config.betting.initial_balance);
        Some(metrics)
    } else {
        None
    };

    let mut tasks = Vec::new();

    if let Some(metrics) = &metrics {
        tasks.push(tokio::spawn(Arc::clone(metrics).watch_ticks(
            handle.clone(),
            shutdown_tx.subscribe(),
        )));

        let server = Arc::clone(metrics);
        let bind = config.metrics.bind_address.clone();
        let rx = shutdown_tx.subscribe();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = server.serve(bind, rx).await {
                error!(error = %e, "Metrics server failed");
            }
        }));
    }

    // ── 7. Health server ────────────────────────────────────
    let health_server = HealthServer::new(Arc::clone(&health), config.metrics.health_port);
    let rx = shutdown_tx.subscribe();
    tasks.push(tokio::spawn(async move {
        if let Err(e) = health_server.run(rx).await {
            error!(error = %e, "Health server failed");
        }
    }));

    // ── 8. Lobby API ────────────────────────────────────────
    let state = Arc::new(ApiState {
        scheduler: scheduler.clone(),
        bets,
        default_sport: config.lobby.sport,
        metrics,
    });
    let bind = config.server.bind_address.clone();
    let rx = shutdown_tx.subscribe();
    tasks.push(tokio::spawn(async move {
        if let Err(e) = api::serve(state, bind, rx).await {
            error!(error = %e, "Lobby API failed");
        }
    }));

    // ── 9. Tick for the process lifetime ────────────────────
    let ticker = scheduler.clone();
    let rx = shutdown_tx.subscribe();
    let tick_handle = tokio::spawn(async move { ticker.run(rx).await });
    health.set_engine_running(true);

    info!(
        matches = handle.snapshot().matches.len(),
        "All tasks spawned, lobby is running"
    );

    // ── 10. Wait for SIGINT ─────────────────────────────────
    signal::ctrl_c()
        .await
        .context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");

    // ── Graceful shutdown ───────────────────────────────────
    health.set_engine_running(false);
    let _ = shutdown_tx.send(());
    info!("Shutdown signal broadcast to all tasks");

    let _ = tokio::time::timeout(Duration::from_secs(5), tick_handle).await;
    for task in tasks {
        let _ = tokio::time::timeout(Duration::from_secs(5), task).await;
    }

    info!(
        version = handle.version(),
        running = scheduler.is_running(),
        "Shutdown complete"
    );
    Ok(())
}
