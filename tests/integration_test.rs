//! Integration Tests - End-to-end Lobby Component Testing
//!
//! Tests the interaction between usecases, ports, and mock adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use mockall::mock;
use mockall::predicate::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::broadcast;
use tokio_test::{assert_err, assert_ok};

use live_odds_lobby::adapters::catalog::{builtin, StaticCatalog};
use live_odds_lobby::domain::wager::WagerLimits;
use live_odds_lobby::domain::{BetError, MarketRef, Match, OddsModel, Selection, SportType};
use live_odds_lobby::usecases::{
    BetController, MatchRegistry, RegistryHandle, TickEngine, TickScheduler,
};

// ---- Mock Definitions ----

mock! {
    pub Wallet {}

    impl live_odds_lobby::ports::balance::BalanceProvider for Wallet {
        fn balance(&self) -> Decimal;
        fn apply_delta(&self, delta: Decimal) -> Result<Decimal, BetError>;
    }
}

mock! {
    pub Source {}

    #[async_trait::async_trait]
    impl live_odds_lobby::ports::match_source::MatchSource for Source {
        async fn fetch_matches(&self, sport: SportType) -> anyhow::Result<Vec<Match>>;
    }
}

fn selection(match_id: &str, market: MarketRef, label: &str, odd: Decimal) -> Selection {
    Selection {
        match_id: match_id.to_string(),
        market,
        label: label.to_string(),
        odd,
    }
}

async fn builtin_registry() -> (MatchRegistry, RegistryHandle) {
    let catalog = StaticCatalog::builtin(Duration::ZERO);
    MatchRegistry::load(&catalog).await.unwrap()
}

/// Built-in catalog with the m1 home odd moved to `odd`.
fn registry_quoting_home(odd: Decimal) -> (MatchRegistry, RegistryHandle) {
    let mut matches = builtin::football();
    matches[0].main_odds.home = matches[0].main_odds.home.with_odd(odd);
    MatchRegistry::new(matches)
}

// ---- Bet placement ----

#[tokio::test]
async fn test_successful_bet_debits_exactly_once() {
    let (_registry, handle) = registry_quoting_home(dec!(2.00));

    let mut wallet = MockWallet::new();
    wallet.expect_balance().return_const(dec!(150));
    wallet
        .expect_apply_delta()
        .with(eq(dec!(-100)))
        .times(1)
        .returning(|delta| Ok(dec!(150) + delta));

    let controller = BetController::new(handle, Arc::new(wallet));
    let receipt = assert_ok!(controller.place_bet(
        &selection("m1", MarketRef::Main, "Home", dec!(2.00)),
        Some("100"),
    ));

    assert_eq!(receipt.debit, dec!(100));
    assert_eq!(receipt.potential_return, dec!(200.00));
    assert_eq!(controller.wagers().len(), 1);
}

#[tokio::test]
async fn test_insufficient_balance_never_debits() {
    let (_registry, handle) = registry_quoting_home(dec!(2.00));

    let mut wallet = MockWallet::new();
    wallet.expect_balance().return_const(dec!(50));
    wallet.expect_apply_delta().never();

    let controller = BetController::new(handle, Arc::new(wallet));
    let err = assert_err!(controller.place_bet(
        &selection("m1", MarketRef::Main, "Home", dec!(2.00)),
        Some("100"),
    ));

    assert_eq!(
        err,
        BetError::InsufficientBalance {
            stake: dec!(100),
            balance: dec!(50)
        }
    );
    assert!(controller.wagers().is_empty());
}

#[tokio::test]
async fn test_locked_option_always_rejected() {
    let (_registry, handle) = builtin_registry().await;

    let mut wallet = MockWallet::new();
    wallet.expect_balance().return_const(dec!(1_000_000));
    wallet.expect_apply_delta().never();

    let controller = BetController::new(handle, Arc::new(wallet));
    let locked = selection(
        "m2",
        MarketRef::Detailed("correct_score".to_string()),
        "0:0",
        dec!(101.0),
    );

    for stake in [Some("1"), Some("100"), Some("abc"), None] {
        let err = assert_err!(controller.place_bet(&locked, stake));
        assert_eq!(err.kind(), "market_locked");
    }
}

#[tokio::test]
async fn test_invalid_amounts_rejected() {
    let (_registry, handle) = builtin_registry().await;

    let mut wallet = MockWallet::new();
    wallet.expect_balance().return_const(dec!(1000));
    wallet.expect_apply_delta().never();

    let limits = WagerLimits {
        min_stake: dec!(1),
        ..WagerLimits::default()
    };
    let controller = BetController::with_limits(handle, Arc::new(wallet), limits, Vec::new());
    let home = selection("m1", MarketRef::Main, "Home", dec!(2.80));

    for stake in [None, Some(""), Some("0"), Some("-10"), Some("10.001"), Some("0.50")] {
        let err = assert_err!(controller.place_bet(&home, stake));
        assert!(matches!(err, BetError::InvalidAmount(_)), "{stake:?}");
    }
}

#[tokio::test]
async fn test_deposit_credits_positive_delta() {
    let (_registry, handle) = builtin_registry().await;

    let mut wallet = MockWallet::new();
    wallet
        .expect_apply_delta()
        .with(eq(dec!(500)))
        .times(1)
        .returning(|delta| Ok(delta));

    let controller = BetController::new(handle, Arc::new(wallet));
    assert_eq!(assert_ok!(controller.deposit(Some("500"))), dec!(500));
}

#[tokio::test]
async fn test_forged_odd_never_debits() {
    let (_registry, handle) = builtin_registry().await;

    let mut wallet = MockWallet::new();
    wallet.expect_balance().return_const(dec!(1000));
    wallet.expect_apply_delta().never();

    let controller = BetController::new(handle, Arc::new(wallet));
    let err = assert_err!(controller.place_bet(
        &selection("m2", MarketRef::Main, "Home", dec!(1000000)),
        Some("100"),
    ));

    assert_eq!(
        err,
        BetError::OddsChanged {
            label: "Home".to_string(),
            quoted: dec!(1000000),
            current: dec!(1.25),
        }
    );
    assert!(controller.wagers().is_empty());
}

#[tokio::test]
async fn test_refused_debit_records_nothing() {
    let (_registry, handle) = registry_quoting_home(dec!(2.00));

    let mut wallet = MockWallet::new();
    wallet.expect_balance().return_const(dec!(150));
    wallet
        .expect_apply_delta()
        .times(1)
        .returning(|_| Err(BetError::InvalidAmount("wallet offline".to_string())));

    let controller = BetController::new(handle, Arc::new(wallet));
    assert_err!(controller.place_bet(
        &selection("m1", MarketRef::Main, "Home", dec!(2.00)),
        Some("100"),
    ));
    assert!(controller.wagers().is_empty());
}

// ---- Registry loading ----

#[tokio::test]
async fn test_registry_loads_every_sport_once() {
    let mut source = MockSource::new();
    source
        .expect_fetch_matches()
        .with(eq(SportType::Football))
        .times(1)
        .returning(|_| Ok(builtin::football()));
    source
        .expect_fetch_matches()
        .with(ne(SportType::Football))
        .times(SportType::ALL.len() - 1)
        .returning(|_| Ok(Vec::new()));

    let (_registry, handle) = assert_ok!(MatchRegistry::load(&source).await);
    assert_eq!(handle.version(), 0);
    assert_eq!(handle.list_matches(SportType::Football).len(), 3);
    assert_eq!(handle.sport_counts()[&SportType::Basketball], 0);
}

#[tokio::test]
async fn test_registry_load_propagates_source_failure() {
    let mut source = MockSource::new();
    source
        .expect_fetch_matches()
        .returning(|_| Err(anyhow::anyhow!("provider unavailable")));

    assert!(MatchRegistry::load(&source).await.is_err());
}

// ---- Tick scheduling ----

fn scheduler_over(matches: Vec<Match>) -> TickScheduler {
    let (registry, _) = MatchRegistry::new(matches);
    let engine = TickEngine::new(registry, OddsModel::default(), Some(2024));
    TickScheduler::new(engine, Duration::from_millis(1000))
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_then_unsubscribe_mutates_nothing() {
    let scheduler = scheduler_over(builtin::football());
    let before = scheduler.registry().snapshot();

    let subscription = scheduler.subscribe();
    drop(subscription);
    tokio::time::sleep(Duration::from_secs(30)).await;

    let after = scheduler.registry().snapshot();
    assert_eq!(after.version, 0);
    assert_eq!(after.matches, before.matches);
}

#[tokio::test(start_paused = true)]
async fn test_stream_advances_live_clocks_only() {
    let scheduler = scheduler_over(builtin::football());
    let snapshots: Vec<_> = scheduler.subscribe().take(60).collect().await;

    let last = snapshots.last().unwrap();
    assert_eq!(last.version, 60);
    assert_eq!(last.matches[0].clock.to_string(), "66:20");
    assert_eq!(last.matches[1].clock.to_string(), "33:10");
    assert_eq!(last.matches[2].clock.to_string(), "0:00");
    assert_eq!(last.matches[2], builtin::football()[2]);
}

#[tokio::test(start_paused = true)]
async fn test_bet_reads_latest_tick() {
    let scheduler = scheduler_over(builtin::football());
    let mut wallet = MockWallet::new();
    wallet.expect_balance().return_const(dec!(1000));
    wallet.expect_apply_delta().times(1).returning(|delta| Ok(dec!(1000) + delta));
    let controller = BetController::new(scheduler.registry().clone(), Arc::new(wallet));

    let mut ticks = scheduler.subscribe();
    let snapshot = ticks.next().await.unwrap();
    let quoted = snapshot.matches[1].main_odds.home.odd;

    let receipt = assert_ok!(controller.place_bet(
        &selection("m2", MarketRef::Main, "Home", quoted),
        Some("10"),
    ));
    assert_eq!(receipt.odd, quoted);
}

#[tokio::test(start_paused = true)]
async fn test_run_stops_on_shutdown() {
    let scheduler = scheduler_over(builtin::football());
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);

    let runner = scheduler.clone();
    let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    let version = scheduler.registry().version();
    assert_eq!(version, 5);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(scheduler.registry().version(), version);
}
