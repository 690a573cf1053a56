//! Configuration Module - TOML-based Lobby Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Simulation constants, stake limits and bind addresses are
//! externalized here - the domain layer only sees the values.

pub mod loader;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::domain::odds::{EXTREME_ODDS, ODDS_FLOOR, OddsModel};
use crate::domain::wager::DEFAULT_MIN_STAKE;
use crate::domain::SportType;

/// Top-level lobby configuration.
///
/// Loaded from `config.toml` at startup. Every section has defaults, so
/// an empty file (or no file at all) yields a runnable lobby.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Lobby identity and logging.
  #[serde(default)]
  pub lobby: LobbyConfig,
  /// Clock/odds tick engine parameters.
  #[serde(default)]
  pub simulation: SimulationConfig,
  /// Stake limits and wallet seed.
  #[serde(default)]
  pub betting: BettingConfig,
  /// Match catalog source.
  #[serde(default)]
  pub catalog: CatalogConfig,
  /// Lobby HTTP API.
  #[serde(default)]
  pub server: ServerConfig,
  /// Metrics and health.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Lobby identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LobbyConfig {
  /// Human-readable lobby name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Sport category loaded at lobby entry.
  #[serde(default = "default_sport")]
  pub sport: SportType,
}

/// Tick engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
  /// Wall-clock interval between ticks (milliseconds).
  #[serde(default = "default_tick_interval")]
  pub tick_interval_ms: u64,
  /// Trend magnitude applied to the main three-way odds.
  #[serde(default = "default_trend_bias")]
  pub trend_bias: Decimal,
  /// Half-width of the uniform noise band.
  #[serde(default = "default_noise_amplitude")]
  pub noise_amplitude: Decimal,
  /// Lowest publishable odd.
  #[serde(default = "default_odds_floor")]
  pub odds_floor: Decimal,
  /// Odds at or above this are frozen.
  #[serde(default = "default_extreme_odds")]
  pub extreme_odds: Decimal,
  /// Minute after which a level score shortens the draw.
  #[serde(default = "default_late_game_minute")]
  pub late_game_minute: u32,
  /// Fixed RNG seed for reproducible sessions (entropy when absent).
  pub seed: Option<u64>,
}

/// Bet validation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BettingConfig {
  /// Smallest accepted stake.
  #[serde(default = "default_min_stake")]
  pub min_stake: Decimal,
  /// Preset stake buttons offered to the UI.
  #[serde(default = "default_quick_stakes")]
  pub quick_stakes: Vec<Decimal>,
  /// Balance of the in-memory wallet at session start.
  #[serde(default)]
  pub initial_balance: Decimal,
}

/// Catalog configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
  /// Optional JSON catalog file; the built-in catalog is used when absent.
  pub path: Option<String>,
  /// Simulated load latency (milliseconds).
  #[serde(default = "default_load_latency")]
  pub load_latency_ms: u64,
}

/// Lobby API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Lobby API bind address.
  #[serde(default = "default_server_addr")]
  pub bind_address: String,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl SimulationConfig {
  /// Odds model described by this section.
  pub fn odds_model(&self) -> OddsModel {
    OddsModel {
      trend_bias: self.trend_bias,
      noise_amplitude: self.noise_amplitude,
      floor: self.odds_floor,
      extreme: self.extreme_odds,
      late_game_minute: self.late_game_minute,
    }
  }

  /// Tick period.
  pub fn tick_interval(&self) -> std::time::Duration {
    std::time::Duration::from_millis(self.tick_interval_ms)
  }
}

impl Default for LobbyConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      sport: default_sport(),
    }
  }
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      tick_interval_ms: default_tick_interval(),
      trend_bias: default_trend_bias(),
      noise_amplitude: default_noise_amplitude(),
      odds_floor: default_odds_floor(),
      extreme_odds: default_extreme_odds(),
      late_game_minute: default_late_game_minute(),
      seed: None,
    }
  }
}

impl Default for BettingConfig {
  fn default() -> Self {
    Self {
      min_stake: default_min_stake(),
      quick_stakes: default_quick_stakes(),
      initial_balance: Decimal::ZERO,
    }
  }
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      path: None,
      load_latency_ms: default_load_latency(),
    }
  }
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind_address: default_server_addr(),
    }
  }
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "live-odds-lobby".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_sport() -> SportType {
  SportType::Football
}

fn default_true() -> bool {
  true
}

fn default_tick_interval() -> u64 {
  1000
}

fn default_trend_bias() -> Decimal {
  dec!(0.01)
}

fn default_noise_amplitude() -> Decimal {
  dec!(0.01)
}

fn default_odds_floor() -> Decimal {
  ODDS_FLOOR
}

fn default_extreme_odds() -> Decimal {
  EXTREME_ODDS
}

fn default_late_game_minute() -> u32 {
  70
}

fn default_min_stake() -> Decimal {
  DEFAULT_MIN_STAKE
}

fn default_quick_stakes() -> Vec<Decimal> {
  vec![dec!(100), dec!(500), dec!(1000), dec!(5000)]
}

fn default_load_latency() -> u64 {
  600
}

fn default_server_addr() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_health_port() -> u16 {
  8081
}
