//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use super::AppConfig;

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file at the requested path; built-in defaults apply.
    Defaults(PathBuf),
}

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  parse_config(&content)
}

/// Load `path` if it exists, otherwise fall back to validated defaults.
///
/// Runs before logging is initialised, so the caller reports the source.
pub fn load_or_default(path: &str) -> Result<(AppConfig, ConfigSource)> {
  if Path::new(path).exists() {
    return Ok((load_config(path)?, ConfigSource::File(path.into())));
  }
  let config = AppConfig::default();
  validate_config(&config)?;
  Ok((config, ConfigSource::Defaults(path.into())))
}

/// Parse and validate TOML configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A non-zero tick interval
/// - Sane odds bounds (floor above 1, extreme above floor)
/// - Non-negative trend/noise magnitudes
/// - Positive stake limits with at most 2 decimal places
fn validate_config(config: &AppConfig) -> Result<()> {
  let sim = &config.simulation;

  anyhow::ensure!(
    sim.tick_interval_ms > 0,
    "tick_interval_ms must be positive"
  );
  anyhow::ensure!(
    sim.odds_floor > Decimal::ONE,
    "odds_floor must be greater than 1, got {}",
    sim.odds_floor
  );
  anyhow::ensure!(
    sim.extreme_odds > sim.odds_floor,
    "extreme_odds ({}) must exceed odds_floor ({})",
    sim.extreme_odds,
    sim.odds_floor
  );
  anyhow::ensure!(
    sim.trend_bias >= Decimal::ZERO,
    "trend_bias must be non-negative, got {}",
    sim.trend_bias
  );
  anyhow::ensure!(
    sim.noise_amplitude >= Decimal::ZERO,
    "noise_amplitude must be non-negative, got {}",
    sim.noise_amplitude
  );

  let betting = &config.betting;
  anyhow::ensure!(
    betting.min_stake > Decimal::ZERO,
    "min_stake must be positive, got {}",
    betting.min_stake
  );
  anyhow::ensure!(
    betting.min_stake.scale() <= 2,
    "min_stake must have at most 2 decimal places, got {}",
    betting.min_stake
  );
  anyhow::ensure!(
    betting.initial_balance >= Decimal::ZERO,
    "initial_balance must be non-negative"
  );
  for stake in &betting.quick_stakes {
    anyhow::ensure!(
      *stake >= betting.min_stake,
      "quick stake {} is below min_stake {}",
      stake,
      betting.min_stake
    );
  }

  anyhow::ensure!(
    !config.server.bind_address.is_empty(),
    "server bind_address must not be empty"
  );

  Ok(())
}
