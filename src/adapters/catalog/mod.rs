//! Catalog Adapter - Static Match Source
//!
//! Serves a fixed match list through the `MatchSource` port, either
//! the bundled football fixture or a JSON file of `Match` records.
//! A configurable delay stands in for provider latency.

pub mod builtin;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::config::CatalogConfig;
use crate::domain::{Match, SportType};
use crate::ports::match_source::MatchSource;

/// In-memory match catalog with simulated load latency.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    /// All matches across sports, in display order.
    matches: Vec<Match>,
    /// Delay applied to every fetch.
    latency: Duration,
}

impl StaticCatalog {
    /// Catalog over an explicit match list.
    pub fn new(matches: Vec<Match>, latency: Duration) -> Self {
        Self { matches, latency }
    }

    /// The bundled football catalog.
    pub fn builtin(latency: Duration) -> Self {
        Self::new(builtin::football(), latency)
    }

    /// Load a JSON array of matches from `path`.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn from_json_file(path: impl AsRef<Path>, latency: Duration) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        let matches: Vec<Match> =
            serde_json::from_str(&json).context("Failed to parse catalog JSON")?;

        info!(matches = matches.len(), "Catalog file loaded");
        Ok(Self::new(matches, latency))
    }

    /// Build the catalog described by the `[catalog]` config section.
    pub async fn from_config(config: &CatalogConfig) -> Result<Self> {
        let latency = Duration::from_millis(config.load_latency_ms);
        match &config.path {
            Some(path) => Self::from_json_file(path, latency).await,
            None => Ok(Self::builtin(latency)),
        }
    }

    /// Every match in the catalog.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }
}

#[async_trait]
impl MatchSource for StaticCatalog {
    async fn fetch_matches(&self, sport: SportType) -> Result<Vec<Match>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let matches: Vec<Match> = self
            .matches
            .iter()
            .filter(|m| m.sport == sport)
            .cloned()
            .collect();
        debug!(sport = %sport, matches = matches.len(), "Catalog fetch");
        Ok(matches)
    }
}
