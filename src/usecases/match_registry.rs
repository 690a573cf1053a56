//! Match Registry - Versioned Snapshot Store
//!
//! Holds the authoritative list of matches as an immutable,
//! reference-counted snapshot. The tick engine is the single writer:
//! every tick publishes a full replacement. Readers clone the `Arc`
//! and never observe a half-updated collection.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::future::try_join_all;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::domain::{Match, SportType};
use crate::ports::match_source::MatchSource;

/// One published state of every match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSnapshot {
  /// 0 after the initial load, +1 per tick.
  pub version: u64,
  /// All matches, in catalog order.
  pub matches: Vec<Match>,
}

impl MatchSnapshot {
  /// Matches of one sport, in catalog order.
  pub fn by_sport(&self, sport: SportType) -> impl Iterator<Item = &Match> {
    self.matches.iter().filter(move |m| m.sport == sport)
  }

  /// Match by id.
  pub fn find(&self, id: &str) -> Option<&Match> {
    self.matches.iter().find(|m| m.id == id)
  }
}

/// Write side of the registry. Owned by the tick engine.
pub struct MatchRegistry {
  tx: watch::Sender<Arc<MatchSnapshot>>,
}

/// Read side of the registry. Cheap to clone, shared with every consumer.
#[derive(Clone)]
pub struct RegistryHandle {
  rx: watch::Receiver<Arc<MatchSnapshot>>,
}

impl MatchRegistry {
  /// Create a registry seeded with `matches` at version 0.
  pub fn new(matches: Vec<Match>) -> (Self, RegistryHandle) {
    let (tx, rx) = watch::channel(Arc::new(MatchSnapshot {
      version: 0,
      matches,
    }));
    (Self { tx }, RegistryHandle { rx })
  }

  /// One-time population from a match source.
  ///
  /// Every sport category is fetched concurrently so the simulated
  /// latency is paid once. Matches whose sport disagrees with the
  /// requested category are dropped.
  #[instrument(skip(source))]
  pub async fn load<S>(source: &S) -> Result<(Self, RegistryHandle)>
  where
    S: MatchSource + ?Sized,
  {
    let batches = try_join_all(SportType::ALL.iter().map(|&sport| async move {
      source
        .fetch_matches(sport)
        .await
        .with_context(|| format!("Failed to fetch {sport} matches"))
        .map(|matches| (sport, matches))
    }))
    .await?;

    let mut matches = Vec::new();
    for (sport, batch) in batches {
      for m in batch {
        if m.sport != sport {
          warn!(match_id = %m.id, expected = %sport, actual = %m.sport, "Dropping miscategorised match");
          continue;
        }
        matches.push(m);
      }
    }

    info!(matches = matches.len(), "Match catalog loaded");
    Ok(Self::new(matches))
  }

  /// Latest published snapshot.
  pub fn current(&self) -> Arc<MatchSnapshot> {
    Arc::clone(&self.tx.borrow())
  }

  /// Publish a full replacement, returning its version.
  pub fn publish(&self, matches: Vec<Match>) -> u64 {
    let version = self.tx.borrow().version + 1;
    self.tx.send_replace(Arc::new(MatchSnapshot { version, matches }));
    version
  }

  /// A new read handle.
  pub fn handle(&self) -> RegistryHandle {
    RegistryHandle {
      rx: self.tx.subscribe(),
    }
  }
}

impl RegistryHandle {
  /// Latest published snapshot.
  pub fn snapshot(&self) -> Arc<MatchSnapshot> {
    Arc::clone(&self.rx.borrow())
  }

  /// Current version number.
  pub fn version(&self) -> u64 {
    self.rx.borrow().version
  }

  /// Stable, filtered copy of every match of `sport`.
  pub fn list_matches(&self, sport: SportType) -> Vec<Match> {
    self.snapshot().by_sport(sport).cloned().collect()
  }

  /// Match by id from the latest snapshot.
  pub fn get_match(&self, id: &str) -> Option<Match> {
    self.snapshot().find(id).cloned()
  }

  /// Number of matches per sport; every category is present.
  pub fn sport_counts(&self) -> BTreeMap<SportType, usize> {
    let snapshot = self.snapshot();
    let mut counts: BTreeMap<SportType, usize> =
      SportType::ALL.iter().map(|&s| (s, 0)).collect();
    for m in &snapshot.matches {
      *counts.entry(m.sport).or_default() += 1;
    }
    counts
  }

  /// A change receiver positioned at the current version.
  ///
  /// `changed()` resolves on the next publish, not on the current value.
  pub fn changes(&self) -> watch::Receiver<Arc<MatchSnapshot>> {
    let mut rx = self.rx.clone();
    rx.mark_unchanged();
    rx
  }
}
