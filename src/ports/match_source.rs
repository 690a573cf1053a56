//! Match Source Port - Catalog Loading Interface
//!
//! Defines the trait for fetching the initial match list of a sport
//! category. The tick engine takes ownership of the returned matches;
//! the source is never consulted again for live state.

use async_trait::async_trait;

use crate::domain::{Match, SportType};

/// Trait for match catalog providers.
///
/// Implementors may read a bundled fixture, a file, or a remote feed.
/// Loading is asynchronous because real providers have latency; the
/// lobby shows a loading state until the future resolves.
#[async_trait]
pub trait MatchSource: Send + Sync + 'static {
  /// Fetch every match in `sport`, in display order.
  ///
  /// An empty list is a valid answer (the category has no events).
  async fn fetch_matches(&self, sport: SportType) -> anyhow::Result<Vec<Match>>;
}
