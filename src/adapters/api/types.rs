//! Lobby API Request/Response Types
//!
//! JSON shapes exchanged with the lobby UI. Decimals travel as strings
//! so odds and amounts never pass through binary floating point.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Match, MarketRef, Receipt, Selection, SportType};

/// `?sport=` filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SportQuery {
  /// Sport category; the configured default when absent.
  pub sport: Option<String>,
}

/// Matches of one sport at one snapshot version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListResponse {
  pub version: u64,
  pub sport: SportType,
  pub matches: Vec<Match>,
}

/// Match count per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportsResponse {
  pub sports: BTreeMap<SportType, usize>,
}

/// Bet placement payload.
#[derive(Debug, Clone, Deserialize)]
pub struct BetRequest {
  pub match_id: String,
  /// Detailed market id; `"main"` or absent for the three-way odds.
  #[serde(default)]
  pub market: Option<String>,
  pub label: String,
  /// Odd shown to the user when the option was selected.
  pub odd: Decimal,
  /// Stake exactly as typed.
  #[serde(default)]
  pub stake: Option<String>,
}

impl BetRequest {
  /// The selection this request refers to.
  pub fn selection(&self) -> Selection {
    Selection {
      match_id: self.match_id.clone(),
      market: MarketRef::from_id(self.market.as_deref()),
      label: self.label.clone(),
      odd: self.odd,
    }
  }
}

/// Accepted bet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetResponse {
  pub receipt: Receipt,
  /// Balance after the debit.
  pub balance: Decimal,
}

/// Deposit payload.
#[derive(Debug, Clone, Deserialize)]
pub struct DepositRequest {
  #[serde(default)]
  pub amount: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
  pub balance: Decimal,
}

/// Stake presets for the confirmation panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakesResponse {
  pub quick_stakes: Vec<Decimal>,
  pub min_stake: Decimal,
}

/// `?stake=&odd=` return preview query.
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewQuery {
  #[serde(default)]
  pub stake: String,
  pub odd: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
  pub potential_return: Decimal,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
  /// Stable machine-readable code.
  pub error: String,
  pub message: String,
}
