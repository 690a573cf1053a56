//! Wager validation.
//!
//! Pure functions only: nothing here touches the balance. The caller
//! receives a `Receipt` describing the debit and applies it through the
//! balance port.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::market::{MarketOption, MarketRef};
use super::match_state::MatchId;
use super::odds::OddsModel;

/// Smallest stake accepted by default (one cent).
pub const DEFAULT_MIN_STAKE: Decimal = dec!(0.01);

/// Largest stake or deposit accepted in a single request.
pub const MAX_STAKE: Decimal = dec!(1000000000);

/// Maximum decimal places allowed in a stake.
pub const STAKE_DECIMAL_PLACES: u32 = 2;

/// Recoverable bet placement failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BetError {
    /// Stake missing, non-numeric, not positive, too precise or too small.
    #[error("invalid stake amount: {0}")]
    InvalidAmount(String),
    /// Stake exceeds the current balance.
    #[error("insufficient balance: stake {stake} exceeds balance {balance}")]
    InsufficientBalance { stake: Decimal, balance: Decimal },
    /// Option is locked and cannot be wagered on.
    #[error("market option {label:?} is locked")]
    MarketLocked { label: String },
    /// Selection does not exist in the current snapshot.
    #[error("selection {label:?} not found in match {match_id}")]
    SelectionNotFound { match_id: MatchId, label: String },
    /// Quoted odd is further from the published odd than one tick can move it.
    #[error("odds for {label:?} changed: quoted {quoted}, now {current}")]
    OddsChanged {
        label: String,
        quoted: Decimal,
        current: Decimal,
    },
}

impl BetError {
    /// Stable machine-readable code for boundaries and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::MarketLocked { .. } => "market_locked",
            Self::SelectionNotFound { .. } => "selection_not_found",
            Self::OddsChanged { .. } => "odds_changed",
        }
    }
}

/// Limits applied when validating a wager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WagerLimits {
    /// Smallest accepted stake.
    pub min_stake: Decimal,
    /// Receipts never pay out below this odd.
    pub odds_floor: Decimal,
    /// Largest accepted gap between the quoted and the published odd.
    pub max_odds_drift: Decimal,
}

impl WagerLimits {
    /// Limits matching the odds model that publishes the prices.
    pub fn for_model(min_stake: Decimal, model: &OddsModel) -> Self {
        Self {
            min_stake,
            odds_floor: model.floor,
            max_odds_drift: model.max_tick_move(),
        }
    }
}

impl Default for WagerLimits {
    fn default() -> Self {
        Self::for_model(DEFAULT_MIN_STAKE, &OddsModel::default())
    }
}

/// What the user clicked: an option reference plus the odd they saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub match_id: MatchId,
    pub market: MarketRef,
    pub label: String,
    /// Odd snapshot at the time of selection.
    pub odd: Decimal,
}

/// Validated result of a bet placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub label: String,
    pub odd: Decimal,
    /// Amount to debit from the balance.
    pub debit: Decimal,
    /// `debit × odd`, rounded to cents.
    pub potential_return: Decimal,
}

/// Wager lifecycle. Real settlement is out of scope, so accepted
/// wagers stay pending for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagerStatus {
    Pending,
}

/// An accepted wager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wager {
    pub id: Uuid,
    pub match_id: MatchId,
    pub market: MarketRef,
    pub label: String,
    pub odd: Decimal,
    pub stake: Decimal,
    pub potential_return: Decimal,
    pub status: WagerStatus,
    pub placed_at: DateTime<Utc>,
}

impl Wager {
    /// Records a pending wager from a selection and its receipt.
    pub fn pending(selection: &Selection, receipt: &Receipt) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id: selection.match_id.clone(),
            market: selection.market.clone(),
            label: receipt.label.clone(),
            odd: receipt.odd,
            stake: receipt.debit,
            potential_return: receipt.potential_return,
            status: WagerStatus::Pending,
            placed_at: Utc::now(),
        }
    }
}

/// Parses a stake as typed by the user.
///
/// Accepts plain currency input only: digits with at most one decimal
/// point and at most two fractional digits. Signs, exponents and
/// thousands separators are rejected.
pub fn parse_stake(input: Option<&str>, min_stake: Decimal) -> Result<Decimal, BetError> {
    let raw = input.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(BetError::InvalidAmount("stake is required".to_string()));
    }

    let (whole, frac) = raw.split_once('.').unwrap_or((raw, ""));
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(whole) || !digits_only(frac) || (whole.is_empty() && frac.is_empty()) {
        return Err(BetError::InvalidAmount(format!("{raw:?} is not a number")));
    }
    if frac.len() > STAKE_DECIMAL_PLACES as usize {
        return Err(BetError::InvalidAmount(format!(
            "{raw:?} has more than {STAKE_DECIMAL_PLACES} decimal places"
        )));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    };
    let stake = Decimal::from_str(&normalized)
        .map_err(|_| BetError::InvalidAmount(format!("{raw:?} is not a number")))?;

    if stake <= Decimal::ZERO {
        return Err(BetError::InvalidAmount("stake must be positive".to_string()));
    }
    if stake < min_stake {
        return Err(BetError::InvalidAmount(format!(
            "stake {stake} is below the minimum of {min_stake}"
        )));
    }
    if stake > MAX_STAKE {
        return Err(BetError::InvalidAmount(format!(
            "stake {stake} exceeds the maximum of {MAX_STAKE}"
        )));
    }

    Ok(stake)
}

/// Potential return for a stake at an odd (clamped to `floor`), rounded
/// to cents.
pub fn potential_return(stake: Decimal, odd: Decimal, floor: Decimal) -> Result<Decimal, BetError> {
    stake
        .checked_mul(odd.max(floor))
        .map(|r| r.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| BetError::InvalidAmount(format!("return on {stake} at {odd} is too large")))
}

/// Live preview shown while the user types: zero for unparsable input.
pub fn preview_return(input: &str, odd: Decimal, floor: Decimal) -> Decimal {
    parse_stake(Some(input), Decimal::ZERO)
        .and_then(|stake| potential_return(stake, odd, floor))
        .unwrap_or(Decimal::ZERO)
}

/// Validates a wager on the published `option` against the balance.
///
/// Checks, in order: lock state, quoted odd against the published one,
/// stake format/limits, balance. The odd used for the return is the
/// quoted one, clamped to the floor.
pub fn validate_wager(
    option: &MarketOption,
    quoted_odd: Decimal,
    stake_input: Option<&str>,
    balance: Decimal,
    limits: &WagerLimits,
) -> Result<Receipt, BetError> {
    if option.locked {
        return Err(BetError::MarketLocked {
            label: option.label.clone(),
        });
    }

    let drifted = quoted_odd
        .checked_sub(option.odd)
        .is_none_or(|gap| gap.abs() > limits.max_odds_drift);
    if drifted {
        return Err(BetError::OddsChanged {
            label: option.label.clone(),
            quoted: quoted_odd,
            current: option.odd,
        });
    }

    let stake = parse_stake(stake_input, limits.min_stake)?;

    if stake > balance {
        return Err(BetError::InsufficientBalance { stake, balance });
    }

    let odd = quoted_odd.max(limits.odds_floor);
    Ok(Receipt {
        label: option.label.clone(),
        odd,
        debit: stake,
        potential_return: potential_return(stake, odd, limits.odds_floor)?,
    })
}
