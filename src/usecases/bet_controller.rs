//! Bet Controller - Wager Placement and Balance Settlement
//!
//! Resolves a selection against the latest registry snapshot, runs the
//! pure validation in `domain::wager`, then requests exactly one balance
//! delta per accepted wager and records it as pending.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::domain::wager::{self, WagerLimits, DEFAULT_MIN_STAKE};
use crate::domain::{BetError, Receipt, Selection, Wager};
use crate::ports::balance::BalanceProvider;

use super::match_registry::RegistryHandle;

/// Validates and commits wagers against a balance provider.
pub struct BetController<B: BalanceProvider + ?Sized> {
  registry: RegistryHandle,
  wallet: Arc<B>,
  /// Stake bounds, payout floor and accepted odds drift.
  limits: WagerLimits,
  /// Preset stakes offered by the UI.
  quick_stakes: Vec<Decimal>,
  /// Accepted wagers. Also serialises read-validate-debit sequences.
  ledger: Mutex<Vec<Wager>>,
}

impl<B: BalanceProvider + ?Sized> BetController<B> {
  /// Create a controller with default limits and no presets.
  pub fn new(registry: RegistryHandle, wallet: Arc<B>) -> Self {
    Self::with_limits(registry, wallet, WagerLimits::default(), Vec::new())
  }

  /// Create a controller with explicit limits.
  pub fn with_limits(
    registry: RegistryHandle,
    wallet: Arc<B>,
    limits: WagerLimits,
    quick_stakes: Vec<Decimal>,
  ) -> Self {
    Self {
      registry,
      wallet,
      limits,
      quick_stakes,
      ledger: Mutex::new(Vec::new()),
    }
  }

  /// Place a wager on `selection` with the stake as typed by the user.
  ///
  /// The lock state is always taken from the latest snapshot. The payout
  /// uses the odd the user saw, provided it is within one tick of the
  /// published odd.
  #[instrument(skip(self, selection), fields(match_id = %selection.match_id, market = %selection.market, label = %selection.label))]
  pub fn place_bet(
    &self,
    selection: &Selection,
    stake_input: Option<&str>,
  ) -> Result<Receipt, BetError> {
    let mut ledger = self.ledger();

    let snapshot = self.registry.snapshot();
    let option = snapshot
      .find(&selection.match_id)
      .and_then(|m| m.find_option(&selection.market, &selection.label))
      .ok_or_else(|| BetError::SelectionNotFound {
        match_id: selection.match_id.clone(),
        label: selection.label.clone(),
      })
      .inspect_err(|e| warn!(error = %e, "Bet rejected"))?;

    let receipt = wager::validate_wager(
      option,
      selection.odd,
      stake_input,
      self.wallet.balance(),
      &self.limits,
    )
    .inspect_err(|e| warn!(error = %e, kind = e.kind(), "Bet rejected"))?;

    let balance = self
      .wallet
      .apply_delta(-receipt.debit)
      .inspect_err(|e| warn!(error = %e, "Debit refused"))?;
    ledger.push(Wager::pending(selection, &receipt));

    info!(
      stake = %receipt.debit,
      odd = %receipt.odd,
      potential_return = %receipt.potential_return,
      balance = %balance,
      "Bet accepted"
    );

    Ok(receipt)
  }

  /// Credit the balance with a typed amount, returning the new balance.
  #[instrument(skip(self))]
  pub fn deposit(&self, amount_input: Option<&str>) -> Result<Decimal, BetError> {
    let _ledger = self.ledger();
    let amount = wager::parse_stake(amount_input, DEFAULT_MIN_STAKE)?;
    let balance = self
      .wallet
      .apply_delta(amount)
      .inspect_err(|e| warn!(error = %e, "Deposit refused"))?;
    info!(amount = %amount, balance = %balance, "Deposit credited");
    Ok(balance)
  }

  /// Current balance.
  pub fn balance(&self) -> Decimal {
    self.wallet.balance()
  }

  /// Accepted wagers, oldest first.
  pub fn wagers(&self) -> Vec<Wager> {
    self.ledger().clone()
  }

  /// Preset stake buttons.
  pub fn quick_stakes(&self) -> &[Decimal] {
    &self.quick_stakes
  }

  /// Minimum stake.
  pub fn min_stake(&self) -> Decimal {
    self.limits.min_stake
  }

  /// Potential return preview for a partially typed stake.
  pub fn preview(&self, stake_input: &str, odd: Decimal) -> Decimal {
    wager::preview_return(stake_input, odd, self.limits.odds_floor)
  }

  fn ledger(&self) -> MutexGuard<'_, Vec<Wager>> {
    self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
