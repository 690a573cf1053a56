//! Balance Port - Wallet Interface
//!
//! The bet controller never owns the balance. It reads it through this
//! port and reports each accepted wager as a single signed delta.

use rust_decimal::Decimal;

use crate::domain::BetError;

/// Trait for balance holders.
///
/// Synchronous on purpose: the read-validate-debit sequence of a bet
/// runs under the controller's lock and must not yield in between.
pub trait BalanceProvider: Send + Sync + 'static {
  /// Current balance.
  fn balance(&self) -> Decimal;

  /// Apply a signed change (negative for a debit) and return the new balance.
  ///
  /// A change the balance cannot represent is refused and leaves the
  /// balance untouched.
  fn apply_delta(&self, delta: Decimal) -> Result<Decimal, BetError>;
}
