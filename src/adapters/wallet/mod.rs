//! Wallet Adapter - In-Memory Balance
//!
//! Session-scoped balance behind the `BalanceProvider` port. Nothing is
//! persisted; a restart starts again from the configured balance.

use std::sync::{PoisonError, RwLock};

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::BetError;
use crate::ports::balance::BalanceProvider;

/// Single-user balance held in memory.
#[derive(Debug, Default)]
pub struct InMemoryWallet {
    balance: RwLock<Decimal>,
}

impl InMemoryWallet {
    /// Wallet starting at `initial`.
    pub fn new(initial: Decimal) -> Self {
        Self {
            balance: RwLock::new(initial),
        }
    }
}

impl BalanceProvider for InMemoryWallet {
    fn balance(&self) -> Decimal {
        *self.balance.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_delta(&self, delta: Decimal) -> Result<Decimal, BetError> {
        let mut balance = self.balance.write().unwrap_or_else(PoisonError::into_inner);
        *balance = balance.checked_add(delta).ok_or_else(|| {
            BetError::InvalidAmount(format!("balance cannot absorb a change of {delta}"))
        })?;
        debug!(delta = %delta, balance = %*balance, "Balance updated");
        Ok(*balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deltas_accumulate() {
        let wallet = InMemoryWallet::new(dec!(150));
        assert_eq!(wallet.apply_delta(dec!(-100)).unwrap(), dec!(50));
        assert_eq!(wallet.apply_delta(dec!(25.50)).unwrap(), dec!(75.50));
        assert_eq!(wallet.balance(), dec!(75.50));
    }

    #[test]
    fn test_overflow_is_refused() {
        let wallet = InMemoryWallet::new(Decimal::MAX);
        let err = wallet.apply_delta(dec!(1)).unwrap_err();
        assert_eq!(err.kind(), "invalid_amount");
        assert_eq!(wallet.balance(), Decimal::MAX);
        assert_eq!(wallet.apply_delta(dec!(-1)).unwrap(), Decimal::MAX - dec!(1));
    }

    #[test]
    fn test_default_is_empty() {
        assert_eq!(InMemoryWallet::default().balance(), Decimal::ZERO);
    }
}
