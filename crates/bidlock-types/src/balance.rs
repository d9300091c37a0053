//! Balance tracking types for the bidlock escrow model.
//!
//! Every account has an `available` balance (spendable on new bids or
//! withdrawal) and a `frozen` balance (escrowed behind the account's
//! current leading bid). The engine custodies a single currency, so
//! there is no asset dimension.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance entry for one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    /// Available for new bids / withdrawal.
    pub available: Decimal,
    /// Frozen / escrowed behind a currently leading bid.
    pub frozen: Decimal,
}

impl BalanceEntry {
    /// Create a zero balance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: Decimal::ZERO,
            frozen: Decimal::ZERO,
        }
    }

    /// Total balance (available + frozen).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.available + self.frozen
    }

    /// Whether this entry has no balance at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.available.is_zero() && self.frozen.is_zero()
    }
}

impl Default for BalanceEntry {
    fn default() -> Self {
        Self::new()
    }
}
