//! Balance book — the funding abstraction the escrow store draws on.
//!
//! Tracks per-account balances with available/frozen accounting.
//! All mutations are atomic: either the full operation succeeds or
//! the balance is unchanged.

use std::collections::HashMap;

use bidlock_types::{AccountId, BalanceEntry, EscrowError, Result};
use rust_decimal::Decimal;

/// Source of truth for all balance state.
///
/// The `AuctionEscrowStore` calls into it to freeze a new leader's funds
/// and to refund a displaced leader; the `SettlementCoordinator` calls
/// into it to pay the seller out of consumed escrow.
pub struct BalanceBook {
    /// Per-account balances.
    balances: HashMap<AccountId, BalanceEntry>,
}

impl BalanceBook {
    /// Create a new empty balance book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Deposit funds (increases available balance).
    pub fn deposit(&mut self, account: AccountId, amount: Decimal) {
        let entry = self.balances.entry(account).or_default();
        entry.available += amount;
    }

    /// Withdraw funds (decreases available balance).
    ///
    /// # Errors
    /// Returns `InsufficientFunds` if available < amount. Frozen funds
    /// can never be withdrawn — they belong to a live bid.
    pub fn withdraw(&mut self, account: AccountId, amount: Decimal) -> Result<()> {
        let entry = self
            .balances
            .get_mut(&account)
            .ok_or(EscrowError::InsufficientFunds {
                needed: amount,
                available: Decimal::ZERO,
            })?;

        if entry.available < amount {
            return Err(EscrowError::InsufficientFunds {
                needed: amount,
                available: entry.available,
            });
        }

        entry.available -= amount;
        Ok(())
    }

    /// Freeze funds (available → frozen). Used when a bid is escrowed.
    ///
    /// # Errors
    /// Returns `InsufficientFunds` if available < amount.
    pub fn freeze(&mut self, account: AccountId, amount: Decimal) -> Result<()> {
        let entry = self
            .balances
            .get_mut(&account)
            .ok_or(EscrowError::InsufficientFunds {
                needed: amount,
                available: Decimal::ZERO,
            })?;

        if entry.available < amount {
            return Err(EscrowError::InsufficientFunds {
                needed: amount,
                available: entry.available,
            });
        }

        entry.available -= amount;
        entry.frozen += amount;
        Ok(())
    }

    /// Unfreeze funds (frozen → available). Used when a leader is
    /// outbid and their escrow is refunded.
    ///
    /// # Errors
    /// Returns `InsufficientEscrow` if frozen < amount.
    pub fn unfreeze(&mut self, account: AccountId, amount: Decimal) -> Result<()> {
        let entry = self
            .balances
            .get_mut(&account)
            .ok_or(EscrowError::InsufficientEscrow)?;

        if entry.frozen < amount {
            return Err(EscrowError::InsufficientEscrow);
        }

        entry.frozen -= amount;
        entry.available += amount;
        Ok(())
    }

    /// Consume frozen funds (for settlement). Frozen balance decreases,
    /// nothing is added back to available — the counterparty is credited
    /// separately.
    ///
    /// # Errors
    /// Returns `InsufficientEscrow` if frozen < amount.
    pub fn consume_frozen(&mut self, account: AccountId, amount: Decimal) -> Result<()> {
        let entry = self
            .balances
            .get_mut(&account)
            .ok_or(EscrowError::InsufficientEscrow)?;

        if entry.frozen < amount {
            return Err(EscrowError::InsufficientEscrow);
        }

        entry.frozen -= amount;
        Ok(())
    }

    /// Credit available balance (settlement — the receiving side).
    pub fn credit(&mut self, account: AccountId, amount: Decimal) {
        let entry = self.balances.entry(account).or_default();
        entry.available += amount;
    }

    /// Get the balance for an account.
    #[must_use]
    pub fn balance(&self, account: AccountId) -> BalanceEntry {
        self.balances.get(&account).cloned().unwrap_or_default()
    }

    /// Total supply (sum of all accounts' available + frozen).
    #[must_use]
    pub fn total_supply(&self) -> Decimal {
        self.balances.values().map(BalanceEntry::total).sum()
    }

    /// Total frozen across all accounts. Must equal the sum of all
    /// escrowed amounts the store records (cross-check invariant).
    #[must_use]
    pub fn total_frozen(&self) -> Decimal {
        self.balances.values().map(|entry| entry.frozen).sum()
    }
}

impl Default for BalanceBook {
    fn default() -> Self {
        Self::new()
    }
}
