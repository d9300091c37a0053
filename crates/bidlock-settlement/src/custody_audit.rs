//! Custody conservation invariant checker.
//!
//! Mathematical invariant enforced after every settlement:
//! ```text
//! Σ(available + frozen) == Σ(deposits) - Σ(withdrawals)
//! ```
//!
//! Bids, refunds, and settlements only move funds between accounts or
//! between the available and frozen sides of one account; none of them
//! may create or destroy money. If this check ever fails, something has
//! gone catastrophically wrong and the caller should halt.

use bidlock_types::{EscrowError, Result};
use rust_decimal::Decimal;

/// Tracks total deposits and withdrawals and validates conservation
/// against the balance book's actual totals.
pub struct CustodyAudit {
    /// Total deposits since genesis.
    deposits: Decimal,
    /// Total withdrawals since genesis.
    withdrawals: Decimal,
}

impl CustodyAudit {
    /// Create a new conservation tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            deposits: Decimal::ZERO,
            withdrawals: Decimal::ZERO,
        }
    }

    /// Record a deposit.
    pub fn record_deposit(&mut self, amount: Decimal) {
        self.deposits += amount;
    }

    /// Record a withdrawal.
    pub fn record_withdrawal(&mut self, amount: Decimal) {
        self.withdrawals += amount;
    }

    /// Expected total supply: deposits - withdrawals.
    #[must_use]
    pub fn expected_supply(&self) -> Decimal {
        self.deposits - self.withdrawals
    }

    /// Verify that the actual supply (sum of all account balances)
    /// matches the expected supply.
    ///
    /// # Errors
    /// Returns [`EscrowError::CustodyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, actual_supply: Decimal) -> Result<()> {
        let expected = self.expected_supply();
        if actual_supply != expected {
            return Err(EscrowError::CustodyInvariantViolation {
                reason: format!(
                    "actual supply {actual_supply} != expected {expected} \
                     (deposits={}, withdrawals={})",
                    self.deposits, self.withdrawals,
                ),
            });
        }
        Ok(())
    }

    /// Verify the escrow cross-check: the stores' summed custody records
    /// must equal the balance book's total frozen funds.
    ///
    /// # Errors
    /// Returns [`EscrowError::CustodyInvariantViolation`] on mismatch.
    pub fn verify_escrow(escrowed_total: Decimal, total_frozen: Decimal) -> Result<()> {
        if escrowed_total != total_frozen {
            return Err(EscrowError::CustodyInvariantViolation {
                reason: format!(
                    "custody records sum to {escrowed_total} but balance book \
                     holds {total_frozen} frozen"
                ),
            });
        }
        Ok(())
    }

    /// Total deposits recorded.
    #[must_use]
    pub fn total_deposits(&self) -> Decimal {
        self.deposits
    }

    /// Total withdrawals recorded.
    #[must_use]
    pub fn total_withdrawals(&self) -> Decimal {
        self.withdrawals
    }
}

impl Default for CustodyAudit {
    fn default() -> Self {
        Self::new()
    }
}
