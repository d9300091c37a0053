//! Error types for the bidlock auction escrow engine.
//!
//! All errors use the `AUC_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors (caller-fixable, nothing mutated)
//! - 2xx: State errors (stale or racing caller view, nothing mutated)
//! - 3xx: Authorization errors
//! - 4xx: Custody failures (rollback guaranteed, no partial effect)
//! - 5xx: Audit / invariant violations
//! - 9xx: Internal errors
//!
//! Every error is scoped to a single operation on a single auction;
//! nothing here is fatal to the process, and nothing is retried
//! internally. Retries are the caller's responsibility.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::AuctionId;

/// Central error enum for all bidlock operations.
#[derive(Debug, Error)]
pub enum EscrowError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// A creation parameter failed validation (e.g. non-positive base price).
    #[error("AUC_ERR_100: Invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    /// The bid does not strictly exceed the current highest bid.
    #[error("AUC_ERR_101: Bid too low: offered {amount}, must exceed {minimum}")]
    BidTooLow { amount: Decimal, minimum: Decimal },

    // =================================================================
    // State Errors (2xx)
    // =================================================================
    /// No auction exists under this id.
    #[error("AUC_ERR_200: Auction not found: {0}")]
    AuctionNotFound(AuctionId),

    /// The auction has ended and no longer accepts bids.
    #[error("AUC_ERR_201: Auction inactive: {0}")]
    AuctionInactive(AuctionId),

    /// The auction was already ended and settled (exactly-once guard).
    #[error("AUC_ERR_202: Auction already ended: {0}")]
    AlreadyEnded(AuctionId),

    // =================================================================
    // Authorization Errors (3xx)
    // =================================================================
    /// The caller may not end this auction.
    #[error("AUC_ERR_300: Not authorized: {reason}")]
    NotAuthorized { reason: String },

    // =================================================================
    // Custody Failures (4xx)
    // =================================================================
    /// Not enough available balance to escrow the bid.
    #[error("AUC_ERR_400: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// Refunding the displaced leader could not be completed; the whole
    /// bid attempt was rolled back.
    #[error("AUC_ERR_401: Refund failure: {reason}")]
    RefundFailure { reason: String },

    /// A frozen-balance movement would underflow the escrowed amount.
    #[error("AUC_ERR_402: Insufficient escrowed balance")]
    InsufficientEscrow,

    // =================================================================
    // Audit / Invariant Violations (5xx)
    // =================================================================
    /// Custody conservation invariant violated — critical safety alert.
    #[error("AUC_ERR_500: Custody invariant violation: {reason}")]
    CustodyInvariantViolation { reason: String },

    // =================================================================
    // Internal (9xx)
    // =================================================================
    /// A serialization lock was poisoned by a panicking writer.
    #[error("AUC_ERR_900: Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EscrowError>;
