//! Accepted-bid record.
//!
//! A `Bid` exists only after the store has validated and escrowed it.
//! Records are append-only: never mutated, never deleted, and they
//! outlive the auction they belong to.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, AuctionId};

/// An accepted bid, as stored in the `BidLedger`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bid {
    /// The auction this bid was accepted into (non-owning back-reference).
    pub auction_id: AuctionId,
    /// The account whose funds are escrowed behind this bid.
    pub bidder: AccountId,
    /// The accepted amount. Strictly greater than the auction's
    /// `highest_bid` at acceptance time.
    pub amount: Decimal,
    /// Per-auction acceptance order, starting at 0. The authoritative
    /// tie-break: equal timestamps are ordered by sequence.
    pub sequence: u64,
    /// Acceptance instant.
    pub placed_at: DateTime<Utc>,
}
