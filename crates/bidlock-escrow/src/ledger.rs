//! Bid ledger — append-only per-auction history of accepted bids.
//!
//! The ledger is the audit-grade source of truth for "current highest":
//! the store's cached leader must always agree with the last appended
//! bid. Appends happen only from inside the store's validated bid path;
//! history survives after an auction ends.

use bidlock_types::{AccountId, AuctionId, Bid, EscrowError, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Ordered, append-only record of accepted bids, keyed by auction.
pub struct BidLedger {
    /// Per-auction histories, oldest first.
    histories: HashMap<AuctionId, Vec<Bid>>,
}

impl BidLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            histories: HashMap::new(),
        }
    }

    /// Seed an empty history for a newly created auction.
    pub fn seed(&mut self, auction_id: AuctionId) {
        self.histories.entry(auction_id).or_default();
    }

    /// Append an accepted bid. Called only by the store after the bid
    /// has been validated and its funds escrowed — never exposed for
    /// arbitrary writes.
    ///
    /// # Errors
    /// Returns `AuctionNotFound` if the auction was never seeded.
    pub(crate) fn append(&mut self, bid: Bid) -> Result<()> {
        let history = self
            .histories
            .get_mut(&bid.auction_id)
            .ok_or(EscrowError::AuctionNotFound(bid.auction_id))?;
        history.push(bid);
        Ok(())
    }

    /// Ordered bid history, oldest first. Lazy and restartable; safe to
    /// call at any auction state including after the auction ends.
    ///
    /// # Errors
    /// Returns `AuctionNotFound` for an unknown auction.
    pub fn history(&self, auction_id: AuctionId) -> Result<impl Iterator<Item = &Bid>> {
        self.histories
            .get(&auction_id)
            .map(|bids| bids.iter())
            .ok_or(EscrowError::AuctionNotFound(auction_id))
    }

    /// The current `(bidder, amount)` leader, derived from the last
    /// appended bid. `None` if no bid has landed.
    ///
    /// # Errors
    /// Returns `AuctionNotFound` for an unknown auction.
    pub fn current_leader(&self, auction_id: AuctionId) -> Result<Option<(AccountId, Decimal)>> {
        let history = self
            .histories
            .get(&auction_id)
            .ok_or(EscrowError::AuctionNotFound(auction_id))?;
        Ok(history.last().map(|bid| (bid.bidder, bid.amount)))
    }

    /// Number of accepted bids for an auction. Zero for unknown auctions.
    #[must_use]
    pub fn bid_count(&self, auction_id: AuctionId) -> u64 {
        self.histories
            .get(&auction_id)
            .map_or(0, |bids| bids.len() as u64)
    }

    /// Whether the ledger tracks this auction.
    #[must_use]
    pub fn contains(&self, auction_id: AuctionId) -> bool {
        self.histories.contains_key(&auction_id)
    }
}

impl Default for BidLedger {
    fn default() -> Self {
        Self::new()
    }
}
