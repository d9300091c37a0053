//! Settlement guard — prevents double-settlement of an auction.
//!
//! Each auction can be settled exactly once. Attempting to settle the
//! same `AuctionId` a second time returns [`EscrowError::AlreadyEnded`].
//! The terminal `Ended` state on the auction record is the authoritative
//! barrier; the guard is the coordinator's own record of what it has
//! paid out, so a payout can never be issued twice even if the store and
//! coordinator were wired up inconsistently.
//!
//! The guard maintains an LRU-style bounded cache so memory usage stays
//! predictable in long-running processes.

use std::collections::{HashSet, VecDeque};

use bidlock_types::{AuctionId, EscrowError, Result};

/// Bounded set of settled auction ids with LRU eviction.
///
/// When the set reaches `max_size`, the oldest entry is evicted to make
/// room. Eviction is safe: evicted auctions remain `Ended` in the store.
pub struct SettleGuard {
    /// Auction ids that have already been settled.
    settled: HashSet<AuctionId>,
    /// Insertion order for LRU eviction (front = oldest).
    order: VecDeque<AuctionId>,
    /// Maximum number of entries before eviction kicks in.
    max_size: usize,
}

impl SettleGuard {
    /// Create a new guard with the given maximum cache size.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "SettleGuard max_size must be > 0");
        Self {
            settled: HashSet::with_capacity(max_size),
            order: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Mark an auction as settled. Returns an error if it was already
    /// settled.
    ///
    /// # Errors
    /// Returns [`EscrowError::AlreadyEnded`] if `auction_id` has already
    /// been marked.
    pub fn mark_settled(&mut self, auction_id: AuctionId) -> Result<()> {
        if self.settled.contains(&auction_id) {
            return Err(EscrowError::AlreadyEnded(auction_id));
        }

        // Evict oldest if at capacity.
        if self.settled.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.settled.remove(&oldest);
            }
        }

        self.settled.insert(auction_id);
        self.order.push_back(auction_id);
        Ok(())
    }

    /// Check whether an auction has already been settled.
    pub fn is_settled(&self, auction_id: AuctionId) -> bool {
        self.settled.contains(&auction_id)
    }

    /// Number of auctions currently tracked.
    pub fn len(&self) -> usize {
        self.settled.len()
    }

    /// Whether the guard is empty (no settlements tracked).
    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }
}
