//! Settlement coordinator — the terminal transition of an auction.
//!
//! One code path handles both close triggers: the seller ending early,
//! and anyone closing after the scheduled end time has elapsed. Both
//! converge on the same sequence:
//! 1. Check the auction is still active (a second end is rejected, not
//!    re-settled — funds must not move twice)
//! 2. Authorize the caller
//! 3. Mark the auction in the settle guard
//! 4. Flip state `Active → Ended` in the store
//! 5. Move the winner's escrow to the seller
//! 6. Issue the settlement receipt

use bidlock_escrow::{AuctionEscrowStore, BalanceBook};
use bidlock_types::{AccountId, AuctionId, EscrowError, Result, SettlementReceipt};
use chrono::{DateTime, Utc};

use crate::settle_guard::SettleGuard;

/// Drives auction close and exactly-once payout.
pub struct SettlementCoordinator {
    /// Record of auctions this coordinator has settled.
    guard: SettleGuard,
}

impl SettlementCoordinator {
    /// Create a coordinator with the given settle-guard capacity.
    #[must_use]
    pub fn new(guard_capacity: usize) -> Self {
        Self {
            guard: SettleGuard::new(guard_capacity),
        }
    }

    /// End an auction and settle its escrow to the seller.
    ///
    /// Authorization: only the seller may end early; once `now` is past
    /// the scheduled end time, any caller may trigger the close. An
    /// auction with no bids closes unsold — a zero-amount transfer and
    /// a receipt with no winner.
    ///
    /// # Errors
    /// - `AuctionNotFound` for an unknown id
    /// - `AlreadyEnded` if the auction was ended before (state check
    ///   precedes authorization, so a stale double-end by the seller
    ///   reports the state error)
    /// - `NotAuthorized` if the caller is not the seller and the end
    ///   time has not elapsed
    pub fn end_auction(
        &mut self,
        store: &mut AuctionEscrowStore,
        book: &mut BalanceBook,
        auction_id: AuctionId,
        caller: AccountId,
        now: DateTime<Utc>,
    ) -> Result<SettlementReceipt> {
        let auction = store.auction(auction_id)?;
        if !auction.is_active() {
            return Err(EscrowError::AlreadyEnded(auction_id));
        }
        if caller != auction.seller && !auction.past_end_time(now) {
            return Err(EscrowError::NotAuthorized {
                reason: format!(
                    "caller {caller} is not the seller and {auction_id} has not reached its end time"
                ),
            });
        }

        self.guard.mark_settled(auction_id)?;
        let closed = store.close_auction(auction_id)?;

        if let Some(winner) = closed.winner {
            // The winner's escrow becomes the seller's money; nothing
            // returns to the winner's available side.
            book.consume_frozen(winner, closed.amount)?;
            book.credit(closed.seller, closed.amount);
        }

        let receipt = SettlementReceipt::new(
            auction_id,
            closed.seller,
            closed.winner,
            closed.amount,
            closed.bid_count,
            Utc::now(),
        );

        tracing::info!(
            auction = %auction_id,
            seller = %closed.seller,
            winner = ?closed.winner,
            amount = %closed.amount,
            digest = %receipt.digest_hex(),
            "Auction settled"
        );
        Ok(receipt)
    }

    /// Whether this coordinator has settled the given auction.
    #[must_use]
    pub fn is_settled(&self, auction_id: AuctionId) -> bool {
        self.guard.is_settled(auction_id)
    }
}
