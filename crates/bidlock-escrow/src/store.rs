//! Auction escrow store — the authoritative registry of auctions.
//!
//! Owns the auction records, the custody bookkeeping, and the embedded
//! bid ledger. This is the only path by which a bid becomes economically
//! binding: `place_bid` validates, escrows the new leader's funds,
//! refunds the displaced leader, and appends to the ledger, all inside
//! one `&mut self` critical section. Either every step lands or none do.

use std::collections::HashMap;

use bidlock_types::{
    AccountId, Auction, AuctionId, AuctionState, Bid, EscrowError, Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::balance_book::BalanceBook;
use crate::ledger::BidLedger;

/// Who currently holds the escrowed balance for one auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustodyRecord {
    /// The current leading bidder, if any.
    pub leader: Option<AccountId>,
    /// The amount held on the leader's behalf. Always equals the
    /// auction's `highest_bid` while a leader exists, zero otherwise.
    pub escrowed: Decimal,
}

impl CustodyRecord {
    fn empty() -> Self {
        Self {
            leader: None,
            escrowed: Decimal::ZERO,
        }
    }
}

/// Snapshot handed to the settlement coordinator by [`AuctionEscrowStore::close_auction`].
///
/// Produced exactly once per auction: the terminal state flip and this
/// summary are one atomic step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedAuction {
    /// The party owed the settlement payout.
    pub seller: AccountId,
    /// The winning bidder, if any bid landed.
    pub winner: Option<AccountId>,
    /// The escrowed amount to transfer. Zero for an unsold close.
    pub amount: Decimal,
    /// Total accepted bids over the auction's lifetime.
    pub bid_count: u64,
}

/// Registry of auctions with custody bookkeeping and bid history.
pub struct AuctionEscrowStore {
    /// All auctions, keyed by id.
    auctions: HashMap<AuctionId, Auction>,
    /// Per-auction custody records. Mutated only inside `place_bid`
    /// and `close_auction`.
    custody: HashMap<AuctionId, CustodyRecord>,
    /// Append-only history of accepted bids.
    ledger: BidLedger,
}

impl AuctionEscrowStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            auctions: HashMap::new(),
            custody: HashMap::new(),
            ledger: BidLedger::new(),
        }
    }

    /// Register a new auction under a caller-allocated id.
    ///
    /// The auction opens directly in `Active` state with an empty
    /// leader, zero escrow, and an empty ledger history. Id allocation
    /// lives with the serialization layer so that sharded stores never
    /// collide.
    ///
    /// # Errors
    /// - `InvalidParameter` if `base_price` is not strictly positive,
    ///   or the id is already taken.
    pub fn create_auction(
        &mut self,
        id: AuctionId,
        seller: AccountId,
        item: impl Into<String>,
        base_price: Decimal,
        end_time: DateTime<Utc>,
    ) -> Result<AuctionId> {
        if base_price <= Decimal::ZERO {
            return Err(EscrowError::InvalidParameter {
                reason: format!("base price must be greater than 0, got {base_price}"),
            });
        }
        if self.auctions.contains_key(&id) {
            return Err(EscrowError::InvalidParameter {
                reason: format!("{id} already exists"),
            });
        }

        let auction = Auction {
            id,
            seller,
            item: item.into(),
            base_price,
            highest_bid: base_price,
            highest_bidder: None,
            end_time,
            state: AuctionState::Active,
            created_at: Utc::now(),
        };

        self.ledger.seed(id);
        self.custody.insert(id, CustodyRecord::empty());
        self.auctions.insert(id, auction);

        tracing::info!(
            auction = %id,
            seller = %seller,
            base_price = %base_price,
            "Auction created"
        );
        Ok(id)
    }

    /// Validate, escrow, and record a bid. On success the previous
    /// leader (if any) has been refunded in full and the new bid is the
    /// last entry in the ledger.
    ///
    /// Effect order: the new bidder's funds are frozen first, so an
    /// underfunded bid aborts before anything moves; then the displaced
    /// leader is refunded; a refund failure unwinds the fresh freeze and
    /// rejects the whole attempt. No partial application survives.
    ///
    /// # Errors
    /// - `AuctionNotFound` for an unknown id
    /// - `AuctionInactive` if the auction has ended
    /// - `BidTooLow` if `amount` does not strictly exceed the current
    ///   highest bid (the base price, before any bid)
    /// - `InsufficientFunds` if the bidder cannot cover `amount`
    /// - `RefundFailure` if the displaced leader could not be refunded
    pub fn place_bid(
        &mut self,
        book: &mut BalanceBook,
        auction_id: AuctionId,
        bidder: AccountId,
        amount: Decimal,
    ) -> Result<Bid> {
        let auction = self
            .auctions
            .get_mut(&auction_id)
            .ok_or(EscrowError::AuctionNotFound(auction_id))?;

        if !auction.is_active() {
            return Err(EscrowError::AuctionInactive(auction_id));
        }

        let minimum = auction.threshold();
        if amount <= minimum {
            return Err(EscrowError::BidTooLow { amount, minimum });
        }

        let displaced = auction.leader();

        // Escrow the new amount. Fails cleanly with nothing moved.
        book.freeze(bidder, amount)?;

        // Refund the displaced leader in full. If this cannot complete,
        // unwind the freeze we just took and reject the whole bid.
        if let Some((prev_bidder, prev_amount)) = displaced {
            if let Err(refund_err) = book.unfreeze(prev_bidder, prev_amount) {
                book.unfreeze(bidder, amount)?;
                tracing::warn!(
                    auction = %auction_id,
                    bidder = %bidder,
                    displaced = %prev_bidder,
                    "Bid rolled back: refund of displaced leader failed"
                );
                return Err(EscrowError::RefundFailure {
                    reason: refund_err.to_string(),
                });
            }
            tracing::debug!(
                auction = %auction_id,
                refunded = %prev_bidder,
                amount = %prev_amount,
                "Displaced leader refunded"
            );
        }

        let bid = Bid {
            auction_id,
            bidder,
            amount,
            sequence: self.ledger.bid_count(auction_id),
            placed_at: Utc::now(),
        };
        self.ledger.append(bid.clone())?;

        auction.highest_bid = amount;
        auction.highest_bidder = Some(bidder);
        self.custody.insert(
            auction_id,
            CustodyRecord {
                leader: Some(bidder),
                escrowed: amount,
            },
        );

        tracing::info!(
            auction = %auction_id,
            bidder = %bidder,
            amount = %amount,
            sequence = bid.sequence,
            "Bid accepted"
        );
        Ok(bid)
    }

    /// Flip an auction from `Active` to `Ended` and release its custody
    /// record for settlement. Called only by the settlement coordinator;
    /// the flip is terminal and a second call is rejected rather than
    /// re-settled.
    ///
    /// The cached `highest_bid`/`highest_bidder` stay frozen on the
    /// record for read access; the custody record drops to zero because
    /// the returned summary is now the coordinator's to pay out.
    ///
    /// # Errors
    /// - `AuctionNotFound` for an unknown id
    /// - `AlreadyEnded` if the auction was ended before
    pub fn close_auction(&mut self, auction_id: AuctionId) -> Result<ClosedAuction> {
        let auction = self
            .auctions
            .get_mut(&auction_id)
            .ok_or(EscrowError::AuctionNotFound(auction_id))?;

        if !auction.state.can_transition_to(AuctionState::Ended) {
            return Err(EscrowError::AlreadyEnded(auction_id));
        }
        auction.state = AuctionState::Ended;

        let winner = auction.leader();
        self.custody.insert(auction_id, CustodyRecord::empty());

        Ok(ClosedAuction {
            seller: auction.seller,
            winner: winner.map(|(bidder, _)| bidder),
            amount: winner.map_or(Decimal::ZERO, |(_, amount)| amount),
            bid_count: self.ledger.bid_count(auction_id),
        })
    }

    /// Look up an auction.
    ///
    /// # Errors
    /// Returns `AuctionNotFound` for an unknown id.
    pub fn auction(&self, auction_id: AuctionId) -> Result<&Auction> {
        self.auctions
            .get(&auction_id)
            .ok_or(EscrowError::AuctionNotFound(auction_id))
    }

    /// Ordered bid history, oldest first.
    ///
    /// # Errors
    /// Returns `AuctionNotFound` for an unknown id.
    pub fn bid_history(&self, auction_id: AuctionId) -> Result<impl Iterator<Item = &Bid>> {
        self.ledger.history(auction_id)
    }

    /// The custody record for one auction.
    ///
    /// # Errors
    /// Returns `AuctionNotFound` for an unknown id.
    pub fn custody(&self, auction_id: AuctionId) -> Result<CustodyRecord> {
        self.custody
            .get(&auction_id)
            .copied()
            .ok_or(EscrowError::AuctionNotFound(auction_id))
    }

    /// Sum of all currently escrowed amounts across this store's
    /// auctions. Must equal the balance book's total frozen funds held
    /// for these auctions.
    #[must_use]
    pub fn escrowed_total(&self) -> Decimal {
        self.custody.values().map(|record| record.escrowed).sum()
    }

    /// Number of auctions ever created in this store.
    #[must_use]
    pub fn auction_count(&self) -> u64 {
        self.auctions.len() as u64
    }

    /// Access the embedded ledger for read queries.
    #[must_use]
    pub fn ledger(&self) -> &BidLedger {
        &self.ledger
    }

    /// Cross-check invariant: the ledger's derived leader must equal the
    /// cached `highest_bidder`/`highest_bid` for the same auction.
    ///
    /// # Errors
    /// - `AuctionNotFound` for an unknown id
    /// - `CustodyInvariantViolation` on any disagreement
    pub fn verify_leader_agreement(&self, auction_id: AuctionId) -> Result<()> {
        let auction = self.auction(auction_id)?;
        let derived = self.ledger.current_leader(auction_id)?;
        if derived != auction.leader() {
            return Err(EscrowError::CustodyInvariantViolation {
                reason: format!(
                    "{auction_id}: ledger leader {derived:?} != cached {:?}",
                    auction.leader()
                ),
            });
        }
        Ok(())
    }
}

impl Default for AuctionEscrowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour_from_now() -> DateTime<Utc> {
        Utc::now() + chrono::Duration::hours(1)
    }

    fn setup_with_auction() -> (AuctionEscrowStore, BalanceBook, AccountId, AuctionId) {
        let mut store = AuctionEscrowStore::new();
        let book = BalanceBook::new();
        let seller = AccountId::new();
        let id = store
            .create_auction(
                AuctionId(1),
                seller,
                "Test Item",
                Decimal::new(100, 0),
                hour_from_now(),
            )
            .unwrap();
        (store, book, seller, id)
    }

    fn funded_bidder(book: &mut BalanceBook, amount: i64) -> AccountId {
        let bidder = AccountId::new();
        book.deposit(bidder, Decimal::new(amount, 0));
        bidder
    }

    #[test]
    fn create_auction_opens_active_with_empty_leader() {
        let (store, _, seller, id) = setup_with_auction();
        let auction = store.auction(id).unwrap();
        assert_eq!(auction.state, AuctionState::Active);
        assert_eq!(auction.seller, seller);
        assert_eq!(auction.highest_bid, Decimal::new(100, 0));
        assert!(auction.highest_bidder.is_none());
        assert_eq!(store.custody(id).unwrap(), CustodyRecord::empty());
        assert_eq!(store.ledger().bid_count(id), 0);
    }

    #[test]
    fn create_auction_rejects_zero_base_price() {
        let mut store = AuctionEscrowStore::new();
        let err = store
            .create_auction(
                AuctionId(1),
                AccountId::new(),
                "Test",
                Decimal::ZERO,
                hour_from_now(),
            )
            .unwrap_err();
        assert!(matches!(err, EscrowError::InvalidParameter { .. }));
        // No auction was created under the would-be id.
        assert!(matches!(
            store.auction(AuctionId(1)).unwrap_err(),
            EscrowError::AuctionNotFound(_)
        ));
        assert_eq!(store.auction_count(), 0);
    }

    #[test]
    fn create_auction_rejects_duplicate_id() {
        let (mut store, _, _, id) = setup_with_auction();
        let err = store
            .create_auction(
                id,
                AccountId::new(),
                "Other",
                Decimal::new(50, 0),
                hour_from_now(),
            )
            .unwrap_err();
        assert!(matches!(err, EscrowError::InvalidParameter { .. }));
    }

    #[test]
    fn first_bid_escrows_and_leads() {
        let (mut store, mut book, _, id) = setup_with_auction();
        let bidder = funded_bidder(&mut book, 500);

        let bid = store
            .place_bid(&mut book, id, bidder, Decimal::new(150, 0))
            .unwrap();
        assert_eq!(bid.sequence, 0);

        let auction = store.auction(id).unwrap();
        assert_eq!(auction.leader(), Some((bidder, Decimal::new(150, 0))));

        let bal = book.balance(bidder);
        assert_eq!(bal.available, Decimal::new(350, 0));
        assert_eq!(bal.frozen, Decimal::new(150, 0));

        let custody = store.custody(id).unwrap();
        assert_eq!(custody.leader, Some(bidder));
        assert_eq!(custody.escrowed, Decimal::new(150, 0));
    }

    #[test]
    fn bid_at_base_price_is_too_low() {
        let (mut store, mut book, _, id) = setup_with_auction();
        let bidder = funded_bidder(&mut book, 500);

        let err = store
            .place_bid(&mut book, id, bidder, Decimal::new(100, 0))
            .unwrap_err();
        assert!(matches!(err, EscrowError::BidTooLow { .. }));
        // Nothing moved.
        assert_eq!(book.balance(bidder).frozen, Decimal::ZERO);
        assert_eq!(store.ledger().bid_count(id), 0);
    }

    #[test]
    fn lower_bid_rejected_with_threshold() {
        let (mut store, mut book, _, id) = setup_with_auction();
        let b1 = funded_bidder(&mut book, 500);
        let b2 = funded_bidder(&mut book, 500);

        store
            .place_bid(&mut book, id, b1, Decimal::new(150, 0))
            .unwrap();
        let err = store
            .place_bid(&mut book, id, b2, Decimal::new(120, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            EscrowError::BidTooLow { minimum, .. } if minimum == Decimal::new(150, 0)
        ));
        // Leader unchanged, b2 untouched.
        assert_eq!(
            store.auction(id).unwrap().leader(),
            Some((b1, Decimal::new(150, 0)))
        );
        assert!(book.balance(b2).frozen.is_zero());
    }

    #[test]
    fn outbid_refunds_displaced_leader_atomically() {
        let (mut store, mut book, _, id) = setup_with_auction();
        let b1 = funded_bidder(&mut book, 200);
        let b2 = funded_bidder(&mut book, 300);

        store
            .place_bid(&mut book, id, b1, Decimal::new(150, 0))
            .unwrap();
        store
            .place_bid(&mut book, id, b2, Decimal::new(200, 0))
            .unwrap();

        // b1 got their full escrow back; b2 is now escrowed.
        let b1_bal = book.balance(b1);
        assert_eq!(b1_bal.available, Decimal::new(200, 0));
        assert_eq!(b1_bal.frozen, Decimal::ZERO);

        let b2_bal = book.balance(b2);
        assert_eq!(b2_bal.available, Decimal::new(100, 0));
        assert_eq!(b2_bal.frozen, Decimal::new(200, 0));

        assert_eq!(
            store.auction(id).unwrap().leader(),
            Some((b2, Decimal::new(200, 0)))
        );
        assert_eq!(store.escrowed_total(), Decimal::new(200, 0));
        assert_eq!(book.total_frozen(), Decimal::new(200, 0));
    }

    #[test]
    fn underfunded_bid_leaves_no_trace() {
        let (mut store, mut book, _, id) = setup_with_auction();
        let b1 = funded_bidder(&mut book, 500);
        let poor = funded_bidder(&mut book, 10);

        store
            .place_bid(&mut book, id, b1, Decimal::new(150, 0))
            .unwrap();
        let err = store
            .place_bid(&mut book, id, poor, Decimal::new(200, 0))
            .unwrap_err();
        assert!(matches!(err, EscrowError::InsufficientFunds { .. }));

        // Leader untouched, b1 still fully escrowed, no ledger entry.
        assert_eq!(
            store.auction(id).unwrap().leader(),
            Some((b1, Decimal::new(150, 0)))
        );
        assert_eq!(book.balance(b1).frozen, Decimal::new(150, 0));
        assert_eq!(store.ledger().bid_count(id), 1);
        store.verify_leader_agreement(id).unwrap();
    }

    #[test]
    fn self_outbid_nets_correctly() {
        let (mut store, mut book, _, id) = setup_with_auction();
        let bidder = funded_bidder(&mut book, 500);

        store
            .place_bid(&mut book, id, bidder, Decimal::new(150, 0))
            .unwrap();
        store
            .place_bid(&mut book, id, bidder, Decimal::new(200, 0))
            .unwrap();

        // Only the new amount stays escrowed; the old one came back.
        let bal = book.balance(bidder);
        assert_eq!(bal.frozen, Decimal::new(200, 0));
        assert_eq!(bal.available, Decimal::new(300, 0));
        assert_eq!(store.escrowed_total(), Decimal::new(200, 0));
    }

    #[test]
    fn bid_on_unknown_auction_fails() {
        let (mut store, mut book, _, _) = setup_with_auction();
        let bidder = funded_bidder(&mut book, 500);
        let err = store
            .place_bid(&mut book, AuctionId(99), bidder, Decimal::new(150, 0))
            .unwrap_err();
        assert!(matches!(err, EscrowError::AuctionNotFound(_)));
    }

    #[test]
    fn close_flips_state_and_releases_custody() {
        let (mut store, mut book, seller, id) = setup_with_auction();
        let bidder = funded_bidder(&mut book, 500);
        store
            .place_bid(&mut book, id, bidder, Decimal::new(150, 0))
            .unwrap();

        let closed = store.close_auction(id).unwrap();
        assert_eq!(closed.seller, seller);
        assert_eq!(closed.winner, Some(bidder));
        assert_eq!(closed.amount, Decimal::new(150, 0));
        assert_eq!(closed.bid_count, 1);

        let auction = store.auction(id).unwrap();
        assert_eq!(auction.state, AuctionState::Ended);
        // Cached leader stays readable; custody is zero.
        assert_eq!(auction.leader(), Some((bidder, Decimal::new(150, 0))));
        assert_eq!(store.custody(id).unwrap(), CustodyRecord::empty());
    }

    #[test]
    fn double_close_rejected() {
        let (mut store, _, _, id) = setup_with_auction();
        store.close_auction(id).unwrap();
        let err = store.close_auction(id).unwrap_err();
        assert!(matches!(err, EscrowError::AlreadyEnded(_)));
    }

    #[test]
    fn bid_after_close_rejected() {
        let (mut store, mut book, _, id) = setup_with_auction();
        let bidder = funded_bidder(&mut book, 500);
        store.close_auction(id).unwrap();

        let err = store
            .place_bid(&mut book, id, bidder, Decimal::new(500, 0))
            .unwrap_err();
        assert!(matches!(err, EscrowError::AuctionInactive(_)));
    }

    #[test]
    fn close_without_bids_is_unsold() {
        let (mut store, _, seller, id) = setup_with_auction();
        let closed = store.close_auction(id).unwrap();
        assert_eq!(closed.seller, seller);
        assert_eq!(closed.winner, None);
        assert_eq!(closed.amount, Decimal::ZERO);
        assert_eq!(closed.bid_count, 0);
    }

    #[test]
    fn ledger_and_cache_agree_throughout() {
        let (mut store, mut book, _, id) = setup_with_auction();
        store.verify_leader_agreement(id).unwrap();

        let b1 = funded_bidder(&mut book, 500);
        let b2 = funded_bidder(&mut book, 500);
        store
            .place_bid(&mut book, id, b1, Decimal::new(150, 0))
            .unwrap();
        store.verify_leader_agreement(id).unwrap();
        store
            .place_bid(&mut book, id, b2, Decimal::new(200, 0))
            .unwrap();
        store.verify_leader_agreement(id).unwrap();

        store.close_auction(id).unwrap();
        store.verify_leader_agreement(id).unwrap();
    }

    #[test]
    fn history_ordered_oldest_first() {
        let (mut store, mut book, _, id) = setup_with_auction();
        let b1 = funded_bidder(&mut book, 1000);
        let b2 = funded_bidder(&mut book, 1000);
        store
            .place_bid(&mut book, id, b1, Decimal::new(150, 0))
            .unwrap();
        store
            .place_bid(&mut book, id, b2, Decimal::new(200, 0))
            .unwrap();
        store
            .place_bid(&mut book, id, b1, Decimal::new(250, 0))
            .unwrap();

        let history: Vec<_> = store.bid_history(id).unwrap().collect();
        assert_eq!(history.len(), 3);
        let amounts: Vec<Decimal> = history.iter().map(|b| b.amount).collect();
        assert_eq!(
            amounts,
            vec![
                Decimal::new(150, 0),
                Decimal::new(200, 0),
                Decimal::new(250, 0)
            ]
        );
        let sequences: Vec<u64> = history.iter().map(|b| b.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }
}
