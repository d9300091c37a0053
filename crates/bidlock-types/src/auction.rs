//! # Auction — the escrowed sale record
//!
//! One auction sells one item. The record caches the current leader and
//! their bid amount; the authoritative history lives in the `BidLedger`
//! and the two must always agree (cross-check invariant).
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐  settlement  ┌───────┐
//!   │ ACTIVE ├─────────────▶│ ENDED │
//!   └────────┘              └───────┘
//! ```
//!
//! There is no pre-open state: an auction is biddable the moment it is
//! created. `Ended` is terminal — once reached, `highest_bid` and
//! `highest_bidder` are frozen and no further bid is accepted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, AuctionId};

/// The lifecycle state of an auction.
///
/// The only transition is `Active → Ended`, taken exactly once by
/// settlement. A second attempt is rejected, which is what prevents a
/// double payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuctionState {
    /// Bids are accepted; the current leader's funds are escrowed.
    Active,
    /// Settlement closed this auction. **Irreversible.**
    Ended,
}

impl AuctionState {
    /// Can this auction transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Active, Self::Ended))
    }
}

impl std::fmt::Display for AuctionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Ended => write!(f, "ENDED"),
        }
    }
}

/// A single-item auction with cached leader state.
///
/// Invariants (enforced by the store, checkable here):
/// - at most one `highest_bidder` at any time, and the amount escrowed
///   for them always equals `highest_bid`;
/// - `highest_bid` is monotonically non-decreasing while `Active` and
///   never below `base_price`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Auction {
    /// Sequential id, assigned at creation.
    pub id: AuctionId,
    /// The party who receives the final settlement funds.
    pub seller: AccountId,
    /// Human-readable item name.
    pub item: String,
    /// Minimum valid opening value; immutable after creation.
    pub base_price: Decimal,
    /// Current leading amount. Initialized to `base_price`; every
    /// accepted bid must strictly exceed it.
    pub highest_bid: Decimal,
    /// The account currently escrowed as leader, if any bid landed.
    pub highest_bidder: Option<AccountId>,
    /// Scheduled close instant; informational for early-ended auctions.
    pub end_time: DateTime<Utc>,
    /// Lifecycle state.
    pub state: AuctionState,
    /// When the auction was created.
    pub created_at: DateTime<Utc>,
}

impl Auction {
    /// Whether bids are currently accepted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == AuctionState::Active
    }

    /// Whether any bid has been accepted.
    #[must_use]
    pub fn has_bids(&self) -> bool {
        self.highest_bidder.is_some()
    }

    /// The current `(bidder, amount)` leader pair, if any.
    #[must_use]
    pub fn leader(&self) -> Option<(AccountId, Decimal)> {
        self.highest_bidder.map(|b| (b, self.highest_bid))
    }

    /// The amount a new bid must strictly exceed to be accepted.
    #[must_use]
    pub fn threshold(&self) -> Decimal {
        self.highest_bid
    }

    /// Whether the scheduled close instant has elapsed at `now`.
    #[must_use]
    pub fn past_end_time(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_auction() -> Auction {
        let now = Utc::now();
        Auction {
            id: AuctionId(1),
            seller: AccountId::new(),
            item: "Test Item".to_string(),
            base_price: Decimal::new(100, 0),
            highest_bid: Decimal::new(100, 0),
            highest_bidder: None,
            end_time: now + chrono::Duration::hours(1),
            state: AuctionState::Active,
            created_at: now,
        }
    }

    #[test]
    fn state_transitions() {
        assert!(AuctionState::Active.can_transition_to(AuctionState::Ended));
        assert!(!AuctionState::Ended.can_transition_to(AuctionState::Active));
        assert!(!AuctionState::Ended.can_transition_to(AuctionState::Ended));
        assert!(!AuctionState::Active.can_transition_to(AuctionState::Active));
    }

    #[test]
    fn state_display() {
        assert_eq!(format!("{}", AuctionState::Active), "ACTIVE");
        assert_eq!(format!("{}", AuctionState::Ended), "ENDED");
    }

    #[test]
    fn fresh_auction_has_no_leader() {
        let auction = make_auction();
        assert!(auction.is_active());
        assert!(!auction.has_bids());
        assert_eq!(auction.leader(), None);
        assert_eq!(auction.threshold(), auction.base_price);
    }

    #[test]
    fn leader_pairs_bidder_with_amount() {
        let mut auction = make_auction();
        let bidder = AccountId::new();
        auction.highest_bidder = Some(bidder);
        auction.highest_bid = Decimal::new(150, 0);
        assert_eq!(auction.leader(), Some((bidder, Decimal::new(150, 0))));
        assert_eq!(auction.threshold(), Decimal::new(150, 0));
    }

    #[test]
    fn past_end_time_check() {
        let auction = make_auction();
        assert!(!auction.past_end_time(Utc::now()));
        assert!(auction.past_end_time(auction.end_time));
        assert!(auction.past_end_time(auction.end_time + chrono::Duration::seconds(1)));
    }

    #[test]
    fn auction_serde_roundtrip() {
        let auction = make_auction();
        let json = serde_json::to_string(&auction).unwrap();
        let back: Auction = serde_json::from_str(&json).unwrap();
        assert_eq!(auction, back);
    }
}
