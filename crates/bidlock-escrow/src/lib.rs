//! # bidlock-escrow
//!
//! **Custody plane**: balance bookkeeping, the append-only bid ledger,
//! and the auction escrow store.
//!
//! ## Architecture
//!
//! 1. **BalanceBook**: per-account available/frozen balances — the
//!    funding abstraction the engine draws on
//! 2. **BidLedger**: append-only ordered history of accepted bids,
//!    source of truth for leader reconstruction
//! 3. **AuctionEscrowStore**: auction registry + custody records; the
//!    only path by which a bid becomes economically binding
//!
//! ## Bid Flow
//!
//! ```text
//! caller → AuctionEscrowStore.place_bid()
//!        → BalanceBook.freeze(new leader)
//!        → BalanceBook.unfreeze(displaced leader)   // refund, or abort all
//!        → BidLedger.append()
//!        → cached leader / custody record updated
//! ```
//!
//! Every step happens under one `&mut self` critical section; callers
//! never observe a half-applied bid.

pub mod balance_book;
pub mod ledger;
pub mod store;

pub use balance_book::BalanceBook;
pub use ledger::BidLedger;
pub use store::{AuctionEscrowStore, ClosedAuction, CustodyRecord};
