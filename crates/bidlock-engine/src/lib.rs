//! # bidlock-engine
//!
//! Thread-safe facade over the bidlock custody and finality planes.
//!
//! The [`EscrowEngine`] is what a surrounding application embeds: it
//! wires the `AuctionEscrowStore`, `BalanceBook`, and
//! `SettlementCoordinator` together behind per-auction serialization,
//! so any number of callers can bid and close concurrently while every
//! auction sees one deterministic total order of mutations.
//!
//! ## Operation set
//!
//! ```text
//! deposit / withdraw / balance          — funding surface
//! create_auction                        — open a biddable auction
//! place_bid                             — escrow a new leader, refund the old
//! end_auction                           — exactly-once settlement to the seller
//! get_auction / bid_history             — read snapshots for display layers
//! verify_custody / verify_auction       — conservation and agreement audits
//! ```

pub mod engine;

pub use engine::EscrowEngine;
