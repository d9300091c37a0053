//! # bidlock-types
//!
//! Shared types, errors, and configuration for the **bidlock** auction
//! escrow engine.
//!
//! This crate is the leaf dependency of the workspace — every other
//! crate depends on it. It defines:
//!
//! - **Identifiers**: [`AuctionId`], [`AccountId`], [`ReceiptId`]
//! - **Auction model**: [`Auction`], [`AuctionState`]
//! - **Bid model**: [`Bid`]
//! - **Balance model**: [`BalanceEntry`]
//! - **Receipt model**: [`SettlementReceipt`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`EscrowError`] with `AUC_ERR_` prefix codes
//! - **Constants**: system-wide defaults

pub mod auction;
pub mod balance;
pub mod bid;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod receipt;

// Re-export all primary types at crate root for ergonomic imports:
//   use bidlock_types::{Auction, Bid, EscrowError, ...};

pub use auction::*;
pub use balance::*;
pub use bid::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use receipt::*;

// Constants are accessed via `bidlock_types::constants::FOO`
// (not re-exported to avoid name collisions).
