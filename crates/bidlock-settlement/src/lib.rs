//! # bidlock-settlement
//!
//! **Finality plane**: auction close, exactly-once payout, and the
//! custody conservation audit.
//!
//! ## Architecture
//!
//! The finality plane receives a close request and:
//! 1. Validates the auction is still active and the caller is allowed
//!    to close it (seller early-end, or scheduled end time elapsed)
//! 2. Marks the auction in the [`SettleGuard`] (no double-settlement)
//! 3. Flips the auction `Active → Ended` in the store (terminal)
//! 4. Moves the winner's escrow to the seller
//! 5. Issues a digest-carrying [`SettlementReceipt`]
//!
//! [`CustodyAudit`] is the safety net around all of it: deposits minus
//! withdrawals must always equal the sum of live balances, and the
//! stores' custody records must match the balance book's frozen total.
//!
//! [`SettlementReceipt`]: bidlock_types::SettlementReceipt

pub mod coordinator;
pub mod custody_audit;
pub mod settle_guard;

pub use coordinator::SettlementCoordinator;
pub use custody_audit::CustodyAudit;
pub use settle_guard::SettleGuard;
