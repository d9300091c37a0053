//! Settlement receipts for the bidlock audit trail.
//!
//! Exactly one receipt exists per ended auction. Each carries a SHA-256
//! digest over a canonical payload so an auditor can verify it was not
//! altered after issue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use rust_decimal::Decimal;

use crate::{AccountId, AuctionId, ReceiptId};

/// Proof that an auction was settled: who got paid, how much, and when.
///
/// `winner` is `None` and `amount` is zero when the auction closed
/// unsold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementReceipt {
    /// Unique receipt identifier.
    pub receipt_id: ReceiptId,
    /// The auction that was settled.
    pub auction_id: AuctionId,
    /// The party credited with the escrowed funds.
    pub seller: AccountId,
    /// The winning bidder, if any bid was accepted.
    pub winner: Option<AccountId>,
    /// The amount transferred from escrow to the seller.
    pub amount: Decimal,
    /// Number of bids accepted over the auction's lifetime.
    pub bid_count: u64,
    /// When settlement completed.
    pub settled_at: DateTime<Utc>,
    /// SHA-256 digest over the canonical payload.
    pub digest: [u8; 32],
}

impl SettlementReceipt {
    /// Build a receipt, computing its digest from the canonical payload.
    #[must_use]
    pub fn new(
        auction_id: AuctionId,
        seller: AccountId,
        winner: Option<AccountId>,
        amount: Decimal,
        bid_count: u64,
        settled_at: DateTime<Utc>,
    ) -> Self {
        let receipt_id = ReceiptId::new();
        let digest = Self::compute_digest(receipt_id, auction_id, seller, winner, amount);
        Self {
            receipt_id,
            auction_id,
            seller,
            winner,
            amount,
            bid_count,
            settled_at,
            digest,
        }
    }

    /// Canonical digest: `"bidlock:receipt:v1:" || receipt_id ||
    /// auction_id || seller || winner || amount`.
    #[must_use]
    pub fn compute_digest(
        receipt_id: ReceiptId,
        auction_id: AuctionId,
        seller: AccountId,
        winner: Option<AccountId>,
        amount: Decimal,
    ) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"bidlock:receipt:v1:");
        hasher.update(receipt_id.0.as_bytes());
        hasher.update(auction_id.0.to_le_bytes());
        hasher.update(seller.0.as_bytes());
        match winner {
            Some(w) => hasher.update(w.0.as_bytes()),
            None => hasher.update([0u8; 16]),
        }
        hasher.update(amount.to_string().as_bytes());
        hasher.finalize().into()
    }

    /// Recompute the digest and compare against the stored one.
    #[must_use]
    pub fn verify_digest(&self) -> bool {
        let expected = Self::compute_digest(
            self.receipt_id,
            self.auction_id,
            self.seller,
            self.winner,
            self.amount,
        );
        self.digest == expected
    }

    /// Hex rendering of the digest, for logs and display surfaces.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}
