//! Concurrent escrow engine facade.
//!
//! `EscrowEngine` exposes the full operation set behind a per-auction
//! serialization point: auctions are partitioned into shards by id, and
//! every mutating operation on an auction runs under that shard's mutex.
//! Two bids racing on the same auction are applied in whichever order
//! they acquire the shard lock; operations on auctions in different
//! shards proceed in parallel.
//!
//! Lock order is fixed — shard, then balance book, then audit — so the
//! engine cannot deadlock. Critical sections do no I/O; acquisition
//! waits are bounded by other callers' in-memory work. A poisoned lock
//! surfaces as [`EscrowError::LockPoisoned`] instead of propagating the
//! panic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use bidlock_escrow::{AuctionEscrowStore, BalanceBook};
use bidlock_settlement::{CustodyAudit, SettlementCoordinator};
use bidlock_types::{
    AccountId, Auction, AuctionId, BalanceEntry, Bid, EngineConfig, EscrowError, Result,
    SettlementReceipt,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One shard's worth of auction state. Everything an operation on a
/// given auction touches (besides balances) lives under one mutex.
struct Shard {
    store: AuctionEscrowStore,
    coordinator: SettlementCoordinator,
}

/// Thread-safe auction escrow engine.
///
/// All five public operations from the external contract are here:
/// `create_auction`, `place_bid`, `end_auction`, `get_auction`, and
/// `bid_history`, plus the funding surface (`deposit`, `withdraw`,
/// `balance`) and audit queries.
pub struct EscrowEngine {
    config: EngineConfig,
    /// Global auction id allocator; the first auction gets id 1.
    next_auction: AtomicU64,
    /// Auction state, partitioned by `id % shard_count`.
    shards: Box<[Mutex<Shard>]>,
    /// All account balances. Locked after the shard, never before.
    book: Mutex<BalanceBook>,
    /// Conservation tallies. Locked last.
    audit: Mutex<CustodyAudit>,
}

impl EscrowEngine {
    /// Create an engine with the given configuration.
    ///
    /// # Panics
    /// Panics if `config.shard_count` is zero.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        assert!(config.shard_count > 0, "EngineConfig shard_count must be > 0");
        let shards = (0..config.shard_count)
            .map(|_| {
                Mutex::new(Shard {
                    store: AuctionEscrowStore::new(),
                    coordinator: SettlementCoordinator::new(config.settle_guard_capacity),
                })
            })
            .collect();
        Self {
            config,
            next_auction: AtomicU64::new(1),
            shards,
            book: Mutex::new(BalanceBook::new()),
            audit: Mutex::new(CustodyAudit::new()),
        }
    }

    // -----------------------------------------------------------------
    // Funding surface
    // -----------------------------------------------------------------

    /// Deposit funds into an account.
    ///
    /// # Errors
    /// Returns `InvalidParameter` for a non-positive amount.
    pub fn deposit(&self, account: AccountId, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(EscrowError::InvalidParameter {
                reason: format!("deposit must be greater than 0, got {amount}"),
            });
        }
        let mut book = self.lock_book()?;
        book.deposit(account, amount);
        self.lock_audit()?.record_deposit(amount);
        tracing::debug!(account = %account, amount = %amount, "Deposit");
        Ok(())
    }

    /// Withdraw available funds from an account. Frozen funds — escrow
    /// behind a live bid — can never be withdrawn.
    ///
    /// # Errors
    /// - `InvalidParameter` for a non-positive amount
    /// - `InsufficientFunds` if available balance cannot cover it
    pub fn withdraw(&self, account: AccountId, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(EscrowError::InvalidParameter {
                reason: format!("withdrawal must be greater than 0, got {amount}"),
            });
        }
        let mut book = self.lock_book()?;
        book.withdraw(account, amount)?;
        self.lock_audit()?.record_withdrawal(amount);
        tracing::debug!(account = %account, amount = %amount, "Withdrawal");
        Ok(())
    }

    /// Current balance snapshot for an account.
    pub fn balance(&self, account: AccountId) -> Result<BalanceEntry> {
        Ok(self.lock_book()?.balance(account))
    }

    // -----------------------------------------------------------------
    // Auction operations
    // -----------------------------------------------------------------

    /// Create an auction with an explicit scheduled end time. The
    /// auction is biddable as soon as this returns.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `base_price` is not strictly
    /// positive; no auction id is consumed in that case.
    pub fn create_auction(
        &self,
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
        let id = AuctionId(self.next_auction.fetch_add(1, Ordering::Relaxed));
        let mut shard = self.lock_shard(id)?;
        shard.store.create_auction(id, seller, item, base_price, end_time)
    }

    /// Create an auction that closes after the configured default
    /// duration.
    pub fn create_auction_with_default_duration(
        &self,
        seller: AccountId,
        item: impl Into<String>,
        base_price: Decimal,
    ) -> Result<AuctionId> {
        let end_time = Utc::now() + chrono::Duration::seconds(self.config.default_duration_secs);
        self.create_auction(seller, item, base_price, end_time)
    }

    /// Place a bid. On success the bidder's funds are escrowed and any
    /// displaced leader has been refunded in full; on any error nothing
    /// has moved. Committed bids cannot be retracted.
    pub fn place_bid(
        &self,
        auction_id: AuctionId,
        bidder: AccountId,
        amount: Decimal,
    ) -> Result<Bid> {
        let mut shard = self.lock_shard(auction_id)?;
        let mut book = self.lock_book()?;
        shard.store.place_bid(&mut book, auction_id, bidder, amount)
    }

    /// End an auction and settle the escrow to the seller. Only the
    /// seller may end early; after the scheduled end time any caller
    /// may trigger the close.
    pub fn end_auction(
        &self,
        auction_id: AuctionId,
        caller: AccountId,
    ) -> Result<SettlementReceipt> {
        let mut shard = self.lock_shard(auction_id)?;
        let mut book = self.lock_book()?;
        let shard = &mut *shard;
        shard.coordinator.end_auction(
            &mut shard.store,
            &mut book,
            auction_id,
            caller,
            Utc::now(),
        )
    }

    /// Snapshot of an auction's current state.
    pub fn get_auction(&self, auction_id: AuctionId) -> Result<Auction> {
        let shard = self.lock_shard(auction_id)?;
        shard.store.auction(auction_id).cloned()
    }

    /// Ordered bid history for an auction, oldest first. Safe at any
    /// auction state, including after the auction has ended.
    pub fn bid_history(&self, auction_id: AuctionId) -> Result<Vec<Bid>> {
        let shard = self.lock_shard(auction_id)?;
        Ok(shard.store.bid_history(auction_id)?.cloned().collect())
    }

    /// Number of auctions created so far.
    #[must_use]
    pub fn auction_count(&self) -> u64 {
        self.next_auction.load(Ordering::Relaxed) - 1
    }

    // -----------------------------------------------------------------
    // Audit
    // -----------------------------------------------------------------

    /// Whole-engine custody check: the custody records summed across
    /// every shard must equal the balance book's frozen total, and
    /// deposits minus withdrawals must equal the live supply.
    ///
    /// Takes every shard lock (in index order) plus the book and audit
    /// locks, so the check observes one consistent cut of the state.
    pub fn verify_custody(&self) -> Result<()> {
        let mut guards = Vec::with_capacity(self.shards.len());
        for (idx, shard) in self.shards.iter().enumerate() {
            guards.push(shard.lock().map_err(|_| EscrowError::LockPoisoned {
                context: format!("shard {idx}"),
            })?);
        }
        let book = self.lock_book()?;
        let audit = self.lock_audit()?;

        let escrowed_total: Decimal = guards.iter().map(|g| g.store.escrowed_total()).sum();
        CustodyAudit::verify_escrow(escrowed_total, book.total_frozen())?;
        audit.verify(book.total_supply())
    }

    /// Cross-check the ledger-derived leader against the cached one for
    /// a single auction.
    pub fn verify_auction(&self, auction_id: AuctionId) -> Result<()> {
        let shard = self.lock_shard(auction_id)?;
        shard.store.verify_leader_agreement(auction_id)
    }

    // -----------------------------------------------------------------
    // Lock plumbing
    // -----------------------------------------------------------------

    fn lock_shard(&self, auction_id: AuctionId) -> Result<MutexGuard<'_, Shard>> {
        #[allow(clippy::cast_possible_truncation)]
        let idx = (auction_id.0 % self.shards.len() as u64) as usize;
        self.shards[idx]
            .lock()
            .map_err(|_| EscrowError::LockPoisoned {
                context: format!("shard {idx}"),
            })
    }

    fn lock_book(&self) -> Result<MutexGuard<'_, BalanceBook>> {
        self.book.lock().map_err(|_| EscrowError::LockPoisoned {
            context: "balance book".to_string(),
        })
    }

    fn lock_audit(&self) -> Result<MutexGuard<'_, CustodyAudit>> {
        self.audit.lock().map_err(|_| EscrowError::LockPoisoned {
            context: "custody audit".to_string(),
        })
    }
}

impl Default for EscrowEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
