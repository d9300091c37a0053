//! System-wide constants for the bidlock escrow engine.

/// Default auction duration in seconds (1 hour).
pub const DEFAULT_AUCTION_DURATION_SECS: i64 = 3600;

/// Default number of shards for per-auction serialization.
pub const DEFAULT_SHARD_COUNT: usize = 16;

/// Settlement guard cache size (number of auction ids to remember).
pub const SETTLE_GUARD_CACHE_SIZE: usize = 100_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "bidlock";
