//! Configuration for the bidlock escrow engine.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Tuning knobs for an [`EscrowEngine`] instance.
///
/// Defaults come from [`constants`] and are suitable for tests and
/// embedded use; a surrounding service would deserialize this from its
/// own config file.
///
/// [`EscrowEngine`]: https://docs.rs/bidlock-engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of shards for per-auction serialization. Auctions in
    /// different shards never contend; more shards means more
    /// parallelism at the cost of memory.
    pub shard_count: usize,
    /// Capacity of the settlement guard's bounded id cache.
    pub settle_guard_capacity: usize,
    /// Duration applied when a caller creates an auction without an
    /// explicit end time, in seconds.
    pub default_duration_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shard_count: constants::DEFAULT_SHARD_COUNT,
            settle_guard_capacity: constants::SETTLE_GUARD_CACHE_SIZE,
            default_duration_secs: constants::DEFAULT_AUCTION_DURATION_SECS,
        }
    }
}
