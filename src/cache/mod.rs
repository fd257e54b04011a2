//! In-memory payload caches: a cost-budgeted primary tier plus a strict-LRU
//! second-chance tier. Both are internally locked so the engine handle can
//! read them, but policy mutations (inserts, trims, promotions) are issued
//! only by the loader task.

pub mod lru;
pub mod primary;

pub use lru::LruCache;
pub use primary::{InsertReport, PrimaryCache};

use std::sync::Arc;

use crate::events::DecodedImage;

/// Counters for one cache tier.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub entry_count: usize,
    pub cost_used: usize,
    pub cost_limit: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Cache hit rate in [0.0, 1.0].
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Budget utilization in [0.0, 1.0].
    pub fn utilization(&self) -> f64 {
        if self.cost_limit == 0 {
            0.0
        } else {
            self.cost_used as f64 / self.cost_limit as f64
        }
    }
}

/// An entry displaced from a tier, handed back to the loader so it can be
/// offered to the next tier or dropped.
#[derive(Debug, Clone)]
pub struct EvictedEntry {
    pub id: u64,
    pub ordinal: usize,
    pub payload: Arc<DecodedImage>,
    pub cost: usize,
}

/// Combined diagnostics exposed by the engine handle.
#[derive(Debug, Clone, Copy)]
pub struct Statistics {
    /// Payload-lookup hit rate across both tiers.
    pub hit_rate: f64,
    /// Bytes held across both tiers.
    pub total_cost: usize,
    /// Entries resident across both tiers.
    pub resident_count: usize,
    pub primary: CacheStats,
    pub lru: CacheStats,
}

impl Statistics {
    pub fn from_tiers(primary: CacheStats, lru: CacheStats) -> Self {
        // A lookup that misses the primary tier falls through to the LRU
        // tier, so chain-level misses are the LRU tier's misses.
        let hits = primary.hits + lru.hits;
        let total = hits + lru.misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        Self {
            hit_rate,
            total_cost: primary.cost_used + lru.cost_used,
            resident_count: primary.entry_count + lru.entry_count,
            primary,
            lru,
        }
    }
}
