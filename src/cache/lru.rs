//! Second-chance LRU tier. Absorbs payloads displaced from the primary
//! cache so that back-and-forth navigation near the window edge does not
//! redo decode work. Strict recency eviction under a byte budget.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::cache::{CacheStats, EvictedEntry};
use crate::events::DecodedImage;

#[derive(Debug)]
struct Entry {
    ordinal: usize,
    payload: Arc<DecodedImage>,
    cost: usize,
}

#[derive(Debug)]
struct State {
    entries: HashMap<u64, Entry>,
    // Most recently used at the back.
    recency: VecDeque<u64>,
    total_cost: usize,
    budget: usize,
    stats: CacheStats,
}

impl State {
    fn touch(&mut self, id: u64) {
        self.recency.retain(|&k| k != id);
        self.recency.push_back(id);
    }

    fn evict_lru(&mut self) -> Option<EvictedEntry> {
        let id = self.recency.pop_front()?;
        let entry = self.entries.remove(&id)?;
        self.total_cost = self.total_cost.saturating_sub(entry.cost);
        self.stats.entry_count = self.entries.len();
        self.stats.cost_used = self.total_cost;
        self.stats.evictions += 1;
        Some(EvictedEntry {
            id,
            ordinal: entry.ordinal,
            payload: entry.payload,
            cost: entry.cost,
        })
    }
}

/// Result of offering a payload to the tier.
#[derive(Debug, Default)]
pub struct LruInsert {
    pub stored: bool,
    pub evicted: Vec<EvictedEntry>,
}

pub struct LruCache {
    inner: Mutex<State>,
}

impl LruCache {
    pub fn new(budget: usize) -> Self {
        Self {
            inner: Mutex::new(State {
                entries: HashMap::new(),
                recency: VecDeque::new(),
                total_cost: 0,
                budget,
                stats: CacheStats {
                    cost_limit: budget,
                    ..Default::default()
                },
            }),
        }
    }

    /// Offer a payload. Least-recently-used entries are displaced until it
    /// fits; an offer larger than the whole budget is declined.
    pub fn insert(
        &self,
        id: u64,
        ordinal: usize,
        payload: Arc<DecodedImage>,
        cost: usize,
    ) -> LruInsert {
        let mut state = self.inner.lock().unwrap();
        let mut outcome = LruInsert::default();

        if let Some(old) = state.entries.remove(&id) {
            state.total_cost = state.total_cost.saturating_sub(old.cost);
            state.recency.retain(|&k| k != id);
        }

        if cost > state.budget {
            return outcome;
        }

        while state.total_cost + cost > state.budget {
            match state.evict_lru() {
                Some(entry) => outcome.evicted.push(entry),
                None => break,
            }
        }

        state.entries.insert(
            id,
            Entry {
                ordinal,
                payload,
                cost,
            },
        );
        state.total_cost += cost;
        state.touch(id);
        state.stats.entry_count = state.entries.len();
        state.stats.cost_used = state.total_cost;
        outcome.stored = true;
        outcome
    }

    /// Look up a payload and refresh its recency.
    pub fn get(&self, id: u64) -> Option<Arc<DecodedImage>> {
        let mut state = self.inner.lock().unwrap();
        if state.entries.contains_key(&id) {
            state.touch(id);
            state.stats.hits += 1;
            state.entries.get(&id).map(|e| Arc::clone(&e.payload))
        } else {
            state.stats.misses += 1;
            None
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.inner.lock().unwrap().entries.contains_key(&id)
    }

    /// Remove and return an entry for promotion back into the primary tier.
    /// Does not count toward hit/miss statistics.
    pub fn take(&self, id: u64) -> Option<EvictedEntry> {
        let mut state = self.inner.lock().unwrap();
        let entry = state.entries.remove(&id)?;
        state.recency.retain(|&k| k != id);
        state.total_cost = state.total_cost.saturating_sub(entry.cost);
        state.stats.entry_count = state.entries.len();
        state.stats.cost_used = state.total_cost;
        Some(EvictedEntry {
            id,
            ordinal: entry.ordinal,
            payload: entry.payload,
            cost: entry.cost,
        })
    }

    pub fn remove(&self, id: u64) -> bool {
        self.take(id).is_some()
    }

    /// Evict least-recently-used entries until total cost is at or below
    /// `target_bytes`.
    pub fn trim_to(&self, target_bytes: usize) -> Vec<EvictedEntry> {
        let mut state = self.inner.lock().unwrap();
        let mut evicted = Vec::new();
        while state.total_cost > target_bytes {
            match state.evict_lru() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        evicted
    }

    /// Drop everything, keeping counters.
    pub fn clear(&self) -> Vec<EvictedEntry> {
        self.trim_to(0)
    }

    pub fn set_budget(&self, budget: usize) -> Vec<EvictedEntry> {
        {
            let mut state = self.inner.lock().unwrap();
            state.budget = budget;
            state.stats.cost_limit = budget;
        }
        self.trim_to(budget)
    }

    pub fn total_cost(&self) -> usize {
        self.inner.lock().unwrap().total_cost
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().unwrap().stats
    }
}
