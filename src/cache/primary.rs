//! Cost-based primary cache. Holds decoded payloads under a byte budget
//! that is never exceeded: every mutating call leaves `total_cost` at or
//! below the budget. Eviction prefers entries outside the active window,
//! farthest from the current index first; within-window eviction happens
//! only when the budget cannot hold the window at all, and is reported so
//! the loader can surface the misconfiguration once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::{CacheStats, EvictedEntry};
use crate::events::DecodedImage;
use crate::window::Window;

#[derive(Debug)]
struct Entry {
    ordinal: usize,
    payload: Arc<DecodedImage>,
    cost: usize,
    last_access: u64,
}

#[derive(Debug)]
struct State {
    entries: HashMap<u64, Entry>,
    total_cost: usize,
    budget: usize,
    tick: u64,
    stats: CacheStats,
}

impl State {
    fn touch(&mut self, id: u64) {
        self.tick += 1;
        let tick = self.tick;
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.last_access = tick;
        }
    }

    fn remove_entry(&mut self, id: u64) -> Option<EvictedEntry> {
        let entry = self.entries.remove(&id)?;
        self.total_cost = self.total_cost.saturating_sub(entry.cost);
        self.stats.entry_count = self.entries.len();
        self.stats.cost_used = self.total_cost;
        Some(EvictedEntry {
            id,
            ordinal: entry.ordinal,
            payload: entry.payload,
            cost: entry.cost,
        })
    }

    /// Pick the next victim: outside-window entries ranked farthest-first
    /// (oldest access breaking ties), falling back to the oldest-accessed
    /// in-window entry. Returns the id and whether it was inside the window.
    fn choose_victim(&self, window: &Window) -> Option<(u64, bool)> {
        let mut outside: Option<(u64, usize, u64)> = None;
        let mut inside: Option<(u64, u64)> = None;
        for (&id, entry) in &self.entries {
            if window.contains(entry.ordinal) {
                match inside {
                    Some((_, access)) if access <= entry.last_access => {}
                    _ => inside = Some((id, entry.last_access)),
                }
            } else {
                let distance = window.distance(entry.ordinal);
                match outside {
                    Some((_, best, access))
                        if best > distance || (best == distance && access <= entry.last_access) => {}
                    _ => outside = Some((id, distance, entry.last_access)),
                }
            }
        }
        if let Some((id, _, _)) = outside {
            Some((id, false))
        } else {
            inside.map(|(id, _)| (id, true))
        }
    }
}

/// Outcome of an insert: entries displaced to make room, whether any of
/// them were inside the window (budget misconfiguration), and whether the
/// payload was actually stored.
#[derive(Debug, Default)]
pub struct InsertReport {
    pub evicted: Vec<EvictedEntry>,
    pub window_eviction: bool,
    pub stored: bool,
}

pub struct PrimaryCache {
    inner: Mutex<State>,
}

impl PrimaryCache {
    pub fn new(budget: usize) -> Self {
        Self {
            inner: Mutex::new(State {
                entries: HashMap::new(),
                total_cost: 0,
                budget,
                tick: 0,
                stats: CacheStats {
                    cost_limit: budget,
                    ..Default::default()
                },
            }),
        }
    }

    /// Insert a payload, evicting as needed to honor the budget. A payload
    /// larger than the whole budget is not stored at all.
    pub fn insert(
        &self,
        id: u64,
        ordinal: usize,
        payload: Arc<DecodedImage>,
        cost: usize,
        window: &Window,
    ) -> InsertReport {
        let mut state = self.inner.lock().unwrap();
        let mut report = InsertReport::default();

        // Replacing an existing payload releases its cost first; the old
        // bytes are not offered to the next tier.
        state.remove_entry(id);

        if cost > state.budget {
            report.window_eviction = true;
            return report;
        }

        while state.total_cost + cost > state.budget {
            let Some((victim, was_inside)) = state.choose_victim(window) else {
                break;
            };
            if let Some(evicted) = state.remove_entry(victim) {
                state.stats.evictions += 1;
                report.window_eviction |= was_inside;
                report.evicted.push(evicted);
            }
        }

        state.tick += 1;
        let last_access = state.tick;
        state.entries.insert(
            id,
            Entry {
                ordinal,
                payload,
                cost,
                last_access,
            },
        );
        state.total_cost += cost;
        state.stats.entry_count = state.entries.len();
        state.stats.cost_used = state.total_cost;
        report.stored = true;
        report
    }

    /// Look up a payload, refreshing its access time and counting the
    /// hit or miss.
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

    /// Residency probe for scheduling; does not touch recency or counters.
    pub fn contains(&self, id: u64) -> bool {
        self.inner.lock().unwrap().entries.contains_key(&id)
    }

    /// Whether `cost` fits under the budget without evicting anything.
    pub fn has_room(&self, cost: usize) -> bool {
        let state = self.inner.lock().unwrap();
        state.total_cost + cost <= state.budget
    }

    pub fn remove(&self, id: u64) -> Option<EvictedEntry> {
        self.inner.lock().unwrap().remove_entry(id)
    }

    /// Evict window-exterior entries farther than `radius + soft_margin`
    /// from the current index.
    pub fn trim_exterior(&self, window: &Window, soft_margin: usize) -> Vec<EvictedEntry> {
        let mut state = self.inner.lock().unwrap();
        let keep_within = window.radius() + soft_margin;
        let victims: Vec<u64> = state
            .entries
            .iter()
            .filter(|(_, e)| {
                !window.contains(e.ordinal) && window.distance(e.ordinal) > keep_within
            })
            .map(|(&id, _)| id)
            .collect();
        let mut evicted = Vec::with_capacity(victims.len());
        for id in victims {
            if let Some(entry) = state.remove_entry(id) {
                state.stats.evictions += 1;
                evicted.push(entry);
            }
        }
        evicted
    }

    /// Evict every entry outside the window.
    pub fn evict_outside(&self, window: &Window) -> Vec<EvictedEntry> {
        self.trim_exterior(window, 0)
    }

    /// Replace the budget, evicting down to it if needed.
    pub fn set_budget(&self, budget: usize, window: &Window) -> Vec<EvictedEntry> {
        let mut state = self.inner.lock().unwrap();
        state.budget = budget;
        state.stats.cost_limit = budget;
        let mut evicted = Vec::new();
        while state.total_cost > state.budget {
            let Some((victim, _)) = state.choose_victim(window) else {
                break;
            };
            if let Some(entry) = state.remove_entry(victim) {
                state.stats.evictions += 1;
                evicted.push(entry);
            }
        }
        evicted
    }

    /// Drop everything, keeping counters.
    pub fn clear(&self) -> Vec<EvictedEntry> {
        let mut state = self.inner.lock().unwrap();
        let ids: Vec<u64> = state.entries.keys().copied().collect();
        let mut evicted = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entry) = state.remove_entry(id) {
                evicted.push(entry);
            }
        }
        evicted
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavigationMode;
    use crate::window::compute_window;

    fn payload(cost: usize) -> Arc<DecodedImage> {
        Arc::new(DecodedImage {
            width: 1,
            height: 1,
            pixels: vec![0; cost],
        })
    }

    #[test]
    fn budget_invariant_holds_after_every_insert() {
        let window = compute_window(0, 100, 2, NavigationMode::Linear);
        let cache = PrimaryCache::new(1_000);
        for i in 0..20u64 {
            cache.insert(i, i as usize, payload(300), 300, &window);
            assert!(cache.total_cost() <= 1_000);
        }
    }

    #[test]
    fn eviction_prefers_farthest_outside_window() {
        // Budget 1000, three entries of 400 each: the third insert evicts
        // the entry farthest from the current index.
        let window = compute_window(0, 100, 1, NavigationMode::Linear);
        let cache = PrimaryCache::new(1_000);
        cache.insert(50, 50, payload(400), 400, &window);
        cache.insert(10, 10, payload(400), 400, &window);
        let report = cache.insert(0, 0, payload(400), 400, &window);
        assert!(report.stored);
        assert!(!report.window_eviction);
        assert_eq!(report.evicted.len(), 1);
        assert_eq!(report.evicted[0].id, 50);
        assert!(cache.contains(10));
        assert!(cache.contains(0));
    }

    #[test]
    fn in_window_eviction_is_oldest_accessed_and_reported() {
        let window = compute_window(1, 3, 1, NavigationMode::Linear);
        let cache = PrimaryCache::new(1_000);
        cache.insert(0, 0, payload(400), 400, &window);
        cache.insert(1, 1, payload(400), 400, &window);
        // Refresh 0 so 1 becomes the oldest-accessed entry.
        assert!(cache.get(0).is_some());
        let report = cache.insert(2, 2, payload(400), 400, &window);
        assert!(report.window_eviction);
        assert_eq!(report.evicted.len(), 1);
        assert_eq!(report.evicted[0].id, 1);
        assert!(cache.total_cost() <= 1_000);
    }

    #[test]
    fn oversized_payload_is_refused() {
        let window = compute_window(0, 10, 1, NavigationMode::Linear);
        let cache = PrimaryCache::new(100);
        let report = cache.insert(0, 0, payload(500), 500, &window);
        assert!(!report.stored);
        assert!(report.window_eviction);
        assert_eq!(cache.total_cost(), 0);
    }

    #[test]
    fn replacing_an_entry_does_not_double_count() {
        let window = compute_window(0, 10, 2, NavigationMode::Linear);
        let cache = PrimaryCache::new(1_000);
        cache.insert(1, 1, payload(400), 400, &window);
        cache.insert(1, 1, payload(300), 300, &window);
        assert_eq!(cache.total_cost(), 300);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn trim_exterior_honors_soft_margin() {
        let window = compute_window(0, 100, 2, NavigationMode::Linear);
        let cache = PrimaryCache::new(10_000);
        cache.insert(1, 1, payload(10), 10, &window); // inside
        cache.insert(3, 3, payload(10), 10, &window); // outside, within margin
        cache.insert(90, 90, payload(10), 10, &window); // far outside
        let evicted = cache.trim_exterior(&window, 2);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, 90);
        assert!(cache.contains(1));
        assert!(cache.contains(3));
    }

    #[test]
    fn evict_outside_clears_all_exterior_entries() {
        let window = compute_window(0, 100, 1, NavigationMode::Linear);
        let cache = PrimaryCache::new(10_000);
        cache.insert(0, 0, payload(10), 10, &window);
        cache.insert(5, 5, payload(10), 10, &window);
        cache.insert(6, 6, payload(10), 10, &window);
        let evicted = cache.evict_outside(&window);
        assert_eq!(evicted.len(), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(0));
    }

    #[test]
    fn shrinking_budget_evicts_down_to_it() {
        let window = compute_window(0, 100, 1, NavigationMode::Linear);
        let cache = PrimaryCache::new(1_000);
        cache.insert(0, 0, payload(400), 400, &window);
        cache.insert(20, 20, payload(400), 400, &window);
        let evicted = cache.set_budget(500, &window);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, 20);
        assert!(cache.total_cost() <= 500);
    }

    #[test]
    fn get_counts_hits_and_misses() {
        let window = compute_window(0, 10, 1, NavigationMode::Linear);
        let cache = PrimaryCache::new(1_000);
        cache.insert(0, 0, payload(10), 10, &window);
        assert!(cache.get(0).is_some());
        assert!(cache.get(7).is_none());
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
