//! Pure window calculation: which indices should be resident around the
//! user's position. No side effects; the loader recomputes the window on
//! every index or tier change instead of patching it incrementally.

use std::collections::HashSet;

use crate::config::NavigationMode;

/// The set of collection indices kept resident around the current index.
#[derive(Debug, Clone)]
pub struct Window {
    current: usize,
    radius: usize,
    collection_size: usize,
    navigation: NavigationMode,
    indices: HashSet<usize>,
}

/// Compute the window for `current` over a collection of `collection_size`
/// items. Out-of-range indices clamp to the collection bounds; an empty
/// collection yields an empty window. Circular navigation wraps around the
/// ends, linear navigation clips.
pub fn compute_window(
    current: usize,
    collection_size: usize,
    radius: usize,
    navigation: NavigationMode,
) -> Window {
    if collection_size == 0 {
        return Window {
            current: 0,
            radius,
            collection_size,
            navigation,
            indices: HashSet::new(),
        };
    }
    let current = current.min(collection_size - 1);
    let mut indices = HashSet::new();
    for distance in 0..=radius {
        if let Some(i) = forward_index(current, distance, collection_size, navigation) {
            indices.insert(i);
        }
        if let Some(i) = backward_index(current, distance, collection_size, navigation) {
            indices.insert(i);
        }
    }
    Window {
        current,
        radius,
        collection_size,
        navigation,
        indices,
    }
}

fn forward_index(
    current: usize,
    distance: usize,
    size: usize,
    navigation: NavigationMode,
) -> Option<usize> {
    match navigation {
        NavigationMode::Linear => {
            let i = current.checked_add(distance)?;
            (i < size).then_some(i)
        }
        NavigationMode::Circular => Some((current + distance % size) % size),
    }
}

fn backward_index(
    current: usize,
    distance: usize,
    size: usize,
    navigation: NavigationMode,
) -> Option<usize> {
    match navigation {
        NavigationMode::Linear => current.checked_sub(distance),
        NavigationMode::Circular => Some((current + size - distance % size) % size),
    }
}

impl Window {
    /// An empty window, used before any collection is attached.
    pub fn empty(navigation: NavigationMode) -> Self {
        compute_window(0, 0, 0, navigation)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Navigation distance from the current index, honoring wraparound in
    /// circular mode. Also used to rank eviction victims outside the window.
    pub fn distance(&self, index: usize) -> usize {
        if self.collection_size == 0 {
            return 0;
        }
        let linear = self.current.abs_diff(index);
        match self.navigation {
            NavigationMode::Linear => linear,
            NavigationMode::Circular => linear.min(self.collection_size - linear),
        }
    }

    /// Window indices in load order: strictly increasing distance, with
    /// equal-distance ties broken toward ascending index (the predominant
    /// reading direction of sequential navigation).
    pub fn indices_by_priority(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.indices.len());
        let mut seen = HashSet::with_capacity(self.indices.len());
        for distance in 0..=self.radius {
            let forward =
                forward_index(self.current, distance, self.collection_size, self.navigation);
            let backward =
                backward_index(self.current, distance, self.collection_size, self.navigation);
            for candidate in [forward, backward].into_iter().flatten() {
                if self.indices.contains(&candidate) && seen.insert(candidate) {
                    out.push(candidate);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_yields_empty_window() {
        let w = compute_window(3, 0, 5, NavigationMode::Linear);
        assert!(w.is_empty());
        assert_eq!(w.indices_by_priority(), Vec::<usize>::new());
    }

    #[test]
    fn window_indices_stay_in_bounds() {
        for size in [1usize, 2, 5, 17, 101, 1_000] {
            for current in [0usize, 1, size / 2, size - 1, size + 10] {
                for navigation in [NavigationMode::Linear, NavigationMode::Circular] {
                    let w = compute_window(current, size, 4, navigation);
                    assert!(!w.is_empty());
                    for i in w.indices() {
                        assert!(i < size, "index {i} out of range for size {size}");
                    }
                    assert!(w.len() <= 2 * 4 + 1);
                }
            }
        }
    }

    #[test]
    fn out_of_range_current_clamps() {
        let w = compute_window(99, 5, 1, NavigationMode::Linear);
        assert_eq!(w.current(), 4);
        assert!(w.contains(4));
        assert!(w.contains(3));
    }

    #[test]
    fn linear_window_clips_at_boundaries() {
        let w = compute_window(0, 5, 2, NavigationMode::Linear);
        let mut got: Vec<_> = w.indices().collect();
        got.sort_unstable();
        assert_eq!(got, vec![0, 1, 2]);

        let w = compute_window(4, 5, 2, NavigationMode::Linear);
        let mut got: Vec<_> = w.indices().collect();
        got.sort_unstable();
        assert_eq!(got, vec![2, 3, 4]);
    }

    #[test]
    fn circular_window_wraps() {
        let w = compute_window(0, 10, 2, NavigationMode::Circular);
        let mut got: Vec<_> = w.indices().collect();
        got.sort_unstable();
        assert_eq!(got, vec![0, 1, 2, 8, 9]);
        assert_eq!(w.distance(9), 1);
        assert_eq!(w.distance(8), 2);
    }

    #[test]
    fn circular_radius_covering_collection_is_fully_resident() {
        let w = compute_window(3, 6, 10, NavigationMode::Circular);
        assert_eq!(w.len(), 6);
    }

    #[test]
    fn priority_order_is_distance_then_forward() {
        let w = compute_window(5, 11, 2, NavigationMode::Linear);
        assert_eq!(w.indices_by_priority(), vec![5, 6, 4, 7, 3]);
    }

    #[test]
    fn priority_order_wraps_in_circular_mode() {
        let w = compute_window(0, 10, 2, NavigationMode::Circular);
        assert_eq!(w.indices_by_priority(), vec![0, 1, 9, 2, 8]);
    }

    #[test]
    fn linear_distance_ignores_wraparound() {
        let w = compute_window(0, 10, 2, NavigationMode::Linear);
        assert_eq!(w.distance(9), 9);
    }
}
