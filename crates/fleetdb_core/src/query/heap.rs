//! Bounded selection heap.

use std::cmp::Ordering;
use std::collections::binary_heap::PeekMut;
use std::collections::BinaryHeap;

struct Entry<K, T> {
    key: K,
    item: T,
}

impl<K: Ord, T> PartialEq for Entry<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Ord, T> Eq for Entry<K, T> {}

impl<K: Ord, T> PartialOrd for Entry<K, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord, T> Ord for Entry<K, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Keeps the `capacity` items with the smallest keys seen so far.
///
/// Internally a max-heap of at most `capacity` entries: the worst kept key
/// sits on top and a new item replaces it only if its key is strictly
/// smaller, so among equal keys the first pushed stays. Pushing costs
/// O(log k).
///
/// Callers choose the key to get the order they want: a distance for
/// k-nearest, `Reverse(rating)` for the highest ratings, and so on.
///
/// ```rust
/// use fleetdb_core::BoundedHeap;
///
/// let mut heap = BoundedHeap::new(2);
/// for (key, name) in [(3, "c"), (1, "a"), (4, "d"), (2, "b")] {
///     heap.push(key, name);
/// }
/// assert_eq!(heap.into_sorted_vec(), vec![(1, "a"), (2, "b")]);
/// ```
pub struct BoundedHeap<K, T> {
    capacity: usize,
    heap: BinaryHeap<Entry<K, T>>,
}

impl<K: Ord, T> BoundedHeap<K, T> {
    /// Creates a heap that keeps at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Offers an item. Returns true if it was kept.
    pub fn push(&mut self, key: K, item: T) -> bool {
        if self.heap.len() < self.capacity {
            self.heap.push(Entry { key, item });
            return true;
        }
        match self.heap.peek_mut() {
            Some(mut top) if key < top.key => {
                *top = Entry { key, item };
                true
            }
            _ => false,
        }
    }

    /// Largest kept key, the one the next push has to beat once full.
    pub fn worst_key(&self) -> Option<&K> {
        self.heap.peek().map(|e| &e.key)
    }

    /// Returns true once `capacity` items are kept.
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Number of kept items.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if nothing is kept.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Consumes the heap, returning kept items by ascending key.
    pub fn into_sorted_vec(mut self) -> Vec<(K, T)> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(Entry { key, item }) = self.heap.pop() {
            out.push((key, item));
        }
        out.reverse();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Reverse;

    #[test]
    fn keeps_smallest_keys() {
        let mut heap = BoundedHeap::new(3);
        for k in [9, 4, 7, 1, 8, 2] {
            heap.push(k, ());
        }
        let keys: Vec<_> = heap.into_sorted_vec().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![1, 2, 4]);
    }

    #[test]
    fn reversed_keys_keep_largest() {
        let mut heap = BoundedHeap::new(2);
        for k in [3, 10, 6, 8] {
            heap.push(Reverse(k), k);
        }
        let items: Vec<_> = heap.into_sorted_vec().into_iter().map(|(_, v)| v).collect();
        assert_eq!(items, vec![10, 8]);
    }

    #[test]
    fn equal_key_does_not_replace() {
        let mut heap = BoundedHeap::new(1);
        assert!(heap.push(5, "first"));
        assert!(!heap.push(5, "second"));
        assert!(heap.push(4, "third"));
        assert_eq!(heap.into_sorted_vec(), vec![(4, "third")]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut heap = BoundedHeap::new(0);
        assert!(heap.is_full());
        assert!(!heap.push(1, ()));
        assert!(heap.is_empty());
        assert!(heap.worst_key().is_none());
    }

    #[test]
    fn worst_key_tracks_top() {
        let mut heap = BoundedHeap::new(2);
        heap.push(3, ());
        assert!(!heap.is_full());
        heap.push(1, ());
        assert!(heap.is_full());
        assert_eq!(heap.worst_key(), Some(&3));
        heap.push(2, ());
        assert_eq!(heap.worst_key(), Some(&2));
        assert_eq!(heap.len(), 2);
    }
}
