//! Bounded FIFO history buffers
//!
//! Every history kept by the core (parameter values, metrics, operation
//! records, audit events, snapshots) is a bounded FIFO: once the retention
//! limit is reached the oldest entry is evicted first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A FIFO buffer that never grows beyond its capacity
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    /// Create a new history with the given retention limit
    ///
    /// A capacity of zero is treated as one so that the latest entry is
    /// always retained.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest if the buffer is full
    pub fn push(&mut self, item: T) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Most recently pushed entry
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Oldest retained entry
    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The retention limit
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all entries, keeping the capacity
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> BoundedHistory<T> {
    /// Owned copy of the retained entries, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a BoundedHistory<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut history = BoundedHistory::new(3);
        history.push(1);
        history.push(2);

        assert_eq!(history.len(), 2);
        assert_eq!(history.oldest(), Some(&1));
        assert_eq!(history.latest(), Some(&2));
    }

    #[test]
    fn test_oldest_evicted_first() {
        let mut history = BoundedHistory::new(3);
        for i in 0..5 {
            history.push(i);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.to_vec(), vec![2, 3, 4]);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut history = BoundedHistory::new(10);
        for i in 0..1000 {
            history.push(i);
            assert!(history.len() <= 10);
        }
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut history = BoundedHistory::new(0);
        history.push(1);
        history.push(2);

        assert_eq!(history.len(), 1);
        assert_eq!(history.latest(), Some(&2));
    }

    #[test]
    fn test_clear() {
        let mut history = BoundedHistory::new(3);
        history.push(1);
        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.capacity(), 3);
    }

    #[test]
    fn test_iter_oldest_first() {
        let mut history = BoundedHistory::new(4);
        for i in [10, 20, 30] {
            history.push(i);
        }

        let collected: Vec<_> = history.iter().copied().collect();
        assert_eq!(collected, vec![10, 20, 30]);
    }
}
