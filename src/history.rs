use std::collections::VecDeque;

/// Fixed-capacity FIFO log
///
/// Once the buffer is full every push evicts the oldest entry first, so the
/// contents are always the most recent `capacity` items in insertion order.
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    /// Create an empty history holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, returning the evicted oldest entry when full
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }

        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate entries oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Most recently pushed entry
    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> BoundedHistory<T> {
    /// Copy out entries in chronological order
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_below_capacity() {
        let mut history = BoundedHistory::new(3);
        assert!(history.is_empty());
        assert_eq!(history.push(1), None);
        assert_eq!(history.push(2), None);

        assert_eq!(history.len(), 2);
        assert_eq!(history.to_vec(), vec![1, 2]);
        assert_eq!(history.latest(), Some(&2));
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut history = BoundedHistory::new(100);
        let mut evicted = Vec::new();
        for i in 0..105 {
            if let Some(old) = history.push(i) {
                evicted.push(old);
            }
        }

        assert_eq!(history.len(), 100);
        assert_eq!(evicted, vec![0, 1, 2, 3, 4]);
        assert_eq!(history.iter().next(), Some(&5));
        assert_eq!(history.latest(), Some(&104));
    }

    #[test]
    fn test_chronological_order_after_wrap() {
        let mut history = BoundedHistory::new(3);
        for c in ['a', 'b', 'c', 'd', 'e'] {
            history.push(c);
        }
        assert_eq!(history.to_vec(), vec!['c', 'd', 'e']);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = BoundedHistory::new(0);
        assert_eq!(history.push("x"), Some("x"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut history = BoundedHistory::new(2);
        history.push(1);
        history.push(2);
        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.capacity(), 2);
    }
}
