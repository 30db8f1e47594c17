//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Fixed-capacity rolling history."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::collections::VecDeque;

/// Insertion-ordered history holding at most `capacity` items; the oldest
/// entry is evicted first.
#[derive(Debug, Clone)]
pub struct RollingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingBuffer<T> {
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `item`, returning the evicted entry if the bound was exceeded.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed item.
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> RollingBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_once_full() {
        let mut buffer = RollingBuffer::with_capacity(3);
        assert_eq!(buffer.push(1), None);
        assert_eq!(buffer.push(2), None);
        assert_eq!(buffer.push(3), None);
        assert_eq!(buffer.push(4), Some(1));
        assert_eq!(buffer.to_vec(), vec![2, 3, 4]);
        assert_eq!(buffer.latest(), Some(&4));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut buffer = RollingBuffer::with_capacity(20);
        for value in 0..100 {
            buffer.push(value);
            assert!(buffer.len() <= 20);
        }
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), (80..100).collect::<Vec<_>>());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut buffer = RollingBuffer::with_capacity(0);
        buffer.push("a");
        buffer.push("b");
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.to_vec(), vec!["b"]);
    }
}
