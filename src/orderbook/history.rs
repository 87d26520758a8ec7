use std::collections::VecDeque;

/// Fixed-capacity buffer that drops its oldest item on overflow.
/// Iteration is oldest first.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an item, returning the evicted oldest item if the buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.capacity {
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

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> RingBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_below_capacity() {
        let mut buf = RingBuffer::new(4);
        for i in 0..3 {
            assert_eq!(buf.push(i), None);
        }
        assert_eq!(buf.to_vec(), vec![0, 1, 2]);
        assert_eq!(buf.last(), Some(&2));
    }

    #[test]
    fn evicts_oldest_on_overflow() {
        let mut buf = RingBuffer::new(3);
        for i in 0..3 {
            buf.push(i);
        }
        assert_eq!(buf.push(3), Some(0));
        assert_eq!(buf.push(4), Some(1));
        assert_eq!(buf.to_vec(), vec![2, 3, 4]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut buf = RingBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
        buf.push("a");
        assert_eq!(buf.push("b"), Some("a"));
        assert_eq!(buf.to_vec(), vec!["b"]);
    }
}
