//! Fixed-capacity rolling history for one metric series.

use std::collections::VecDeque;

/// FIFO buffer that never grows past its capacity: pushing at
/// capacity drops the oldest value. Capacity is fixed at construction
/// (`history_window / scan_interval`, computed once at startup).
#[derive(Debug, Clone)]
pub struct History {
    buf: VecDeque<f32>,
    capacity: usize,
}

impl History {
    /// Create an empty history. Capacity has a floor of one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, dropping the oldest if at capacity.
    pub fn push(&mut self, value: f32) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(value);
    }

    /// Current values, oldest first.
    pub fn values(&self) -> Vec<f32> {
        self.buf.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_drops_oldest_at_capacity() {
        let mut history = History::new(3);
        for value in [1.0, 2.0, 3.0, 4.0] {
            history.push(value);
        }
        assert_eq!(history.values(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn never_grows_past_capacity() {
        let mut history = History::new(5);
        for i in 0..100 {
            history.push(i as f32);
            assert!(history.len() <= 5);
        }
        assert_eq!(history.values(), vec![95.0, 96.0, 97.0, 98.0, 99.0]);
    }

    #[test]
    fn partial_fill_keeps_insertion_order() {
        let mut history = History::new(10);
        history.push(7.0);
        history.push(8.0);
        assert_eq!(history.values(), vec![7.0, 8.0]);
    }

    #[test]
    fn zero_capacity_clamped_to_one() {
        let mut history = History::new(0);
        history.push(1.0);
        history.push(2.0);
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.values(), vec![2.0]);
    }
}
