// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-capacity FIFO queue with lazy compaction.
//!
//! Items are appended to a backing vector and consumed by advancing a head
//! offset. Consumed slots are only reclaimed once the head has passed half of
//! the backing storage, at which point the unconsumed suffix is moved to a
//! fresh allocation. Enqueue and dequeue are amortized O(1) and the backing
//! storage never holds more than about twice `capacity` slots.
//!
//! ```text
//!  slots: [ taken | taken | item | item | item ]
//!                          ^ head
//!  len = slots.len() - head
//! ```

use crate::error::{ConstructionError, Error};

/// Smallest accepted capacity.
pub const MIN_CAPACITY: usize = 1;

/// Largest accepted capacity.
pub const MAX_CAPACITY: usize = 500;

/// A bounded FIFO queue.
#[derive(Debug, Clone)]
pub struct BoundedQueue<T> {
    slots: Vec<Option<T>>,
    head: usize,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create an empty queue holding at most `capacity` items.
    ///
    /// Fails with [`ConstructionError::QueueSize`] unless
    /// `MIN_CAPACITY <= capacity <= MAX_CAPACITY`.
    pub fn new(capacity: usize) -> Result<Self, ConstructionError> {
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
            return Err(ConstructionError::QueueSize(capacity));
        }
        Ok(Self {
            slots: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        })
    }

    /// Append `item` at the tail.
    ///
    /// Fails with [`Error::CapacityExceeded`] when the queue is full; the
    /// queue is left untouched.
    pub fn enqueue(&mut self, item: T) -> Result<(), Error> {
        if self.is_full() {
            return Err(Error::CapacityExceeded(self.capacity));
        }
        self.slots.push(Some(item));
        Ok(())
    }

    /// Remove and return the head item, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head += 1;

        if self.head * 2 >= self.slots.len() {
            self.compact();
        }
        item
    }

    /// Remove every item, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        std::iter::from_fn(|| self.dequeue()).collect()
    }

    /// Number of items currently held.
    pub fn len(&self) -> usize {
        self.slots.len() - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Move the unconsumed suffix to a fresh backing store.
    fn compact(&mut self) {
        self.slots = self.slots.split_off(self.head);
        self.head = 0;
    }

    #[cfg(test)]
    fn backing_len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[test]
    fn test_new_queue_is_empty() {
        let queue: BoundedQueue<u32> = BoundedQueue::new(20).unwrap();
        assert!(queue.is_empty());
        assert!(!queue.is_full());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.capacity(), 20);
    }

    #[test]
    fn test_capacity_out_of_range() {
        assert_eq!(
            BoundedQueue::<u32>::new(0).unwrap_err(),
            ConstructionError::QueueSize(0)
        );
        assert_eq!(
            BoundedQueue::<u32>::new(501).unwrap_err(),
            ConstructionError::QueueSize(501)
        );
        assert!(BoundedQueue::<u32>::new(1).is_ok());
        assert!(BoundedQueue::<u32>::new(500).is_ok());
    }

    #[test]
    fn test_is_full_tracks_state() {
        let mut queue = BoundedQueue::new(2).unwrap();
        queue.enqueue(1).unwrap();
        assert!(!queue.is_full());
        queue.enqueue(2).unwrap();
        assert!(queue.is_full());
        queue.dequeue();
        assert!(!queue.is_full());
    }

    #[test]
    fn test_capacity_one_is_full_after_single_item() {
        let mut queue = BoundedQueue::new(1).unwrap();
        queue.enqueue(1).unwrap();
        assert!(queue.is_full());
    }

    #[test]
    fn test_enqueue_past_capacity_fails() {
        let mut queue = BoundedQueue::new(3).unwrap();
        queue.enqueue(1).unwrap();
        queue.enqueue(2).unwrap();
        queue.enqueue(3).unwrap();

        match queue.enqueue(4) {
            Err(Error::CapacityExceeded(cap)) => assert_eq!(cap, 3),
            other => panic!("expected CapacityExceeded, got: {:?}", other),
        }
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), Some(3));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_dequeue_frees_exactly_one_slot() {
        let mut queue = BoundedQueue::new(3).unwrap();
        for i in 0..3 {
            queue.enqueue(i).unwrap();
        }
        queue.dequeue();
        assert!(queue.enqueue(3).is_ok());
        assert!(queue.enqueue(4).is_err());
    }

    #[test]
    fn test_dequeue_empty_returns_none() {
        let mut queue: BoundedQueue<u32> = BoundedQueue::new(3).unwrap();
        assert_eq!(queue.dequeue(), None);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_drain_preserves_order() {
        let mut queue = BoundedQueue::new(5).unwrap();
        for c in ["a", "b", "c", "d"] {
            queue.enqueue(c).unwrap();
        }
        assert_eq!(queue.drain(), vec!["a", "b", "c", "d"]);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_compaction_bounds_backing_storage() {
        let capacity = 8;
        let mut queue = BoundedQueue::new(capacity).unwrap();

        for round in 0..1000u32 {
            while !queue.is_full() {
                queue.enqueue(round).unwrap();
            }
            queue.dequeue();
            queue.dequeue();
            assert!(queue.backing_len() <= 2 * capacity);
        }
    }

    #[test]
    fn test_matches_reference_model() {
        // Deterministic pseudo-random interleaving checked against VecDeque.
        let capacity = 7;
        let mut queue = BoundedQueue::new(capacity).unwrap();
        let mut model = VecDeque::new();
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = 0u64;

        for _ in 0..10_000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;

            if state % 3 == 0 {
                assert_eq!(queue.dequeue(), model.pop_front());
            } else {
                let result = queue.enqueue(next);
                if model.len() == capacity {
                    assert!(matches!(result, Err(Error::CapacityExceeded(7))));
                } else {
                    assert!(result.is_ok());
                    model.push_back(next);
                }
                next += 1;
            }
            assert_eq!(queue.len(), model.len());
            assert_eq!(queue.is_empty(), model.is_empty());
            assert_eq!(queue.is_full(), model.len() == capacity);
        }
    }
}
