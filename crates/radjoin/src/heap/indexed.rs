//! Array-backed heap with a key-to-position map.

use std::collections::HashMap;
use std::hash::Hash;

use super::order::{HeapOrder, MissingKeyPolicy, UnitStep};
use super::HeapError;

/// A binary heap over unique keys with mutable priorities.
///
/// Positions are 1-indexed: the root lives at position 1 and the children of
/// position `k` are `2k` and `2k + 1`. `positions[key]` always holds the
/// current position of `key`.
#[derive(Debug, Clone)]
pub struct IndexedHeap<K, P> {
    /// Heap entries; position `k` is stored at `slots[k - 1]`.
    slots: Vec<(K, P)>,
    /// Key to 1-indexed position.
    positions: HashMap<K, usize>,
    order: HeapOrder,
    capacity: usize,
    missing_key: MissingKeyPolicy,
}

impl<K, P> IndexedHeap<K, P>
where
    K: Copy + Eq + Hash,
    P: Copy + PartialOrd,
{
    /// Create an empty heap holding at most `capacity` live entries.
    #[must_use]
    pub fn new(order: HeapOrder, capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
            order,
            capacity,
            missing_key: MissingKeyPolicy::Error,
        }
    }

    /// Create an empty max-heap.
    #[must_use]
    pub fn max_heap(capacity: usize) -> Self {
        Self::new(HeapOrder::Max, capacity)
    }

    /// Create an empty min-heap.
    #[must_use]
    pub fn min_heap(capacity: usize) -> Self {
        Self::new(HeapOrder::Min, capacity)
    }

    /// Set the behaviour of [`decrement`](Self::decrement) on absent keys.
    #[must_use]
    pub const fn with_missing_key_policy(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_key = policy;
        self
    }

    /// The ordering this heap pops by.
    #[inline]
    #[must_use]
    pub const fn order(&self) -> HeapOrder {
        self.order
    }

    /// Maximum number of live entries.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the heap is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check if a key is live in the heap.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.positions.contains_key(&key)
    }

    /// Current priority of a key, if present.
    #[must_use]
    pub fn priority(&self, key: K) -> Option<P> {
        self.positions.get(&key).map(|&pos| self.slots[pos - 1].1)
    }

    /// The extremal entry without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<(K, P)> {
        self.slots.first().copied()
    }

    /// 1-indexed array position of a key, if present.
    #[must_use]
    pub fn position(&self, key: K) -> Option<usize> {
        self.positions.get(&key).copied()
    }

    /// Key stored at a 1-indexed array position.
    #[must_use]
    pub fn key_at(&self, position: usize) -> Option<K> {
        position.checked_sub(1).and_then(|i| self.slots.get(i)).map(|&(key, _)| key)
    }

    /// Insert a new key.
    ///
    /// # Errors
    ///
    /// Returns [`HeapError::DuplicateKey`] if the key is already live and
    /// [`HeapError::CapacityExceeded`] if the heap is full.
    pub fn insert(&mut self, key: K, priority: P) -> Result<(), HeapError> {
        if self.positions.contains_key(&key) {
            return Err(HeapError::DuplicateKey);
        }
        if self.slots.len() >= self.capacity {
            return Err(HeapError::CapacityExceeded { capacity: self.capacity });
        }

        self.slots.push((key, priority));
        let pos = self.slots.len();
        self.positions.insert(key, pos);
        self.sift_up(pos);
        Ok(())
    }

    /// Remove and return the extremal entry.
    pub fn pop(&mut self) -> Option<(K, P)> {
        let last = self.slots.len();
        if last == 0 {
            return None;
        }

        self.swap(1, last);
        let top = self.slots.pop()?;
        self.positions.remove(&top.0);
        if !self.slots.is_empty() {
            self.sift_down(1);
        }
        Some(top)
    }

    /// Change a key's priority, inserting the key if it is absent.
    ///
    /// The entry moves toward the root when the new priority is preferred over
    /// the old one under the heap's ordering, and away from it otherwise.
    ///
    /// # Errors
    ///
    /// Only the insertion path can fail; see [`insert`](Self::insert).
    pub fn set_priority(&mut self, key: K, priority: P) -> Result<(), HeapError> {
        let Some(&pos) = self.positions.get(&key) else {
            return self.insert(key, priority);
        };

        let old = self.slots[pos - 1].1;
        self.slots[pos - 1].1 = priority;
        if self.order.prefers(&priority, &old) {
            self.sift_up(pos);
        } else {
            self.sift_down(pos);
        }
        Ok(())
    }

    /// Lower a key's priority by exactly one unit.
    ///
    /// Unlike [`set_priority`](Self::set_priority) this never inserts.
    ///
    /// # Errors
    ///
    /// Returns [`HeapError::KeyNotFound`] if the key is absent.
    ///
    /// # Panics
    ///
    /// Panics on an absent key when the heap was built with
    /// [`MissingKeyPolicy::Panic`].
    pub fn decrement(&mut self, key: K) -> Result<(), HeapError>
    where
        P: UnitStep,
    {
        let Some(&pos) = self.positions.get(&key) else {
            return match self.missing_key {
                MissingKeyPolicy::Error => Err(HeapError::KeyNotFound),
                MissingKeyPolicy::Panic => panic!("decrement called on a key not in the heap"),
            };
        };

        let slot = &mut self.slots[pos - 1].1;
        *slot = slot.step_down();
        match self.order {
            HeapOrder::Max => self.sift_down(pos),
            HeapOrder::Min => self.sift_up(pos),
        }
        Ok(())
    }

    /// Verify heap ordering and the position map.
    ///
    /// Intended for tests and debug assertions; O(n).
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        if self.positions.len() != self.slots.len() {
            return false;
        }
        for (i, &(key, priority)) in self.slots.iter().enumerate() {
            let pos = i + 1;
            if self.positions.get(&key) != Some(&pos) {
                return false;
            }
            if pos > 1 {
                let parent = self.slots[pos / 2 - 1].1;
                if self.order.prefers(&priority, &parent) {
                    return false;
                }
            }
        }
        true
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.slots.swap(a - 1, b - 1);
        let key_a = self.slots[a - 1].0;
        let key_b = self.slots[b - 1].0;
        self.positions.insert(key_a, a);
        self.positions.insert(key_b, b);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 1 {
            let parent = pos / 2;
            if !self.order.prefers(&self.slots[pos - 1].1, &self.slots[parent - 1].1) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.slots.len();
        loop {
            let left = pos * 2;
            if left > len {
                break;
            }
            let right = left + 1;
            let mut best = left;
            if right <= len && self.order.prefers(&self.slots[right - 1].1, &self.slots[left - 1].1)
            {
                best = right;
            }
            if !self.order.prefers(&self.slots[best - 1].1, &self.slots[pos - 1].1) {
                break;
            }
            self.swap(pos, best);
            pos = best;
        }
    }
}
