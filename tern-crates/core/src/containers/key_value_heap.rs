//! A max-heap over a dense key range whose entries can be taken out and put back without losing
//! their value. This is the backing structure of activity-based branching.
use std::ops::AddAssign;
use std::ops::DivAssign;

use super::KeyedVec;
use super::StorageKey;
use crate::tern_assert_moderate;

/// A max-heap keyed by [`StorageKey`]s.
///
/// Every key that was ever added keeps a value, but only the keys in the first `end_position`
/// slots take part in the heap. The others are parked behind it and can be restored with
/// [`KeyValueHeap::restore_key`].
#[derive(Debug, Clone)]
pub struct KeyValueHeap<Key, Value> {
    /// Values in heap order; the value of key `k` lives at `position_of[k]`.
    values: Vec<Value>,
    position_of: KeyedVec<Key, usize>,
    key_at: Vec<Key>,
    end_position: usize,
}

impl<Key: StorageKey, Value> Default for KeyValueHeap<Key, Value> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            position_of: KeyedVec::default(),
            key_at: Vec::new(),
            end_position: 0,
        }
    }
}

impl<Key, Value> KeyValueHeap<Key, Value>
where
    Key: StorageKey + Copy,
    Value: AddAssign<Value> + DivAssign<Value> + PartialOrd + Default + Copy,
{
    /// The key with the highest value, without removing it.
    pub fn peek_max(&self) -> Option<(Key, Value)> {
        if self.end_position == 0 {
            None
        } else {
            Some((self.key_at[0], self.values[0]))
        }
    }

    /// Removes the key with the highest value from the heap and returns it. Its value is kept.
    pub fn pop_max(&mut self) -> Option<Key> {
        let (best, _) = self.peek_max()?;
        self.delete_key(best);
        Some(best)
    }

    pub fn get_value(&self, key: Key) -> Value {
        self.values[self.position_of[key]]
    }

    /// Whether `key` is known to the heap, present or parked.
    pub fn contains_key(&self, key: Key) -> bool {
        key.index() < self.position_of.len()
    }

    pub fn is_key_present(&self, key: Key) -> bool {
        self.contains_key(key) && self.position_of[key] < self.end_position
    }

    /// Adds all keys up to and including `key` that are not yet known, parked with the default
    /// value.
    pub fn grow_to(&mut self, key: Key) {
        while self.position_of.len() <= key.index() {
            let new_key = Key::create_from_index(self.position_of.len());
            let position = self.values.len();
            self.values.push(Value::default());
            self.key_at.push(new_key);
            let _ = self.position_of.push(position);
        }
    }

    pub fn increment(&mut self, key: Key, increment: Value) {
        let position = self.position_of[key];
        self.values[position] += increment;
        if position < self.end_position {
            self.sift_up(position);
        }
    }

    /// Puts a parked key back into the heap; does nothing if it is present already.
    pub fn restore_key(&mut self, key: Key) {
        if self.is_key_present(key) {
            return;
        }
        let position = self.position_of[key];
        tern_assert_moderate!(position >= self.end_position);
        self.swap_positions(position, self.end_position);
        self.end_position += 1;
        self.sift_up(self.end_position - 1);
    }

    /// Parks a key behind the heap; does nothing if it is not present.
    pub fn delete_key(&mut self, key: Key) {
        if !self.is_key_present(key) {
            return;
        }
        let position = self.position_of[key];
        self.end_position -= 1;
        self.swap_positions(position, self.end_position);
        if position < self.end_position {
            self.sift_down(position);
            self.sift_up(position);
        }
    }

    /// Divides every value, parked keys included. Division by a positive constant keeps the heap
    /// order intact.
    pub fn divide_values(&mut self, divisor: Value) {
        for value in self.values.iter_mut() {
            *value /= divisor;
        }
    }

    pub fn num_present(&self) -> usize {
        self.end_position
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.position_of.clear();
        self.key_at.clear();
        self.end_position = 0;
    }

    fn swap_positions(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let key_a = self.key_at[a];
        let key_b = self.key_at[b];
        self.values.swap(a, b);
        self.key_at.swap(a, b);
        self.position_of[key_a] = b;
        self.position_of[key_b] = a;
    }

    fn sift_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if self.values[parent] >= self.values[position] {
                break;
            }
            self.swap_positions(parent, position);
            position = parent;
        }
    }

    fn sift_down(&mut self, mut position: usize) {
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            let mut largest = position;
            if left < self.end_position && self.values[left] > self.values[largest] {
                largest = left;
            }
            if right < self.end_position && self.values[right] > self.values[largest] {
                largest = right;
            }
            if largest == position {
                break;
            }
            self.swap_positions(position, largest);
            position = largest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap_with(values: &[f64]) -> KeyValueHeap<usize, f64> {
        let mut heap = KeyValueHeap::default();
        heap.grow_to(values.len() - 1);
        for (key, value) in values.iter().enumerate() {
            heap.increment(key, *value);
            heap.restore_key(key);
        }
        heap
    }

    #[test]
    fn grown_keys_start_parked() {
        let mut heap: KeyValueHeap<usize, f64> = KeyValueHeap::default();
        heap.grow_to(4);

        assert!(heap.contains_key(4));
        assert!(!heap.is_key_present(4));
        assert_eq!(heap.pop_max(), None);
    }

    #[test]
    fn keys_are_popped_by_decreasing_value() {
        let mut heap = heap_with(&[3.0, 9.0, 1.0, 5.0]);

        let popped: Vec<usize> = std::iter::from_fn(|| heap.pop_max()).collect();
        assert_eq!(popped, vec![1, 3, 0, 2]);
    }

    #[test]
    fn restored_key_keeps_its_value() {
        let mut heap = heap_with(&[3.0, 9.0, 1.0]);
        heap.delete_key(1);
        assert_eq!(heap.peek_max(), Some((0, 3.0)));

        heap.restore_key(1);
        assert_eq!(heap.peek_max(), Some((1, 9.0)));
    }

    #[test]
    fn incrementing_a_parked_key_does_not_restore_it() {
        let mut heap = heap_with(&[1.0, 2.0]);
        heap.delete_key(0);
        heap.increment(0, 10.0);

        assert!(!heap.is_key_present(0));
        assert_eq!(heap.get_value(0), 11.0);
        assert_eq!(heap.pop_max(), Some(1));
    }

    #[test]
    fn dividing_keeps_order() {
        let mut heap = heap_with(&[4.0, 8.0, 2.0]);
        heap.divide_values(2.0);

        assert_eq!(heap.peek_max(), Some((1, 4.0)));
        assert_eq!(heap.get_value(2), 1.0);
    }
}
