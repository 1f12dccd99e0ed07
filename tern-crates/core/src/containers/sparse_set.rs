//! A set over a dense key range with O(1) insertion, removal and membership tests, and iteration
//! proportional to the number of members.
//!
//! Members are kept contiguously in `dense`; `sparse[k]` holds the position of key `k` in `dense`
//! or [`usize::MAX`] when `k` is absent. Removal swaps the member with the last one, so the
//! iteration order is the insertion order only as long as nothing is removed.

use super::KeyedVec;
use super::StorageKey;
use crate::tern_assert_moderate;

#[derive(Debug, Clone)]
pub(crate) struct SparseSet<T> {
    dense: Vec<T>,
    sparse: KeyedVec<T, usize>,
}

impl<T: StorageKey> Default for SparseSet<T> {
    fn default() -> Self {
        Self {
            dense: Vec::new(),
            sparse: KeyedVec::default(),
        }
    }
}

impl<T: StorageKey + Copy + PartialEq> SparseSet<T> {
    pub(crate) fn len(&self) -> usize {
        self.dense.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub(crate) fn contains(&self, element: T) -> bool {
        self.sparse
            .get(element)
            .is_some_and(|&position| position != usize::MAX)
    }

    /// Returns whether the element was newly inserted.
    pub(crate) fn insert(&mut self, element: T) -> bool {
        if self.contains(element) {
            return false;
        }
        self.sparse.accomodate(element, usize::MAX);
        self.sparse[element] = self.dense.len();
        self.dense.push(element);
        true
    }

    /// Returns whether the element was a member.
    pub(crate) fn remove(&mut self, element: T) -> bool {
        if !self.contains(element) {
            return false;
        }
        let position = self.sparse[element];
        let last = self.dense.len() - 1;
        self.dense.swap(position, last);
        let moved = self.dense[position];
        self.sparse[moved] = position;
        let _ = self.dense.pop();
        self.sparse[element] = usize::MAX;
        tern_assert_moderate!(!self.contains(element));
        true
    }

    pub(crate) fn get(&self, index: usize) -> Option<T> {
        self.dense.get(index).copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.dense.iter().copied()
    }

    pub(crate) fn clear(&mut self) {
        for &element in self.dense.iter() {
            self.sparse[element] = usize::MAX;
        }
        self.dense.clear();
    }
}
