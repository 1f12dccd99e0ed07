use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

use crate::tern_assert_simple;

/// A stack of values partitioned into decision levels.
///
/// Level `0` starts at the bottom of the stack; every [`Trail::new_checkpoint`] opens the next
/// level. Going back to a level removes everything pushed after it was opened.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    current_checkpoint: usize,
    /// `level_starts[i]` is the trail length at the moment level `i + 1` was opened.
    level_starts: Vec<usize>,
    trail: Vec<T>,
}

impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            current_checkpoint: 0,
            level_starts: Vec::new(),
            trail: Vec::new(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn new_checkpoint(&mut self) {
        self.current_checkpoint += 1;
        self.level_starts.push(self.trail.len());
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.current_checkpoint
    }

    /// Position on the trail where `checkpoint` begins.
    pub(crate) fn start_of(&self, checkpoint: usize) -> usize {
        tern_assert_simple!(checkpoint <= self.current_checkpoint);
        if checkpoint == 0 {
            0
        } else {
            self.level_starts[checkpoint - 1]
        }
    }

    /// Removes every level above `new_checkpoint` and yields the removed values, most recent
    /// first.
    pub(crate) fn synchronise(&mut self, new_checkpoint: usize) -> Rev<Drain<'_, T>> {
        tern_assert_simple!(new_checkpoint < self.current_checkpoint);

        let new_trail_len = self.level_starts[new_checkpoint];
        self.current_checkpoint = new_checkpoint;
        self.level_starts.truncate(new_checkpoint);
        self.trail.drain(new_trail_len..).rev()
    }

    pub(crate) fn push(&mut self, elem: T) {
        self.trail.push(elem)
    }

    pub(crate) fn clear(&mut self) {
        self.current_checkpoint = 0;
        self.level_starts.clear();
        self.trail.clear();
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.trail
    }
}
