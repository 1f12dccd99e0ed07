use std::marker::PhantomData;

use super::StorageKey;

/// Hands out fresh keys in increasing order.
///
/// The grounder uses one to number the nogoods it registers.
#[derive(Clone, Copy, Debug)]
pub struct KeyGenerator<Key> {
    key: PhantomData<Key>,
    counter: usize,
}

impl<Key> Default for KeyGenerator<Key> {
    fn default() -> Self {
        Self {
            key: PhantomData,
            counter: 0,
        }
    }
}

impl<Key: StorageKey> KeyGenerator<Key> {
    pub fn next_key(&mut self) -> Key {
        let key = Key::create_from_index(self.counter);
        self.counter += 1;
        key
    }

    /// The number of keys handed out so far.
    pub fn num_generated(&self) -> usize {
        self.counter
    }
}
