//! Utility types.

use std::{collections::VecDeque, hash::Hash};

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;

/// A FIFO work queue that ignores values which are already pending.
#[derive(Debug)]
pub struct Queue<T> {
    queue: VecDeque<T>,
    pending: Set<T>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            pending: Set::default(),
        }
    }
}

impl<T> Queue<T>
where
    T: Clone + Eq + Hash,
{
    pub fn push(&mut self, value: T) -> bool {
        if self.pending.insert(value.clone()) {
            self.queue.push_back(value);
            true
        } else {
            false
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        let value = self.queue.pop_front()?;
        self.pending.swap_remove(&value);
        Some(value)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> FromIterator<T> for Queue<T>
where
    T: Clone + Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Self::default();
        for value in iter {
            queue.push(value);
        }
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_skips_pending_duplicates() {
        let mut queue: Queue<u32> = [3, 1, 3, 2].into_iter().collect();
        assert!(!queue.push(1));
        assert_eq!(queue.pop(), Some(3));
        assert!(queue.push(3));
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }
}
