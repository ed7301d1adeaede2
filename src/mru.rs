//! Most-recently-used tab stack.
//!
//! Ids are kept most-recent-first with no duplicates. The owner removes ids
//! as tabs close, so the stack never holds a closed tab.

use crate::tabs::TabId;
use std::collections::VecDeque;

/// Recency-ordered tab history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MruStack {
    ids: VecDeque<TabId>,
}

impl MruStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `id` to the front, inserting it if absent.
    pub fn touch(&mut self, id: TabId) {
        // Deduplicate: remove existing entry so it moves to the front
        self.ids.retain(|&existing| existing != id);
        self.ids.push_front(id);
    }

    /// Remove `id`. Returns whether it was present.
    pub fn remove(&mut self, id: TabId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&existing| existing != id);
        self.ids.len() != before
    }

    /// Up to `n` most recent ids.
    pub fn peek(&self, n: usize) -> Vec<TabId> {
        self.ids.iter().take(n).copied().collect()
    }

    /// Copy of the whole stack, most recent first.
    pub fn snapshot(&self) -> Vec<TabId> {
        self.ids.iter().copied().collect()
    }

    /// Keep only ids for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(TabId) -> bool) {
        self.ids.retain(|&id| keep(id));
    }

    /// The most recent id.
    pub fn front(&self) -> Option<TabId> {
        self.ids.front().copied()
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(ids: &[TabId]) -> MruStack {
        let mut stack = MruStack::new();
        for &id in ids.iter().rev() {
            stack.touch(id);
        }
        stack
    }

    #[test]
    fn test_touch_moves_to_front() {
        let mut mru = stack(&[1, 2, 3]);
        mru.touch(3);
        assert_eq!(mru.snapshot(), vec![3, 1, 2]);
        mru.touch(4);
        assert_eq!(mru.snapshot(), vec![4, 3, 1, 2]);
    }

    #[test]
    fn test_touch_deduplicates() {
        let mut mru = MruStack::new();
        mru.touch(1);
        mru.touch(1);
        mru.touch(1);
        assert_eq!(mru.len(), 1);
        assert_eq!(mru.front(), Some(1));
    }

    #[test]
    fn test_touch_back_and_forth() {
        let mut mru = MruStack::new();
        mru.touch(10);
        mru.touch(20);
        mru.touch(10);
        assert_eq!(mru.snapshot(), vec![10, 20]);
    }

    #[test]
    fn test_remove() {
        let mut mru = stack(&[1, 2, 3]);
        assert!(mru.remove(2));
        assert_eq!(mru.snapshot(), vec![1, 3]);
        assert!(!mru.remove(42));
        assert_eq!(mru.snapshot(), vec![1, 3]);
    }

    #[test]
    fn test_peek() {
        let mru = stack(&[5, 6, 7]);
        assert_eq!(mru.peek(2), vec![5, 6]);
        assert_eq!(mru.peek(10), vec![5, 6, 7]);
        assert!(mru.peek(0).is_empty());
        assert!(MruStack::new().peek(3).is_empty());
    }

    #[test]
    fn test_retain() {
        let mut mru = stack(&[1, 2, 3, 4]);
        mru.retain(|id| id % 2 == 0);
        assert_eq!(mru.snapshot(), vec![2, 4]);
        assert!(mru.contains(4));
        assert!(!mru.contains(1));
    }
}
