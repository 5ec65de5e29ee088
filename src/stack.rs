//! Ordered stack of active overlay entries.
//!
//! Every `show` call pushes one [`StackEntry`] with a fresh [`EntryId`], so a
//! token shown twice occupies two entries and each show cycle removes exactly
//! its own entry when it is popped.
//!
//! # Invariants
//!
//! - Entries stay in push order; later entries render on top.
//! - Entry ids are strictly increasing within one stack.
//! - `remove()` for an unknown id returns `None` (no panic).

use crate::token::ViewToken;

/// Identifies one show cycle on the active stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    /// Get the raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// One mounted overlay on the active stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    /// Show cycle this entry belongs to.
    pub id: EntryId,
    /// Token of the mounted view.
    pub token: ViewToken,
}

/// Push-ordered sequence of active overlay entries.
#[derive(Debug, Default)]
pub struct ActiveStack {
    entries: Vec<StackEntry>,
    next_id: u64,
}

impl ActiveStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a token on top, returning the new entry id.
    pub fn push(&mut self, token: ViewToken) -> EntryId {
        self.next_id += 1;
        let id = EntryId(self.next_id);
        self.entries.push(StackEntry { id, token });
        id
    }

    /// Remove the entry with the given id, wherever it sits.
    pub fn remove(&mut self, id: EntryId) -> Option<StackEntry> {
        let pos = self.entries.iter().rposition(|entry| entry.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Check if any entry carries the token.
    pub fn contains(&self, token: &ViewToken) -> bool {
        self.entries.iter().any(|entry| &entry.token == token)
    }

    /// Entries in push order.
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    /// Tokens in push order.
    pub fn tokens(&self) -> Vec<ViewToken> {
        self.entries.iter().map(|entry| entry.token.clone()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut stack = ActiveStack::new();
        let a = stack.push("a".into());
        let b = stack.push("b".into());

        assert!(a < b);
        assert_eq!(stack.tokens(), vec![ViewToken::from("a"), ViewToken::from("b")]);
        assert_eq!(stack.entries().last().map(|e| e.id), Some(b));
    }

    #[test]
    fn test_remove_targets_one_cycle() {
        let mut stack = ActiveStack::new();
        let first = stack.push("a".into());
        let _other = stack.push("b".into());
        let second = stack.push("a".into());

        let removed = stack.remove(first).unwrap();
        assert_eq!(removed.id, first);
        assert_eq!(stack.len(), 2);
        assert!(stack.contains(&"a".into()));

        stack.remove(second);
        assert!(!stack.contains(&"a".into()));
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let mut stack = ActiveStack::new();
        let id = stack.push("a".into());
        stack.remove(id);
        assert!(stack.remove(id).is_none());
        assert!(stack.is_empty());
    }
}
