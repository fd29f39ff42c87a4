//! Bounded command history with a draft slot
//!
//! The cursor is `None` while the user is editing a fresh line ("at end").
//! Stepping back from there stashes the visible input as the draft, and
//! stepping forward past the newest entry brings it back.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    capacity: usize,
    cursor: Option<usize>,
    draft: String,
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            cursor: None,
            draft: String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Record a submitted command and return the cursor to the end.
    ///
    /// A repeat of the newest entry is not stored again. Returns whether the
    /// command was added.
    pub fn push(&mut self, command: &str) -> bool {
        self.cursor = None;
        self.draft.clear();
        if self.entries.back().map(String::as_str) == Some(command) {
            return false;
        }
        self.entries.push_back(command.to_string());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    /// Step to the previous entry.
    ///
    /// `current_input` is what the input line shows right now; it becomes the
    /// draft when leaving the end. Returns the text to show, or `None` when
    /// nothing changed.
    pub fn navigate_up(&mut self, current_input: &str) -> Option<&str> {
        let index = match self.cursor {
            None if self.entries.is_empty() => return None,
            None => {
                self.draft = current_input.to_string();
                self.entries.len() - 1
            }
            Some(0) => return None,
            Some(i) => i - 1,
        };
        self.cursor = Some(index);
        Some(&self.entries[index])
    }

    /// Step to the next entry, or back to the draft after the newest one.
    /// Returns `None` when already at the end.
    pub fn navigate_down(&mut self) -> Option<String> {
        let next = self.cursor? + 1;
        if next >= self.entries.len() {
            self.cursor = None;
            return Some(std::mem::take(&mut self.draft));
        }
        self.cursor = Some(next);
        Some(self.entries[next].clone())
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_capacity_evicts_oldest() {
        let mut history = CommandHistory::new(50);
        for i in 0..55 {
            assert!(history.push(&format!("cmd {i}")));
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.entries().next(), Some("cmd 5"));
        assert_eq!(history.entries().last(), Some("cmd 54"));
    }

    #[test]
    fn test_navigate_up_reaches_oldest_then_stops() {
        let mut history = CommandHistory::new(50);
        for i in 0..55 {
            history.push(&format!("cmd {i}"));
        }
        let mut shown = String::new();
        for _ in 0..50 {
            shown = history.navigate_up(&shown).unwrap().to_string();
        }
        assert_eq!(shown, "cmd 5");
        assert_eq!(history.cursor(), Some(0));
        assert_eq!(history.navigate_up(&shown), None);
        assert_eq!(history.cursor(), Some(0));
    }

    #[test]
    fn test_consecutive_duplicates_suppressed() {
        let mut history = CommandHistory::default();
        assert!(history.push("ls"));
        assert!(!history.push("ls"));
        assert_eq!(history.len(), 1);

        history.push("pwd");
        assert!(history.push("ls"));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_draft_restored_after_browsing() {
        let mut history = CommandHistory::default();
        history.push("first");
        history.push("second");

        assert_eq!(history.navigate_up("half-typed"), Some("second"));
        assert_eq!(history.navigate_up("second"), Some("first"));
        assert_eq!(history.navigate_down().as_deref(), Some("second"));
        assert_eq!(history.navigate_down().as_deref(), Some("half-typed"));
        assert_eq!(history.cursor(), None);
        assert_eq!(history.navigate_down(), None);
    }

    #[test]
    fn test_navigation_on_empty_history() {
        let mut history = CommandHistory::default();
        assert_eq!(history.navigate_up("text"), None);
        assert_eq!(history.navigate_down(), None);
        assert_eq!(history.draft(), "");
    }

    #[test]
    fn test_push_resets_cursor_even_for_duplicate() {
        let mut history = CommandHistory::default();
        history.push("make");
        history.navigate_up("");
        assert_eq!(history.cursor(), Some(0));
        history.push("make");
        assert_eq!(history.cursor(), None);
    }
}
