//! Incremental document highlighting
//!
//! The engine keeps every line's highlight in sync with its text using the
//! per-line exit state cached in the [`Document`]. After an edit it
//! re-highlights the edited lines and then keeps going only while the exit
//! state it computes differs from the one cached for that line. Once a line
//! ends in the same state as before, every later line sees the same entry
//! state as before and its cached result is still correct.
//!
//! # Cost
//! Proportional to the number of lines whose comment state flips. Inserting
//! or deleting a block comment delimiter near the top of a large file is the
//! O(n) worst case.

use crate::model::document::Document;
use crate::primitives::highlighter::{BlockState, RuleSet};
use std::ops::Range;
use std::sync::Arc;

/// Drives a [`RuleSet`] over a document, one line at a time
#[derive(Debug, Clone)]
pub struct HighlightEngine {
    rules: Arc<RuleSet>,
}

impl Default for HighlightEngine {
    fn default() -> Self {
        Self::new(RuleSet::c_family())
    }
}

impl HighlightEngine {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    /// Highlight every line from scratch, ignoring any cached state.
    ///
    /// Used once when a document is loaded.
    pub fn highlight_all(&self, document: &mut Document) -> Range<usize> {
        document.clear_highlights();
        let recomputed = self.propagate(document, 0, document.line_count());
        tracing::debug!(lines = recomputed.len(), "highlighted document");
        recomputed
    }

    /// Bring highlights up to date after the lines in `affected` changed.
    ///
    /// Every line in `affected` is recomputed; lines after it are recomputed
    /// only while the propagated exit state keeps changing. Returns the range
    /// of lines whose spans were recomputed.
    pub fn on_edit(&self, document: &mut Document, affected: Range<usize>) -> Range<usize> {
        let line_count = document.line_count();
        let mut first = affected.start.min(line_count - 1);
        // A predecessor that was never highlighted cannot supply an entry state
        while first > 0 && document.line(first - 1).and_then(|l| l.exit_state()).is_none() {
            first -= 1;
        }
        let recomputed = self.propagate(document, first, affected.end);
        tracing::trace!(
            first = recomputed.start,
            recomputed = recomputed.len(),
            "highlight propagation"
        );
        recomputed
    }

    fn propagate(&self, document: &mut Document, first: usize, must_reach: usize) -> Range<usize> {
        let line_count = document.line_count();
        let mut entry = match first {
            0 => BlockState::NotInComment,
            _ => document
                .line(first - 1)
                .and_then(|line| line.exit_state())
                .unwrap_or_default(),
        };

        let mut index = first;
        while index < line_count {
            let Some(line) = document.line(index) else {
                break;
            };
            let previous = line.exit_state();
            let highlight = self.rules.highlight_line(line.text(), entry);
            let exit = highlight.exit_state;
            document.set_highlight(index, highlight);
            index += 1;
            entry = exit;

            if index >= must_reach && previous == Some(exit) {
                break;
            }
        }
        first..index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::highlighter::HighlightCategory;

    fn states(document: &Document) -> Vec<Option<BlockState>> {
        document.lines().map(|line| line.exit_state()).collect()
    }

    fn fresh_states(document: &Document) -> Vec<Option<BlockState>> {
        let mut copy = Document::from_str(&document.text());
        HighlightEngine::default().highlight_all(&mut copy);
        states(&copy)
    }

    #[test]
    fn test_initial_pass_covers_every_line() {
        let mut doc = Document::from_str("int x; /* start\nstill comment\nend */ int y;");
        let engine = HighlightEngine::default();
        assert_eq!(engine.highlight_all(&mut doc), 0..3);
        assert_eq!(
            states(&doc),
            vec![
                Some(BlockState::InComment),
                Some(BlockState::InComment),
                Some(BlockState::NotInComment)
            ]
        );
        let middle = doc.line(1).unwrap();
        assert_eq!(middle.spans().len(), 1);
        assert_eq!(middle.spans()[0].category, HighlightCategory::Comment);
        assert_eq!(middle.spans()[0].len, 13);
    }

    #[test]
    fn test_edit_without_state_change_stops_immediately() {
        let text = (0..100).map(|i| format!("int v{i} = {i};")).collect::<Vec<_>>().join("\n");
        let mut doc = Document::from_str(&text);
        let engine = HighlightEngine::default();
        engine.highlight_all(&mut doc);

        let changed = doc.insert(doc.line_start(40), "x");
        assert_eq!(engine.on_edit(&mut doc, changed), 40..41);
    }

    #[test]
    fn test_opening_comment_propagates_to_end() {
        let text = (0..20).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut doc = Document::from_str(&text);
        let engine = HighlightEngine::default();
        engine.highlight_all(&mut doc);

        let changed = doc.insert(doc.line_start(5), "/*");
        assert_eq!(engine.on_edit(&mut doc, changed), 5..20);
        assert!(doc
            .lines()
            .skip(5)
            .all(|line| line.exit_state() == Some(BlockState::InComment)));
        assert_eq!(states(&doc), fresh_states(&doc));
    }

    #[test]
    fn test_closing_comment_stops_where_state_stabilizes() {
        let mut doc = Document::from_str("a\n/* b\nc\nd */\ne\nf");
        let engine = HighlightEngine::default();
        engine.highlight_all(&mut doc);

        // Close the comment early: lines 2 and 3 flip, line 4 was already out
        let changed = doc.insert(doc.line_start(1) + 4, " */");
        let recomputed = engine.on_edit(&mut doc, changed);
        assert_eq!(recomputed, 1..4);
        assert_eq!(states(&doc), fresh_states(&doc));
    }

    #[test]
    fn test_multi_line_paste_recomputes_all_pasted_lines() {
        let mut doc = Document::from_str("x\ny");
        let engine = HighlightEngine::default();
        engine.highlight_all(&mut doc);

        let changed = doc.insert(1, "\nint a;\nint b;\n");
        assert_eq!(changed, 0..4);
        let recomputed = engine.on_edit(&mut doc, changed);
        assert_eq!(recomputed.start, 0);
        assert!(recomputed.end >= 4);
        assert_eq!(doc.line(1).unwrap().spans()[0].category, HighlightCategory::Keyword);
    }

    #[test]
    fn test_edit_before_initial_pass_backs_up() {
        let mut doc = Document::from_str("/* a\nb\nc");
        let engine = HighlightEngine::default();
        let recomputed = engine.on_edit(&mut doc, 2..3);
        assert_eq!(recomputed, 0..3);
        assert_eq!(doc.line(2).unwrap().exit_state(), Some(BlockState::InComment));
    }

    #[test]
    fn test_join_lines_propagates_exit_state() {
        let mut doc = Document::from_str("/* a\nb */\nc\nd");
        let engine = HighlightEngine::default();
        engine.highlight_all(&mut doc);

        // Remove "b */" and the newline before it: comment now runs to the end
        let start = doc.line_start(1) - 1;
        let end = doc.line_start(2) - 1;
        let changed = doc.delete(start..end);
        engine.on_edit(&mut doc, changed);
        assert_eq!(states(&doc), fresh_states(&doc));
        assert_eq!(doc.line(2).unwrap().exit_state(), Some(BlockState::InComment));
    }
}
