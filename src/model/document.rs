//! Line-indexed document
//!
//! The document is an arena of [`Line`] records indexed by line number. Each
//! line owns its text plus the highlight results last computed for it; the
//! cached exit state is what lets the highlight engine stop propagating as
//! soon as a line's state stops changing.
//!
//! All positions are character offsets into the text with lines joined by a
//! single `\n`, which counts as one character.

use crate::primitives::highlighter::{BlockState, LineHighlight, StyledSpan};
use std::ops::Range;

/// One logical line of the document
#[derive(Debug, Clone, Default)]
pub struct Line {
    text: String,
    char_len: usize,
    /// `None` until the line has been highlighted at least once
    exit_state: Option<BlockState>,
    spans: Vec<StyledSpan>,
}

impl Line {
    fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self {
            text,
            char_len,
            exit_state: None,
            spans: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn exit_state(&self) -> Option<BlockState> {
        self.exit_state
    }

    pub fn spans(&self) -> &[StyledSpan] {
        &self.spans
    }

    fn recount(&mut self) {
        self.char_len = self.text.chars().count();
    }

    fn byte_offset(&self, column: usize) -> usize {
        self.text
            .char_indices()
            .nth(column)
            .map_or(self.text.len(), |(byte, _)| byte)
    }
}

/// Editable text held as a sequence of lines
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<Line>,
    /// Character offset of each line's first character, parallel to `lines`
    line_starts: Vec<usize>,
    len_chars: usize,
    modified: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document (one empty line)
    pub fn new() -> Self {
        Self::with_lines(vec![Line::default()])
    }

    /// Build a document from text. A `\r` before each `\n` is dropped.
    pub fn from_str(text: &str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| Line::new(line.strip_suffix('\r').unwrap_or(line)))
            .collect();
        Self::with_lines(lines)
    }

    fn with_lines(lines: Vec<Line>) -> Self {
        let mut document = Self {
            lines,
            line_starts: Vec::new(),
            len_chars: 0,
            modified: false,
        };
        document.reindex_from(0);
        document
    }

    /// Recompute line start offsets for `from..` after an edit there
    fn reindex_from(&mut self, from: usize) {
        self.line_starts.truncate(from);
        let mut next = match from.checked_sub(1) {
            Some(prev) => self.line_starts[prev] + self.lines[prev].char_len + 1,
            None => 0,
        };
        for line in &self.lines[from..] {
            self.line_starts.push(next);
            next += line.char_len + 1;
        }
        self.len_chars = next - 1;
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Total length in characters, newlines included
    pub fn len_chars(&self) -> usize {
        self.len_chars
    }

    /// The full text with lines joined by `\n`
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.lines.iter().map(|l| l.text.len() + 1).sum());
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(&line.text);
        }
        text
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Convert a character offset to (line, column), clamping to the end
    pub fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len_chars);
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        (line, offset - self.line_starts[line])
    }

    /// Convert (line, column) to a character offset, clamping both
    pub fn position_to_offset(&self, line: usize, column: usize) -> usize {
        let line = line.min(self.lines.len() - 1);
        self.line_starts[line] + column.min(self.lines[line].char_len)
    }

    /// Offset of the first character of `line`
    pub fn line_start(&self, line: usize) -> usize {
        self.position_to_offset(line, 0)
    }

    /// Insert `text` at a character offset.
    ///
    /// Returns the range of lines whose text changed. When the insertion
    /// splits a line, the old cached exit state moves to the last piece,
    /// which is the one that still ends where the old line ended.
    pub fn insert(&mut self, offset: usize, text: &str) -> Range<usize> {
        let (index, column) = self.offset_to_position(offset);
        if text.is_empty() {
            return index..index;
        }
        self.modified = true;

        let line = &mut self.lines[index];
        let split_at = line.byte_offset(column);
        let tail = line.text.split_off(split_at);

        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            line.text.push_str(first);
        }
        let rest: Vec<&str> = pieces.collect();

        let Some((last, middle)) = rest.split_last() else {
            line.text.push_str(&tail);
            line.recount();
            self.reindex_from(index);
            return index..index + 1;
        };

        let carried = line.exit_state.take();
        line.recount();

        let mut inserted: Vec<Line> = middle.iter().map(|piece| Line::new(*piece)).collect();
        let mut last_line = Line::new(format!("{last}{tail}"));
        last_line.exit_state = carried;
        inserted.push(last_line);

        let added = inserted.len();
        self.lines.splice(index + 1..index + 1, inserted);
        self.reindex_from(index);
        index..index + 1 + added
    }

    /// Delete a character range. Returns the range of lines whose text changed.
    pub fn delete(&mut self, range: Range<usize>) -> Range<usize> {
        let total = self.len_chars;
        let start = range.start.min(total);
        let end = range.end.min(total);
        let (start_line, start_col) = self.offset_to_position(start);
        if start >= end {
            return start_line..start_line;
        }
        self.modified = true;

        let (end_line, end_col) = self.offset_to_position(end);
        if start_line == end_line {
            let line = &mut self.lines[start_line];
            let from = line.byte_offset(start_col);
            let to = line.byte_offset(end_col);
            line.text.replace_range(from..to, "");
            line.recount();
            self.reindex_from(start_line);
            return start_line..start_line + 1;
        }

        let last = &self.lines[end_line];
        let tail = last.text[last.byte_offset(end_col)..].to_string();
        let carried = last.exit_state;

        let first = &mut self.lines[start_line];
        let cut = first.byte_offset(start_col);
        first.text.truncate(cut);
        first.text.push_str(&tail);
        first.recount();
        first.exit_state = carried;

        self.lines.drain(start_line + 1..=end_line);
        self.reindex_from(start_line);
        start_line..start_line + 1
    }

    /// Replace the whole text, dropping all cached highlight state
    pub fn set_text(&mut self, text: &str) {
        *self = Self::from_str(text);
        self.modified = true;
    }

    /// Characters from `offset` to the end of the document
    pub fn chars_from(&self, offset: usize) -> impl Iterator<Item = char> + '_ {
        let (start_line, column) = self.offset_to_position(offset);
        let total = self.lines.len();
        self.lines[start_line..]
            .iter()
            .enumerate()
            .flat_map(move |(i, line)| {
                let skip = if i == 0 { column } else { 0 };
                let newline = (start_line + i + 1 < total).then_some('\n');
                line.text.chars().skip(skip).chain(newline)
            })
    }

    /// Characters before `offset`, nearest first
    pub fn chars_before(&self, offset: usize) -> impl Iterator<Item = char> + '_ {
        let (end_line, column) = self.offset_to_position(offset);
        self.lines[..=end_line]
            .iter()
            .rev()
            .enumerate()
            .flat_map(move |(i, line)| {
                let skip = if i == 0 { line.char_len - column } else { 0 };
                let newline = (i > 0).then_some('\n');
                newline.into_iter().chain(line.text.chars().rev().skip(skip))
            })
    }

    /// Store a freshly computed highlight for a line
    pub(crate) fn set_highlight(&mut self, index: usize, highlight: LineHighlight) {
        let line = &mut self.lines[index];
        line.exit_state = Some(highlight.exit_state);
        line.spans = highlight.spans;
    }

    /// Forget every cached highlight
    pub(crate) fn clear_highlights(&mut self) {
        for line in &mut self.lines {
            line.exit_state = None;
            line.spans.clear();
        }
    }
}
