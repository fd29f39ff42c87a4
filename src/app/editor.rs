//! Editor controller
//!
//! Owns the document and keeps everything derived from it current: after each
//! edit the highlight engine updates the affected lines, the gutter learns the
//! new line count, and the bracket match follows the cursor.

use crate::config::{Config, EditorConfig};
use crate::model::document::Document;
use crate::primitives::bracket::{match_in_document, BracketMatch};
use crate::primitives::highlight_engine::HighlightEngine;
use crate::primitives::highlighter::StyledSpan;
use crate::view::margin::Gutter;
use anyhow::{Context, Result};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Keys the controller understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Char(char),
    Tab,
    Enter,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

pub struct Editor {
    config: EditorConfig,
    document: Document,
    engine: HighlightEngine,
    gutter: Gutter,
    /// Character offset into the document
    cursor: usize,
    /// Column kept while moving vertically through shorter lines
    goal_column: Option<usize>,
    bracket_matching: bool,
    bracket_match: Option<BracketMatch>,
    dirty_lines: Range<usize>,
    path: Option<PathBuf>,
}

impl Editor {
    pub fn new(config: &Config) -> Self {
        let mut editor = Self {
            config: config.editor.clone(),
            document: Document::new(),
            engine: HighlightEngine::default(),
            gutter: Gutter::new(config.gutter, 1),
            cursor: 0,
            goal_column: None,
            bracket_matching: config.editor.bracket_matching,
            bracket_match: None,
            dirty_lines: 0..0,
            path: None,
        };
        editor.reset_derived_state();
        editor
    }

    /// An editor holding `text`, unmodified
    pub fn with_text(config: &Config, text: &str) -> Self {
        let mut editor = Self::new(config);
        editor.document = Document::from_str(text);
        editor.reset_derived_state();
        editor
    }

    /// Replace the document with the contents of `path`.
    ///
    /// On failure the current document is left exactly as it was.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let text = String::from_utf8(bytes)
            .with_context(|| format!("{} is not valid UTF-8", path.display()))?;

        self.document = Document::from_str(&text);
        self.path = Some(path.to_path_buf());
        self.reset_derived_state();
        tracing::info!(
            "Loaded {} ({} lines)",
            path.display(),
            self.document.line_count()
        );
        Ok(())
    }

    /// Write the document to `path` and mark it unmodified.
    ///
    /// On failure the modified flag is left as it was.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Err(e) = std::fs::write(path, self.document.text()) {
            tracing::warn!("Failed to save {}: {}", path.display(), e);
            return Err(e).with_context(|| format!("Failed to write {}", path.display()));
        }
        self.document.set_modified(false);
        self.path = Some(path.to_path_buf());
        tracing::info!("Saved {}", path.display());
        Ok(())
    }

    /// Path of the last successful load or save
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> String {
        self.document.text()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn is_modified(&self) -> bool {
        self.document.is_modified()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn gutter(&self) -> &Gutter {
        &self.gutter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// (line, column), both 0-based
    pub fn cursor_position(&self) -> (usize, usize) {
        self.document.offset_to_position(self.cursor)
    }

    /// Line holding the cursor, for the current-line highlight
    pub fn current_line(&self) -> usize {
        self.cursor_position().0
    }

    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.document.len_chars());
        self.goal_column = None;
        self.update_bracket_match();
    }

    /// Highlighted spans of one line; empty past the end of the document
    pub fn line_spans(&self, line: usize) -> &[StyledSpan] {
        self.document.line(line).map_or(&[], |line| line.spans())
    }

    pub fn bracket_match(&self) -> Option<BracketMatch> {
        self.bracket_match
    }

    /// Flip bracket matching on or off and return the new setting
    pub fn toggle_bracket_matching(&mut self) -> bool {
        self.bracket_matching = !self.bracket_matching;
        self.update_bracket_match();
        self.bracket_matching
    }

    /// Lines whose highlighting was recomputed by the last edit
    pub fn dirty_lines(&self) -> Range<usize> {
        self.dirty_lines.clone()
    }

    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let text = text.replace("\r\n", "\n");
        let changed = self.document.insert(self.cursor, &text);
        self.cursor += text.chars().count();
        self.after_edit(changed);
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.insert_text(ch.encode_utf8(&mut buf));
    }

    /// Delete the character before the cursor. Returns false at the start.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let changed = self.document.delete(self.cursor - 1..self.cursor);
        self.cursor -= 1;
        self.after_edit(changed);
        true
    }

    /// Delete the character after the cursor. Returns false at the end.
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.document.len_chars() {
            return false;
        }
        let changed = self.document.delete(self.cursor..self.cursor + 1);
        self.after_edit(changed);
        true
    }

    /// Apply one key. Returns true if the text changed.
    pub fn handle_key(&mut self, key: EditorKey) -> bool {
        match key {
            EditorKey::Char(ch) => {
                self.insert_char(ch);
                true
            }
            EditorKey::Tab => {
                self.insert_text(&" ".repeat(self.config.tab_width));
                true
            }
            EditorKey::Enter => {
                let newline = format!("\n{}", self.indent_for_new_line());
                self.insert_text(&newline);
                true
            }
            EditorKey::Backspace => self.backspace(),
            EditorKey::Delete => self.delete_forward(),
            EditorKey::Left => {
                self.set_cursor(self.cursor.saturating_sub(1));
                false
            }
            EditorKey::Right => {
                self.set_cursor(self.cursor + 1);
                false
            }
            EditorKey::Up => {
                self.move_vertically(-1);
                false
            }
            EditorKey::Down => {
                self.move_vertically(1);
                false
            }
            EditorKey::Home => {
                let (line, _) = self.cursor_position();
                self.set_cursor(self.document.line_start(line));
                false
            }
            EditorKey::End => {
                let (line, _) = self.cursor_position();
                let len = self.document.line(line).map_or(0, |l| l.char_len());
                self.set_cursor(self.document.line_start(line) + len);
                false
            }
        }
    }

    /// Leading whitespace of the cursor's line, plus one level when the line
    /// ends with an indent trigger
    fn indent_for_new_line(&self) -> String {
        if !self.config.auto_indent {
            return String::new();
        }
        let text = self
            .document
            .line(self.current_line())
            .map_or("", |line| line.text());
        let mut indent: String = text.chars().take_while(|c| c.is_whitespace()).collect();
        let trimmed = text.trim_end();
        if self
            .config
            .indent_triggers
            .iter()
            .any(|trigger| trimmed.ends_with(trigger.as_str()))
        {
            indent.push_str(&" ".repeat(self.config.tab_width));
        }
        indent
    }

    fn move_vertically(&mut self, delta: isize) {
        let (line, column) = self.cursor_position();
        let goal = *self.goal_column.get_or_insert(column);
        let target = line.checked_add_signed(delta);
        let Some(target) = target.filter(|&t| t < self.document.line_count()) else {
            return;
        };
        self.cursor = self.document.position_to_offset(target, goal);
        self.update_bracket_match();
    }

    fn after_edit(&mut self, changed: Range<usize>) {
        let recomputed = self.engine.on_edit(&mut self.document, changed.clone());
        self.dirty_lines = changed.start.min(recomputed.start)..changed.end.max(recomputed.end);
        self.gutter.set_line_count(self.document.line_count());
        self.goal_column = None;
        self.update_bracket_match();
    }

    fn reset_derived_state(&mut self) {
        self.dirty_lines = self.engine.highlight_all(&mut self.document);
        self.gutter.set_line_count(self.document.line_count());
        self.cursor = 0;
        self.goal_column = None;
        self.update_bracket_match();
    }

    fn update_bracket_match(&mut self) {
        self.bracket_match = if self.bracket_matching {
            match_in_document(&self.document, self.cursor)
        } else {
            None
        };
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("lines", &self.document.line_count())
            .field("cursor", &self.cursor)
            .field("modified", &self.document.is_modified())
            .field("path", &self.path)
            .finish()
    }
}
