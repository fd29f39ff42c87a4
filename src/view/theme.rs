//! Colors used to render highlighted text, the gutter and the terminal transcript

use crate::primitives::highlighter::HighlightCategory;
use crate::services::terminal::session::ChunkKind;
use ratatui::style::{Color, Modifier, Style};

/// A fixed palette. Only the dark palette ships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub editor_fg: Color,
    pub gutter_fg: Color,

    pub syntax_keyword: Color,
    pub syntax_scoped_name: Color,
    pub syntax_function: Color,
    pub syntax_comment: Color,
    pub syntax_string: Color,
    pub syntax_number: Color,
    pub syntax_preprocessor: Color,

    pub terminal_echo: Color,
    pub terminal_stderr: Color,
    pub terminal_info: Color,
    pub terminal_error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            editor_fg: Color::Rgb(0xD4, 0xD4, 0xD4),
            gutter_fg: Color::Rgb(0x85, 0x85, 0x85),
            syntax_keyword: Color::Rgb(0x56, 0x9C, 0xD6),
            syntax_scoped_name: Color::Rgb(0x4E, 0xC9, 0xB0),
            syntax_function: Color::Rgb(0xDC, 0xDC, 0xAA),
            syntax_comment: Color::Rgb(0x6A, 0x99, 0x55),
            syntax_string: Color::Rgb(0xCE, 0x91, 0x78),
            syntax_number: Color::Rgb(0xB5, 0xCE, 0xA8),
            syntax_preprocessor: Color::Rgb(0xBD, 0x63, 0xC5),
            terminal_echo: Color::Rgb(0x56, 0x9C, 0xD6),
            terminal_stderr: Color::Rgb(0xF1, 0x4C, 0x4C),
            terminal_info: Color::Rgb(0x85, 0x85, 0x85),
            terminal_error: Color::Rgb(0xF1, 0x4C, 0x4C),
        }
    }
}

/// Foreground color for a highlight category
pub fn highlight_color(category: HighlightCategory, theme: &Theme) -> Color {
    match category {
        HighlightCategory::Keyword => theme.syntax_keyword,
        HighlightCategory::ScopedName => theme.syntax_scoped_name,
        HighlightCategory::Function => theme.syntax_function,
        HighlightCategory::Comment => theme.syntax_comment,
        HighlightCategory::String => theme.syntax_string,
        HighlightCategory::Number => theme.syntax_number,
        HighlightCategory::Preprocessor => theme.syntax_preprocessor,
    }
}

/// Full style for a highlight category. Keywords are bold, comments italic.
pub fn highlight_style(category: HighlightCategory, theme: &Theme) -> Style {
    let style = Style::default().fg(highlight_color(category, theme));
    match category {
        HighlightCategory::Keyword => style.add_modifier(Modifier::BOLD),
        HighlightCategory::Comment => style.add_modifier(Modifier::ITALIC),
        _ => style,
    }
}

/// Style for a transcript chunk
pub fn chunk_style(kind: ChunkKind, theme: &Theme) -> Style {
    match kind {
        ChunkKind::Echo => Style::default().fg(theme.terminal_echo),
        ChunkKind::Stdout => Style::default().fg(theme.editor_fg),
        ChunkKind::Stderr => Style::default().fg(theme.terminal_stderr),
        ChunkKind::Info => Style::default().fg(theme.terminal_info),
        ChunkKind::Error => Style::default()
            .fg(theme.terminal_error)
            .add_modifier(Modifier::BOLD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_differs_from_stdout() {
        let theme = Theme::dark();
        assert_ne!(
            chunk_style(ChunkKind::Stderr, &theme),
            chunk_style(ChunkKind::Stdout, &theme)
        );
    }

    #[test]
    fn test_keyword_style_is_bold() {
        let style = highlight_style(HighlightCategory::Keyword, &Theme::default());
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(style.fg, Some(Color::Rgb(0x56, 0x9C, 0xD6)));
    }
}
