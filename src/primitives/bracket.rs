//! Bracket matching for the character before the cursor
//!
//! Only the partner of that one bracket is searched for, by walking away
//! from the cursor and counting nesting depth. No bracket tree is built, so
//! the cost is the distance to the partner.
//!
//! Depth only counts the bracket's own kind: a scan for `)` ignores `[`, `]`,
//! `{` and `}`. Mismatched kinds such as `( ... ]` are therefore never
//! reported; the scan simply looks past them.

use crate::model::document::Document;

/// Location of the partner bracket, in character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketMatch {
    pub position: usize,
    pub length: usize,
}

impl BracketMatch {
    fn at(position: usize) -> Self {
        Self {
            position,
            length: 1,
        }
    }
}

/// Which way to scan and what to count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BracketKind {
    Opening { open: char, close: char },
    Closing { open: char, close: char },
}

impl BracketKind {
    fn classify(ch: char) -> Option<Self> {
        let kind = match ch {
            '(' => Self::Opening { open: '(', close: ')' },
            '{' => Self::Opening { open: '{', close: '}' },
            '[' => Self::Opening { open: '[', close: ']' },
            ')' => Self::Closing { open: '(', close: ')' },
            '}' => Self::Closing { open: '{', close: '}' },
            ']' => Self::Closing { open: '[', close: ']' },
            _ => return None,
        };
        Some(kind)
    }
}

/// Whether `ch` is one of the six recognized bracket characters
pub fn is_bracket(ch: char) -> bool {
    BracketKind::classify(ch).is_some()
}

/// Find the partner of the bracket immediately before `cursor` in `text`
pub fn match_at(text: &str, cursor: usize) -> Option<BracketMatch> {
    let before = cursor.checked_sub(1)?;
    let (byte, ch) = text.char_indices().nth(before)?;
    match BracketKind::classify(ch)? {
        BracketKind::Opening { open, close } => {
            let rest = &text[byte + ch.len_utf8()..];
            scan(rest.chars(), open, close).map(|distance| BracketMatch::at(cursor + distance))
        }
        BracketKind::Closing { open, close } => {
            let rest = &text[..byte];
            scan(rest.chars().rev(), close, open)
                .map(|distance| BracketMatch::at(before - 1 - distance))
        }
    }
}

/// Same as [`match_at`] but walks the document's lines directly
pub fn match_in_document(document: &Document, cursor: usize) -> Option<BracketMatch> {
    if cursor > document.len_chars() {
        return None;
    }
    let before = cursor.checked_sub(1)?;
    let ch = document.chars_before(cursor).next()?;
    match BracketKind::classify(ch)? {
        BracketKind::Opening { open, close } => scan(document.chars_from(cursor), open, close)
            .map(|distance| BracketMatch::at(cursor + distance)),
        BracketKind::Closing { open, close } => {
            scan(document.chars_before(cursor).skip(1), close, open)
                .map(|distance| BracketMatch::at(before - 1 - distance))
        }
    }
}

/// Walk `chars` with depth seeded at 1; `same` nests, `partner` unnests.
/// Returns how many characters were stepped over before the partner.
fn scan(chars: impl Iterator<Item = char>, same: char, partner: char) -> Option<usize> {
    let mut depth = 1usize;
    for (distance, ch) in chars.enumerate() {
        if ch == same {
            depth += 1;
        } else if ch == partner {
            depth -= 1;
            if depth == 0 {
                return Some(distance);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both(text: &str, cursor: usize) -> Option<BracketMatch> {
        let direct = match_at(text, cursor);
        let via_document = match_in_document(&Document::from_str(text), cursor);
        assert_eq!(direct, via_document, "string and document scans disagree");
        direct
    }

    #[test]
    fn test_forward_match_outer() {
        let found = both("foo(bar(1,2), baz)", 4).unwrap();
        assert_eq!(found, BracketMatch { position: 17, length: 1 });
    }

    #[test]
    fn test_forward_match_inner() {
        assert_eq!(both("foo(bar(1,2), baz)", 8).unwrap().position, 11);
    }

    #[test]
    fn test_backward_match() {
        assert_eq!(both("foo(bar(1,2), baz)", 18).unwrap().position, 3);
        assert_eq!(both("foo(bar(1,2), baz)", 12).unwrap().position, 7);
    }

    #[test]
    fn test_mismatched_kinds_are_ignored() {
        assert_eq!(both("( ] )", 1).unwrap().position, 4);
        assert_eq!(both("( ] )", 5).unwrap().position, 0);
        // The `]` scans backward for `[` and finds none
        assert_eq!(both("( ] )", 3), None);
    }

    #[test]
    fn test_no_bracket_before_cursor() {
        assert_eq!(both("abc", 2), None);
        assert_eq!(both("(abc)", 0), None);
        assert_eq!(both("", 0), None);
    }

    #[test]
    fn test_cursor_past_end() {
        assert_eq!(both("()", 5), None);
    }

    #[test]
    fn test_unbalanced_has_no_partner() {
        assert_eq!(both("((a)", 1), None);
        assert_eq!(both("a))", 3), None);
    }

    #[test]
    fn test_match_across_lines() {
        let text = "fn main() {\n    if x {\n    }\n}";
        let open = text.find('{').unwrap() + 1;
        let found = both(text, open).unwrap();
        assert_eq!(found.position, text.chars().count() - 1);

        let back = both(text, text.chars().count()).unwrap();
        assert_eq!(back.position, open - 1);
    }

    #[test]
    fn test_multibyte_offsets() {
        // Offsets count characters, so "é" occupies one position
        assert_eq!(both("(é[ü])", 1).unwrap().position, 5);
        assert_eq!(both("(é[ü])", 5).unwrap().position, 2);
        assert_eq!(both("(é[ü])", 3).unwrap().position, 4);
    }

    #[test]
    fn test_is_bracket() {
        assert!("(){}[]".chars().all(is_bracket));
        assert!(!"<>ab".chars().any(is_bracket));
    }
}
