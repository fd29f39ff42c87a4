//! Line-oriented syntax highlighting with regex rules
//!
//! # Design
//! - **Ordered rules**: every rule is matched globally against the line; later
//!   rules overwrite earlier ones wherever their matches intersect
//! - **Block comments as a second pass**: `/* ... */` handling runs after the
//!   rule list and is the only construct that carries state across lines
//! - **Character offsets**: spans are expressed in chars, not bytes, so they
//!   stay valid for any consumer that indexes text by character
//!
//! String literals are matched with a greedy `".*"` pattern. Escaped quotes
//! are not understood, so `"a\"b"` and `"a" + "b"` both become one span.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::sync::Arc;

const BLOCK_COMMENT_OPEN: &str = "/*";
const BLOCK_COMMENT_CLOSE: &str = "*/";

const KEYWORDS: &[&str] = &[
    "class", "const", "enum", "explicit", "friend", "inline", "namespace", "operator", "private",
    "protected", "public", "signals", "slots", "static", "template", "typedef", "typename",
    "union", "virtual", "volatile", "break", "case", "catch", "continue", "default", "delete",
    "do", "else", "for", "if", "new", "return", "switch", "throw", "try", "while", "auto", "bool",
    "char", "double", "float", "int", "long", "short", "signed", "struct", "unsigned", "void",
    "include", "define", "ifdef", "ifndef", "endif", "undef", "pragma",
];

static C_FAMILY_RULES: Lazy<Arc<RuleSet>> = Lazy::new(|| {
    let keywords = format!(r"\b(?:{})\b", KEYWORDS.join("|"));
    let rules = [
        LexicalRule::new(&keywords, HighlightCategory::Keyword),
        LexicalRule::new(r"\b[A-Za-z0-9_]+::[A-Za-z0-9_]+\b", HighlightCategory::ScopedName),
        // No lookahead in `regex`: capture the identifier and leave the paren unstyled
        LexicalRule::with_group(r"\b([A-Za-z0-9_]+)\(", 1, HighlightCategory::Function),
        LexicalRule::new(r"//[^\n]*", HighlightCategory::Comment),
        LexicalRule::new(r#"".*""#, HighlightCategory::String),
        LexicalRule::new(r"\b[0-9]+\b", HighlightCategory::Number),
        LexicalRule::new(r"#[^\n]*", HighlightCategory::Preprocessor),
    ];
    let rules = rules
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("built-in highlight patterns are valid");
    Arc::new(RuleSet { rules })
});

/// Token class assigned to a styled span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightCategory {
    Keyword,
    /// `identifier::identifier`
    ScopedName,
    /// Identifier immediately followed by `(`
    Function,
    /// Line and block comments
    Comment,
    String,
    Number,
    /// `#` to end of line
    Preprocessor,
}

/// Lexical context carried from the end of one line to the start of the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockState {
    #[default]
    NotInComment,
    InComment,
}

/// A styled sub-range of a single line, in character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledSpan {
    pub start: usize,
    pub len: usize,
    pub category: HighlightCategory,
}

impl StyledSpan {
    pub fn new(start: usize, len: usize, category: HighlightCategory) -> Self {
        Self {
            start,
            len,
            category,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Result of highlighting one line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineHighlight {
    /// Non-overlapping spans in ascending order
    pub spans: Vec<StyledSpan>,
    pub exit_state: BlockState,
}

impl LineHighlight {
    /// Category at a character offset, if any span covers it
    pub fn category_at(&self, offset: usize) -> Option<HighlightCategory> {
        self.spans
            .iter()
            .find(|span| span.range().contains(&offset))
            .map(|span| span.category)
    }
}

/// One (pattern, category) rule
#[derive(Debug, Clone)]
pub struct LexicalRule {
    pattern: Regex,
    /// Capture group whose extent gets styled (0 = whole match)
    group: usize,
    category: HighlightCategory,
}

impl LexicalRule {
    /// Style every match of `pattern` with `category`
    pub fn new(pattern: &str, category: HighlightCategory) -> Result<Self, regex::Error> {
        Self::with_group(pattern, 0, category)
    }

    /// Style only capture group `group` of every match
    pub fn with_group(
        pattern: &str,
        group: usize,
        category: HighlightCategory,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            group,
            category,
        })
    }

    pub fn category(&self) -> HighlightCategory {
        self.category
    }

    /// Byte ranges this rule styles in `text`
    fn byte_ranges<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = Range<usize>> + 'a> {
        if self.group == 0 {
            Box::new(self.pattern.find_iter(text).map(|m| m.range()))
        } else {
            Box::new(
                self.pattern
                    .captures_iter(text)
                    .filter_map(move |caps| caps.get(self.group).map(|m| m.range())),
            )
        }
    }
}

/// Ordered list of lexical rules; registration order is priority order
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<LexicalRule>,
}

impl RuleSet {
    /// Create an empty rule set (block comments are still recognized)
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in C/C++ rule set, compiled once and shared
    pub fn c_family() -> Arc<RuleSet> {
        Arc::clone(&C_FAMILY_RULES)
    }

    /// Build a rule set from (pattern, category) pairs in priority order
    pub fn from_patterns<'a>(
        patterns: impl IntoIterator<Item = (&'a str, HighlightCategory)>,
    ) -> Result<Self, regex::Error> {
        let rules = patterns
            .into_iter()
            .map(|(pattern, category)| LexicalRule::new(pattern, category))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Append a rule. It is applied last, so it wins where it overlaps earlier rules
    pub fn push(&mut self, rule: LexicalRule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Highlight one line given the state carried in from the previous line.
    ///
    /// Pure: the same `(text, entry_state)` always yields the same result.
    pub fn highlight_line(&self, text: &str, entry_state: BlockState) -> LineHighlight {
        let index = CharIndex::new(text);
        let mut formats: Vec<Option<HighlightCategory>> = vec![None; index.char_len()];

        for rule in &self.rules {
            for range in rule.byte_ranges(text) {
                if range.is_empty() {
                    continue;
                }
                paint(&mut formats, index.chars(range), rule.category);
            }
        }

        let (comments, exit_state) = scan_block_comments(text, entry_state);
        for range in comments {
            paint(&mut formats, index.chars(range), HighlightCategory::Comment);
        }

        LineHighlight {
            spans: coalesce(&formats),
            exit_state,
        }
    }
}

/// Find block comment byte ranges on a line and the state at its end.
///
/// With `InComment` the comment is already open at offset 0. The closer is
/// searched from the opener's own start, so `/*/` closes itself.
fn scan_block_comments(text: &str, entry_state: BlockState) -> (Vec<Range<usize>>, BlockState) {
    let mut ranges = Vec::new();
    let mut exit_state = BlockState::NotInComment;

    let mut open = match entry_state {
        BlockState::InComment => Some(0),
        BlockState::NotInComment => find_opener(text, 0),
    };

    while let Some(start) = open {
        match text[start..].find(BLOCK_COMMENT_CLOSE) {
            Some(rel) => {
                let end = start + rel + BLOCK_COMMENT_CLOSE.len();
                ranges.push(start..end);
                open = find_opener(text, end);
            }
            None => {
                ranges.push(start..text.len());
                exit_state = BlockState::InComment;
                break;
            }
        }
    }

    (ranges, exit_state)
}

fn find_opener(text: &str, from: usize) -> Option<usize> {
    text[from..].find(BLOCK_COMMENT_OPEN).map(|rel| from + rel)
}

fn paint(formats: &mut [Option<HighlightCategory>], range: Range<usize>, category: HighlightCategory) {
    for slot in &mut formats[range] {
        *slot = Some(category);
    }
}

/// Collapse a per-character format array into runs
fn coalesce(formats: &[Option<HighlightCategory>]) -> Vec<StyledSpan> {
    let mut spans: Vec<StyledSpan> = Vec::new();
    for (offset, format) in formats.iter().enumerate() {
        let Some(category) = *format else {
            continue;
        };
        match spans.last_mut() {
            Some(last) if last.category == category && last.end() == offset => last.len += 1,
            _ => spans.push(StyledSpan::new(offset, 1, category)),
        }
    }
    spans
}

/// Byte offset to char offset lookup for one line
struct CharIndex {
    /// Byte offset where each char starts, plus the total byte length
    starts: Vec<usize>,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        let mut starts: Vec<usize> = text.char_indices().map(|(byte, _)| byte).collect();
        starts.push(text.len());
        Self { starts }
    }

    fn char_len(&self) -> usize {
        self.starts.len() - 1
    }

    fn char_at(&self, byte: usize) -> usize {
        self.starts.partition_point(|&start| start < byte)
    }

    fn chars(&self, bytes: Range<usize>) -> Range<usize> {
        self.char_at(bytes.start)..self.char_at(bytes.end)
    }
}
