// Highlighting properties checked through the public API

mod common;

use ember::model::document::Document;
use ember::primitives::highlight_engine::HighlightEngine;
use ember::primitives::highlighter::{BlockState, HighlightCategory, RuleSet};
use proptest::prelude::*;

fn exit_states(document: &Document) -> Vec<Option<BlockState>> {
    document.lines().map(|line| line.exit_state()).collect()
}

fn from_scratch(document: &Document) -> Document {
    let mut fresh = Document::from_str(&document.text());
    HighlightEngine::default().highlight_all(&mut fresh);
    fresh
}

/// Short lines drawn from fragments that exercise comment delimiters
fn line_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("/*".to_string()),
            Just("*/".to_string()),
            Just("/".to_string()),
            Just("*".to_string()),
            Just("//".to_string()),
            Just("\"".to_string()),
            Just("int ".to_string()),
            Just("foo(".to_string()),
            Just("#x".to_string()),
            "[a-z0-9 ]{1,4}",
        ],
        0..6,
    )
    .prop_map(|parts| parts.concat())
}

fn document_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(line_strategy(), 1..12)
}

#[derive(Debug, Clone)]
enum Edit {
    Insert { at: usize, text: String },
    Delete { at: usize, len: usize },
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (any::<usize>(), prop_oneof![
            Just("/*".to_string()),
            Just("*/".to_string()),
            Just("\n".to_string()),
            Just("\n/* x\n".to_string()),
            line_strategy(),
        ])
            .prop_map(|(at, text)| Edit::Insert { at, text }),
        (any::<usize>(), 1usize..6).prop_map(|(at, len)| Edit::Delete { at, len }),
    ]
}

#[test]
fn test_comment_state_example() {
    common::tracing::init_tracing_from_env();
    let mut document = Document::from_str("int x; /* start\nstill comment\nend */ int y;");
    HighlightEngine::default().highlight_all(&mut document);

    let first = document.line(0).unwrap();
    assert_eq!(first.exit_state(), Some(BlockState::InComment));
    let comment = first.spans().last().unwrap();
    assert_eq!((comment.start, comment.len), (7, 8));
    assert_eq!(comment.category, HighlightCategory::Comment);

    let second = document.line(1).unwrap();
    assert_eq!(second.spans().len(), 1);
    assert_eq!(second.spans()[0].len, "still comment".len());

    let third = document.line(2).unwrap();
    assert_eq!(third.exit_state(), Some(BlockState::NotInComment));
    assert_eq!(third.spans()[0].range(), 0..6);
    assert_eq!(third.spans()[0].category, HighlightCategory::Comment);
    assert!(third
        .spans()
        .iter()
        .any(|span| span.category == HighlightCategory::Keyword && span.start == 7));
}

proptest! {
    /// Highlighting the same line with the same entry state is deterministic
    #[test]
    fn prop_highlight_line_is_idempotent(
        text in line_strategy(),
        in_comment in any::<bool>(),
    ) {
        let rules = RuleSet::c_family();
        let entry = if in_comment { BlockState::InComment } else { BlockState::NotInComment };
        prop_assert_eq!(rules.highlight_line(&text, entry), rules.highlight_line(&text, entry));
    }

    /// After any sequence of edits, incremental propagation leaves every line
    /// exactly as a from-scratch pass would
    #[test]
    fn prop_incremental_matches_from_scratch(
        lines in document_strategy(),
        edits in prop::collection::vec(edit_strategy(), 1..8),
    ) {
        let engine = HighlightEngine::default();
        let mut document = Document::from_str(&lines.join("\n"));
        engine.highlight_all(&mut document);

        for edit in edits {
            let len = document.len_chars();
            let changed = match edit {
                Edit::Insert { at, text } => document.insert(at % (len + 1), &text),
                Edit::Delete { at, len: count } => {
                    let start = at % (len + 1);
                    document.delete(start..start + count)
                }
            };
            engine.on_edit(&mut document, changed);

            let fresh = from_scratch(&document);
            prop_assert_eq!(exit_states(&document), exit_states(&fresh));
            for (incremental, expected) in document.lines().zip(fresh.lines()) {
                prop_assert_eq!(incremental.spans(), expected.spans());
            }
        }
    }
}
