// Editor controller driven the way a front end would drive it

mod common;

use ember::app::{Editor, EditorKey};
use ember::config::Config;
use ember::primitives::highlighter::HighlightCategory;
use ember::view::margin::{BlockGeometry, Viewport};

fn press(editor: &mut Editor, keys: &[EditorKey]) {
    for key in keys {
        editor.handle_key(*key);
    }
}

fn type_str(editor: &mut Editor, text: &str) {
    for ch in text.chars() {
        editor.handle_key(EditorKey::Char(ch));
    }
}

#[test]
fn test_write_function_with_auto_indent() {
    common::tracing::init_tracing_from_env();
    let mut editor = Editor::new(&Config::default());

    type_str(&mut editor, "int main() {");
    press(&mut editor, &[EditorKey::Enter]);
    type_str(&mut editor, "return 0;");
    press(&mut editor, &[EditorKey::Enter]);
    // Dedent the closing brace by hand
    for _ in 0..4 {
        editor.handle_key(EditorKey::Backspace);
    }
    type_str(&mut editor, "}");

    assert_eq!(editor.text(), "int main() {\n    return 0;\n}");
    assert_eq!(editor.bracket_match().map(|m| m.position), Some(11));
    assert_eq!(editor.line_spans(1)[0].category, HighlightCategory::Keyword);
}

#[test]
fn test_open_edit_save_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("widget.cpp");
    std::fs::write(&path, "#include <vector>\nstd::vector<int> v;\n").unwrap();

    let mut editor = Editor::new(&Config::default());
    editor.load(&path).unwrap();
    assert_eq!(
        editor.line_spans(0)[0].category,
        HighlightCategory::Preprocessor
    );
    assert_eq!(
        editor.line_spans(1)[0].category,
        HighlightCategory::ScopedName
    );

    press(&mut editor, &[EditorKey::Down, EditorKey::End]);
    type_str(&mut editor, " // values");
    editor.save(&path).unwrap();

    let mut reopened = Editor::new(&Config::default());
    reopened.load(&path).unwrap();
    assert_eq!(
        reopened.text(),
        "#include <vector>\nstd::vector<int> v; // values\n"
    );
    assert!(!reopened.is_modified());
}

#[test]
fn test_block_comment_typed_then_closed() {
    let mut editor = Editor::with_text(&Config::default(), "a();\nb();\nc();");
    type_str(&mut editor, "/*");
    for line in 0..3 {
        assert!(editor
            .line_spans(line)
            .iter()
            .all(|span| span.category == HighlightCategory::Comment));
    }

    press(&mut editor, &[EditorKey::Down, EditorKey::End]);
    type_str(&mut editor, "*/");
    assert_eq!(editor.dirty_lines(), 1..3);
    assert_eq!(
        editor.line_spans(2)[0].category,
        HighlightCategory::Function
    );
}

#[test]
fn test_gutter_labels_for_editor_lines() {
    let text = (1..=12).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
    let editor = Editor::with_text(&Config::default(), &text);
    let gutter = editor.gutter();
    assert_eq!(gutter.digits(), 2);

    let blocks = BlockGeometry::uniform(editor.document().line_count(), 1);
    let labels = gutter.render(0, &blocks, 3, Viewport::new(0, 5));
    let numbers: Vec<usize> = labels.iter().map(|label| label.line_number).collect();
    assert_eq!(numbers, vec![3, 4, 5, 6, 7, 8]);
    assert_eq!(gutter.cell_text(4), " 4");
}
