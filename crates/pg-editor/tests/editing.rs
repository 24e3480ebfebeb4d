//! End-to-end editing: keys in, bytes on disk and cells on screen out.

use std::fs;
use std::path::PathBuf;

use pg_editor::command::{self, EditCommand, Motion};
use pg_editor::options::Options;
use pg_editor::{Editor, Outcome};
use pg_term::input::Parser;
use pg_term::paint::{AnsiPainter, PaintOp, RecordingPainter};
use pretty_assertions::assert_eq;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("pg_editor_it").join(name);
    fs::create_dir_all(&dir).unwrap();
    dir.join("doc.txt")
}

/// Feed raw terminal bytes through the key decoder into the editor.
fn drive(ed: &mut Editor, keys: &[u8]) -> Vec<Outcome> {
    let mut parser = Parser::new();
    let mut events = parser.advance(keys);
    events.extend(parser.flush());

    let mut outcomes = Vec::new();
    for key in events {
        if let Some(cmd) = command::from_key(key, ed.page_rows()) {
            match ed.apply(cmd) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => assert!(e.is_recoverable(), "unexpected failure: {e}"),
            }
        }
    }
    outcomes
}

#[test]
fn append_then_save_scenario() {
    let path = scratch("append");
    fs::write(&path, b"abc\nde").unwrap();

    let mut ed = Editor::open(Some(&path), 20, 4, Options::default()).unwrap();
    ed.apply(EditCommand::MoveCursor(Motion::Absolute(
        pg_editor::position::Position::new(0, 3),
    )))
    .unwrap();
    ed.apply(EditCommand::InsertByte(b'X')).unwrap();
    assert_eq!(ed.apply(EditCommand::CommitAndSave).unwrap(), Outcome::Saved);

    assert_eq!(fs::read(&path).unwrap(), b"abcX\nde");
}

#[test]
fn keystrokes_edit_and_save_through_the_decoder() {
    let path = scratch("keys");
    fs::write(&path, b"abc\nde\n").unwrap();

    let mut ed = Editor::open(Some(&path), 20, 6, Options::default()).unwrap();
    // Right, Enter (split "abc" after 'a'), Down, End, "!", Ctrl-S, Ctrl-Q.
    let outcomes = drive(&mut ed, b"\x1b[C\r\x1b[B\x1b[F!\x13\x11");

    assert_eq!(outcomes.last(), Some(&Outcome::Quit));
    assert!(outcomes.contains(&Outcome::Saved));
    assert_eq!(fs::read(&path).unwrap(), b"a\nbc\nde!\n");
    assert!(ed.is_closed());
}

#[test]
fn boundary_keys_change_nothing() {
    let mut ed = Editor::new(10, 3, Options::default()).unwrap();
    // Backspace, Left and Up at the origin of an empty document.
    drive(&mut ed, b"\x7f\x1b[D\x1b[A");
    assert_eq!(ed.contents(), b"");
    assert!(!ed.is_modified());
}

#[test]
fn unnamed_buffer_cannot_save() {
    let mut ed = Editor::new(10, 3, Options::default()).unwrap();
    drive(&mut ed, b"hi");
    let err = ed.apply(EditCommand::CommitAndSave).unwrap_err();
    assert!(!err.is_recoverable());
    assert!(err.to_string().contains("no file path"));
}

#[test]
fn edits_repaint_only_changed_cells() {
    let mut ed = Editor::new(8, 3, Options::default()).unwrap();
    let mut painter = RecordingPainter::new();
    ed.paint(&mut painter).unwrap();
    assert_eq!(painter.full_frames, 1);
    painter.clear();

    drive(&mut ed, b"ok");
    let cursor = ed.paint(&mut painter).unwrap();
    assert_eq!(
        painter.ops,
        vec![
            PaintOp { row: 0, col: 0, byte: b'o' },
            PaintOp { row: 0, col: 1, byte: b'k' },
        ]
    );
    assert_eq!(cursor, Some((0, 2)));

    painter.clear();
    ed.paint(&mut painter).unwrap();
    assert!(painter.ops.is_empty(), "an unchanged frame paints nothing");
}

#[test]
fn scrolling_follows_the_cursor() {
    let text: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
    let path = scratch("scroll");
    fs::write(&path, text.join("\n")).unwrap();

    let mut ed = Editor::open(Some(&path), 10, 5, Options::from_set_str("so=1").unwrap()).unwrap();
    let mut painter = RecordingPainter::new();
    ed.paint(&mut painter).unwrap();

    // PageDown twice.
    drive(&mut ed, b"\x1b[6~\x1b[6~");
    let cursor = ed.paint(&mut painter).unwrap();
    assert_eq!(ed.cursor().line, 8);
    let (row, _) = cursor.unwrap();
    assert!(row < 5);
    let top = ed.renderer().view().top_line();
    assert_eq!(
        ed.renderer().screen().front().row(row).unwrap(),
        format!("{:<10}", text[top + usize::from(row)]).as_bytes()
    );
}

#[test]
fn ansi_output_contains_text_and_cursor_moves() {
    let mut ed = Editor::new(6, 2, Options::default()).unwrap();
    drive(&mut ed, b"hey");
    let mut painter = AnsiPainter::new(Vec::new());
    let cursor = ed.paint(&mut painter).unwrap();
    painter.place_cursor(cursor).unwrap();

    let out = String::from_utf8_lossy(painter.writer()).into_owned();
    assert!(out.contains("hey"));
    assert!(out.ends_with("\x1b[1;4H\x1b[?25h"));
}
