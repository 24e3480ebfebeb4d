//! Editor — owns the document and applies commands to it.
//!
//! The editor ties the pieces together: a [`PieceTable`] holding the
//! document, the [`LineEditSession`] for the active line, a [`Renderer`] for
//! the screen, the file path and the [`Options`]. Commands are applied one
//! at a time, each to completion, through [`apply`](Editor::apply).
//!
//! The active line only changes through the session's `switch_to` (vertical
//! motion, absolute jumps) or its structural edits (new line, merging
//! backspace/delete). Every command either succeeds completely or fails
//! without changing the document.

use std::io;
use std::path::{Path, PathBuf};

use pg_term::paint::Painter;

use crate::command::{EditCommand, Motion};
use crate::error::{Boundary, EditError, Result};
use crate::options::Options;
use crate::piece_table::PieceTable;
use crate::position::Position;
use crate::renderer::Renderer;
use crate::session::LineEditSession;

/// What happened as a result of applying a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep going.
    Continue,
    /// The document was written to disk.
    Saved,
    /// The session is closed; the front end should exit.
    Quit,
}

/// The whole editing state for one document.
#[derive(Debug)]
pub struct Editor {
    table: PieceTable,
    /// `None` once the editor has been closed.
    session: Option<LineEditSession>,
    renderer: Renderer,
    path: Option<PathBuf>,
    options: Options,
    modified: bool,
    status: Option<String>,
}

impl Editor {
    // -- Construction -------------------------------------------------------

    /// An unnamed editor over a single empty line.
    ///
    /// # Errors
    ///
    /// Infallible in practice; opening the first line of a fresh table
    /// cannot go out of range.
    pub fn new(width: u16, height: u16, options: Options) -> Result<Self> {
        Self::with_table(PieceTable::new(), None, width, height, options)
    }

    /// Open `path`, or an unnamed buffer when `path` is `None`.
    ///
    /// A file that does not exist yet starts empty and keeps its path; it is
    /// created on the first save.
    ///
    /// # Errors
    ///
    /// [`EditError::Io`] if the file exists but cannot be read.
    pub fn open(path: Option<&Path>, width: u16, height: u16, options: Options) -> Result<Self> {
        let Some(path) = path else {
            return Self::new(width, height, options);
        };

        let table = match PieceTable::from_file(path) {
            Ok(table) => table,
            Err(EditError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "new file");
                PieceTable::new()
            }
            Err(e) => return Err(e),
        };
        Self::with_table(table, Some(path.to_path_buf()), width, height, options)
    }

    /// An editor over an existing table, with the cursor at the origin.
    ///
    /// # Errors
    ///
    /// Infallible in practice; a table always has a line 0.
    pub fn with_table(
        table: PieceTable,
        path: Option<PathBuf>,
        width: u16,
        height: u16,
        options: Options,
    ) -> Result<Self> {
        let session = LineEditSession::with_gap(&table, 0, options.gap_size)?;
        let mut renderer = Renderer::new(width, height);
        renderer.set_pad(options.pad_byte);
        renderer.view_mut().set_scroll_off(options.scroll_off);

        Ok(Self {
            table,
            session: Some(session),
            renderer,
            path,
            options,
            modified: false,
            status: None,
        })
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn table(&self) -> &PieceTable {
        &self.table
    }

    #[inline]
    #[must_use]
    pub const fn session(&self) -> Option<&LineEditSession> {
        self.session.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Whether anything changed since the last save.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline]
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.session.is_none()
    }

    /// Current cursor; the origin once closed.
    #[must_use]
    pub fn cursor(&self) -> Position {
        self.session
            .as_ref()
            .map_or(Position::ZERO, LineEditSession::cursor)
    }

    /// The document as it would be saved right now, uncommitted edits
    /// included.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        match &self.session {
            Some(s) if s.is_dirty() => {
                let mut table = self.table.clone();
                // The bound line is always in range while the session lives.
                if table.replace(s.line(), &s.snapshot()).is_err() {
                    return self.table.serialize();
                }
                table.serialize()
            }
            _ => self.table.serialize(),
        }
    }

    /// Message shown on the bottom row, if any.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Rows PageUp/PageDown move by.
    #[must_use]
    pub const fn page_rows(&self) -> usize {
        let rows = self.renderer.text_rows() as usize;
        if rows > 1 { rows - 1 } else { 1 }
    }

    // -- Commands -----------------------------------------------------------

    /// Apply one command to completion.
    ///
    /// Applying anything after [`EditCommand::Close`] returns
    /// [`Outcome::Quit`] again without touching the document.
    ///
    /// # Errors
    ///
    /// - [`EditError::BoundaryReached`] / [`EditError::OutOfRange`]: nothing
    ///   changed.
    /// - [`EditError::Io`]: saving failed; the document is committed but not
    ///   written.
    pub fn apply(&mut self, cmd: EditCommand) -> Result<Outcome> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Outcome::Quit);
        };
        let table = &mut self.table;

        match cmd {
            EditCommand::InsertByte(b'\t') => {
                session.insert_slice(table, &self.options.tab_bytes())?;
                self.modified = true;
            }
            EditCommand::InsertByte(byte) => {
                session.insert_byte(table, byte)?;
                self.modified = true;
            }
            EditCommand::Backspace => {
                session.backspace(table)?;
                self.modified = true;
            }
            EditCommand::ForwardDelete => {
                session.forward_delete(table)?;
                self.modified = true;
            }
            EditCommand::NewLine => {
                session.handle_separator(table)?;
                self.modified = true;
            }
            EditCommand::MoveCursor(motion) => move_cursor(session, table, motion)?,
            EditCommand::CommitAndSave => {
                session.commit(table)?;
                self.save()?;
                return Ok(Outcome::Saved);
            }
            EditCommand::Close => {
                if let Some(session) = self.session.take() {
                    session.close(&mut self.table)?;
                }
                tracing::debug!(modified = self.modified, "editor closed");
                return Ok(Outcome::Quit);
            }
        }
        Ok(Outcome::Continue)
    }

    /// Write the committed document to the file path.
    fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "buffer has no file path"))?;
        self.table.save(path)?;
        self.modified = false;
        self.status = Some(format!(
            "\"{}\" {}L, {}B written",
            path.display(),
            self.table.line_count(),
            self.table.len_bytes()
        ));
        Ok(())
    }

    /// Discard everything and re-read the file. The cursor keeps its line
    /// (clamped) and returns to column 0.
    ///
    /// # Errors
    ///
    /// [`EditError::Io`] if there is no path or the file cannot be read. The
    /// document is unchanged in that case.
    pub fn reload(&mut self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "buffer has no file path"))?;
        let table = PieceTable::from_file(path)?;
        let line = self.cursor().line.min(table.line_count() - 1);
        self.session = Some(LineEditSession::with_gap(&table, line, self.options.gap_size)?);
        self.table = table;
        self.modified = false;
        Ok(())
    }

    // -- Screen -------------------------------------------------------------

    /// Compose and present a frame. Returns the hardware cursor cell, or
    /// `None` if the cursor is off screen.
    ///
    /// # Errors
    ///
    /// [`EditError::Io`] from the painter.
    pub fn paint(&mut self, painter: &mut impl Painter) -> Result<Option<(u16, u16)>> {
        let cursor = self.cursor();
        self.renderer.frame(
            &self.table,
            self.session.as_ref(),
            cursor,
            self.status.as_deref().map(str::as_bytes),
        );
        self.renderer.present(painter)?;
        Ok(self.renderer.cursor_screen_pos(cursor))
    }

    /// Follow a terminal resize.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.renderer.resize(width, height);
    }

    /// Repaint every cell on the next frame.
    pub const fn force_redraw(&mut self) {
        self.renderer.force_redraw();
    }
}

/// Apply a motion to the session.
///
/// Vertical moves switch lines and clamp the column to the new line.
/// Horizontal moves stay within the line.
fn move_cursor(
    session: &mut LineEditSession,
    table: &mut PieceTable,
    motion: Motion,
) -> Result<()> {
    let cursor = session.cursor();
    match motion {
        Motion::LineStart => session.move_to_column(0),
        Motion::LineEnd => {
            session.move_to_end();
            Ok(())
        }
        Motion::Absolute(pos) => {
            let len = if pos.line == cursor.line {
                session.line_len()
            } else {
                table.line_len(pos.line)?
            };
            if pos.col > len {
                return Err(EditError::column(pos.col, len));
            }
            if pos.line != cursor.line {
                session.switch_to(table, pos.line)?;
            }
            session.move_to_column(pos.col)
        }
        Motion::Relative { d_row, d_col } => {
            let (line, len) = if d_row == 0 {
                (cursor.line, session.line_len())
            } else {
                let last = table.line_count() - 1;
                let target = cursor.line.saturating_add_signed(d_row).min(last);
                if target == cursor.line {
                    let edge = if d_row < 0 { Boundary::Top } else { Boundary::Bottom };
                    return Err(EditError::BoundaryReached(edge));
                }
                (target, table.line_len(target)?)
            };

            let col = match cursor.col.min(len).checked_add_signed(d_col) {
                Some(c) if c <= len => c,
                Some(_) => return Err(EditError::BoundaryReached(Boundary::End)),
                None => return Err(EditError::BoundaryReached(Boundary::Start)),
            };

            if line != cursor.line {
                session.switch_to(table, line)?;
            }
            session.move_to_column(col)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pg_term::paint::RecordingPainter;
    use pretty_assertions::assert_eq;

    fn editor(text: &str) -> Editor {
        Editor::with_table(
            PieceTable::load(text.as_bytes()),
            None,
            20,
            5,
            Options::default(),
        )
        .unwrap()
    }

    fn type_str(ed: &mut Editor, s: &str) {
        for b in s.bytes() {
            ed.apply(EditCommand::InsertByte(b)).unwrap();
        }
    }

    fn mv(ed: &mut Editor, motion: Motion) -> Result<Outcome> {
        ed.apply(EditCommand::MoveCursor(motion))
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn new_is_unnamed_and_empty() {
        let ed = Editor::new(10, 3, Options::default()).unwrap();
        assert!(ed.path().is_none());
        assert_eq!(ed.contents(), b"");
        assert_eq!(ed.cursor(), Position::ZERO);
        assert!(!ed.is_modified());
    }

    #[test]
    fn open_missing_file_keeps_path() {
        let path = std::env::temp_dir().join("pg_editor_missing_dir/new.txt");
        let ed = Editor::open(Some(&path), 10, 3, Options::default()).unwrap();
        assert_eq!(ed.path(), Some(path.as_path()));
        assert_eq!(ed.table().line_count(), 1);
    }

    #[test]
    fn options_reach_the_renderer() {
        let opts = Options::from_set_str("pb=. so=1").unwrap();
        let ed = Editor::new(3, 2, opts).unwrap();
        assert_eq!(ed.renderer().pad(), b'.');
        assert_eq!(ed.renderer().view().scroll_off(), 1);
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn typing_and_newline() {
        let mut ed = editor("");
        type_str(&mut ed, "ab");
        ed.apply(EditCommand::NewLine).unwrap();
        type_str(&mut ed, "cd");
        assert_eq!(ed.contents(), b"ab\ncd");
        assert_eq!(ed.cursor(), Position::new(1, 2));
        assert!(ed.is_modified());
    }

    #[test]
    fn separator_byte_splits_line() {
        let mut ed = editor("xy");
        mv(&mut ed, Motion::RIGHT).unwrap();
        ed.apply(EditCommand::InsertByte(b'\n')).unwrap();
        assert_eq!(ed.table().line_count(), 2);
        assert_eq!(ed.contents(), b"x\ny");
    }

    #[test]
    fn tab_follows_options() {
        let mut ed = editor("");
        ed.apply(EditCommand::InsertByte(b'\t')).unwrap();
        assert_eq!(ed.contents(), b"    ");

        let mut ed = Editor::new(10, 3, Options::from_set_str("noet").unwrap()).unwrap();
        ed.apply(EditCommand::InsertByte(b'\t')).unwrap();
        assert_eq!(ed.contents(), b"\t");
    }

    #[test]
    fn backspace_and_delete_across_lines() {
        let mut ed = editor("ab\ncd");
        mv(&mut ed, Motion::DOWN).unwrap();
        ed.apply(EditCommand::Backspace).unwrap();
        assert_eq!(ed.contents(), b"abcd");
        assert_eq!(ed.cursor(), Position::new(0, 2));

        ed.apply(EditCommand::ForwardDelete).unwrap();
        assert_eq!(ed.contents(), b"abd");
    }

    #[test]
    fn backspace_at_start_is_recoverable() {
        let mut ed = editor("ab");
        let err = ed.apply(EditCommand::Backspace).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(ed.contents(), b"ab");
    }

    // -- Motion -------------------------------------------------------------

    #[test]
    fn vertical_motion_clamps_column() {
        let mut ed = editor("long line\nab\nanother");
        mv(&mut ed, Motion::LineEnd).unwrap();
        assert_eq!(ed.cursor(), Position::new(0, 9));
        mv(&mut ed, Motion::DOWN).unwrap();
        assert_eq!(ed.cursor(), Position::new(1, 2));
        mv(&mut ed, Motion::DOWN).unwrap();
        assert_eq!(ed.cursor(), Position::new(2, 2));
    }

    #[test]
    fn vertical_motion_commits_edits() {
        let mut ed = editor("a\nb");
        type_str(&mut ed, "!");
        mv(&mut ed, Motion::DOWN).unwrap();
        assert_eq!(ed.table().get(0).unwrap().as_bytes(), b"!a");
    }

    #[test]
    fn motion_at_edges_is_boundary() {
        let mut ed = editor("ab\ncd");
        assert!(matches!(
            mv(&mut ed, Motion::UP),
            Err(EditError::BoundaryReached(Boundary::Top))
        ));
        assert!(matches!(
            mv(&mut ed, Motion::LEFT),
            Err(EditError::BoundaryReached(Boundary::Start))
        ));
        mv(&mut ed, Motion::LineEnd).unwrap();
        assert!(matches!(
            mv(&mut ed, Motion::RIGHT),
            Err(EditError::BoundaryReached(Boundary::End))
        ));
        mv(&mut ed, Motion::DOWN).unwrap();
        assert!(matches!(
            mv(&mut ed, Motion::DOWN),
            Err(EditError::BoundaryReached(Boundary::Bottom))
        ));
    }

    #[test]
    fn page_motion_clamps_to_document() {
        let mut ed = editor("0\n1\n2\n3");
        mv(&mut ed, Motion::Relative { d_row: 100, d_col: 0 }).unwrap();
        assert_eq!(ed.cursor(), Position::new(3, 0));
        mv(&mut ed, Motion::Relative { d_row: -100, d_col: 0 }).unwrap();
        assert_eq!(ed.cursor(), Position::new(0, 0));
    }

    #[test]
    fn absolute_motion_validates_before_switching() {
        let mut ed = editor("abc\nde");
        type_str(&mut ed, "X");
        assert!(mv(&mut ed, Motion::Absolute(Position::new(1, 5))).is_err());
        assert_eq!(ed.cursor(), Position::new(0, 1));
        assert!(ed.session().unwrap().is_dirty());
        assert!(mv(&mut ed, Motion::Absolute(Position::new(7, 0))).is_err());

        mv(&mut ed, Motion::Absolute(Position::new(1, 2))).unwrap();
        assert_eq!(ed.cursor(), Position::new(1, 2));
        assert_eq!(ed.table().get(0).unwrap().as_bytes(), b"Xabc");
    }

    // -- Save / close -------------------------------------------------------

    #[test]
    fn save_without_path_is_io_error() {
        let mut ed = editor("abc");
        type_str(&mut ed, "!");
        let err = ed.apply(EditCommand::CommitAndSave).unwrap_err();
        assert!(matches!(err, EditError::Io(_)));
        assert!(!err.is_recoverable());
        // The edit was still committed.
        assert_eq!(ed.table().serialize(), b"!abc");
    }

    #[test]
    fn save_writes_file_and_sets_status() {
        let dir = std::env::temp_dir().join("pg_editor_save_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.txt");
        std::fs::write(&path, b"abc\nde").unwrap();

        let mut ed = Editor::open(Some(&path), 20, 5, Options::default()).unwrap();
        mv(&mut ed, Motion::LineEnd).unwrap();
        type_str(&mut ed, "X");
        assert_eq!(ed.apply(EditCommand::CommitAndSave).unwrap(), Outcome::Saved);
        assert_eq!(std::fs::read(&path).unwrap(), b"abcX\nde");
        assert!(!ed.is_modified());
        assert!(ed.status().unwrap().contains("written"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn reload_discards_edits() {
        let dir = std::env::temp_dir().join("pg_editor_reload_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("r.txt");
        std::fs::write(&path, b"one\ntwo").unwrap();

        let mut ed = Editor::open(Some(&path), 20, 5, Options::default()).unwrap();
        mv(&mut ed, Motion::DOWN).unwrap();
        type_str(&mut ed, "zzz");
        ed.reload().unwrap();
        assert_eq!(ed.contents(), b"one\ntwo");
        assert_eq!(ed.cursor(), Position::new(1, 0));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn close_commits_and_quits() {
        let mut ed = editor("a");
        type_str(&mut ed, "b");
        assert_eq!(ed.apply(EditCommand::Close).unwrap(), Outcome::Quit);
        assert!(ed.is_closed());
        assert_eq!(ed.table().serialize(), b"ba");
        assert_eq!(ed.apply(EditCommand::InsertByte(b'z')).unwrap(), Outcome::Quit);
        assert_eq!(ed.table().serialize(), b"ba");
    }

    // -- Paint --------------------------------------------------------------

    #[test]
    fn paint_returns_cursor_cell() {
        let mut ed = editor("hello\nworld");
        mv(&mut ed, Motion::DOWN).unwrap();
        mv(&mut ed, Motion::RIGHT).unwrap();
        let mut p = RecordingPainter::new();
        let pos = ed.paint(&mut p).unwrap();
        assert_eq!(pos, Some((1, 1)));
        assert_eq!(p.ops.len(), 20 * 5);
    }

    #[test]
    fn paint_shows_status_row() {
        let mut ed = editor("x");
        ed.set_status("hi");
        let mut p = RecordingPainter::new();
        ed.paint(&mut p).unwrap();
        let back = ed.renderer().screen().back();
        assert_eq!(&back.row(4).unwrap()[..2], b"hi");
        ed.clear_status();
        assert!(ed.status().is_none());
    }

    #[test]
    fn page_rows_leaves_one_line_of_overlap() {
        let mut ed = editor("");
        let mut p = RecordingPainter::new();
        ed.paint(&mut p).unwrap();
        assert_eq!(ed.page_rows(), 4);
    }
}
