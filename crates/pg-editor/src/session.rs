//! Line edit session — binds one piece table line to the gap buffer.
//!
//! Exactly one line is mutable at a time. The session copies that line's
//! piece into a [`GapBuffer`], absorbs edits there, and writes the result
//! back with [`commit`](LineEditSession::commit). Changing the active line
//! always goes through [`switch_to`](LineEditSession::switch_to) (or one of
//! the structural edits built on it), which commits first.
//!
//! ```text
//!   open ──► Open ──edit──► Editing ──commit──► Committed ──edit──► Editing
//!              ▲                                    │
//!              └──────────── switch_to ◄────────────┘
//! ```
//!
//! Closing consumes the session after a final commit; a closed session is
//! simply one that no longer exists.
//!
//! Every multi-step operation checks all the indices it will touch before
//! its first write, so a failed call leaves both the table and the buffer as
//! they were.

use crate::error::{Boundary, EditError, Result};
use crate::gap_buffer::{GapBuffer, INITIAL_GAP_SIZE};
use crate::piece_table::{PieceTable, SEPARATOR};
use crate::position::Position;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Freshly bound; the buffer matches the table.
    Open,
    /// The buffer holds edits the table has not seen.
    Editing,
    /// The last edit was written back; the buffer matches the table.
    Committed,
}

/// The binding between the active line and its gap buffer.
#[derive(Debug, Clone)]
pub struct LineEditSession {
    line: usize,
    buffer: GapBuffer,
    state: SessionState,
}

impl LineEditSession {
    /// Bind `line` with the default gap size. The cursor starts at column 0.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `line` is not in the table.
    pub fn open(table: &PieceTable, line: usize) -> Result<Self> {
        Self::with_gap(table, line, INITIAL_GAP_SIZE)
    }

    /// Bind `line` reserving `gap_size` bytes of gap.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `line` is not in the table.
    pub fn with_gap(table: &PieceTable, line: usize, gap_size: usize) -> Result<Self> {
        let piece = table.get(line)?;
        tracing::trace!(line, len = piece.len(), "session opened");
        Ok(Self {
            line,
            buffer: GapBuffer::with_gap(piece.as_bytes(), gap_size),
            state: SessionState::Open,
        })
    }

    // -- Queries ------------------------------------------------------------

    /// The bound line number.
    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// True while the buffer holds uncommitted edits.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state == SessionState::Editing
    }

    /// Cursor as a document position.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        Position::new(self.line, self.buffer.cursor())
    }

    /// Length of the line being edited, including uncommitted edits.
    #[inline]
    #[must_use]
    pub fn line_len(&self) -> usize {
        self.buffer.len()
    }

    /// Current content of the line being edited.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u8> {
        self.buffer.snapshot()
    }

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &GapBuffer {
        &self.buffer
    }

    fn check_bound(&self, table: &PieceTable) -> Result<()> {
        if self.line < table.line_count() {
            Ok(())
        } else {
            Err(EditError::line(self.line, table.line_count()))
        }
    }

    // -- In-line edits ------------------------------------------------------

    /// Insert a byte at the cursor. The line separator splits the line, as
    /// [`handle_separator`](Self::handle_separator) does.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if a split is needed and the bound line is
    /// no longer in the table.
    pub fn insert_byte(&mut self, table: &mut PieceTable, byte: u8) -> Result<()> {
        if byte == SEPARATOR {
            return self.handle_separator(table);
        }
        self.buffer.insert_byte(byte);
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Insert a run of bytes at the cursor, splitting the line at every
    /// separator in `bytes`. The cursor ends up after the last byte.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `bytes` holds a separator and the bound
    /// line is no longer in the table. Nothing is inserted in that case.
    pub fn insert_slice(&mut self, table: &mut PieceTable, bytes: &[u8]) -> Result<()> {
        if bytes.contains(&SEPARATOR) {
            self.check_bound(table)?;
        }

        let mut parts = bytes.split(|&b| b == SEPARATOR);
        if let Some(first) = parts.next() {
            self.insert_run(first);
        }
        for part in parts {
            self.handle_separator(table)?;
            self.insert_run(part);
        }
        Ok(())
    }

    fn insert_run(&mut self, bytes: &[u8]) {
        if !bytes.is_empty() {
            self.buffer.insert_slice(bytes);
            self.state = SessionState::Editing;
        }
    }

    /// Move the cursor within the line.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `col > line_len()`.
    pub fn move_to_column(&mut self, col: usize) -> Result<()> {
        self.buffer.move_cursor_to(col)
    }

    /// Move the cursor past the last byte of the line.
    pub fn move_to_end(&mut self) {
        self.buffer.move_to_end();
    }

    // -- Commit / switch ----------------------------------------------------

    /// Write the buffer back to the table if it holds edits.
    ///
    /// Returns whether the table was written. The cursor column survives the
    /// reset.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if the bound line is no longer in the table.
    pub fn commit(&mut self, table: &mut PieceTable) -> Result<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        self.check_bound(table)?;

        let snapshot = self.buffer.snapshot();
        let col = self.buffer.cursor();
        table.replace(self.line, &snapshot)?;
        self.buffer.reset(&snapshot);
        self.buffer.move_cursor_to(col.min(snapshot.len()))?;
        self.state = SessionState::Committed;

        tracing::debug!(line = self.line, len = snapshot.len(), "line committed");
        Ok(true)
    }

    /// Commit, then bind `new` with the cursor at column 0.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `new` is not in the table. Nothing is
    /// committed in that case.
    pub fn switch_to(&mut self, table: &mut PieceTable, new: usize) -> Result<()> {
        if new >= table.line_count() {
            return Err(EditError::line(new, table.line_count()));
        }
        self.commit(table)?;
        self.rebind(table, new)?;
        tracing::trace!(line = new, "active line switched");
        Ok(())
    }

    /// Load `line` from the table into the buffer.
    fn rebind(&mut self, table: &PieceTable, line: usize) -> Result<()> {
        let piece = table.get(line)?;
        self.buffer.reset(piece.as_bytes());
        self.line = line;
        self.state = SessionState::Open;
        Ok(())
    }

    /// Commit and give up the binding.
    ///
    /// # Errors
    ///
    /// Whatever the final [`commit`](Self::commit) returns.
    pub fn close(mut self, table: &mut PieceTable) -> Result<()> {
        self.commit(table)?;
        tracing::trace!(line = self.line, "session closed");
        Ok(())
    }

    // -- Structural edits ---------------------------------------------------

    /// Split the line at the cursor.
    ///
    /// The part before the cursor stays on this line; the part after becomes
    /// a new line directly below, which becomes the active line with the
    /// cursor at column 0.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if the bound line is no longer in the table.
    pub fn handle_separator(&mut self, table: &mut PieceTable) -> Result<()> {
        self.check_bound(table)?;

        let (before, after) = self.buffer.split_at_cursor();
        table.replace(self.line, &before)?;
        table.insert_line_after(self.line, &after)?;

        self.line += 1;
        self.buffer.reset(&after);
        self.state = SessionState::Open;
        tracing::debug!(line = self.line, "line split");
        Ok(())
    }

    /// Delete the byte before the cursor.
    ///
    /// At column 0 the line is merged into the previous one and the cursor
    /// lands at the join point.
    ///
    /// # Errors
    ///
    /// [`EditError::BoundaryReached`] at the very start of the document.
    pub fn backspace(&mut self, table: &mut PieceTable) -> Result<()> {
        if self.buffer.cursor() > 0 {
            self.buffer.delete_before_cursor()?;
            self.state = SessionState::Editing;
            return Ok(());
        }
        if self.line == 0 {
            return Err(EditError::BoundaryReached(Boundary::Start));
        }
        self.check_bound(table)?;

        self.commit(table)?;
        let prev = self.line - 1;
        let join_col = table.join_with_next(prev)?;
        self.rebind(table, prev)?;
        self.buffer.move_cursor_to(join_col)?;
        tracing::debug!(line = prev, col = join_col, "lines joined");
        Ok(())
    }

    /// Delete the byte under the cursor.
    ///
    /// At the end of the line the next line is pulled up onto this one and
    /// the cursor stays where it was.
    ///
    /// # Errors
    ///
    /// [`EditError::BoundaryReached`] at the very end of the document.
    pub fn forward_delete(&mut self, table: &mut PieceTable) -> Result<()> {
        if self.buffer.cursor() < self.buffer.len() {
            self.buffer.delete_after_cursor()?;
            self.state = SessionState::Editing;
            return Ok(());
        }
        self.check_bound(table)?;
        if self.line + 1 >= table.line_count() {
            return Err(EditError::BoundaryReached(Boundary::End));
        }

        self.commit(table)?;
        let col = self.buffer.cursor();
        table.join_with_next(self.line)?;
        self.rebind(table, self.line)?;
        self.buffer.move_cursor_to(col)?;
        tracing::debug!(line = self.line, col, "lines joined");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
