//! Gap buffer — the mutable store for the one line being edited.
//!
//! Storage is a single `Vec<u8>` laid out as `before | gap | after`. The gap
//! sits at the cursor, so inserting and deleting there never shifts the rest
//! of the line. Moving the cursor slides the gap with `copy_within` over the
//! displaced span only.
//!
//! When a piece is opened the gap is placed in front of the content and the
//! cursor starts at column 0. Callers that want the cursor elsewhere move it
//! explicitly.
//!
//! The gap grows geometrically (`max(2 * capacity, len + gap_size)`), so a
//! run of N inserts costs O(log N) reallocations.

use std::fmt;

use crate::error::{Boundary, EditError, Result};

/// Gap reserved on open and after every reset unless options override it.
pub const INITIAL_GAP_SIZE: usize = 64;

/// Byte store with a movable gap at the cursor.
#[derive(Clone)]
pub struct GapBuffer {
    buf: Vec<u8>,
    gap_start: usize,
    gap_end: usize,
    gap_size: usize,
    grows: usize,
}

impl GapBuffer {
    // -- Construction -------------------------------------------------------

    /// An empty buffer with the default gap.
    #[must_use]
    pub fn new() -> Self {
        Self::open(&[])
    }

    /// Open a buffer over `piece` with the default gap.
    #[must_use]
    pub fn open(piece: &[u8]) -> Self {
        Self::with_gap(piece, INITIAL_GAP_SIZE)
    }

    /// Open a buffer over `piece` reserving `gap_size` free bytes in front of
    /// it. A zero gap size is raised to one.
    #[must_use]
    pub fn with_gap(piece: &[u8], gap_size: usize) -> Self {
        let mut gb = Self {
            buf: Vec::new(),
            gap_start: 0,
            gap_end: 0,
            gap_size: gap_size.max(1),
            grows: 0,
        };
        gb.load(piece);
        gb
    }

    /// Replace the contents with `piece` and a fresh minimal gap, cursor at
    /// column 0. Capacity gained by earlier growth is released.
    pub fn reset(&mut self, piece: &[u8]) {
        self.load(piece);
    }

    fn load(&mut self, piece: &[u8]) {
        let cap = piece.len() + self.gap_size;
        let mut buf = vec![0; cap];
        buf[self.gap_size..].copy_from_slice(piece);
        self.buf = buf;
        self.gap_start = 0;
        self.gap_end = self.gap_size;
        self.check_invariants();
    }

    // -- Queries ------------------------------------------------------------

    /// Logical length in bytes (gap excluded).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len() - self.gap_len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cursor column, which is also the gap start.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.gap_start
    }

    /// Total storage, content plus gap.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub const fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// How many times the storage has been reallocated since construction.
    #[inline]
    #[must_use]
    pub const fn grow_count(&self) -> usize {
        self.grows
    }

    /// Logical byte at `index`, or `None` past the end.
    #[must_use]
    pub fn byte_at(&self, index: usize) -> Option<u8> {
        if index < self.gap_start {
            Some(self.buf[index])
        } else {
            self.buf.get(self.gap_end + index - self.gap_start).copied()
        }
    }

    /// Content before the cursor.
    #[inline]
    #[must_use]
    pub fn before(&self) -> &[u8] {
        &self.buf[..self.gap_start]
    }

    /// Content from the cursor on.
    #[inline]
    #[must_use]
    pub fn after(&self) -> &[u8] {
        &self.buf[self.gap_end..]
    }

    /// The logical content, `before ++ after`.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(self.before());
        out.extend_from_slice(self.after());
        out
    }

    /// Copy out both halves around the cursor.
    #[must_use]
    pub fn split_at_cursor(&self) -> (Vec<u8>, Vec<u8>) {
        (self.before().to_vec(), self.after().to_vec())
    }

    // -- Cursor -------------------------------------------------------------

    /// Move the cursor (and the gap) to `col`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `col > len()`. The buffer is unchanged.
    pub fn move_cursor_to(&mut self, col: usize) -> Result<()> {
        let len = self.len();
        if col > len {
            return Err(EditError::column(col, len));
        }

        if col < self.gap_start {
            let shift = self.gap_start - col;
            self.buf.copy_within(col..self.gap_start, self.gap_end - shift);
            self.gap_start = col;
            self.gap_end -= shift;
        } else if col > self.gap_start {
            let shift = col - self.gap_start;
            self.buf.copy_within(self.gap_end..self.gap_end + shift, self.gap_start);
            self.gap_start += shift;
            self.gap_end += shift;
        }

        self.check_invariants();
        Ok(())
    }

    /// Move the cursor past the last byte.
    pub fn move_to_end(&mut self) {
        let shift = self.buf.len() - self.gap_end;
        self.buf.copy_within(self.gap_end.., self.gap_start);
        self.gap_start += shift;
        self.gap_end = self.buf.len();
        self.check_invariants();
    }

    // -- Editing ------------------------------------------------------------

    /// Insert one byte at the cursor; the cursor moves past it.
    pub fn insert_byte(&mut self, byte: u8) {
        self.reserve(1);
        self.buf[self.gap_start] = byte;
        self.gap_start += 1;
        self.check_invariants();
    }

    /// Insert a run of bytes at the cursor; the cursor moves past them.
    pub fn insert_slice(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.reserve(bytes.len());
        self.buf[self.gap_start..self.gap_start + bytes.len()].copy_from_slice(bytes);
        self.gap_start += bytes.len();
        self.check_invariants();
    }

    /// Remove and return the byte before the cursor.
    ///
    /// # Errors
    ///
    /// [`EditError::BoundaryReached`] at column 0.
    pub fn delete_before_cursor(&mut self) -> Result<u8> {
        if self.gap_start == 0 {
            return Err(EditError::BoundaryReached(Boundary::Start));
        }
        self.gap_start -= 1;
        let byte = self.buf[self.gap_start];
        self.check_invariants();
        Ok(byte)
    }

    /// Remove and return the byte under the cursor.
    ///
    /// # Errors
    ///
    /// [`EditError::BoundaryReached`] at the end of the content.
    pub fn delete_after_cursor(&mut self) -> Result<u8> {
        if self.gap_end == self.buf.len() {
            return Err(EditError::BoundaryReached(Boundary::End));
        }
        let byte = self.buf[self.gap_end];
        self.gap_end += 1;
        self.check_invariants();
        Ok(byte)
    }

    // -- Growth -------------------------------------------------------------

    /// Make sure the gap holds at least `additional` bytes.
    fn reserve(&mut self, additional: usize) {
        if self.gap_len() >= additional {
            return;
        }

        let old_cap = self.buf.len();
        let len = self.len();
        let new_cap = (old_cap * 2).max(len + additional + self.gap_size);
        let after_len = old_cap - self.gap_end;
        let new_gap_end = new_cap - after_len;

        let mut buf = vec![0; new_cap];
        buf[..self.gap_start].copy_from_slice(&self.buf[..self.gap_start]);
        buf[new_gap_end..].copy_from_slice(&self.buf[self.gap_end..]);

        self.buf = buf;
        self.gap_end = new_gap_end;
        self.grows += 1;
        tracing::trace!(old_cap, new_cap, len, "gap buffer grown");
    }

    // -- Invariants ---------------------------------------------------------

    #[inline]
    fn check_invariants(&self) {
        debug_assert!(self.gap_start <= self.gap_end, "gap has negative size");
        debug_assert!(self.gap_end <= self.buf.len(), "gap ends past storage");
    }
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GapBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GapBuffer({:?}[{}]{:?})",
            String::from_utf8_lossy(self.before()),
            self.gap_len(),
            String::from_utf8_lossy(self.after()),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
