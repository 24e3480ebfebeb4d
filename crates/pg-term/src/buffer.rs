// SPDX-License-Identifier: MIT
//
// FrameBuffer — the 2D byte grid a frame is composed into.
//
// Every position on screen is one byte. The renderer writes the visible
// lines of the document here, and the diff pass compares two of these grids
// to decide what the terminal actually needs to repaint.
//
// Design:
//
//   - Flat `Vec<u8>` with row-major indexing: `index = row * width + col`.
//     A row is a contiguous slice, so composing a line is one copy plus one
//     fill, and comparing two rows is one slice comparison.
//
//   - Dimensions are fixed at construction. There is no way to grow a grid
//     in place; a terminal resize builds new grids. Every accessor checks
//     bounds and returns `None` or ignores the write rather than panicking.
//
// Memory:
//
//   200×50 terminal = 10,000 bytes per grid. Two grids for double
//   buffering: 20 KB.

use std::fmt;

/// Byte used for cells that hold no document content.
pub const PAD: u8 = b' ';

/// A `height × width` grid of bytes.
///
/// # Examples
///
/// ```
/// use pg_term::buffer::FrameBuffer;
///
/// let mut frame = FrameBuffer::new(80, 24);
/// assert_eq!(frame.width(), 80);
/// assert_eq!(frame.height(), 24);
///
/// frame.set(3, 5, b'X');
/// assert_eq!(frame.get(3, 5), Some(b'X'));
/// assert_eq!(frame.get(24, 0), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<u8>,
}

impl FrameBuffer {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a grid filled with [`PAD`].
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self::filled(width, height, PAD)
    }

    /// Create a grid filled with an arbitrary byte.
    #[must_use]
    pub fn filled(width: u16, height: u16, byte: u8) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![byte; size],
        }
    }

    // ─── Dimensions ──────────────────────────────────────────────────────

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Total number of cells (`width × height`).
    #[inline]
    #[must_use]
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has zero area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether another grid has the same dimensions.
    #[inline]
    #[must_use]
    pub const fn same_size(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }

    // ─── Cell access ─────────────────────────────────────────────────────

    #[inline]
    fn index(&self, row: u16, col: u16) -> Option<usize> {
        if row < self.height && col < self.width {
            Some(usize::from(row) * usize::from(self.width) + usize::from(col))
        } else {
            None
        }
    }

    /// The byte at `(row, col)`, or `None` outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, row: u16, col: u16) -> Option<u8> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Write one byte. Writes outside the grid are ignored.
    #[inline]
    pub fn set(&mut self, row: u16, col: u16, byte: u8) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = byte;
        }
    }

    /// A full row as a slice, or `None` if `row >= height`.
    #[must_use]
    pub fn row(&self, row: u16) -> Option<&[u8]> {
        if row >= self.height {
            return None;
        }
        let start = usize::from(row) * usize::from(self.width);
        Some(&self.cells[start..start + usize::from(self.width)])
    }

    /// Iterate over rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // `chunks_exact(0)` panics, and a zero-width grid has no cells anyway.
        let width = usize::from(self.width).max(1);
        self.cells.chunks_exact(width)
    }

    // ─── Bulk paint ──────────────────────────────────────────────────────

    /// Write `bytes` into `row`, truncated to the grid width, and fill the
    /// rest of the row with `pad`.
    ///
    /// Returns the number of content bytes actually written. Rows outside
    /// the grid are ignored (returns 0).
    pub fn put_row(&mut self, row: u16, bytes: &[u8], pad: u8) -> usize {
        if row >= self.height {
            return 0;
        }
        let width = usize::from(self.width);
        let start = usize::from(row) * width;
        let dst = &mut self.cells[start..start + width];
        let n = bytes.len().min(width);
        dst[..n].copy_from_slice(&bytes[..n]);
        dst[n..].fill(pad);
        n
    }

    /// Fill one row with a single byte.
    pub fn fill_row(&mut self, row: u16, byte: u8) {
        self.put_row(row, &[], byte);
    }

    /// Fill the whole grid with a single byte.
    pub fn fill(&mut self, byte: u8) {
        self.cells.fill(byte);
    }

    /// Copy all cells from a grid of the same size.
    ///
    /// # Panics
    ///
    /// Debug builds assert matching dimensions. Release builds copy the
    /// overlapping prefix.
    pub fn copy_from(&mut self, other: &Self) {
        debug_assert!(self.same_size(other), "copy_from requires equal sizes");
        let n = self.cells.len().min(other.cells.len());
        self.cells[..n].copy_from_slice(&other.cells[..n]);
    }

    /// All cells in row-major order.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FrameBuffer({}x{})", self.width, self.height)?;
        for row in self.rows() {
            writeln!(f, "|{}|", String::from_utf8_lossy(row))?;
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
