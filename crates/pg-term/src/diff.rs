// SPDX-License-Identifier: MIT
//
// Double-buffered display and the diff pass.
//
// The renderer never paints the screen directly. It composes the next frame
// into the *back* grid, the diff pass compares back against *front* (what
// the terminal currently shows), and only the differing cells are handed to
// a `Painter`. After a successful present, front becomes a copy of back.
//
// The pipeline per frame:
//
//   1. Renderer writes every visible row into `back_mut()`.
//   2. `diff()` computes the exact set of changed cells (row-major).
//   3. `present()` sends those cells to the painter, then `front := back`.
//
// Ordering rule: back is written first; front is only ever overwritten by
// `present`. A half-composed frame can therefore never be diffed against
// itself.
//
// Optimizations:
//
//   - Row-level skip: unchanged rows are detected with one slice comparison
//     and skipped without iterating individual cells.
//   - Zero allocation in steady state: front is updated with `copy_from`.

use std::io;

use crate::buffer::FrameBuffer;
use crate::paint::Painter;

// ─── CellPos ─────────────────────────────────────────────────────────────────

/// A screen cell coordinate, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPos {
    pub row: u16,
    pub col: u16,
}

impl CellPos {
    #[inline]
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

// ─── diff ────────────────────────────────────────────────────────────────────

/// Every cell whose byte differs between `front` and `back`, in row-major
/// order.
///
/// The result is exactly the minimal repaint set: `diff(a, a)` is empty and
/// `diff(a, b).len()` equals the cell-wise Hamming distance.
///
/// Grids of different sizes have no meaningful cell correspondence; in that
/// case every cell of `back` is reported.
#[must_use]
pub fn diff(front: &FrameBuffer, back: &FrameBuffer) -> Vec<CellPos> {
    if !front.same_size(back) {
        return every_cell(back);
    }

    let mut changed = Vec::new();

    for (row, (f, b)) in (0..back.height()).zip(front.rows().zip(back.rows())) {
        if f == b {
            continue;
        }
        for (col, (fb, bb)) in (0..back.width()).zip(f.iter().zip(b)) {
            if fb != bb {
                changed.push(CellPos::new(row, col));
            }
        }
    }

    changed
}

/// Every cell of `frame`, row-major.
fn every_cell(frame: &FrameBuffer) -> Vec<CellPos> {
    (0..frame.height())
        .flat_map(|row| (0..frame.width()).map(move |col| CellPos::new(row, col)))
        .collect()
}

// ─── PresentStats ────────────────────────────────────────────────────────────

/// Statistics from a present pass, for profiling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentStats {
    /// Cells sent to the painter.
    pub cells_painted: usize,
    /// Cells that matched the front buffer and were skipped.
    pub cells_skipped: usize,
    /// Whether this was a full redraw.
    pub full_redraw: bool,
}

impl PresentStats {
    /// Total cells considered (painted + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_painted + self.cells_skipped
    }
}

// ─── DoubleBuffer ────────────────────────────────────────────────────────────

/// Front/back pair of equal-sized grids.
///
/// # Usage
///
/// ```
/// use pg_term::diff::DoubleBuffer;
/// use pg_term::paint::RecordingPainter;
///
/// let mut screen = DoubleBuffer::new(10, 2);
/// let mut painter = RecordingPainter::new();
///
/// screen.back_mut().put_row(0, b"hello", b' ');
/// let stats = screen.present(&mut painter).unwrap();
///
/// // The first frame is a full redraw.
/// assert_eq!(stats.cells_painted, 20);
///
/// // Nothing changed: nothing is painted.
/// let stats = screen.present(&mut painter).unwrap();
/// assert_eq!(stats.cells_painted, 0);
/// ```
#[derive(Debug)]
pub struct DoubleBuffer {
    front: FrameBuffer,
    back: FrameBuffer,
    /// Front does not reflect the terminal (first frame, forced redraw).
    stale: bool,
}

impl DoubleBuffer {
    /// Create a pair of padded grids. The first present repaints everything.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            front: FrameBuffer::new(width, height),
            back: FrameBuffer::new(width, height),
            stale: true,
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.back.width()
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.back.height()
    }

    /// What the terminal currently shows.
    #[inline]
    #[must_use]
    pub const fn front(&self) -> &FrameBuffer {
        &self.front
    }

    /// The frame being composed.
    #[inline]
    #[must_use]
    pub const fn back(&self) -> &FrameBuffer {
        &self.back
    }

    /// Mutable access to the frame being composed.
    #[inline]
    pub const fn back_mut(&mut self) -> &mut FrameBuffer {
        &mut self.back
    }

    /// Whether the next present will repaint every cell.
    #[inline]
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Cells that differ between front and back.
    #[must_use]
    pub fn diff(&self) -> Vec<CellPos> {
        diff(&self.front, &self.back)
    }

    /// Paint the changed cells and record back as the new front.
    ///
    /// A present with nothing to repaint makes no painter calls, even when a
    /// full redraw is pending on a zero-area screen.
    ///
    /// # Errors
    ///
    /// Returns the painter's I/O error. Front is left untouched in that case,
    /// so the next present repaints the same cells again.
    pub fn present(&mut self, painter: &mut impl Painter) -> io::Result<PresentStats> {
        let area = self.back.area();
        let full_redraw = self.stale;

        let cells: Vec<CellPos> = if full_redraw {
            every_cell(&self.back)
        } else {
            self.diff()
        };

        let stats = PresentStats {
            cells_painted: cells.len(),
            cells_skipped: area - cells.len(),
            full_redraw,
        };

        if cells.is_empty() {
            self.stale = false;
            return Ok(stats);
        }

        painter.begin_frame(full_redraw)?;
        for pos in &cells {
            if let Some(byte) = self.back.get(pos.row, pos.col) {
                painter.paint(pos.row, pos.col, byte)?;
            }
        }
        painter.finish()?;

        self.front.copy_from(&self.back);
        self.stale = false;
        Ok(stats)
    }

    /// Forget what the terminal shows; the next present repaints everything.
    ///
    /// Useful after returning from a shell or when the user asks for a
    /// manual refresh.
    pub const fn force_redraw(&mut self) {
        self.stale = true;
    }

    /// Rebuild both grids at a new size and force a full redraw.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.front = FrameBuffer::new(width, height);
        self.back = FrameBuffer::new(width, height);
        self.stale = true;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
