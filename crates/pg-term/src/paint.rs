// SPDX-License-Identifier: MIT
//
// Painters — where changed cells go.
//
// The diff pass decides *which* cells to repaint; a `Painter` decides *how*.
// Keeping that behind a trait means the double buffer never touches a file
// descriptor: the editor binary hands it an `AnsiPainter` wrapping stdout,
// tests hand it a `RecordingPainter` and inspect the instructions.
//
// AnsiPainter keeps the same economy as a cell writer in a full TUI stack:
// it remembers where the terminal cursor is and skips the CUP sequence when
// the next cell is immediately to the right of the last one. That only
// holds while every printed byte is one column wide, which is what
// `printable` enforces.

use std::io::{self, Write};

use crate::ansi;

// ─── Painter ─────────────────────────────────────────────────────────────────

/// Receiver of paint instructions from [`DoubleBuffer::present`].
///
/// For each frame with at least one changed cell, `present` calls
/// [`begin_frame`](Self::begin_frame) once, [`paint`](Self::paint) for each
/// changed cell in row-major order, then [`finish`](Self::finish). A frame
/// with no changes produces no calls at all.
///
/// [`DoubleBuffer::present`]: crate::diff::DoubleBuffer::present
pub trait Painter {
    /// Start a frame. `full` is true when the whole screen is being redrawn
    /// (first frame, forced redraw, resize).
    ///
    /// # Errors
    ///
    /// Implementations return I/O errors from the underlying device.
    fn begin_frame(&mut self, _full: bool) -> io::Result<()> {
        Ok(())
    }

    /// Place `byte` at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Implementations return I/O errors from the underlying device.
    fn paint(&mut self, row: u16, col: u16, byte: u8) -> io::Result<()>;

    /// End the frame and push it to the device.
    ///
    /// # Errors
    ///
    /// Implementations return I/O errors from the underlying device.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── PaintOp / RecordingPainter ──────────────────────────────────────────────

/// One `(row, col, byte)` paint instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintOp {
    pub row: u16,
    pub col: u16,
    pub byte: u8,
}

/// A painter that records instructions instead of writing them anywhere.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    /// Every instruction received, across all frames.
    pub ops: Vec<PaintOp>,
    /// Number of frames started.
    pub frames: usize,
    /// Number of frames started as full redraws.
    pub full_frames: usize,
    /// Number of frames finished.
    pub finished: usize,
}

impl RecordingPainter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Painter for RecordingPainter {
    fn begin_frame(&mut self, full: bool) -> io::Result<()> {
        self.frames += 1;
        if full {
            self.full_frames += 1;
        }
        Ok(())
    }

    fn paint(&mut self, row: u16, col: u16, byte: u8) -> io::Result<()> {
        self.ops.push(PaintOp { row, col, byte });
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.finished += 1;
        Ok(())
    }
}

// ─── AnsiPainter ─────────────────────────────────────────────────────────────

/// Map a document byte to something safe to print.
///
/// Every cell must advance the terminal cursor by exactly one column.
/// Control bytes would move it or switch modes, and bytes from 0x80 up may
/// combine with their neighbours into a single glyph, so both are shown as
/// `?`. The document itself keeps the original bytes.
#[inline]
#[must_use]
pub const fn printable(byte: u8) -> u8 {
    match byte {
        0x20..=0x7E => byte,
        _ => b'?',
    }
}

const FRAME_CAPACITY: usize = 16 * 1024;

/// Painter that emits ANSI cursor moves and bytes to a writer.
///
/// A frame is assembled in memory and handed to the writer with one
/// `write_all` in [`finish`](Painter::finish).
pub struct AnsiPainter<W: Write> {
    writer: W,
    pending: Vec<u8>,
    /// Cell painted last in this frame; the terminal cursor sits just right
    /// of it.
    last: Option<(u16, u16)>,
}

impl<W: Write> AnsiPainter<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pending: Vec::with_capacity(FRAME_CAPACITY),
            last: None,
        }
    }

    /// Show the hardware cursor at `pos`, or hide it for `None`. Written
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying writer fails.
    pub fn place_cursor(&mut self, pos: Option<(u16, u16)>) -> io::Result<()> {
        if let Some((row, col)) = pos {
            ansi::move_to(&mut self.pending, row, col)?;
            self.pending.extend_from_slice(ansi::SHOW_CURSOR);
        } else {
            self.pending.extend_from_slice(ansi::HIDE_CURSOR);
        }
        self.last = None;
        self.send()
    }

    /// Ring the bell. Written immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying writer fails.
    pub fn bell(&mut self) -> io::Result<()> {
        self.pending.extend_from_slice(ansi::BELL);
        self.send()
    }

    pub const fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Hand everything pending to the writer. On failure the bytes stay
    /// pending.
    fn send(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.writer.write_all(&self.pending)?;
        self.writer.flush()?;
        self.pending.clear();
        Ok(())
    }
}

impl<W: Write> Painter for AnsiPainter<W> {
    fn begin_frame(&mut self, full: bool) -> io::Result<()> {
        self.pending.clear();
        self.pending.extend_from_slice(ansi::SYNC_BEGIN);
        self.pending.extend_from_slice(ansi::HIDE_CURSOR);
        if full {
            self.pending.extend_from_slice(ansi::RESET_ATTRS);
            self.pending.extend_from_slice(ansi::CLEAR_SCREEN);
        }
        self.last = None;
        Ok(())
    }

    fn paint(&mut self, row: u16, col: u16, byte: u8) -> io::Result<()> {
        let adjacent = self
            .last
            .is_some_and(|(r, c)| r == row && c.checked_add(1) == Some(col));
        if !adjacent {
            ansi::move_to(&mut self.pending, row, col)?;
        }
        self.pending.push(printable(byte));
        self.last = Some((row, col));
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.pending.extend_from_slice(ansi::SYNC_END);
        self.last = None;
        self.send()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
