//! Renderer — drives the double buffer from the document.
//!
//! Each frame is built in two steps. [`frame`](Renderer::frame) scrolls the
//! view to the cursor and composes the document (plus an optional status row)
//! into the back buffer. [`present`](Renderer::present) diffs back against
//! front and hands only the changed cells to a [`Painter`].
//!
//! Nothing reaches the terminal until `present`, and the front buffer always
//! mirrors what the painter last drew successfully.

use std::io;

use pg_term::buffer::{FrameBuffer, PAD};
use pg_term::diff::{DoubleBuffer, PresentStats};
use pg_term::paint::Painter;

use crate::piece_table::PieceTable;
use crate::position::Position;
use crate::session::LineEditSession;
use crate::view::View;

/// Scroll state plus the front/back grids.
#[derive(Debug)]
pub struct Renderer {
    view: View,
    screen: DoubleBuffer,
    pad: u8,
    /// Rows given to document text in the last composed frame.
    text_rows: u16,
}

impl Renderer {
    /// A renderer for a `width × height` screen padded with spaces.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            view: View::new(),
            screen: DoubleBuffer::new(width, height),
            pad: PAD,
            text_rows: height,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn view(&self) -> &View {
        &self.view
    }

    #[inline]
    pub const fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    #[inline]
    #[must_use]
    pub const fn screen(&self) -> &DoubleBuffer {
        &self.screen
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.screen.width()
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.screen.height()
    }

    /// Rows available for document text in the last frame.
    #[inline]
    #[must_use]
    pub const fn text_rows(&self) -> u16 {
        self.text_rows
    }

    #[inline]
    #[must_use]
    pub const fn pad(&self) -> u8 {
        self.pad
    }

    pub const fn set_pad(&mut self, pad: u8) {
        self.pad = pad;
    }

    // -- Frame --------------------------------------------------------------

    /// Compose the next frame into the back buffer.
    ///
    /// The view scrolls so that `cursor` is visible. When `status` is given
    /// it occupies the bottom row and the text area shrinks by one.
    pub fn frame(
        &mut self,
        table: &PieceTable,
        session: Option<&LineEditSession>,
        cursor: Position,
        status: Option<&[u8]>,
    ) {
        let height = self.screen.height();
        let reserve = u16::from(status.is_some() && height > 0);
        self.text_rows = height - reserve;

        self.view.ensure_cursor_visible(cursor.line, self.text_rows);

        let pad = self.pad;
        let back: &mut FrameBuffer = self.screen.back_mut();
        self.view.compose(table, session, back, self.text_rows, pad);
        if let Some(status) = status.filter(|_| height > 0) {
            back.put_row(height - 1, status, pad);
        }
    }

    /// Paint the difference between the last presented frame and the newly
    /// composed one.
    ///
    /// # Errors
    ///
    /// Returns the painter's I/O error. The front buffer is left as it was,
    /// so the next successful present repaints the same cells.
    pub fn present(&mut self, painter: &mut impl Painter) -> io::Result<PresentStats> {
        let stats = self.screen.present(painter)?;
        tracing::trace!(
            painted = stats.cells_painted,
            full = stats.full_redraw,
            "frame presented"
        );
        Ok(stats)
    }

    /// Rebuild both grids at a new size and force a full redraw.
    ///
    /// Any size is accepted, including zero; a zero-area screen composes and
    /// presents nothing.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen.resize(width, height);
        self.text_rows = self.text_rows.min(height);
        tracing::debug!(width, height, "renderer resized");
    }

    /// Make the next present repaint every cell.
    pub const fn force_redraw(&mut self) {
        self.screen.force_redraw();
    }

    /// Hardware cursor cell for `cursor`, or `None` if it is clipped.
    #[must_use]
    pub fn cursor_screen_pos(&self, cursor: Position) -> Option<(u16, u16)> {
        self.view
            .screen_pos(cursor.line, cursor.col, self.width(), self.text_rows)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
