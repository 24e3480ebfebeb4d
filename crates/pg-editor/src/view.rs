//! View — scroll state and the mapping from document lines to screen rows.
//!
//! A `View` owns nothing but the first visible line and the scroll margin.
//! The table and session are passed in to [`compose`](View::compose), which
//! writes one frame into a [`FrameBuffer`]:
//!
//! ```text
//!   PieceTable + session         View            FrameBuffer
//!  ┌──────────────┐        ┌────────────┐     ┌────────────┐
//!  │ line 0       │        │ top_line   │     │ line 3     │
//!  │ ...          │ ─────▶ │ scroll_off │ ──▶ │ line 4*    │  * bound line
//!  │ line 4 (gap) │        └────────────┘     │ pad pad .. │    from the
//!  └──────────────┘                           └────────────┘    gap buffer
//! ```
//!
//! Lines are not wrapped and there is no horizontal scroll: bytes past the
//! frame width are clipped. Rows past the end of the document are filled with
//! the pad byte. No write ever lands outside the frame.

use pg_term::buffer::FrameBuffer;

use crate::piece_table::PieceTable;
use crate::session::LineEditSession;

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Vertical scroll state.
#[derive(Debug, Clone, Default)]
pub struct View {
    /// First visible document line.
    top_line: usize,

    /// Lines of context kept above and below the cursor when scrolling.
    scroll_off: usize,
}

impl View {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            top_line: 0,
            scroll_off: 0,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn top_line(&self) -> usize {
        self.top_line
    }

    #[inline]
    #[must_use]
    pub const fn scroll_off(&self) -> usize {
        self.scroll_off
    }

    pub const fn set_top_line(&mut self, line: usize) {
        self.top_line = line;
    }

    pub const fn set_scroll_off(&mut self, lines: usize) {
        self.scroll_off = lines;
    }

    // -- Scrolling ----------------------------------------------------------

    /// Move `top_line` by the least amount that puts `cursor_line` inside
    /// `[top_line + margin, top_line + height - margin)`.
    ///
    /// The margin is `scroll_off`, capped so that it always leaves room for
    /// the cursor row itself. A zero height leaves the view untouched.
    pub fn ensure_cursor_visible(&mut self, cursor_line: usize, height: u16) {
        let height = usize::from(height);
        if height == 0 {
            return;
        }
        let margin = self.scroll_off.min((height - 1) / 2);

        let upper = cursor_line.saturating_sub(margin);
        if upper < self.top_line {
            self.top_line = upper;
        }

        let lower = cursor_line + margin;
        if lower >= self.top_line + height {
            self.top_line = lower + 1 - height;
        }
    }

    // -- Composition --------------------------------------------------------

    /// Fill the first `rows` rows of `frame` with document lines starting at
    /// `top_line`.
    ///
    /// The bound line's bytes come from the session's gap buffer, so
    /// uncommitted edits are visible. `rows` larger than the frame height is
    /// clamped.
    pub fn compose(
        &self,
        table: &PieceTable,
        session: Option<&LineEditSession>,
        frame: &mut FrameBuffer,
        rows: u16,
        pad: u8,
    ) {
        let rows = rows.min(frame.height());
        let bound = session.map(|s| (s.line(), s.snapshot()));

        for row in 0..rows {
            let line = self.top_line + usize::from(row);
            match &bound {
                Some((bound_line, bytes)) if *bound_line == line => {
                    frame.put_row(row, bytes, pad);
                }
                _ => match table.get(line) {
                    Ok(piece) => {
                        frame.put_row(row, piece.as_bytes(), pad);
                    }
                    Err(_) => frame.fill_row(row, pad),
                },
            }
        }
    }

    /// Screen cell for a document position, or `None` if it is outside the
    /// visible `width × height` window.
    #[must_use]
    pub fn screen_pos(
        &self,
        line: usize,
        col: usize,
        width: u16,
        height: u16,
    ) -> Option<(u16, u16)> {
        let row = line.checked_sub(self.top_line)?;
        let row = u16::try_from(row).ok().filter(|&r| r < height)?;
        let col = u16::try_from(col).ok().filter(|&c| c < width)?;
        Some((row, col))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pg_term::buffer::PAD;
    use pretty_assertions::assert_eq;

    fn table(lines: &[&str]) -> PieceTable {
        PieceTable::load(lines.join("\n").as_bytes())
    }

    fn rows_of(frame: &FrameBuffer) -> Vec<String> {
        frame
            .rows()
            .map(|r| String::from_utf8_lossy(r).into_owned())
            .collect()
    }

    // ── ensure_cursor_visible ─────────────────────────────────────────────

    #[test]
    fn cursor_already_visible() {
        let mut v = View::new();
        v.ensure_cursor_visible(2, 5);
        assert_eq!(v.top_line(), 0);
    }

    #[test]
    fn scroll_down_when_cursor_below() {
        let mut v = View::new();
        v.ensure_cursor_visible(4, 3);
        assert_eq!(v.top_line(), 2); // lines 2,3,4 visible
    }

    #[test]
    fn scroll_up_when_cursor_above() {
        let mut v = View::new();
        v.set_top_line(10);
        v.ensure_cursor_visible(3, 5);
        assert_eq!(v.top_line(), 3);
    }

    #[test]
    fn scroll_off_keeps_context() {
        let mut v = View::new();
        v.set_scroll_off(2);
        v.ensure_cursor_visible(5, 6);
        // Cursor must sit at most at row 3 of 6 (two lines below it).
        assert_eq!(v.top_line(), 2);

        v.ensure_cursor_visible(3, 6);
        assert_eq!(v.top_line(), 1);
    }

    #[test]
    fn scroll_off_is_capped_for_small_windows() {
        let mut v = View::new();
        v.set_scroll_off(50);
        v.ensure_cursor_visible(10, 3);
        // Margin collapses to 1 in a 3-row window: cursor in the middle row.
        assert_eq!(v.top_line(), 9);
    }

    #[test]
    fn zero_height_is_noop() {
        let mut v = View::new();
        v.set_top_line(4);
        v.ensure_cursor_visible(100, 0);
        assert_eq!(v.top_line(), 4);
    }

    // ── compose ───────────────────────────────────────────────────────────

    #[test]
    fn compose_pads_past_document() {
        let t = table(&["ab", "c"]);
        let mut f = FrameBuffer::filled(4, 3, b'#');
        View::new().compose(&t, None, &mut f, 3, PAD);
        assert_eq!(rows_of(&f), vec!["ab  ", "c   ", "    "]);
    }

    #[test]
    fn compose_truncates_long_lines() {
        let t = table(&["abcdefgh"]);
        let mut f = FrameBuffer::new(3, 1);
        View::new().compose(&t, None, &mut f, 1, PAD);
        assert_eq!(rows_of(&f), vec!["abc"]);
    }

    #[test]
    fn compose_uses_session_for_bound_line() {
        let mut t = table(&["one", "two"]);
        let mut s = LineEditSession::open(&t, 1).unwrap();
        s.insert_byte(&mut t, b'>').unwrap();
        let mut f = FrameBuffer::new(5, 2);
        View::new().compose(&t, Some(&s), &mut f, 2, b'.');
        assert_eq!(rows_of(&f), vec!["one..", ">two."]);
    }

    #[test]
    fn compose_starts_at_top_line() {
        let t = table(&["0", "1", "2", "3"]);
        let mut v = View::new();
        v.set_top_line(2);
        let mut f = FrameBuffer::new(1, 3);
        v.compose(&t, None, &mut f, 3, b'~');
        assert_eq!(rows_of(&f), vec!["2", "3", "~"]);
    }

    #[test]
    fn compose_leaves_rows_beyond_count() {
        let t = table(&["x", "y"]);
        let mut f = FrameBuffer::filled(2, 2, b'S');
        View::new().compose(&t, None, &mut f, 1, PAD);
        assert_eq!(rows_of(&f), vec!["x ", "SS"]);
    }

    #[test]
    fn compose_is_bounds_safe() {
        let long = "x".repeat(500);
        let lines: Vec<&str> = std::iter::repeat_n(long.as_str(), 200).collect();
        let t = table(&lines);
        for (w, h) in [(0, 0), (0, 5), (5, 0), (1, 1), (3, 250)] {
            let mut f = FrameBuffer::new(w, h);
            let mut v = View::new();
            v.ensure_cursor_visible(199, h);
            v.compose(&t, None, &mut f, u16::MAX, PAD);
            assert_eq!(f.as_bytes().len(), usize::from(w) * usize::from(h));
        }
    }

    // ── screen_pos ────────────────────────────────────────────────────────

    #[test]
    fn screen_pos_inside_and_clipped() {
        let mut v = View::new();
        v.set_top_line(5);
        assert_eq!(v.screen_pos(6, 2, 10, 4), Some((1, 2)));
        assert_eq!(v.screen_pos(4, 0, 10, 4), None, "above the window");
        assert_eq!(v.screen_pos(9, 0, 10, 4), None, "below the window");
        assert_eq!(v.screen_pos(6, 10, 10, 4), None, "right of the window");
    }
}
