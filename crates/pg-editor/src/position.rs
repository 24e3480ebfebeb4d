//! Cursor position type.
//!
//! All coordinates are **0-indexed**. Line 0 is the first line, column 0 is
//! the first byte. Columns count bytes: the editor does not interpret UTF-8,
//! so a multi-byte character occupies several columns.
//!
//! A valid cursor satisfies `line < line_count` and `col <= line_len`. The
//! column may equal the line length, which is the append-at-end position.
//!
//! Display layers (status line) convert to 1-indexed for the user; that
//! conversion never belongs here.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A cursor position: (line, byte column), both 0-indexed.
///
/// # Ordering
///
/// Positions are ordered lexicographically: line first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// The origin — line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Apply a signed line/column delta, saturating at zero.
    ///
    /// Upper bounds are not known here; the caller clamps against the
    /// document.
    #[must_use]
    pub const fn offset(self, d_line: isize, d_col: isize) -> Self {
        Self {
            line: self.line.saturating_add_signed(d_line),
            col: self.col.saturating_add_signed(d_col),
        }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line.cmp(&other.line).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for human display.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_new() {
        assert_eq!(Position::ZERO, Position::new(0, 0));
        assert_eq!(Position::default(), Position::ZERO);
        let p = Position::new(5, 10);
        assert_eq!((p.line, p.col), (5, 10));
    }

    #[test]
    fn ordering_is_line_then_col() {
        assert!(Position::new(1, 3) < Position::new(1, 7));
        assert!(Position::new(0, 100) < Position::new(1, 0));
        assert_eq!(Position::new(3, 3).cmp(&Position::new(3, 3)), std::cmp::Ordering::Equal);
    }

    #[test]
    fn offset_saturates_at_zero() {
        let p = Position::new(2, 1);
        assert_eq!(p.offset(1, 4), Position::new(3, 5));
        assert_eq!(p.offset(-5, -5), Position::ZERO);
        assert_eq!(p.offset(0, -1), Position::new(2, 0));
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Position::new(2, 5)), "Pos(2:5)");
    }

    #[test]
    fn display_is_1_indexed() {
        assert_eq!(format!("{}", Position::ZERO), "1:1");
        assert_eq!(format!("{}", Position::new(9, 14)), "10:15");
    }
}
