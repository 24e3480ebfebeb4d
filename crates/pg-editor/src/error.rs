//! Error taxonomy for the editing core.
//!
//! Three kinds of failure reach callers:
//!
//! - **`OutOfRange`** — a line index or column outside valid bounds. The
//!   caller recovers by clamping or rejecting the input.
//! - **`BoundaryReached`** — a delete or move at the start or end of the
//!   content. Nothing changed; the front end may ring the bell.
//! - **`Io`** — a file read or write failed. Fatal to the current operation
//!   and surfaced to the user, never swallowed.
//!
//! Internal consistency violations (a gap with negative size, a piece
//! holding a separator) are bugs, not errors: they are `debug_assert!`s.

use std::fmt;
use std::io;

use thiserror::Error;

/// Result alias used throughout `pg-editor`.
pub type Result<T> = std::result::Result<T, EditError>;

/// What kind of index an [`EditError::OutOfRange`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    /// A line number in the piece table.
    Line,
    /// A byte column within a line.
    Column,
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line => f.write_str("line"),
            Self::Column => f.write_str("column"),
        }
    }
}

/// Which edge of the content an operation ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Start of a line (or of the document).
    Start,
    /// End of a line (or of the document).
    End,
    /// First line of the document.
    Top,
    /// Last line of the document.
    Bottom,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start of line"),
            Self::End => f.write_str("end of line"),
            Self::Top => f.write_str("top of document"),
            Self::Bottom => f.write_str("bottom of document"),
        }
    }
}

/// Errors produced by the editing core.
#[derive(Debug, Error)]
pub enum EditError {
    /// `index` is not within `0..len` (lines) or `0..=len` (columns).
    #[error("{what} {index} out of range (length {len})")]
    OutOfRange { what: Index, index: usize, len: usize },

    /// Delete or move at an edge; nothing changed.
    #[error("reached {0}")]
    BoundaryReached(Boundary),

    /// File read or write failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl EditError {
    /// Shorthand for a line index out of range.
    #[must_use]
    pub const fn line(index: usize, len: usize) -> Self {
        Self::OutOfRange {
            what: Index::Line,
            index,
            len,
        }
    }

    /// Shorthand for a column out of range.
    #[must_use]
    pub const fn column(index: usize, len: usize) -> Self {
        Self::OutOfRange {
            what: Index::Column,
            index,
            len,
        }
    }

    /// True for errors the front end should treat as "nothing happened"
    /// rather than as a failure worth reporting.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::BoundaryReached(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
