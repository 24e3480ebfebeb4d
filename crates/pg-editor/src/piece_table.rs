//! Piece table — the line-indexed source of truth for the document.
//!
//! The document is a dense sequence of [`Piece`]s, one per line, stored in a
//! `Vec`. Line numbers are plain vector indices: inserting or deleting a line
//! shifts every later line by one, and that renumbering is an explicit,
//! tested property of [`insert_line_after`](PieceTable::insert_line_after)
//! and [`delete_line`](PieceTable::delete_line).
//!
//! # Lifecycle
//!
//! - **Load**: file bytes are split on the separator (`\n`). The split is
//!   taken literally, so a trailing separator yields a trailing empty line
//!   and [`serialize`](PieceTable::serialize) reproduces the input exactly.
//! - **Edit**: only the active line is mutable, and it lives in a gap buffer
//!   owned by the line edit session. The session writes it back here with
//!   [`replace`](PieceTable::replace) when it commits.
//! - **Save**: all pieces are joined with `line_count - 1` separators.
//! - **Reload**: the whole table is rebuilt from the file.
//!
//! A table always holds at least one line. Removing the last remaining line
//! leaves a single empty one.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{EditError, Result};

/// The line separator byte.
pub const SEPARATOR: u8 = b'\n';

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// One line's immutable byte content, without a line terminator.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Piece {
    bytes: Box<[u8]>,
}

impl Piece {
    /// Create a piece from line content.
    ///
    /// The content must not contain [`SEPARATOR`]; a piece is exactly one
    /// line. This is checked in debug builds.
    #[must_use]
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        let bytes = bytes.into();
        debug_assert!(
            !bytes.contains(&SEPARATOR),
            "a piece never contains the line separator"
        );
        Self { bytes }
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for Piece {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&[u8]> for Piece {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for Piece {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece({:?})", String::from_utf8_lossy(&self.bytes))
    }
}

// ---------------------------------------------------------------------------
// PieceTable
// ---------------------------------------------------------------------------

/// Index-contiguous sequence of pieces representing the whole document.
#[derive(Clone, PartialEq, Eq)]
pub struct PieceTable {
    lines: Vec<Piece>,
}

impl PieceTable {
    // -- Construction -------------------------------------------------------

    /// A document with a single empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![Piece::default()],
        }
    }

    /// Build a table by splitting `bytes` on the separator.
    ///
    /// Empty input yields one empty line; `b"a\n"` yields `["a", ""]`.
    #[must_use]
    pub fn load(bytes: &[u8]) -> Self {
        let lines: Vec<Piece> = bytes.split(|&b| b == SEPARATOR).map(Piece::from).collect();
        debug_assert!(!lines.is_empty(), "split always yields at least one piece");
        Self { lines }
    }

    /// Read a file and build a table from its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Io`] if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let table = Self::load(&bytes);
        tracing::debug!(
            path = %path.display(),
            bytes = bytes.len(),
            lines = table.line_count(),
            "piece table loaded"
        );
        Ok(table)
    }

    /// Rebuild the table wholesale from a file.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Io`] if the file cannot be read; the table is
    /// left unchanged in that case.
    pub fn reload(&mut self, path: &Path) -> Result<()> {
        *self = Self::from_file(path)?;
        Ok(())
    }

    // -- Queries ------------------------------------------------------------

    /// Number of lines. Never zero.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Length of the serialized document in bytes.
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        let content: usize = self.lines.iter().map(Piece::len).sum();
        content + self.lines.len() - 1
    }

    /// The piece at `line`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `line >= line_count()`.
    pub fn get(&self, line: usize) -> Result<&Piece> {
        self.lines
            .get(line)
            .ok_or_else(|| EditError::line(line, self.lines.len()))
    }

    /// Byte length of `line`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `line >= line_count()`.
    pub fn line_len(&self, line: usize) -> Result<usize> {
        self.get(line).map(Piece::len)
    }

    /// Iterate over all lines in order.
    pub fn lines(&self) -> impl ExactSizeIterator<Item = &Piece> {
        self.lines.iter()
    }

    fn check_line(&self, line: usize) -> Result<()> {
        if line < self.lines.len() {
            Ok(())
        } else {
            Err(EditError::line(line, self.lines.len()))
        }
    }

    // -- Mutation -----------------------------------------------------------

    /// Replace the content of `line`. No other line is touched.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `line >= line_count()`.
    pub fn replace(&mut self, line: usize, bytes: &[u8]) -> Result<()> {
        self.check_line(line)?;
        self.lines[line] = Piece::from(bytes);
        tracing::trace!(line, len = bytes.len(), "line replaced");
        Ok(())
    }

    /// Insert a new line directly after `line`. Every line after it moves
    /// down by one.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `line >= line_count()`.
    pub fn insert_line_after(&mut self, line: usize, bytes: &[u8]) -> Result<()> {
        self.check_line(line)?;
        self.lines.insert(line + 1, Piece::from(bytes));
        tracing::trace!(after = line, lines = self.lines.len(), "line inserted");
        Ok(())
    }

    /// Remove `line` and return its piece. Every line after it moves up by
    /// one.
    ///
    /// Removing the only line leaves a single empty line and returns the old
    /// content.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `line >= line_count()`.
    pub fn delete_line(&mut self, line: usize) -> Result<Piece> {
        self.check_line(line)?;
        let removed = if self.lines.len() == 1 {
            std::mem::take(&mut self.lines[0])
        } else {
            self.lines.remove(line)
        };
        tracing::trace!(line, lines = self.lines.len(), "line deleted");
        Ok(removed)
    }

    /// Append the content of `line + 1` to `line` and remove `line + 1`.
    ///
    /// Returns the column at which the two lines were joined (the old
    /// length of `line`).
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `line + 1 >= line_count()`. The table is
    /// unchanged in that case.
    pub fn join_with_next(&mut self, line: usize) -> Result<usize> {
        let next = line.saturating_add(1);
        self.check_line(next)?;

        let join_col = self.lines[line].len();
        let mut joined = Vec::with_capacity(join_col + self.lines[next].len());
        joined.extend_from_slice(self.lines[line].as_bytes());
        joined.extend_from_slice(self.lines[next].as_bytes());

        self.lines[line] = Piece::from(joined);
        self.lines.remove(next);
        Ok(join_col)
    }

    // -- Output -------------------------------------------------------------

    /// Join all lines with exactly `line_count - 1` separators.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len_bytes());
        for (i, piece) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push(SEPARATOR);
            }
            out.extend_from_slice(piece.as_bytes());
        }
        out
    }

    /// Stream the serialized document into a writer.
    ///
    /// # Errors
    ///
    /// [`EditError::Io`] if writing fails.
    pub fn write_to(&self, w: &mut impl Write) -> Result<()> {
        for (i, piece) in self.lines.iter().enumerate() {
            if i > 0 {
                w.write_all(&[SEPARATOR])?;
            }
            w.write_all(piece.as_bytes())?;
        }
        w.flush()?;
        Ok(())
    }

    /// Write the serialized document to `path`, creating or truncating it.
    ///
    /// # Errors
    ///
    /// [`EditError::Io`] if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_to(&mut w)?;
        tracing::debug!(
            path = %path.display(),
            bytes = self.len_bytes(),
            lines = self.line_count(),
            "piece table saved"
        );
        Ok(())
    }
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PieceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.lines).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn table(lines: &[&str]) -> PieceTable {
        PieceTable::load(lines.join("\n").as_bytes())
    }

    fn lines_of(t: &PieceTable) -> Vec<String> {
        t.lines()
            .map(|p| String::from_utf8_lossy(p.as_bytes()).into_owned())
            .collect()
    }

    // -- Load ---------------------------------------------------------------

    #[test]
    fn load_splits_on_separator() {
        let t = PieceTable::load(b"abc\nde");
        assert_eq!(lines_of(&t), vec!["abc", "de"]);
    }

    #[test]
    fn load_empty_is_one_empty_line() {
        let t = PieceTable::load(b"");
        assert_eq!(t.line_count(), 1);
        assert!(t.get(0).unwrap().is_empty());
    }

    #[test]
    fn load_trailing_separator_keeps_natural_empty_line() {
        let t = PieceTable::load(b"a\nb\n");
        assert_eq!(lines_of(&t), vec!["a", "b", ""]);
    }

    #[test]
    fn load_only_separators() {
        let t = PieceTable::load(b"\n\n");
        assert_eq!(lines_of(&t), vec!["", "", ""]);
    }

    #[test]
    fn new_and_default_have_one_line() {
        assert_eq!(PieceTable::new().line_count(), 1);
        assert_eq!(PieceTable::default(), PieceTable::load(b""));
    }

    // -- Get ----------------------------------------------------------------

    #[test]
    fn get_out_of_range() {
        let t = table(&["a", "b"]);
        assert_eq!(t.get(1).unwrap().as_bytes(), b"b");
        assert!(matches!(
            t.get(2),
            Err(EditError::OutOfRange { index: 2, len: 2, .. })
        ));
        assert!(t.line_len(5).is_err());
        assert_eq!(t.line_len(0).unwrap(), 1);
    }

    // -- Replace ------------------------------------------------------------

    #[test]
    fn replace_touches_only_that_line() {
        let mut t = table(&["one", "two", "three"]);
        t.replace(1, b"TWO!").unwrap();
        assert_eq!(lines_of(&t), vec!["one", "TWO!", "three"]);
    }

    #[test]
    fn replace_out_of_range_leaves_table() {
        let mut t = table(&["x"]);
        let before = t.clone();
        assert!(t.replace(1, b"y").is_err());
        assert_eq!(t, before);
    }

    // -- Insert / delete renumbering ----------------------------------------

    #[test]
    fn insert_after_shifts_following_lines() {
        let mut t = table(&["a", "b", "c"]);
        t.insert_line_after(0, b"new").unwrap();
        assert_eq!(lines_of(&t), vec!["a", "new", "b", "c"]);
        assert_eq!(t.get(2).unwrap().as_bytes(), b"b");
    }

    #[test]
    fn insert_after_last_line_appends() {
        let mut t = table(&["a"]);
        t.insert_line_after(0, b"z").unwrap();
        assert_eq!(lines_of(&t), vec!["a", "z"]);
    }

    #[test]
    fn insert_after_out_of_range() {
        let mut t = table(&["a"]);
        assert!(t.insert_line_after(1, b"z").is_err());
        assert_eq!(t.line_count(), 1);
    }

    #[test]
    fn delete_shifts_following_lines_up() {
        let mut t = table(&["a", "b", "c"]);
        let removed = t.delete_line(1).unwrap();
        assert_eq!(removed.as_bytes(), b"b");
        assert_eq!(lines_of(&t), vec!["a", "c"]);
        assert_eq!(t.get(1).unwrap().as_bytes(), b"c");
    }

    #[test]
    fn delete_only_line_leaves_empty_line() {
        let mut t = table(&["solo"]);
        let removed = t.delete_line(0).unwrap();
        assert_eq!(removed.as_bytes(), b"solo");
        assert_eq!(t.line_count(), 1);
        assert!(t.get(0).unwrap().is_empty());
    }

    #[test]
    fn delete_out_of_range() {
        let mut t = table(&["a", "b"]);
        assert!(t.delete_line(2).is_err());
        assert_eq!(t.line_count(), 2);
    }

    // -- Join ---------------------------------------------------------------

    #[test]
    fn join_with_next_merges_and_renumbers() {
        let mut t = table(&["ab", "cd", "ef"]);
        let col = t.join_with_next(0).unwrap();
        assert_eq!(col, 2);
        assert_eq!(lines_of(&t), vec!["abcd", "ef"]);
    }

    #[test]
    fn join_last_line_is_out_of_range() {
        let mut t = table(&["ab", "cd"]);
        let before = t.clone();
        assert!(t.join_with_next(1).is_err());
        assert!(t.join_with_next(usize::MAX).is_err());
        assert_eq!(t, before);
    }

    // -- Serialize ----------------------------------------------------------

    #[test]
    fn serialize_writes_count_minus_one_separators() {
        let t = table(&["abc", "de"]);
        assert_eq!(t.serialize(), b"abc\nde");
        assert_eq!(t.len_bytes(), 6);
    }

    #[test]
    fn serialize_single_empty_line_is_empty() {
        assert!(PieceTable::new().serialize().is_empty());
        assert_eq!(PieceTable::new().len_bytes(), 0);
    }

    #[test]
    fn write_to_matches_serialize() {
        let t = PieceTable::load(b"x\n\ny\n");
        let mut out = Vec::new();
        t.write_to(&mut out).unwrap();
        assert_eq!(out, t.serialize());
    }

    #[test]
    fn scenario_replace_then_serialize() {
        let mut t = table(&["abc", "de"]);
        t.replace(0, b"abcX").unwrap();
        assert_eq!(t.serialize(), b"abcX\nde");
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = std::env::temp_dir().join("pg_editor_piece_table_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.txt");

        let t = PieceTable::load(b"first\nsecond\n");
        t.save(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first\nsecond\n");

        let mut other = PieceTable::new();
        other.reload(&path).unwrap();
        assert_eq!(other, t);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn from_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("pg_editor_definitely_missing/nope.txt");
        assert!(matches!(
            PieceTable::from_file(&path),
            Err(EditError::Io(_))
        ));
    }

    #[test]
    fn failed_reload_keeps_table() {
        let mut t = table(&["keep", "me"]);
        let before = t.clone();
        let path = std::env::temp_dir().join("pg_editor_definitely_missing/nope.txt");
        assert!(t.reload(&path).is_err());
        assert_eq!(t, before);
    }

    // -- Pieces -------------------------------------------------------------

    #[test]
    fn piece_debug_is_readable() {
        assert_eq!(format!("{:?}", Piece::from(&b"hi"[..])), "Piece(\"hi\")");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "never contains the line separator")]
    fn piece_with_separator_is_a_defect() {
        let _ = Piece::new(b"a\nb".to_vec());
    }

    // -- Properties ---------------------------------------------------------

    proptest! {
        #[test]
        fn serialize_load_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(PieceTable::load(&bytes).serialize(), bytes);
        }

        #[test]
        fn line_count_is_separators_plus_one(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let separators = bytes.iter().filter(|&&b| b == SEPARATOR).count();
            prop_assert_eq!(PieceTable::load(&bytes).line_count(), separators + 1);
        }
    }
}
