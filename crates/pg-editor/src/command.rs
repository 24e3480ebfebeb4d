//! Edit commands — the unit of work the editor applies.
//!
//! The front end decodes key presses into [`EditCommand`]s with
//! [`from_key`]; the [`Editor`](crate::editor::Editor) applies them one at a
//! time, each to completion.
//!
//! # Key map
//!
//! | Key                 | Command                          |
//! |---------------------|----------------------------------|
//! | printable byte, Tab | `InsertByte`                     |
//! | Enter               | `NewLine`                        |
//! | Backspace           | `Backspace`                      |
//! | Delete              | `ForwardDelete`                  |
//! | arrows              | `MoveCursor(Relative)`           |
//! | Home / End          | `MoveCursor(LineStart / LineEnd)`|
//! | PageUp / PageDown   | `MoveCursor(Relative)` by a page |
//! | Ctrl-S              | `CommitAndSave`                  |
//! | Ctrl-Q              | `Close`                          |

use pg_term::input::{KeyCode, KeyEvent, Modifiers};

use crate::position::Position;

/// Where a cursor motion goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Move by a signed number of rows and columns.
    Relative { d_row: isize, d_col: isize },
    /// Jump to a document position.
    Absolute(Position),
    /// Column 0 of the current line.
    LineStart,
    /// Past the last byte of the current line.
    LineEnd,
}

impl Motion {
    pub const UP: Self = Self::Relative { d_row: -1, d_col: 0 };
    pub const DOWN: Self = Self::Relative { d_row: 1, d_col: 0 };
    pub const LEFT: Self = Self::Relative { d_row: 0, d_col: -1 };
    pub const RIGHT: Self = Self::Relative { d_row: 0, d_col: 1 };
}

/// One decoded user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    InsertByte(u8),
    Backspace,
    ForwardDelete,
    MoveCursor(Motion),
    /// Split the line at the cursor.
    NewLine,
    /// Commit the active line and write the document to its file.
    CommitAndSave,
    /// Commit and end the editing session.
    Close,
}

/// Translate a key press into a command.
///
/// `page` is the number of rows PageUp/PageDown move. Keys with no binding
/// return `None`.
#[must_use]
pub fn from_key(key: KeyEvent, page: usize) -> Option<EditCommand> {
    let page = isize::try_from(page.max(1)).unwrap_or(isize::MAX);

    if key.modifiers.contains(Modifiers::CTRL) {
        return match key.code {
            KeyCode::Byte(b's') => Some(EditCommand::CommitAndSave),
            KeyCode::Byte(b'q') => Some(EditCommand::Close),
            _ => None,
        };
    }
    if key.modifiers.contains(Modifiers::ALT) {
        return None;
    }

    let cmd = match key.code {
        KeyCode::Byte(b) => EditCommand::InsertByte(b),
        KeyCode::Tab => EditCommand::InsertByte(b'\t'),
        KeyCode::Enter => EditCommand::NewLine,
        KeyCode::Backspace => EditCommand::Backspace,
        KeyCode::Delete => EditCommand::ForwardDelete,
        KeyCode::Up => EditCommand::MoveCursor(Motion::UP),
        KeyCode::Down => EditCommand::MoveCursor(Motion::DOWN),
        KeyCode::Left => EditCommand::MoveCursor(Motion::LEFT),
        KeyCode::Right => EditCommand::MoveCursor(Motion::RIGHT),
        KeyCode::Home => EditCommand::MoveCursor(Motion::LineStart),
        KeyCode::End => EditCommand::MoveCursor(Motion::LineEnd),
        KeyCode::PageUp => EditCommand::MoveCursor(Motion::Relative { d_row: -page, d_col: 0 }),
        KeyCode::PageDown => EditCommand::MoveCursor(Motion::Relative { d_row: page, d_col: 0 }),
        KeyCode::Escape => return None,
    };
    Some(cmd)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
