// SPDX-License-Identifier: MIT
//
// The escape sequences pgedit writes.
//
// Fixed sequences are byte constants so they can be appended to a frame or
// written from a panic hook without formatting. Only the cursor move takes
// arguments. Coordinates are `(row, col)`, 0-indexed on our side and
// 1-indexed on the wire.

use std::io::{self, Write};

pub const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
pub const SHOW_CURSOR: &[u8] = b"\x1b[?25h";
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
pub const RESET_ATTRS: &[u8] = b"\x1b[0m";
pub const BELL: &[u8] = b"\x07";

/// DEC mode 2026. The terminal holds everything up to [`SYNC_END`] and
/// shows it at once; terminals without support ignore both.
pub const SYNC_BEGIN: &[u8] = b"\x1b[?2026h";
pub const SYNC_END: &[u8] = b"\x1b[?2026l";

pub const ALT_SCREEN_ON: &[u8] = b"\x1b[?1049h";
pub const ALT_SCREEN_OFF: &[u8] = b"\x1b[?1049l";

/// What leaving the editor writes, in order. The alternate screen goes last
/// so the shell's own content comes back after attributes are reset.
pub const RESTORE: [&[u8]; 4] = [SYNC_END, RESET_ATTRS, SHOW_CURSOR, ALT_SCREEN_OFF];

/// CUP to `(row, col)`.
#[inline]
pub fn move_to(w: &mut impl Write, row: u16, col: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(row) + 1, u32::from(col) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cup(row: u16, col: u16) -> String {
        let mut out = Vec::new();
        move_to(&mut out, row, col).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn move_to_is_one_indexed() {
        assert_eq!(cup(0, 0), "\x1b[1;1H");
        assert_eq!(cup(4, 7), "\x1b[5;8H");
        assert_eq!(cup(u16::MAX, 0), "\x1b[65536;1H");
    }

    #[test]
    fn restore_leaves_alt_screen_last() {
        assert_eq!(RESTORE.last(), Some(&ALT_SCREEN_OFF));
        assert!(RESTORE.contains(&SHOW_CURSOR));
        assert!(RESTORE.contains(&RESET_ATTRS));
    }
}
