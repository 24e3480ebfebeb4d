// SPDX-License-Identifier: MIT
//
// Terminal key decoder.
//
// Turns raw stdin bytes into key events. pgedit edits bytes, not
// characters, so printable input is reported byte by byte: a UTF-8 sequence
// arrives as several `KeyCode::Byte` events and is inserted verbatim.
//
// Handled encodings:
//
// - Control bytes (Ctrl+letter, Tab, Enter, Backspace)
// - CSI cursor keys with optional modifier parameter (`ESC [ 1 ; 5 C`)
// - CSI tilde keys (Home, Delete, End, PageUp, PageDown)
// - SS3 cursor keys (`ESC O A`, sent in application cursor mode)
// - Alt+key (ESC followed by a printable byte)
//
// # Design
//
// Escape sequences can span multiple `read()` calls, so the parser keeps a
// small byte buffer. Feed bytes with [`Parser::advance`]; call
// [`Parser::flush`] when input goes quiet to turn a pending lone ESC into an
// Escape key.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press without modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// Ctrl + a lowercase ASCII letter.
    #[must_use]
    pub const fn ctrl(letter: u8) -> Self {
        Self {
            code: KeyCode::Byte(letter),
            modifiers: Modifiers::CTRL,
        }
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable ASCII byte or any byte >= 0x80.
    Byte(u8),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags, using the xterm encoding where the CSI
    /// parameter is `1 + bitmask`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental key decoder.
///
/// ```
/// use pg_term::input::{KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// let keys = parser.advance(b"a\x1b[D");
/// assert_eq!(keys, vec![
///     KeyEvent::plain(KeyCode::Byte(b'a')),
///     KeyEvent::plain(KeyCode::Left),
/// ]);
/// ```
pub struct Parser {
    /// Bytes of an escape sequence that has not completed yet.
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(16),
        }
    }

    /// Feed raw bytes and return every key that can be decoded.
    ///
    /// Incomplete escape sequences stay buffered until more bytes arrive.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }
        keys
    }

    /// Are there buffered bytes waiting for the rest of a sequence?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes as literal keys.
    ///
    /// A lone ESC becomes [`KeyCode::Escape`]; anything after it is decoded
    /// on its own.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let pending = std::mem::take(&mut self.buf);
        let mut keys = Vec::new();
        for &byte in &pending {
            if byte == 0x1B {
                keys.push(KeyEvent::plain(KeyCode::Escape));
            } else if let Parsed::Key(key, _) = try_parse(&[byte]) {
                keys.push(key);
            }
        }
        keys
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────

enum Parsed {
    /// A key, consuming `usize` bytes.
    Key(KeyEvent, usize),
    /// Need more bytes.
    Incomplete,
    /// Unrecognized input, skip `usize` bytes.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };

    match first {
        0x1B => parse_escape(buf),
        0x08 | 0x7F => Parsed::Key(KeyEvent::plain(KeyCode::Backspace), 1),
        0x09 => Parsed::Key(KeyEvent::plain(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Key(KeyEvent::plain(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Key(KeyEvent::ctrl(b + b'a' - 1), 1),
        0x00 | 0x1C..=0x1F => Parsed::Skip(1),
        b => Parsed::Key(KeyEvent::plain(KeyCode::Byte(b)), 1),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    let Some(&second) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        b @ 0x20..=0x7E => Parsed::Key(
            KeyEvent {
                code: KeyCode::Byte(b),
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        _ => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&final_byte) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    match cursor_key(final_byte) {
        Some(code) => Parsed::Key(KeyEvent::plain(code), 3),
        None => Parsed::Skip(3),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    // Scan for the final byte (0x40..=0x7E). Parameter bytes are 0x30..=0x3F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }
    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params
        .get(1)
        .map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = if final_byte == b'~' {
        match params.first().copied().unwrap_or(0) {
            1 | 7 => Some(KeyCode::Home),
            3 => Some(KeyCode::Delete),
            4 | 8 => Some(KeyCode::End),
            5 => Some(KeyCode::PageUp),
            6 => Some(KeyCode::PageDown),
            _ => None,
        }
    } else {
        cursor_key(final_byte)
    };

    match code {
        Some(code) => Parsed::Key(KeyEvent { code, modifiers }, consumed),
        None => Parsed::Skip(consumed),
    }
}

const fn cursor_key(final_byte: u8) -> Option<KeyCode> {
    match final_byte {
        b'A' => Some(KeyCode::Up),
        b'B' => Some(KeyCode::Down),
        b'C' => Some(KeyCode::Right),
        b'D' => Some(KeyCode::Left),
        b'H' => Some(KeyCode::Home),
        b'F' => Some(KeyCode::End),
        _ => None,
    }
}

/// Parse `;`-separated decimal parameters. Missing values read as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &d| {
                    acc.saturating_mul(10).saturating_add(u16::from(d - b'0'))
                })
        })
        .collect()
}

/// Decode an xterm modifier parameter (`1 + bitmask`).
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
