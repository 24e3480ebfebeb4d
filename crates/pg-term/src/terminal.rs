// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// The controlling terminal: raw input, the alternate screen, window size.
//
// `Terminal::new` refuses to start unless stdin and stdout are both
// terminals, so escape sequences never end up in a pipe or a file. Raw mode
// lives in `RawMode`, which holds the termios it replaced. A copy of that
// termios is also parked in a static for the panic hook, which restores the
// shell by writing straight to fd 1 since a panicking frame may still hold
// the stdout lock.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the window size cannot be read.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// The window size of stdout, or `None` if it is not a terminal.
#[cfg(unix)]
#[must_use]
pub fn window_size() -> Option<Size> {
    let mut ws = unsafe { std::mem::zeroed::<libc::winsize>() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn window_size() -> Option<Size> {
    None
}

/// Whether stdin and stdout are both terminals.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 && libc::isatty(libc::STDOUT_FILENO) == 1 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Raw mode ────────────────────────────────────────────────────────────────

#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn check(rc: libc::c_int) -> io::Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Stdin switched to raw, byte-at-a-time input.
#[cfg(unix)]
struct RawMode {
    saved: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    fn enable() -> io::Result<Self> {
        let fd = libc::STDIN_FILENO;
        let mut saved = unsafe { std::mem::zeroed::<libc::termios>() };
        check(unsafe { libc::tcgetattr(fd, &raw mut saved) })?;

        let mut attrs = saved;
        unsafe { libc::cfmakeraw(&raw mut attrs) };
        // read() returns as soon as one byte is there.
        attrs.c_cc[libc::VMIN] = 1;
        attrs.c_cc[libc::VTIME] = 0;
        check(unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const attrs) })?;

        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = Some(saved);
        }
        Ok(Self { saved })
    }

    fn restore(self) -> io::Result<()> {
        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = None;
        }
        let fd = libc::STDIN_FILENO;
        check(unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const self.saved) })
    }
}

#[cfg(not(unix))]
struct RawMode;

#[cfg(not(unix))]
impl RawMode {
    fn enable() -> io::Result<Self> {
        Err(io::ErrorKind::Unsupported.into())
    }

    fn restore(self) -> io::Result<()> {
        Ok(())
    }
}

fn write_all_seqs(out: &mut impl Write, seqs: &[&[u8]]) -> io::Result<()> {
    for seq in seqs {
        out.write_all(seq)?;
    }
    out.flush()
}

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            #[cfg(unix)]
            {
                for seq in ansi::RESTORE {
                    unsafe { libc::write(libc::STDOUT_FILENO, seq.as_ptr().cast(), seq.len()) };
                }
                if let Ok(slot) = SAVED_TERMIOS.lock() {
                    if let Some(saved) = slot.as_ref() {
                        unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, saved) };
                    }
                }
            }
            previous(info);
        }));
    });
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// The terminal the editor draws on.
///
/// Dropping it after [`enter`](Self::enter) puts the shell back.
///
/// ```no_run
/// use pg_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// term.enter()?;
/// // paint frames, read keys
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    size: Size,
    raw: Option<RawMode>,
}

impl Terminal {
    /// Check for a terminal and read its size. Nothing is changed yet.
    ///
    /// # Errors
    ///
    /// `ErrorKind::Unsupported` when stdin or stdout is not a terminal.
    pub fn new() -> io::Result<Self> {
        if !is_tty() {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not running in a terminal"));
        }
        Ok(Self {
            size: window_size().unwrap_or(Size::FALLBACK),
            raw: None,
        })
    }

    /// Size read at creation. Later changes arrive through SIGWINCH.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Raw mode plus a cleared alternate screen with the cursor hidden.
    /// Does nothing if already entered.
    ///
    /// # Errors
    ///
    /// termios failures and write errors on stdout.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.raw.is_some() {
            return Ok(());
        }
        install_panic_hook();
        self.raw = Some(RawMode::enable()?);
        write_all_seqs(
            &mut io::stdout().lock(),
            &[ansi::ALT_SCREEN_ON, ansi::HIDE_CURSOR, ansi::CLEAR_SCREEN],
        )
    }

    /// Undo [`enter`](Self::enter). The termios is restored even if writing
    /// the screen sequences fails.
    ///
    /// # Errors
    ///
    /// The first of the write or termios errors.
    pub fn leave(&mut self) -> io::Result<()> {
        let Some(raw) = self.raw.take() else {
            return Ok(());
        };
        let written = write_all_seqs(&mut io::stdout().lock(), &ansi::RESTORE);
        let restored = raw.restore();
        written.and(restored)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
