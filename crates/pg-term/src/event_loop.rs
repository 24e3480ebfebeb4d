// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — single-threaded read → decode → apply → paint cycle.
//
// The loop blocks in `poll()` on stdin until bytes arrive, decodes them
// into key events, hands each one to the application, and repaints once
// the batch has been applied. Nothing runs concurrently: every key is
// applied to completion before the next is looked at.
//
// # SIGWINCH Handling
//
// A signal handler sets an `AtomicBool`. The handler is installed without
// SA_RESTART, so a resize interrupts the blocking `poll()`; the loop sees
// EINTR, checks the flag, and tells the application the new size.
//
// # Escape Sequence Timeout
//
// A lone ESC byte is ambiguous until the next byte arrives. While the
// parser holds pending bytes the loop polls with a short timeout instead
// of blocking, and flushes them as literal keys if nothing follows.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::input::{KeyEvent, Parser};
use crate::paint::AnsiPainter;
use crate::terminal::{self, Size};

/// Bytes requested per read. One keypress is 1-6 bytes, a paste can be
/// kilobytes.
const READ_BUF_SIZE: usize = 4096;

/// How long a lone ESC waits for the rest of a sequence.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(25);

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── Input ───────────────────────────────────────────────────────────────────

/// A byte source the loop can wait on.
pub trait Input {
    /// Block until bytes are available or `timeout` elapses (`None` waits
    /// forever). Returns `false` on timeout.
    ///
    /// # Errors
    ///
    /// `ErrorKind::Interrupted` when a signal arrived; other I/O errors from
    /// the device.
    fn wait(&mut self, timeout: Option<Duration>) -> io::Result<bool>;

    /// Read available bytes. `Ok(0)` means end of input.
    ///
    /// # Errors
    ///
    /// I/O errors from the device.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Raw reads from the process's stdin file descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinInput;

#[cfg(unix)]
impl Input for StdinInput {
    fn wait(&mut self, timeout: Option<Duration>) -> io::Result<bool> {
        let ms = timeout.map_or(-1, |t| i32::try_from(t.as_millis()).unwrap_or(i32::MAX));
        let mut pfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        let n = unsafe { libc::poll(&raw mut pfd, 1, ms) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n > 0)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
impl Input for StdinInput {
    fn wait(&mut self, _timeout: Option<Duration>) -> io::Result<bool> {
        Ok(true)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut io::stdin(), buf)
    }
}

/// Scripted input: always ready, ends when the slice is exhausted.
impl Input for &[u8] {
    fn wait(&mut self, _timeout: Option<Duration>) -> io::Result<bool> {
        Ok(true)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }
}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the loop after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// State may have changed; repaint before waiting again.
    Continue,
    /// Nothing changed; ring the bell.
    Bell,
    /// Exit the loop.
    Quit,
}

/// Application interface for the event loop.
pub trait App {
    /// Handle one decoded key.
    fn on_key(&mut self, key: KeyEvent) -> Action;

    /// The terminal changed size. The next paint follows immediately.
    fn on_resize(&mut self, _size: Size) {}

    /// Draw the current state. Returns where the hardware cursor goes, or
    /// `None` to hide it.
    ///
    /// # Errors
    ///
    /// I/O errors from the painter.
    fn paint<W: Write>(&mut self, painter: &mut AnsiPainter<W>) -> io::Result<Option<(u16, u16)>>;
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The read/apply/paint loop.
pub struct EventLoop<I: Input, W: Write> {
    input: I,
    painter: AnsiPainter<W>,
    parser: Parser,
}

impl<W: Write> EventLoop<StdinInput, W> {
    /// A loop reading the process's stdin and painting to `output`.
    pub fn stdin(output: W) -> Self {
        Self::new(StdinInput, output)
    }
}

impl<I: Input, W: Write> EventLoop<I, W> {
    pub fn new(input: I, output: W) -> Self {
        Self {
            input,
            painter: AnsiPainter::new(output),
            parser: Parser::new(),
        }
    }

    /// Unwrap the loop, returning the output writer.
    pub fn into_output(self) -> W {
        self.painter.into_inner()
    }

    /// Run until the application quits or input ends.
    ///
    /// The first frame is painted before any input is read.
    ///
    /// # Errors
    ///
    /// I/O errors from reading input or painting.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        install_sigwinch_handler();

        let mut buf = [0u8; READ_BUF_SIZE];
        let mut dirty = true;

        loop {
            if dirty {
                let cursor = app.paint(&mut self.painter)?;
                self.painter.place_cursor(cursor)?;
                dirty = false;
            }

            let timeout = self.parser.has_pending().then_some(ESCAPE_TIMEOUT);
            let ready = match self.input.wait(timeout) {
                Ok(ready) => ready,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => false,
                Err(e) => return Err(e),
            };

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                if let Some(size) = terminal::window_size() {
                    app.on_resize(size);
                    dirty = true;
                }
            }

            let (keys, eof) = if ready {
                match self.input.read(&mut buf) {
                    Ok(0) => (self.parser.flush(), true),
                    Ok(n) => (self.parser.advance(&buf[..n]), false),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            } else if self.parser.has_pending() && timeout.is_some() {
                (self.parser.flush(), false)
            } else {
                continue;
            };

            for key in keys {
                match app.on_key(key) {
                    Action::Continue => dirty = true,
                    Action::Bell => self.painter.bell()?,
                    Action::Quit => return Ok(()),
                }
            }

            if eof {
                return Ok(());
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
