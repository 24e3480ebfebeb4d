// SPDX-License-Identifier: MIT
//
// pgedit — a small terminal text editor.
//
// This is the binary that wires the two crates together:
//
//   pg-term   → raw mode, key decoding, frame diff, ANSI painting, loop
//   pg-editor → piece table, gap buffer, line session, renderer, commands
//
// Each keypress flows through:
//
//   stdin → parser → command::from_key → Editor::apply
//   Editor::paint → compose into back buffer → diff → AnsiPainter → stdout
//
// Recoverable failures (an edit at the edge of the text) ring the bell.
// I/O failures are written to the bottom row and to the log file. Logs go
// to `pgedit.log` in the temp directory, never to the screen being drawn.
//
// Environment:
//
//   PGEDIT_LOG      tracing filter, e.g. `debug` or `pg_editor=trace`
//   PGEDIT_OPTIONS  `:set`-style directives, e.g. `gapsize=128 so=2 noet`

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use pg_editor::command;
use pg_editor::options::Options;
use pg_editor::{EditError, Editor, Outcome};
use pg_term::event_loop::{Action, App, EventLoop};
use pg_term::input::KeyEvent;
use pg_term::paint::AnsiPainter;
use pg_term::terminal::{Size, Terminal};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "pgedit.log";
const LOG_ENV: &str = "PGEDIT_LOG";
const OPTIONS_ENV: &str = "PGEDIT_OPTIONS";

// ─── App ────────────────────────────────────────────────────────────────────

/// The editor as seen by the event loop.
struct PgEdit {
    editor: Editor,
}

impl PgEdit {
    const fn new(editor: Editor) -> Self {
        Self { editor }
    }
}

impl App for PgEdit {
    fn on_key(&mut self, key: KeyEvent) -> Action {
        let Some(cmd) = command::from_key(key, self.editor.page_rows()) else {
            return Action::Bell;
        };

        match self.editor.apply(cmd) {
            Ok(Outcome::Quit) => Action::Quit,
            Ok(Outcome::Saved) => {
                tracing::info!(path = ?self.editor.path(), "saved");
                Action::Continue
            }
            Ok(Outcome::Continue) => {
                self.editor.clear_status();
                Action::Continue
            }
            Err(e) if e.is_recoverable() => {
                tracing::trace!(error = %e, ?cmd, "command had no effect");
                Action::Bell
            }
            Err(e) => {
                tracing::error!(error = %e, ?cmd, "command failed");
                self.editor.set_status(e.to_string());
                Action::Continue
            }
        }
    }

    fn on_resize(&mut self, size: Size) {
        self.editor.resize(size.cols, size.rows);
    }

    fn paint<W: Write>(&mut self, painter: &mut AnsiPainter<W>) -> io::Result<Option<(u16, u16)>> {
        self.editor.paint(painter).map_err(into_io)
    }
}

fn into_io(e: EditError) -> io::Error {
    match e {
        EditError::Io(e) => e,
        other => io::Error::other(other),
    }
}

// ─── Startup ────────────────────────────────────────────────────────────────

/// Send tracing output to a file in the temp directory.
///
/// Returns the guard that flushes the background writer on drop, or `None`
/// if a subscriber was already installed.
fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = env::temp_dir();
    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|()| guard)
}

/// Options from the environment on top of the defaults.
fn load_options() -> Result<Options, String> {
    match env::var(OPTIONS_ENV) {
        Ok(args) => Options::from_set_str(&args).map_err(|e| format!("{OPTIONS_ENV}: {e}")),
        Err(_) => Ok(Options::default()),
    }
}

/// `pgedit [FILE]`
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>, String> {
    let path = args.next().map(PathBuf::from);
    if args.next().is_some() {
        return Err("usage: pgedit [FILE]".to_string());
    }
    Ok(path)
}

fn run(path: Option<PathBuf>, options: Options) -> Result<(), String> {
    // Refuses before anything is read or drawn when stdio is not a terminal.
    let mut term = Terminal::new().map_err(|e| e.to_string())?;
    let size = term.size();

    let opened = Editor::open(path.as_deref(), size.cols, size.rows, options);
    let editor = opened.map_err(|e| match &path {
        Some(p) => format!("{}: {e}", p.display()),
        None => e.to_string(),
    })?;
    tracing::info!(
        path = ?editor.path(),
        lines = editor.table().line_count(),
        cols = size.cols,
        rows = size.rows,
        options = %editor.options().describe(),
        "startup"
    );

    term.enter().map_err(|e| format!("failed to enter raw mode: {e}"))?;
    let mut app = PgEdit::new(editor);
    let result = EventLoop::stdin(io::stdout()).run(&mut app);
    term.leave().map_err(|e| format!("failed to restore terminal: {e}"))?;

    result.map_err(|e| e.to_string())?;
    tracing::info!(modified = app.editor.is_modified(), "exit");
    Ok(())
}

fn main() {
    let log_guard = configure_logging();

    let outcome = parse_args(env::args().skip(1))
        .and_then(|path| Ok((path, load_options()?)))
        .and_then(|(path, options)| run(path, options));

    if let Err(e) = outcome {
        tracing::error!(error = %e, "fatal");
        eprintln!("pgedit: {e}");
        drop(log_guard);
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
