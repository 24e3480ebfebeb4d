//! # pg-editor — Editing core for pgedit
//!
//! This crate holds the document model and everything that edits it:
//!
//! - **[`piece_table`]** — the document as a dense sequence of line pieces
//! - **[`gap_buffer`]** — the mutable store for the line being edited
//! - **[`session`]** — binds one line to the gap buffer and commits it back
//! - **[`view`]** / **[`renderer`]** — scroll state and frame composition
//!   onto pg-term's double buffer
//! - **[`command`]** / **[`editor`]** — decoded user actions and the editor
//!   that applies them
//! - **[`options`]** — `:set`-style tunables
//! - **[`error`]** / **[`position`]** — shared error and coordinate types

pub mod command;
pub mod editor;
pub mod error;
pub mod gap_buffer;
pub mod options;
pub mod piece_table;
pub mod position;
pub mod renderer;
pub mod session;
pub mod view;

pub use editor::{Editor, Outcome};
pub use error::{EditError, Result};
