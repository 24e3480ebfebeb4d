// SPDX-License-Identifier: MIT
//
// pg-term — Terminal layer for pgedit.
//
// Owns everything that touches the terminal device: a byte-per-cell frame
// buffer, the front/back pair with its diff pass, the painter that turns
// changed cells into cursor moves and bytes, raw mode and size queries, a
// small key decoder, and the single-threaded loop that ties them together.
//
// Like the rest of the editor, this crate talks to the terminal through
// plain ANSI escape sequences and termios. Every repaint is a diff. Nothing
// is written that did not change.

pub mod ansi;
pub mod buffer;
pub mod diff;
pub mod event_loop;
pub mod input;
pub mod paint;
pub mod terminal;
