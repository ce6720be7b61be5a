//! Line console for serial-style terminal connections.
//!
//! This library turns a raw, possibly fragmented byte stream, as it arrives
//! from a serial port or a Telnet socket, into discrete key events and an
//! editable line of text. It recognizes plain and control characters, ANSI
//! CSI sequences, SS3 function keys and Telnet IAC negotiation, and it does
//! so without ever waiting for input: every call either completes at once or
//! reports that it needs more bytes.
//!
//! The main entry point in this crate is [`Console`], which is polled once
//! per iteration of the host's own loop through [`Console::read_key`] and
//! delivers completed lines to an implementation of trait [`LineHandler`].
//! The pieces it is built from, [`SequenceDecoder`] and [`LineEditor`], can
//! also be used on their own.
//!
//! ```rust
//! # use std::collections::VecDeque;
//! # use vtconsole::{line_handler_fn, Console, KeyEvent};
//! let mut lines: Vec<Vec<u8>> = Vec::new();
//! let input: VecDeque<u8> = b"helo\x1b[D\x1b[Dl\r\n".iter().copied().collect();
//! let mut console = Console::new(
//!     input,
//!     Vec::new(),
//!     line_handler_fn(|line| lines.push(line.to_vec())),
//! );
//! while console.read_key() != KeyEvent::Idle {}
//! # drop(console);
//! assert_eq!(lines, [b"hello".to_vec()]);
//! ```
//!
//! Nothing here grows after construction: the line buffer, the history
//! slots and the lookahead for partial sequences are all sized up front.

mod config;
mod console;
mod decoder;
mod editor;
mod error;
mod handler;
mod history;
mod key;
mod line;
pub mod render;
mod source;
pub mod telnet;

pub use config::{ConsoleConfig, ConsoleFlags, Prompt, PROMPT_CAPACITY};
pub use console::{Console, DEFAULT_HISTORY_DEPTH, DEFAULT_LINE_CAPACITY};
pub use decoder::{SequenceDecoder, SEQUENCE_TIMEOUT_MS};
pub use editor::LineEditor;
pub use error::{ConfigError, EditError};
pub use handler::{line_handler_fn, LineHandler};
pub use history::{History, Recall};
pub use key::{KeyEvent, Sequence, LOOKAHEAD_LEN};
pub use line::LineBuffer;
pub use source::{ByteSource, ChannelSource, Clock, MonotonicClock};

#[cfg(test)]
mod tests;
