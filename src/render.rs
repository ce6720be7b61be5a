//! Drawing the input line.
//!
//! Rendering is a pure function of the prompt, the line storage, the caret
//! and the flags. It always repaints the whole line, so it can be called
//! after any change without tracking what is already on screen.

use std::io::{self, Write};

use crate::config::{ConsoleFlags, Prompt};
use crate::key::Sequence;

/// Moves the cursor to the far left and erases the line.
pub const CLEAR_LINE: &str = "\x1b[1000D\x1b[0K";
/// Moves the cursor to the far left.
pub const CURSOR_HOME: &str = "\x1b[1000D";

/// Number of storage bytes shown by the debug dump.
pub const DEBUG_DUMP_LEN: usize = 32;

/// Repaints the prompt and line, then places the cursor on the caret.
///
/// `raw` is the line's whole backing storage; only the part before the
/// first NUL is shown, except in debug mode which dumps the first
/// [`DEBUG_DUMP_LEN`] bytes as hex with each NUL drawn as `|`.
pub fn render_line<W: Write + ?Sized>(
    out: &mut W,
    prompt: &Prompt,
    raw: &[u8],
    caret: usize,
    flags: ConsoleFlags,
) -> io::Result<()> {
    out.write_all(CLEAR_LINE.as_bytes())?;
    out.write_all(prompt.as_str().as_bytes())?;

    let hidden = flags.contains(ConsoleFlags::HIDE_PASSWORD);
    if flags.contains(ConsoleFlags::DEBUG) {
        for &b in raw.iter().take(DEBUG_DUMP_LEN) {
            if b == 0 {
                out.write_all(b"|")?;
            } else {
                write!(out, "0x{b:02x} ")?;
            }
        }
    } else if !hidden {
        let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        out.write_all(&raw[..len])?;
    }

    out.write_all(CURSOR_HOME.as_bytes())?;
    let column = if hidden {
        prompt.len()
    } else {
        prompt.len() + caret
    };
    // `ESC [ 0 C` moves one column on most terminals, so skip it.
    if column > 0 {
        write!(out, "\x1b[{column}C")?;
    }
    out.flush()
}

/// Writes a readable dump of an unrecognized sequence on its own line,
/// for example ` \e[99~ => 0x5B [ 0x39 9 0x39 9 0x7E ~`.
pub fn write_sequence_dump<W: Write + ?Sized>(out: &mut W, sequence: &Sequence) -> io::Result<()> {
    let bytes = sequence.bytes();
    let rest = bytes.get(1..).unwrap_or_default();
    let shown = |b: u8| if b.is_ascii_graphic() { b as char } else { '.' };
    out.write_all(b" \\e")?;
    for &b in rest {
        write!(out, "{}", shown(b))?;
    }
    out.write_all(b" =>")?;
    for &b in rest {
        write!(out, " 0x{b:02X} {}", shown(b))?;
    }
    out.write_all(b"\r\n")
}
