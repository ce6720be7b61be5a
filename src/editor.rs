use std::io::{self, Write};

use crate::config::{ConsoleFlags, Prompt};
use crate::error::EditError;
use crate::key::Sequence;
use crate::line::LineBuffer;
use crate::render;

/// An editable line with a caret, drawn after a prompt.
///
/// Every method that changes the line or the caret repaints it on the
/// writer before returning when [`ConsoleFlags::AUTO_REDRAW`] is set.
/// Repaint failures are logged and otherwise ignored; call
/// [`LineEditor::redraw`] directly to observe them.
pub struct LineEditor<W> {
    out: W,
    line: LineBuffer,
    caret: usize,
    prompt: Prompt,
    flags: ConsoleFlags,
}

impl<W> LineEditor<W> {
    pub fn new(out: W, capacity: usize) -> Self {
        Self::with_flags(out, capacity, ConsoleFlags::default())
    }

    pub fn with_flags(out: W, capacity: usize, flags: ConsoleFlags) -> Self {
        Self {
            out,
            line: LineBuffer::with_capacity(capacity),
            caret: 0,
            prompt: Prompt::default(),
            flags,
        }
    }

    /// The current text, without terminator.
    #[inline(always)]
    pub fn contents(&self) -> &[u8] {
        self.line.as_bytes()
    }

    #[inline(always)]
    pub fn buffer(&self) -> &LineBuffer {
        &self.line
    }

    #[inline(always)]
    pub fn caret(&self) -> usize {
        self.caret
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.line.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.line.capacity()
    }

    #[inline(always)]
    pub fn flags(&self) -> ConsoleFlags {
        self.flags
    }

    #[inline(always)]
    pub fn set_flags(&mut self, flags: ConsoleFlags) {
        self.flags = flags;
    }

    #[inline(always)]
    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    /// Changes the prompt, truncated to fit. Shown from the next redraw on.
    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = Prompt::new(prompt);
    }

    #[inline(always)]
    pub fn writer(&self) -> &W {
        &self.out
    }

    #[inline(always)]
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    #[inline(always)]
    pub fn into_writer(self) -> W {
        self.out
    }
}

impl<W: Write> LineEditor<W> {
    /// Inserts `b` at the caret and advances the caret past it.
    pub fn insert(&mut self, b: u8) -> Result<(), EditError> {
        self.line.insert(self.caret, b)?;
        self.caret += 1;
        self.notify();
        Ok(())
    }

    /// Inserts `b` at `index` (clamped to the length) without moving the caret.
    pub fn insert_at(&mut self, index: usize, b: u8) -> Result<(), EditError> {
        self.line.insert(index, b)?;
        self.notify();
        Ok(())
    }

    /// Enters a typed byte at the caret, inserting or overwriting depending
    /// on [`ConsoleFlags::INSERT_MODE`].
    pub fn type_byte(&mut self, b: u8) -> Result<(), EditError> {
        if self.flags.contains(ConsoleFlags::INSERT_MODE) {
            return self.insert(b);
        }
        self.line.overwrite(self.caret, b)?;
        self.caret += 1;
        self.notify();
        Ok(())
    }

    /// Removes the byte before the caret. Does nothing at the start of the line.
    pub fn backspace(&mut self) -> Result<(), EditError> {
        if self.line.max_len() == 0 {
            return Err(EditError::NoCapacity);
        }
        if self.caret == 0 {
            return Ok(());
        }
        self.line.remove(self.caret - 1)?;
        self.caret -= 1;
        self.notify();
        Ok(())
    }

    /// Removes the byte under the caret. Does nothing at the end of the line.
    pub fn delete_forward(&mut self) -> Result<(), EditError> {
        if self.line.remove(self.caret)?.is_some() {
            self.notify();
        }
        Ok(())
    }

    /// Moves the caret to `index`, clamped to `0..=len`.
    pub fn set_caret(&mut self, index: usize) {
        self.caret = index.min(self.line.len());
        self.notify();
    }

    /// Moves the caret by `delta`, clamped to the line.
    pub fn move_caret(&mut self, delta: isize) {
        self.set_caret(self.caret.saturating_add_signed(delta));
    }

    pub fn caret_to_end(&mut self) {
        self.set_caret(self.line.len());
    }

    /// Moves the caret to the start of the word before it.
    pub fn word_left(&mut self) {
        let text = self.line.as_bytes();
        let mut i = self.caret;
        while i > 0 && text[i - 1] == b' ' {
            i -= 1;
        }
        while i > 0 && text[i - 1] != b' ' {
            i -= 1;
        }
        self.set_caret(i);
    }

    /// Moves the caret to the end of the word after it.
    pub fn word_right(&mut self) {
        let text = self.line.as_bytes();
        let mut i = self.caret;
        while i < text.len() && text[i] == b' ' {
            i += 1;
        }
        while i < text.len() && text[i] != b' ' {
            i += 1;
        }
        self.set_caret(i);
    }

    /// Replaces the whole line and puts the caret at its end.
    pub fn replace(&mut self, text: &[u8]) -> Result<(), EditError> {
        self.line.set(text)?;
        self.caret = self.line.len();
        self.notify();
        Ok(())
    }

    /// Zeroes the line in place and resets the caret.
    pub fn clear(&mut self) {
        self.line.clear();
        self.caret = 0;
        self.notify();
    }

    /// Repaints the prompt and line unconditionally.
    pub fn redraw(&mut self) -> io::Result<()> {
        render::render_line(
            &mut self.out,
            &self.prompt,
            self.line.raw(),
            self.caret,
            self.flags,
        )
    }

    /// Prints a dump of `sequence` above the line, then repaints.
    pub fn dump_sequence(&mut self, sequence: &Sequence) {
        if let Err(err) = render::write_sequence_dump(&mut self.out, sequence) {
            tracing::warn!(%err, "failed to write sequence dump");
        }
        self.notify();
    }

    fn notify(&mut self) {
        if !self.flags.contains(ConsoleFlags::AUTO_REDRAW) {
            return;
        }
        if let Err(err) = self.redraw() {
            tracing::warn!(%err, "failed to redraw line");
        }
    }
}
