use std::io::Write;

use crate::config::{ConsoleConfig, ConsoleFlags};
use crate::decoder::SequenceDecoder;
use crate::editor::LineEditor;
use crate::handler::LineHandler;
use crate::history::{History, Recall};
use crate::key::KeyEvent;
use crate::source::{ByteSource, Clock, MonotonicClock};

/// Default line buffer size in bytes.
pub const DEFAULT_LINE_CAPACITY: usize = 128;
/// Default number of lines kept for recall.
pub const DEFAULT_HISTORY_DEPTH: usize = 8;

/// An interactive line console over a non-blocking byte stream.
///
/// Call [`Console::read_key`] once per iteration of the host loop. Each call
/// decodes at most one key, applies it to the line according to the
/// current [`ConsoleFlags`], and hands completed lines to the
/// [`LineHandler`].
pub struct Console<S, W, H, C = MonotonicClock> {
    source: S,
    decoder: SequenceDecoder<C>,
    editor: LineEditor<W>,
    history: History,
    handler: H,
    prompt_pending: bool,
}

impl<S, W, H> Console<S, W, H, MonotonicClock> {
    pub fn new(source: S, out: W, handler: H) -> Self {
        Self::with_clock(
            source,
            out,
            handler,
            MonotonicClock::new(),
            DEFAULT_LINE_CAPACITY,
        )
    }
}

impl<S, W, H, C> Console<S, W, H, C> {
    #[inline(always)]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    #[inline(always)]
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    #[inline(always)]
    pub fn take_handler(self) -> H {
        self.handler
    }

    #[inline(always)]
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[inline(always)]
    pub fn editor(&self) -> &LineEditor<W> {
        &self.editor
    }

    #[inline(always)]
    pub fn editor_mut(&mut self) -> &mut LineEditor<W> {
        &mut self.editor
    }

    #[inline(always)]
    pub fn decoder(&self) -> &SequenceDecoder<C> {
        &self.decoder
    }

    #[inline(always)]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[inline(always)]
    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// The line as typed so far.
    #[inline(always)]
    pub fn line(&self) -> &[u8] {
        self.editor.contents()
    }

    #[inline(always)]
    pub fn caret(&self) -> usize {
        self.editor.caret()
    }

    #[inline(always)]
    pub fn writer(&self) -> &W {
        self.editor.writer()
    }

    #[inline(always)]
    pub fn writer_mut(&mut self) -> &mut W {
        self.editor.writer_mut()
    }

    #[inline(always)]
    pub fn flags(&self) -> ConsoleFlags {
        self.editor.flags()
    }

    pub fn set_flag(&mut self, flag: ConsoleFlags, on: bool) {
        let mut flags = self.editor.flags();
        flags.set(flag, on);
        self.editor.set_flags(flags);
    }

    pub fn set_flags(&mut self, flags: ConsoleFlags) {
        self.editor.set_flags(flags);
    }

    pub fn insert_mode(&self) -> bool {
        self.flags().contains(ConsoleFlags::INSERT_MODE)
    }

    pub fn set_insert_mode(&mut self, on: bool) {
        self.set_flag(ConsoleFlags::INSERT_MODE, on);
    }

    pub fn debug(&self) -> bool {
        self.flags().contains(ConsoleFlags::DEBUG)
    }

    pub fn set_debug(&mut self, on: bool) {
        self.set_flag(ConsoleFlags::DEBUG, on);
    }

    pub fn hide_password(&self) -> bool {
        self.flags().contains(ConsoleFlags::HIDE_PASSWORD)
    }

    pub fn set_hide_password(&mut self, on: bool) {
        self.set_flag(ConsoleFlags::HIDE_PASSWORD, on);
    }

    pub fn auto_redraw(&self) -> bool {
        self.flags().contains(ConsoleFlags::AUTO_REDRAW)
    }

    pub fn set_auto_redraw(&mut self, on: bool) {
        self.set_flag(ConsoleFlags::AUTO_REDRAW, on);
    }

    pub fn auto_edit(&self) -> bool {
        self.flags().contains(ConsoleFlags::AUTO_EDIT)
    }

    pub fn set_auto_edit(&mut self, on: bool) {
        self.set_flag(ConsoleFlags::AUTO_EDIT, on);
    }

    pub fn auto_move(&self) -> bool {
        self.flags().contains(ConsoleFlags::AUTO_MOVE)
    }

    pub fn set_auto_move(&mut self, on: bool) {
        self.set_flag(ConsoleFlags::AUTO_MOVE, on);
    }

    pub fn auto_clear(&self) -> bool {
        self.flags().contains(ConsoleFlags::AUTO_CLEAR)
    }

    pub fn set_auto_clear(&mut self, on: bool) {
        self.set_flag(ConsoleFlags::AUTO_CLEAR, on);
    }

    pub fn auto_history(&self) -> bool {
        self.flags().contains(ConsoleFlags::AUTO_HISTORY)
    }

    pub fn set_auto_history(&mut self, on: bool) {
        self.set_flag(ConsoleFlags::AUTO_HISTORY, on);
    }

    pub fn prompt(&self) -> &str {
        self.editor.prompt().as_str()
    }

    /// Changes the prompt, truncated to fit. Shown from the next redraw on.
    pub fn set_prompt(&mut self, prompt: &str) {
        self.editor.set_prompt(prompt);
    }
}

impl<S, W, H, C: Clock> Console<S, W, H, C> {
    pub fn with_clock(source: S, out: W, handler: H, clock: C, line_capacity: usize) -> Self {
        Self {
            source,
            decoder: SequenceDecoder::new(clock),
            editor: LineEditor::new(out, line_capacity),
            history: History::new(DEFAULT_HISTORY_DEPTH, line_capacity),
            handler,
            prompt_pending: true,
        }
    }

    /// Builds a console from a loaded [`ConsoleConfig`].
    pub fn from_config(config: &ConsoleConfig, source: S, out: W, handler: H, clock: C) -> Self {
        let mut editor = LineEditor::with_flags(out, config.line_capacity, config.flags());
        editor.set_prompt(&config.prompt);
        Self {
            source,
            decoder: SequenceDecoder::new(clock),
            editor,
            history: History::new(config.history_depth, config.line_capacity),
            handler,
            prompt_pending: true,
        }
    }
}

impl<S, W, H, C> Console<S, W, H, C>
where
    S: ByteSource,
    W: Write,
    H: LineHandler,
    C: Clock,
{
    /// Polls for one key and applies it to the line.
    ///
    /// Never waits for input: returns [`KeyEvent::Idle`] when nothing has
    /// arrived and [`KeyEvent::Pending`] while a sequence is incomplete.
    pub fn read_key(&mut self) -> KeyEvent {
        if self.prompt_pending {
            self.prompt_pending = false;
            if self.auto_redraw() {
                if let Err(err) = self.editor.redraw() {
                    tracing::warn!(%err, "failed to draw prompt");
                }
            }
        }

        let event = self.decoder.next_event(&mut self.source);
        // Bytes released from a stalled sequence are reported, not typed.
        if !self.decoder.flushed() {
            self.apply(event);
        }
        event
    }

    fn apply(&mut self, event: KeyEvent) {
        let flags = self.flags();
        let edit = flags.contains(ConsoleFlags::AUTO_EDIT);
        let move_caret = flags.contains(ConsoleFlags::AUTO_MOVE);

        match event {
            KeyEvent::Char(b) if edit => {
                self.history.reset_recall();
                if let Err(err) = self.editor.type_byte(b) {
                    tracing::trace!(%err, byte = b, "dropped typed byte");
                }
            }
            KeyEvent::Backspace if edit => {
                self.history.reset_recall();
                if let Err(err) = self.editor.backspace() {
                    tracing::trace!(%err, "backspace refused");
                }
            }
            KeyEvent::Delete => {
                self.history.reset_recall();
                if let Err(err) = self.editor.delete_forward() {
                    tracing::trace!(%err, "delete refused");
                }
            }
            KeyEvent::Insert if edit => {
                self.set_insert_mode(!self.insert_mode());
            }
            KeyEvent::Left if move_caret => self.editor.move_caret(-1),
            KeyEvent::Right if move_caret => self.editor.move_caret(1),
            KeyEvent::Home | KeyEvent::Ctrl(b'A') if move_caret => self.editor.set_caret(0),
            KeyEvent::End | KeyEvent::Ctrl(b'E') if move_caret => self.editor.caret_to_end(),
            KeyEvent::Ctrl(b'B') if move_caret => self.editor.word_left(),
            KeyEvent::Ctrl(b'F') if move_caret => self.editor.word_right(),
            KeyEvent::Up if flags.contains(ConsoleFlags::AUTO_HISTORY) => {
                let recall = self.history.older();
                Self::recall_into(&mut self.editor, recall);
            }
            KeyEvent::Down if flags.contains(ConsoleFlags::AUTO_HISTORY) => {
                let recall = self.history.newer();
                Self::recall_into(&mut self.editor, recall);
            }
            KeyEvent::Enter => self.complete_line(flags),
            KeyEvent::Unrecognized(sequence) if flags.contains(ConsoleFlags::DEBUG) => {
                self.editor.dump_sequence(&sequence);
            }
            _ => {}
        }
    }

    fn recall_into(editor: &mut LineEditor<W>, recall: Recall<'_>) {
        let result = match recall {
            Recall::Entry(line) => editor.replace(line),
            Recall::Fresh => {
                editor.clear();
                Ok(())
            }
            Recall::Unchanged => Ok(()),
        };
        if let Err(err) = result {
            tracing::trace!(%err, "history recall refused");
        }
    }

    fn complete_line(&mut self, flags: ConsoleFlags) {
        self.handler.line(self.editor.contents());
        if flags.contains(ConsoleFlags::AUTO_HISTORY) {
            self.history.push(self.editor.contents());
        } else {
            self.history.reset_recall();
        }
        if flags.contains(ConsoleFlags::AUTO_CLEAR) {
            self.editor.clear();
        }
    }
}
