use crate::key::{KeyEvent, Sequence};
use crate::source::{ByteSource, Clock};
use crate::telnet;

/// How long a partial sequence may sit without new input before its bytes
/// are flushed as individual keys.
pub const SEQUENCE_TIMEOUT_MS: u64 = 250;

/// Turns a stream of raw terminal bytes into [`KeyEvent`]s.
///
/// The decoder never blocks. Each call to [`SequenceDecoder::next_event`]
/// consumes whatever input is needed to produce one event, or stops early
/// with [`KeyEvent::Pending`] / [`KeyEvent::Idle`] and resumes on the next
/// call, keeping the in-progress bytes in a small lookahead buffer.
pub struct SequenceDecoder<C> {
    clock: C,
    state: State,
    lookahead: Sequence,
    last_read: u64,
    draining: bool,
    flushed: bool,
    after_cr: bool,
}

impl<C: Clock> SequenceDecoder<C> {
    pub fn new(clock: C) -> Self {
        let last_read = clock.now_millis();
        Self {
            clock,
            state: State::Ground,
            lookahead: Sequence::new(),
            last_read,
            draining: false,
            flushed: false,
            after_cr: false,
        }
    }

    #[inline(always)]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The bytes of the sequence currently being assembled.
    #[inline(always)]
    pub fn lookahead(&self) -> &[u8] {
        self.lookahead.bytes()
    }

    /// Returns true when no sequence is in progress.
    pub fn is_idle(&self) -> bool {
        self.state == State::Ground && self.lookahead.is_empty()
    }

    /// Returns true if the last event was a byte released from a stalled
    /// sequence rather than decoded input.
    #[inline(always)]
    pub fn flushed(&self) -> bool {
        self.flushed
    }

    /// Milliseconds since a byte was last taken from the source.
    pub fn millis_since_read(&self) -> u64 {
        self.clock.now_millis().saturating_sub(self.last_read)
    }

    /// Abandons any partial sequence.
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.lookahead.clear();
        self.draining = false;
    }

    /// Decodes the next event from `source`.
    pub fn next_event<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> KeyEvent {
        self.flushed = false;
        if self.draining || self.stalled() {
            if let Some(event) = self.drain_one() {
                return event;
            }
        }

        loop {
            if !source.available() {
                return self.dry();
            }
            let Some(b) = source.read() else {
                return self.dry();
            };
            self.last_read = self.clock.now_millis();
            // The LF of a CR LF pair may arrive in a later poll than its CR.
            if std::mem::take(&mut self.after_cr) && b == 0x0a {
                continue;
            }
            if let Some(event) = self.step(b, source) {
                return event;
            }
        }
    }

    fn dry(&self) -> KeyEvent {
        if self.state == State::Ground {
            KeyEvent::Idle
        } else {
            KeyEvent::Pending
        }
    }

    fn stalled(&self) -> bool {
        !self.lookahead.is_empty() && self.millis_since_read() > SEQUENCE_TIMEOUT_MS
    }

    /// Gives up on a stalled sequence by releasing its oldest byte.
    ///
    /// Telnet commands are not keystrokes, so a stalled one is dropped
    /// instead of being replayed as characters.
    fn drain_one(&mut self) -> Option<KeyEvent> {
        if self.state.is_telnet() {
            tracing::debug!(sequence = ?self.lookahead, "discarding stalled telnet command");
            self.reset();
            return None;
        }

        self.state = State::Ground;
        let Some(b) = self.lookahead.pop_front() else {
            self.draining = false;
            return None;
        };
        self.draining = !self.lookahead.is_empty();
        self.flushed = true;
        tracing::trace!(byte = b, remaining = self.lookahead.len(), "flushing stalled sequence");
        Some(KeyEvent::from_byte(b))
    }

    fn step<S: ByteSource + ?Sized>(&mut self, b: u8, source: &mut S) -> Option<KeyEvent> {
        match self.state {
            State::Ground => match b {
                0x1b => self.begin(State::Escape, b),
                telnet::IAC => self.begin(State::Iac, b),
                0x0d => {
                    if source.peek() == Some(0x0a) {
                        let _ = source.read();
                    } else {
                        self.after_cr = true;
                    }
                    Some(KeyEvent::Enter)
                }
                _ => Some(KeyEvent::from_byte(b)),
            },
            State::Escape => {
                self.lookahead.push(b);
                match b {
                    0x1b => self.finish(KeyEvent::Escape),
                    b'[' => self.enter(State::Csi),
                    b'O' => self.enter(State::Ss3),
                    _ => self.unrecognized(),
                }
            }
            State::Csi => {
                self.lookahead.push(b);
                match b {
                    // Parameter and intermediate bytes; the sequence goes on.
                    0x20..=0x3f => Some(KeyEvent::Pending),
                    b'A' => self.finish(KeyEvent::Up),
                    b'B' => self.finish(KeyEvent::Down),
                    b'C' => self.finish(KeyEvent::Right),
                    b'D' => self.finish(KeyEvent::Left),
                    // Cursor position report, answer to `ESC [ 6 n`.
                    b'R' => self.finish(KeyEvent::Idle),
                    b'~' => match self.tilde_key() {
                        Some(key) => self.finish(key),
                        None => self.unrecognized(),
                    },
                    _ => self.unrecognized(),
                }
            }
            State::Ss3 => {
                self.lookahead.push(b);
                match b {
                    b'P'..=b'S' => self.finish(KeyEvent::F(b - b'P' + 1)),
                    _ => self.unrecognized(),
                }
            }
            State::Iac => {
                self.lookahead.push(b);
                match b {
                    telnet::IAC => self.finish(KeyEvent::Char(telnet::IAC)),
                    cmd if telnet::takes_option(cmd) => self.enter(State::IacOption(cmd)),
                    cmd => {
                        tracing::debug!(command = telnet::command_name(cmd), "telnet command ignored");
                        self.finish(KeyEvent::Idle)
                    }
                }
            }
            State::IacOption(cmd) => {
                self.lookahead.push(b);
                let command = telnet::command_name(cmd);
                let option = telnet::option_name(b);
                match cmd {
                    telnet::SB => {
                        tracing::debug!(option, "telnet sub-negotiation started");
                        self.enter(State::Subnegotiation)
                    }
                    telnet::DO | telnet::DONT if telnet::is_passive_option(b) => {
                        tracing::debug!(command, option, "telnet option acknowledged");
                        self.finish(KeyEvent::Idle)
                    }
                    _ => {
                        tracing::debug!(command, option, code = b, "telnet option ignored");
                        self.finish(KeyEvent::Idle)
                    }
                }
            }
            State::Subnegotiation => {
                if b == telnet::IAC {
                    self.state = State::SubnegotiationIac;
                }
                None
            }
            State::SubnegotiationIac => match b {
                telnet::SE => {
                    tracing::debug!("telnet sub-negotiation finished");
                    self.finish(KeyEvent::Idle)
                }
                // IAC IAC is an escaped data byte; anything else is a peer
                // error that we tolerate by staying in the payload.
                _ => self.enter(State::Subnegotiation),
            },
        }
    }

    /// Maps the parameter of a `ESC [ <n> ~` sequence to its key.
    fn tilde_key(&self) -> Option<KeyEvent> {
        if self.lookahead.has_overrun() {
            return None;
        }
        let bytes = self.lookahead.bytes();
        // Strip the leading `ESC [` and the trailing `~`.
        let param = bytes.get(2..bytes.len().saturating_sub(1))?;
        let key = match param {
            b"1" => KeyEvent::Home,
            b"2" => KeyEvent::Insert,
            b"3" => KeyEvent::Delete,
            b"4" => KeyEvent::End,
            b"5" => KeyEvent::PageUp,
            b"6" => KeyEvent::PageDown,
            b"11" => KeyEvent::F(1),
            b"12" => KeyEvent::F(2),
            b"13" => KeyEvent::F(3),
            b"14" => KeyEvent::F(4),
            b"15" => KeyEvent::F(5),
            b"17" => KeyEvent::F(6),
            b"18" => KeyEvent::F(7),
            b"19" => KeyEvent::F(8),
            b"20" => KeyEvent::F(9),
            b"21" => KeyEvent::F(10),
            b"23" => KeyEvent::F(11),
            b"24" => KeyEvent::F(12),
            _ => return None,
        };
        Some(key)
    }

    fn begin(&mut self, state: State, b: u8) -> Option<KeyEvent> {
        self.lookahead.clear();
        self.lookahead.push(b);
        self.enter(state)
    }

    #[inline(always)]
    fn enter(&mut self, state: State) -> Option<KeyEvent> {
        self.state = state;
        None
    }

    fn finish(&mut self, event: KeyEvent) -> Option<KeyEvent> {
        self.reset();
        Some(event)
    }

    fn unrecognized(&mut self) -> Option<KeyEvent> {
        let sequence = self.lookahead;
        tracing::debug!(?sequence, "unrecognized sequence");
        self.reset();
        Some(KeyEvent::Unrecognized(sequence))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    Csi,
    Ss3,
    Iac,
    IacOption(u8),
    Subnegotiation,
    SubnegotiationIac,
}

impl State {
    const fn is_telnet(self) -> bool {
        matches!(
            self,
            State::Iac | State::IacOption(_) | State::Subnegotiation | State::SubnegotiationIac
        )
    }
}
