/// Number of bytes an in-progress sequence can hold before it overruns.
pub const LOOKAHEAD_LEN: usize = 10;

/// Logical key events produced by [`crate::SequenceDecoder`].
///
/// Besides one variant per named key there are three markers that carry no
/// key at all: [`KeyEvent::Pending`], [`KeyEvent::Unrecognized`] and
/// [`KeyEvent::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A printable byte in the range `0x20..=0xFF`.
    Char(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// Function key `F1` through `F12`.
    F(u8),
    Backspace,
    Tab,
    Escape,
    /// Line terminator, either `CR` (with an optional `LF` swallowed) or a lone `LF`.
    Enter,
    /// Any other C0 control byte, reported by its caret-notation letter,
    /// so `0x03` arrives as `Ctrl(b'C')`.
    Ctrl(u8),
    /// Part of a sequence has been buffered and more bytes are needed.
    Pending,
    /// A complete sequence that has no meaning here.
    Unrecognized(Sequence),
    /// Nothing happened during this poll.
    Idle,
}

impl KeyEvent {
    /// Classifies one byte on its own, without any sequence context.
    pub fn from_byte(b: u8) -> Self {
        match b {
            0x1b => KeyEvent::Escape,
            0x08 | 0x7f => KeyEvent::Backspace,
            0x09 => KeyEvent::Tab,
            0x0a | 0x0d => KeyEvent::Enter,
            0x00..=0x1f => KeyEvent::Ctrl(b + 0x40),
            _ => KeyEvent::Char(b),
        }
    }

    /// Returns true for events that represent an actual key press.
    pub const fn is_key(&self) -> bool {
        !matches!(
            self,
            KeyEvent::Pending | KeyEvent::Unrecognized(_) | KeyEvent::Idle
        )
    }
}

/// The raw bytes of an escape or Telnet sequence, held inline.
///
/// Pushes beyond [`LOOKAHEAD_LEN`] are dropped and remembered as an overrun,
/// so a runaway sequence can still be recognized as malformed once it ends.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Sequence {
    buf: [u8; LOOKAHEAD_LEN],
    len: u8, // greater than length of buf means overrun
}

impl Sequence {
    const OVERRUN_LEN: usize = LOOKAHEAD_LEN + 1;

    pub const fn new() -> Self {
        Self {
            buf: [0; LOOKAHEAD_LEN],
            len: 0,
        }
    }

    pub fn from_slice(from: &[u8]) -> Self {
        let mut ret = Self::new();
        for &b in from {
            ret.push(b);
        }
        ret
    }

    pub fn push(&mut self, b: u8) {
        let len = self.len();
        if len >= self.buf.len() {
            self.len = Self::OVERRUN_LEN as u8;
            return;
        }
        self.buf[len] = b;
        self.len += 1;
    }

    /// Removes and returns the oldest byte, shifting the rest down.
    pub fn pop_front(&mut self) -> Option<u8> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        let b = self.buf[0];
        self.buf.copy_within(1..len, 0);
        self.buf[len - 1] = 0;
        self.len = (len - 1) as u8;
        Some(b)
    }

    /// Zeroes every byte and forgets any overrun.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.buf = [0; LOOKAHEAD_LEN];
        self.len = 0;
    }

    #[inline(always)]
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        core::cmp::min(self.buf.len(), self.len as usize)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub const fn has_overrun(&self) -> bool {
        self.len as usize > LOOKAHEAD_LEN
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Sequence(\"")?;
        for &b in self.bytes() {
            match b {
                0x1b => f.write_str("\\e")?,
                0x20..=0x7e => write!(f, "{}", b as char)?,
                _ => write!(f, "\\x{b:02x}")?,
            }
        }
        if self.has_overrun() {
            f.write_str("…")?;
        }
        f.write_str("\")")
    }
}
