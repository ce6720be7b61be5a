use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

/// A non-blocking, single-consumer supply of input bytes.
///
/// None of these methods may wait for input. A source that has nothing to
/// offer right now reports that through [`ByteSource::available`] and by
/// returning `None`.
pub trait ByteSource {
    /// Returns true if [`ByteSource::read`] would currently return a byte.
    fn available(&mut self) -> bool;

    /// Takes the next byte, if one has already arrived.
    fn read(&mut self) -> Option<u8>;

    /// Returns the next byte without consuming it.
    fn peek(&mut self) -> Option<u8>;
}

impl ByteSource for VecDeque<u8> {
    #[inline(always)]
    fn available(&mut self) -> bool {
        !self.is_empty()
    }

    #[inline(always)]
    fn read(&mut self) -> Option<u8> {
        self.pop_front()
    }

    #[inline(always)]
    fn peek(&mut self) -> Option<u8> {
        self.front().copied()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline(always)]
    fn available(&mut self) -> bool {
        (**self).available()
    }

    #[inline(always)]
    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }

    #[inline(always)]
    fn peek(&mut self) -> Option<u8> {
        (**self).peek()
    }
}

/// Adapts the receiving end of a byte channel into a [`ByteSource`].
///
/// This is how a blocking reader, such as stdin or a serial port, can be
/// moved onto its own thread while the console keeps polling.
#[derive(Debug)]
pub struct ChannelSource {
    rx: Receiver<u8>,
    peeked: Option<u8>,
    disconnected: bool,
}

impl ChannelSource {
    pub fn new(rx: Receiver<u8>) -> Self {
        Self {
            rx,
            peeked: None,
            disconnected: false,
        }
    }

    /// Returns true once the sending side has hung up and every byte it
    /// sent has been consumed.
    pub fn is_closed(&self) -> bool {
        self.disconnected && self.peeked.is_none()
    }

    fn fill(&mut self) {
        if self.peeked.is_some() || self.disconnected {
            return;
        }
        match self.rx.try_recv() {
            Ok(b) => self.peeked = Some(b),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                tracing::debug!("byte channel disconnected");
                self.disconnected = true;
            }
        }
    }
}

impl ByteSource for ChannelSource {
    fn available(&mut self) -> bool {
        self.fill();
        self.peeked.is_some()
    }

    fn read(&mut self) -> Option<u8> {
        self.fill();
        self.peeked.take()
    }

    fn peek(&mut self) -> Option<u8> {
        self.fill();
        self.peeked
    }
}

/// A monotonic time source with millisecond resolution.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

/// [`Clock`] backed by [`std::time::Instant`], counting from its creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline(always)]
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}
