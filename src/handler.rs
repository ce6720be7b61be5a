/// Trait for implementations that receive completed lines from a [`crate::Console`].
///
/// The provided method implementation performs no action at all, so `()`
/// can stand in when the caller only wants key events.
pub trait LineHandler {
    /// Handles a completed line.
    ///
    /// This is called synchronously, once per line terminator, before the
    /// line buffer is cleared. `line` is the exact buffer contents without
    /// the terminator and may be empty.
    #[inline(always)]
    fn line(&mut self, line: &[u8]) {
        let _ = line;
        // Silently ignored by default.
    }
}

impl LineHandler for () {}

impl<H: LineHandler + ?Sized> LineHandler for &mut H {
    #[inline(always)]
    fn line(&mut self, line: &[u8]) {
        (**self).line(line);
    }
}

/// Returns a [`LineHandler`] that calls the given function for each
/// completed line.
pub fn line_handler_fn(f: impl FnMut(&[u8])) -> impl LineHandler {
    LineHandlerFn { f }
}

struct LineHandlerFn<F> {
    f: F,
}

impl<F: FnMut(&[u8])> LineHandler for LineHandlerFn<F> {
    #[inline(always)]
    fn line(&mut self, line: &[u8]) {
        (self.f)(line);
    }
}
