use crate::error::EditError;

/// Fixed-capacity, NUL-terminated line storage.
///
/// The storage is allocated once and never grows. Two trailing bytes are
/// always kept in reserve, so a buffer of capacity `n` holds at most `n - 2`
/// bytes of text and every byte past the text is zero. A buffer with a
/// capacity below two can hold nothing and rejects every edit with
/// [`EditError::NoCapacity`].
#[derive(Clone, PartialEq, Eq)]
pub struct LineBuffer {
    buf: Box<[u8]>,
    len: usize,
}

impl LineBuffer {
    const RESERVED: usize = 2;

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Longest text this buffer can hold.
    #[inline(always)]
    pub fn max_len(&self) -> usize {
        self.buf.len().saturating_sub(Self::RESERVED)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.len >= self.max_len()
    }

    /// The text, without its terminator.
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// The whole backing storage, terminator and trailing zeroes included.
    #[inline(always)]
    pub fn raw(&self) -> &[u8] {
        &self.buf
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_bytes().get(index).copied()
    }

    /// Inserts `b` at `index`, clamped to the current length.
    pub fn insert(&mut self, index: usize, b: u8) -> Result<(), EditError> {
        self.check_capacity()?;
        if self.is_full() {
            return Err(EditError::BufferFull {
                capacity: self.capacity(),
            });
        }
        let index = index.min(self.len);
        self.shift(index, Shift::Open);
        self.buf[index] = b;
        Ok(())
    }

    /// Replaces the byte at `index`, or appends when `index` is the end.
    pub fn overwrite(&mut self, index: usize, b: u8) -> Result<(), EditError> {
        self.check_capacity()?;
        if index < self.len {
            self.buf[index] = b;
            Ok(())
        } else {
            self.insert(index, b)
        }
    }

    /// Removes and returns the byte at `index`, if there is one.
    pub fn remove(&mut self, index: usize) -> Result<Option<u8>, EditError> {
        self.check_capacity()?;
        if index >= self.len {
            return Ok(None);
        }
        let b = self.buf[index];
        self.shift(index, Shift::Close);
        Ok(Some(b))
    }

    /// Replaces the whole text, truncating it to [`LineBuffer::max_len`].
    pub fn set(&mut self, text: &[u8]) -> Result<(), EditError> {
        self.check_capacity()?;
        self.clear();
        let n = text.len().min(self.max_len());
        self.buf[..n].copy_from_slice(&text[..n]);
        self.len = n;
        Ok(())
    }

    /// Zeroes the text in place.
    pub fn clear(&mut self) {
        self.buf[..self.len].fill(0);
        self.len = 0;
    }

    fn check_capacity(&self) -> Result<(), EditError> {
        if self.max_len() == 0 {
            Err(EditError::NoCapacity)
        } else {
            Ok(())
        }
    }

    /// Moves the tail starting at `index` one byte right or left, keeping
    /// the terminator in place behind it.
    fn shift(&mut self, index: usize, dir: Shift) {
        match dir {
            Shift::Open => {
                self.buf.copy_within(index..self.len, index + 1);
                self.len += 1;
            }
            Shift::Close => {
                self.buf.copy_within(index + 1..self.len, index);
                self.len -= 1;
                self.buf[self.len] = 0;
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Shift {
    Open,
    Close,
}

impl core::fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LineBuffer")
            .field("text", &String::from_utf8_lossy(self.as_bytes()))
            .field("capacity", &self.capacity())
            .finish()
    }
}
