/// Read position over an immutable byte buffer.
///
/// `byte`, `window` and `advance` assume the caller knows the bytes are there
/// and panic otherwise. `peek` and `take_until` are the checked counterparts.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline]
    pub fn byte(&self) -> u8 {
        self.buf[self.pos]
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// The next `n` bytes without advancing.
    #[inline]
    pub fn window(&self, n: usize) -> &'a [u8] {
        &self.buf[self.pos..self.pos + n]
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Bytes from `start` up to the current position.
    #[inline]
    pub fn since(&self, start: usize) -> &'a [u8] {
        &self.buf[start..self.pos]
    }

    /// Advance up to the next `delim` (not past it) and return the bytes
    /// skipped. `None` if `delim` does not occur before the end; the cursor
    /// is left unmoved in that case.
    pub fn take_until(&mut self, delim: u8) -> Option<&'a [u8]> {
        let rest = self.buf.get(self.pos..)?;
        let len = rest.iter().position(|&c| c == delim)?;
        self.pos += len;
        Some(&rest[..len])
    }
}
