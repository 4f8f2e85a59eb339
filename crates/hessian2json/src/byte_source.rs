//! Refillable byte buffer over a blocking reader.
//!
//! Invariant: `offset <= len <= buf.len()`; bytes in `buf[offset..len]` are
//! valid and not yet consumed. The buffer is refilled when it runs dry or when
//! a fixed-width read needs more than is buffered: the unread tail is shifted
//! to the front and one read tops up the rest.

use std::io::{self, Read};

#[derive(Debug)]
pub(crate) struct ByteSource<R> {
    inner: R,
    buf: Box<[u8]>,
    offset: usize,
    len: usize,
}

impl<R: Read> ByteSource<R> {
    pub(crate) fn new(inner: R, capacity: usize) -> Self {
        Self {
            inner,
            buf: vec![0; capacity].into_boxed_slice(),
            offset: 0,
            len: 0,
        }
    }

    /// Returns `false` once the underlying reader is exhausted and nothing is
    /// left unread.
    fn refill(&mut self) -> io::Result<bool> {
        if self.offset < self.len {
            self.buf.copy_within(self.offset..self.len, 0);
            self.len -= self.offset;
        } else {
            self.len = 0;
        }
        self.offset = 0;

        if self.len == self.buf.len() {
            return Ok(true);
        }

        loop {
            match self.inner.read(&mut self.buf[self.len..]) {
                Ok(0) => return Ok(self.len > 0),
                Ok(n) => {
                    self.len += n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Consumes one byte; `None` at end of stream.
    #[inline]
    pub(crate) fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.offset >= self.len && !self.refill()? {
            return Ok(None);
        }
        let byte = self.buf[self.offset];
        self.offset += 1;
        Ok(Some(byte))
    }

    /// Returns the next byte without consuming it; `None` at end of stream.
    #[inline]
    pub(crate) fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        if self.offset >= self.len && !self.refill()? {
            return Ok(None);
        }
        Ok(Some(self.buf[self.offset]))
    }

    /// Consumes exactly `N` bytes; `None` if the stream ends first.
    ///
    /// Tops the buffer up once when fewer than `N` bytes are buffered, copies
    /// straight out of the buffer when that suffices, and falls back to
    /// byte-at-a-time reads otherwise.
    pub(crate) fn read_array<const N: usize>(&mut self) -> io::Result<Option<[u8; N]>> {
        let mut out = [0; N];
        if self.len - self.offset < N {
            self.refill()?;
        }
        if self.len - self.offset >= N {
            out.copy_from_slice(&self.buf[self.offset..self.offset + N]);
            self.offset += N;
            return Ok(Some(out));
        }
        for slot in &mut out {
            match self.read_byte()? {
                Some(byte) => *slot = byte,
                None => return Ok(None),
            }
        }
        Ok(Some(out))
    }

    /// Appends up to `max` buffered ASCII bytes to `dst` and returns how many
    /// were copied. Never refills.
    pub(crate) fn copy_ascii(&mut self, max: usize, dst: &mut String) -> usize {
        let available = &self.buf[self.offset..self.len];
        let count = available
            .iter()
            .take(max)
            .take_while(|b| b.is_ascii())
            .count();
        dst.extend(available[..count].iter().copied().map(char::from));
        self.offset += count;
        count
    }

    /// Number of bytes buffered but not yet consumed.
    #[cfg(test)]
    pub(crate) fn buffered(&self) -> usize {
        self.len - self.offset
    }

    /// Unwraps the reader; bytes still buffered are lost.
    pub(crate) fn into_inner(self) -> R {
        self.inner
    }
}
