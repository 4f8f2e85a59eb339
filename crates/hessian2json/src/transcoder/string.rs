//! Chunked string reassembly.
//!
//! ```text
//! string ::= x52 b1 b0 <utf8-data> string  # non-final chunk
//!        ::= 'S' b1 b0 <utf8-data>         # string of length 0-65535
//!        ::= [x00-x1f] <utf8-data>         # string of length 0-31
//!        ::= [x30-x33] b0 <utf8-data>      # string of length 0-1023
//! ```
//!
//! Lengths count UTF-16 code units, not bytes. Characters arrive as 1-, 2- or
//! 3-byte UTF-8 sequences; supplementary characters arrive as a surrogate pair
//! of two 3-byte sequences, which may straddle a chunk boundary. 4-byte UTF-8
//! sequences are rejected.

use std::io::Read;

use super::{Emit, Transcoder};
use crate::error::Result;

/// Progress through the chunks of one string.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ChunkState {
    /// The chunk being read is the final one.
    is_last: bool,
    /// UTF-16 units left in the chunk being read.
    remaining: usize,
}

impl<R: Read> Transcoder<R> {
    pub(crate) fn decode_string(&mut self, emit: Emit) -> Result<String> {
        let tag = self.tag()?;
        self.begin_chunk(tag)?;
        let text = self.read_chunks()?;
        match emit {
            Emit::Skip => {}
            Emit::FieldName => self.json.field_name(&text),
            Emit::Value => self.json.string(&text),
        }
        Ok(text)
    }

    fn begin_chunk(&mut self, tag: Option<u8>) -> Result<()> {
        let (is_last, remaining) = match tag {
            Some(0x52) => (false, usize::from(u16::from_be_bytes(self.bytes("string")?))),
            Some(b'S') => (true, usize::from(u16::from_be_bytes(self.bytes("string")?))),
            Some(t @ 0x00..=0x1f) => (true, usize::from(t)),
            Some(t @ 0x30..=0x33) => {
                let low = usize::from(self.byte("string")?);
                (true, usize::from(t - 0x30) * 256 + low)
            }
            _ => return self.unexpected("string", tag),
        };
        self.chunk = ChunkState { is_last, remaining };
        Ok(())
    }

    fn read_chunks(&mut self) -> Result<String> {
        let mut out = String::with_capacity(self.chunk.remaining);
        let mut high_surrogate = None;
        loop {
            while self.chunk.remaining > 0 {
                if high_surrogate.is_none() {
                    let copied = self.source.copy_ascii(self.chunk.remaining, &mut out);
                    self.chunk.remaining -= copied;
                    if self.chunk.remaining == 0 {
                        break;
                    }
                }
                let unit = self.decode_utf16_unit()?;
                self.chunk.remaining -= 1;
                match (high_surrogate.take(), unit) {
                    (None, 0xd800..=0xdbff) => high_surrogate = Some(unit),
                    (Some(high), 0xdc00..=0xdfff) => {
                        let code = 0x1_0000
                            + ((u32::from(high) - 0xd800) << 10)
                            + (u32::from(unit) - 0xdc00);
                        match char::from_u32(code) {
                            Some(c) => out.push(c),
                            None => return self.lone_surrogate(unit),
                        }
                    }
                    (None, 0xdc00..=0xdfff) => return self.lone_surrogate(unit),
                    (Some(high), _) => return self.lone_surrogate(high),
                    (None, _) => match char::from_u32(u32::from(unit)) {
                        Some(c) => out.push(c),
                        None => return self.lone_surrogate(unit),
                    },
                }
            }
            if self.chunk.is_last {
                break;
            }
            let tag = self.tag()?;
            self.begin_chunk(tag)?;
        }
        if let Some(high) = high_surrogate {
            return self.lone_surrogate(high);
        }
        Ok(out)
    }

    /// Decodes one 1-, 2- or 3-byte UTF-8 sequence into a UTF-16 unit.
    fn decode_utf16_unit(&mut self) -> Result<u16> {
        let lead = self.byte("string")?;
        let unit = match lead {
            0x00..=0x7f => u16::from(lead),
            0xc0..=0xdf => {
                let b1 = self.continuation()?;
                (u16::from(lead & 0x1f) << 6) | u16::from(b1)
            }
            0xe0..=0xef => {
                let b1 = self.continuation()?;
                let b2 = self.continuation()?;
                (u16::from(lead & 0x0f) << 12) | (u16::from(b1) << 6) | u16::from(b2)
            }
            _ => return self.unexpected("utf-8 lead byte", Some(lead)),
        };
        Ok(unit)
    }

    /// Payload bits of a `10xxxxxx` byte.
    fn continuation(&mut self) -> Result<u8> {
        let b = self.byte("string")?;
        if b & 0xc0 != 0x80 {
            return self.unexpected("utf-8 continuation byte", Some(b));
        }
        Ok(b & 0x3f)
    }

    fn lone_surrogate<T>(&self, unit: u16) -> Result<T> {
        self.unexpected_text("surrogate pair", format!("0x{unit:04x}"))
    }
}
