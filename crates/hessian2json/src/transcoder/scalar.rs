//! Scalar productions and the public scalar reads built on them.

use std::io::Read;

use super::{Emit, Transcoder};
use crate::{error::Result, value::Value};

impl<R: Read> Transcoder<R> {
    /// ```text
    /// null ::= 'N'
    /// ```
    pub(crate) fn decode_null(&mut self, emit: Emit) -> Result<()> {
        let tag = self.tag()?;
        if tag != Some(b'N') {
            return self.unexpected("null", tag);
        }
        self.emit(emit, &Value::Null, tag)
    }

    /// ```text
    /// boolean ::= 'T'
    ///         ::= 'F'
    /// ```
    pub(crate) fn decode_bool(&mut self, emit: Emit) -> Result<bool> {
        let tag = self.tag()?;
        let value = match tag {
            Some(b'T') => true,
            Some(b'F') => false,
            _ => return self.unexpected("boolean", tag),
        };
        self.emit(emit, &Value::Bool(value), tag)?;
        Ok(value)
    }

    /// ```text
    /// int ::= 'I' b3 b2 b1 b0
    ///     ::= [x80-xbf]             # -x10 to x3f
    ///     ::= [xc0-xcf] b0          # -x800 to x7ff
    ///     ::= [xd0-xd7] b1 b0       # -x40000 to x3ffff
    /// ```
    pub(crate) fn decode_int(&mut self, emit: Emit) -> Result<i32> {
        let tag = self.tag()?;
        let value = match tag {
            Some(b'I') => i32::from_be_bytes(self.bytes("int")?),
            Some(t @ 0x80..=0xbf) => i32::from(t) - 0x90,
            Some(t @ 0xc0..=0xcf) => ((i32::from(t) - 0xc8) << 8) + i32::from(self.byte("int")?),
            Some(t @ 0xd0..=0xd7) => {
                let [b1, b0] = self.bytes::<2>("int")?;
                ((i32::from(t) - 0xd4) << 16) + (i32::from(b1) << 8) + i32::from(b0)
            }
            _ => return self.unexpected("int", tag),
        };
        self.emit(emit, &Value::Int(value), tag)?;
        Ok(value)
    }

    /// ```text
    /// long ::= 'L' b7 b6 b5 b4 b3 b2 b1 b0
    ///      ::= [xd8-xef]             # -x08 to x0f
    ///      ::= [xf0-xff] b0          # -x800 to x7ff
    ///      ::= [x38-x3f] b1 b0       # -x40000 to x3ffff
    ///      ::= x59 b3 b2 b1 b0       # 32-bit integer cast to long
    /// ```
    pub(crate) fn decode_long(&mut self, emit: Emit) -> Result<i64> {
        let tag = self.tag()?;
        let value = match tag {
            Some(b'L') => i64::from_be_bytes(self.bytes("long")?),
            Some(t @ 0xd8..=0xef) => i64::from(t) - 0xe0,
            Some(t @ 0xf0..=0xff) => ((i64::from(t) - 0xf8) << 8) + i64::from(self.byte("long")?),
            Some(t @ 0x38..=0x3f) => {
                let [b1, b0] = self.bytes::<2>("long")?;
                ((i64::from(t) - 0x3c) << 16) + (i64::from(b1) << 8) + i64::from(b0)
            }
            Some(0x59) => i64::from(i32::from_be_bytes(self.bytes("long")?)),
            _ => return self.unexpected("long", tag),
        };
        self.emit(emit, &Value::Long(value), tag)?;
        Ok(value)
    }

    /// ```text
    /// double ::= 'D' b7 b6 b5 b4 b3 b2 b1 b0
    ///        ::= x5b                   # 0.0
    ///        ::= x5c                   # 1.0
    ///        ::= x5d b0                # byte cast to double
    ///        ::= x5e b1 b0             # short cast to double
    ///        ::= x5f b3 b2 b1 b0       # int / 1000
    /// ```
    pub(crate) fn decode_double(&mut self, emit: Emit) -> Result<f64> {
        let tag = self.tag()?;
        let value = match tag {
            Some(b'D') => f64::from_be_bytes(self.bytes("double")?),
            Some(0x5b) => 0.0,
            Some(0x5c) => 1.0,
            Some(0x5d) => f64::from(i8::from_be_bytes(self.bytes("double")?)),
            Some(0x5e) => f64::from(i16::from_be_bytes(self.bytes("double")?)),
            Some(0x5f) => f64::from(i32::from_be_bytes(self.bytes("double")?)) / 1000.0,
            _ => return self.unexpected("double", tag),
        };
        self.emit(emit, &Value::Double(value), tag)?;
        Ok(value)
    }

    /// ```text
    /// date ::= x4a b7 b6 b5 b4 b3 b2 b1 b0   # milliseconds since epoch
    ///      ::= x4b b3 b2 b1 b0               # minutes since epoch
    /// ```
    pub(crate) fn decode_date(&mut self, emit: Emit) -> Result<i64> {
        let tag = self.tag()?;
        let value = match tag {
            Some(0x4a) => i64::from_be_bytes(self.bytes("date")?),
            Some(0x4b) => i64::from(i32::from_be_bytes(self.bytes("date")?)) * 60_000,
            _ => return self.unexpected("date", tag),
        };
        self.emit(emit, &Value::Long(value), tag)?;
        Ok(value)
    }

    /// ```text
    /// binary ::= x41 b1 b0 <binary-data> binary
    ///        ::= 'B' b1 b0 <binary-data>
    ///        ::= [x20-x2f] <binary-data>
    ///        ::= [x34-x37] b0 <binary-data>
    /// ```
    ///
    /// Binary payloads are not supported; the tag is consumed and rejected.
    fn decode_bytes(&mut self) -> Result<Vec<u8>> {
        let tag = self.tag()?;
        self.unexpected("bytes", tag)
    }
}

/// Scalar reads that decode without emitting JSON, for callers that walk a
/// message field by field.
impl<R: Read> Transcoder<R> {
    /// Reads `N`.
    ///
    /// # Errors
    ///
    /// Fails if the next value is not null.
    pub fn read_null(&mut self) -> Result<()> {
        self.session(|this| this.decode_null(Emit::Skip))
    }

    /// Reads a boolean.
    ///
    /// # Errors
    ///
    /// Fails if the next value is not a boolean.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.session(|this| this.decode_bool(Emit::Skip))
    }

    /// Reads an int and truncates it to a byte.
    ///
    /// # Errors
    ///
    /// Fails if the next value is not an int.
    #[expect(clippy::cast_possible_truncation)]
    pub fn read_byte(&mut self) -> Result<i8> {
        self.read_int().map(|v| v as i8)
    }

    /// Reads an int and truncates it to a short.
    ///
    /// # Errors
    ///
    /// Fails if the next value is not an int.
    #[expect(clippy::cast_possible_truncation)]
    pub fn read_short(&mut self) -> Result<i16> {
        self.read_int().map(|v| v as i16)
    }

    /// Reads an int.
    ///
    /// # Errors
    ///
    /// Fails if the next value is not an int.
    pub fn read_int(&mut self) -> Result<i32> {
        self.session(|this| this.decode_int(Emit::Skip))
    }

    /// Reads a long.
    ///
    /// # Errors
    ///
    /// Fails if the next value is not a long.
    pub fn read_long(&mut self) -> Result<i64> {
        self.session(|this| this.decode_long(Emit::Skip))
    }

    /// Reads a double and narrows it to a float.
    ///
    /// # Errors
    ///
    /// Fails if the next value is not a double.
    #[expect(clippy::cast_possible_truncation)]
    pub fn read_float(&mut self) -> Result<f32> {
        self.read_double().map(|v| v as f32)
    }

    /// Reads a double.
    ///
    /// # Errors
    ///
    /// Fails if the next value is not a double.
    pub fn read_double(&mut self) -> Result<f64> {
        self.session(|this| this.decode_double(Emit::Skip))
    }

    /// Reads a string.
    ///
    /// # Errors
    ///
    /// Fails if the next value is not a string or is not valid modified
    /// UTF-8.
    pub fn read_string(&mut self) -> Result<String> {
        self.session(|this| this.decode_string(Emit::Skip))
    }

    /// Reads a date as epoch milliseconds.
    ///
    /// # Errors
    ///
    /// Fails if the next value is not a date.
    pub fn read_date(&mut self) -> Result<i64> {
        self.session(|this| this.decode_date(Emit::Skip))
    }

    /// Binary payloads are not supported in this mode.
    ///
    /// # Errors
    ///
    /// Always fails and faults the session.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        self.session(Self::decode_bytes)
    }
}
