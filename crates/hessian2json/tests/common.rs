#![allow(missing_docs, dead_code)]
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

/// Minimal Hessian 2.0 writer used to build test payloads. It picks the most
/// compact form for every value, the way a conforming encoder does.
#[derive(Debug, Default)]
pub struct Encoder {
    bytes: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.bytes)
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn null(&mut self) -> &mut Self {
        self.raw(b"N")
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.raw(if value { b"T" } else { b"F" })
    }

    pub fn int(&mut self, value: i32) -> &mut Self {
        match value {
            -0x10..=0x2f => self.raw(&[(value + 0x90) as u8]),
            -0x800..=0x7ff => self.raw(&[(0xc8 + (value >> 8)) as u8, value as u8]),
            -0x4_0000..=0x3_ffff => {
                self.raw(&[(0xd4 + (value >> 16)) as u8, (value >> 8) as u8, value as u8])
            }
            _ => self.raw(b"I").raw(&value.to_be_bytes()),
        }
    }

    pub fn long(&mut self, value: i64) -> &mut Self {
        match value {
            -0x08..=0x0f => self.raw(&[(value + 0xe0) as u8]),
            -0x800..=0x7ff => self.raw(&[(0xf8 + (value >> 8)) as u8, value as u8]),
            -0x4_0000..=0x3_ffff => {
                self.raw(&[(0x3c + (value >> 16)) as u8, (value >> 8) as u8, value as u8])
            }
            _ => match i32::try_from(value) {
                Ok(narrow) => self.raw(&[0x59]).raw(&narrow.to_be_bytes()),
                Err(_) => self.raw(b"L").raw(&value.to_be_bytes()),
            },
        }
    }

    pub fn double(&mut self, value: f64) -> &mut Self {
        let same = |candidate: f64| candidate.to_bits() == value.to_bits();
        if same(0.0) {
            return self.raw(&[0x5b]);
        }
        if same(1.0) {
            return self.raw(&[0x5c]);
        }
        if same(f64::from(value as i8)) {
            return self.raw(&[0x5d, value as i8 as u8]);
        }
        if same(f64::from(value as i16)) {
            return self.raw(&[0x5e]).raw(&(value as i16).to_be_bytes());
        }
        let mills = (value * 1000.0) as i32;
        if same(f64::from(mills) / 1000.0) {
            return self.raw(&[0x5f]).raw(&mills.to_be_bytes());
        }
        self.raw(b"D").raw(&value.to_be_bytes())
    }

    pub fn date(&mut self, millis: i64) -> &mut Self {
        match i32::try_from(millis / 60_000) {
            Ok(minutes) if millis % 60_000 == 0 => self.raw(&[0x4b]).raw(&minutes.to_be_bytes()),
            _ => self.raw(&[0x4a]).raw(&millis.to_be_bytes()),
        }
    }

    pub fn string(&mut self, value: &str) -> &mut Self {
        self.string_chunked(value, 0x8000)
    }

    /// Splits `value` into chunks of at most `chunk` UTF-16 units, possibly
    /// between the halves of a surrogate pair.
    pub fn string_chunked(&mut self, value: &str, chunk: usize) -> &mut Self {
        let units: Vec<u16> = value.encode_utf16().collect();
        let chunk = chunk.clamp(1, 0xffff);
        let mut pieces = units.chunks(chunk).peekable();
        if pieces.peek().is_none() {
            return self.raw(&[0x00]);
        }
        while let Some(piece) = pieces.next() {
            let len = piece.len();
            if pieces.peek().is_some() {
                self.raw(&[0x52]).raw(&(len as u16).to_be_bytes());
            } else if len <= 0x1f {
                self.raw(&[len as u8]);
            } else if len <= 0x3ff {
                self.raw(&[0x30 + (len >> 8) as u8, len as u8]);
            } else {
                self.raw(b"S").raw(&(len as u16).to_be_bytes());
            }
            for &unit in piece {
                self.utf8_unit(unit);
            }
        }
        self
    }

    /// Encodes one UTF-16 unit the way Java's modified UTF-8 does, so
    /// surrogates become two 3-byte sequences.
    fn utf8_unit(&mut self, unit: u16) {
        match unit {
            0x0001..=0x007f => {
                self.bytes.push(unit as u8);
            }
            0x0000 | 0x0080..=0x07ff => {
                self.bytes.push(0xc0 | (unit >> 6) as u8);
                self.bytes.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                self.bytes.push(0xe0 | (unit >> 12) as u8);
                self.bytes.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                self.bytes.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }

    /// Untyped map; close with [`end`](Self::end).
    pub fn map(&mut self) -> &mut Self {
        self.raw(b"H")
    }

    /// Typed map; close with [`end`](Self::end).
    pub fn typed_map(&mut self, type_name: &str) -> &mut Self {
        self.raw(b"M").string(type_name)
    }

    /// Untyped variable-length list; close with [`end`](Self::end).
    pub fn list(&mut self) -> &mut Self {
        self.raw(&[0x57])
    }

    /// Untyped fixed-length list; follow with exactly `len` values.
    pub fn fixed_list(&mut self, len: usize) -> &mut Self {
        if len < 8 {
            self.raw(&[0x78 + len as u8])
        } else {
            self.raw(&[0x58]).int(len as i32)
        }
    }

    pub fn end(&mut self) -> &mut Self {
        self.raw(b"Z")
    }

    pub fn class_def(&mut self, type_name: &str, fields: &[&str]) -> &mut Self {
        self.raw(b"C").string(type_name).int(fields.len() as i32);
        for field in fields {
            self.string(field);
        }
        self
    }

    /// Compact object header; follow with the field values.
    pub fn object(&mut self, class_index: u8) -> &mut Self {
        self.raw(&[0x60 + class_index])
    }

    pub fn decimal(&mut self, class_index: u8, text: &str) -> &mut Self {
        self.object(class_index).string(text)
    }

    pub fn reference(&mut self, index: i32) -> &mut Self {
        self.raw(&[0x51]).int(index)
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
