//! Tag byte classification.
//!
//! Classification looks at a single byte and never consumes it; the decoding
//! function for the chosen production re-reads the byte and validates it
//! against the exact forms it accepts.

use core::fmt;

/// The production a tag byte introduces.
///
/// ```text
/// x00 - x1f    string of length 0-31       x4e          null
/// x20 - x2f    binary of length 0-15       x4f          object
/// x30 - x33    string of length 0-1023     x51          back-reference
/// x34 - x37    binary of length 0-1023     x52          non-final string chunk
/// x38 - x3f    long in three bytes         x53          final string chunk
/// x41 - x42    binary chunks               x54          true
/// x43          class definition            x55 - x58    list forms
/// x44          double                      x59          long as 32-bit int
/// x46          false                       x5a          list/map terminator
/// x48          untyped map                 x5b - x5f    compact doubles
/// x49          int                         x60 - x6f    compact object
/// x4a - x4b    date                        x70 - x7f    fixed-length lists
/// x4c          long                        x80 - xd7    compact ints
/// x4d          typed map                   xd8 - xff    compact longs
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    /// `N`
    Null,
    /// `T` or `F`
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 64-bit IEEE double.
    Double,
    /// UTF-8 string, possibly chunked.
    String,
    /// Raw bytes. Recognized so that it can be rejected.
    Binary,
    /// List or vector.
    List,
    /// Typed or untyped map.
    Map,
    /// Milliseconds or minutes since the epoch.
    Date,
    /// Class definition preceding an object.
    ClassDef,
    /// Object instance referring to a class definition.
    Object,
    /// Back-reference to an earlier list, map or object.
    Ref,
    /// List and map terminator `Z`.
    End,
    /// Byte with no meaning in the grammar.
    Reserved,
}

impl Production {
    /// Short grammar name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::String => "string",
            Self::Binary => "bytes",
            Self::List => "list",
            Self::Map => "map",
            Self::Date => "date",
            Self::ClassDef => "class-def",
            Self::Object => "object",
            Self::Ref => "ref",
            Self::End => "Z",
            Self::Reserved => "reserved",
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a tag byte into exactly one production.
///
/// ```rust
/// use hessian2json::{Production, classify};
///
/// assert_eq!(classify(b'H'), Production::Map);
/// assert_eq!(classify(0x90), Production::Int);
/// assert_eq!(classify(0xe0), Production::Long);
/// ```
#[must_use]
pub const fn classify(tag: u8) -> Production {
    match tag {
        0x00..=0x1f | 0x30..=0x33 | 0x52 | b'S' => Production::String,
        0x20..=0x2f | 0x34..=0x37 | 0x41 | b'B' => Production::Binary,
        0x38..=0x3f | b'L' | 0x59 | 0xd8..=0xff => Production::Long,
        b'I' | 0x80..=0xd7 => Production::Int,
        b'C' => Production::ClassDef,
        b'D' | 0x5b..=0x5f => Production::Double,
        b'T' | b'F' => Production::Bool,
        b'H' | b'M' => Production::Map,
        0x4a | 0x4b => Production::Date,
        b'N' => Production::Null,
        b'O' | 0x60..=0x6f => Production::Object,
        0x51 => Production::Ref,
        0x55..=0x58 | 0x70..=0x7f => Production::List,
        b'Z' => Production::End,
        0x40 | b'E' | b'G' | b'P' => Production::Reserved,
    }
}

/// Describes a tag for diagnostics: `0x4e (N)` for printable bytes, `0x90`
/// otherwise, and `end of file` when the stream is exhausted.
#[must_use]
pub fn code_name(code: Option<u8>) -> String {
    match code {
        None => "end of file".to_owned(),
        Some(b) if b.is_ascii_graphic() || b == b' ' => format!("0x{b:02x} ({})", char::from(b)),
        Some(b) => format!("0x{b:02x}"),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0x00, Production::String)]
    #[case(0x1f, Production::String)]
    #[case(0x20, Production::Binary)]
    #[case(0x2f, Production::Binary)]
    #[case(0x30, Production::String)]
    #[case(0x33, Production::String)]
    #[case(0x34, Production::Binary)]
    #[case(0x37, Production::Binary)]
    #[case(0x38, Production::Long)]
    #[case(0x3f, Production::Long)]
    #[case(0x40, Production::Reserved)]
    #[case(0x41, Production::Binary)]
    #[case(b'B', Production::Binary)]
    #[case(b'C', Production::ClassDef)]
    #[case(b'D', Production::Double)]
    #[case(b'F', Production::Bool)]
    #[case(b'H', Production::Map)]
    #[case(b'I', Production::Int)]
    #[case(0x4a, Production::Date)]
    #[case(0x4b, Production::Date)]
    #[case(b'L', Production::Long)]
    #[case(b'M', Production::Map)]
    #[case(b'N', Production::Null)]
    #[case(b'O', Production::Object)]
    #[case(0x51, Production::Ref)]
    #[case(0x52, Production::String)]
    #[case(b'S', Production::String)]
    #[case(b'T', Production::Bool)]
    #[case(0x55, Production::List)]
    #[case(b'V', Production::List)]
    #[case(0x57, Production::List)]
    #[case(0x58, Production::List)]
    #[case(0x59, Production::Long)]
    #[case(b'Z', Production::End)]
    #[case(0x5b, Production::Double)]
    #[case(0x5f, Production::Double)]
    #[case(0x60, Production::Object)]
    #[case(0x6f, Production::Object)]
    #[case(0x70, Production::List)]
    #[case(0x7f, Production::List)]
    #[case(0x80, Production::Int)]
    #[case(0xbf, Production::Int)]
    #[case(0xc0, Production::Int)]
    #[case(0xcf, Production::Int)]
    #[case(0xd0, Production::Int)]
    #[case(0xd7, Production::Int)]
    #[case(0xd8, Production::Long)]
    #[case(0xef, Production::Long)]
    #[case(0xf0, Production::Long)]
    #[case(0xff, Production::Long)]
    fn classifies_range_boundaries(#[case] tag: u8, #[case] expected: Production) {
        assert_eq!(classify(tag), expected);
    }

    #[test]
    fn only_four_bytes_are_reserved() {
        let reserved: Vec<u8> = (0..=u8::MAX)
            .filter(|&b| classify(b) == Production::Reserved)
            .collect();
        assert_eq!(reserved, vec![0x40, b'E', b'G', b'P']);
    }

    #[test]
    fn code_names() {
        assert_eq!(code_name(None), "end of file");
        assert_eq!(code_name(Some(b'N')), "0x4e (N)");
        assert_eq!(code_name(Some(0x90)), "0x90");
        assert_eq!(code_name(Some(0x05)), "0x05");
    }
}
