//! Incremental JSON writer.
//!
//! The transcoder drives this writer one structural event at a time while it
//! walks the wire; nothing here sees a finished tree except
//! [`JsonEmitter::value`], which re-serializes an already decoded value.

use std::io;

use serde_json::ser::{CompactFormatter, Formatter};

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Array { empty: bool },
    Object { empty: bool, awaiting_value: bool },
}

/// Streaming JSON text sink.
///
/// Callers are responsible for balancing `begin_*`/`end_*` calls and for
/// following every [`field_name`](Self::field_name) with exactly one value;
/// violations are caught by debug assertions.
///
/// ```rust
/// use hessian2json::JsonEmitter;
///
/// let mut json = JsonEmitter::new();
/// json.begin_object();
/// json.field_name("ids");
/// json.begin_array();
/// json.int(1);
/// json.int(2);
/// json.end_array();
/// json.end_object();
/// assert_eq!(json.as_str(), r#"{"ids":[1,2]}"#);
/// ```
#[derive(Debug, Default)]
pub struct JsonEmitter {
    out: String,
    frames: Vec<Frame>,
}

impl JsonEmitter {
    /// Creates an empty emitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON written so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Number of currently open arrays and objects.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Discards everything written so far.
    pub fn clear(&mut self) {
        self.out.clear();
        self.frames.clear();
    }

    /// Returns the text written so far and resets the emitter.
    pub fn take(&mut self) -> String {
        debug_assert!(self.frames.is_empty(), "unbalanced JSON structure");
        self.frames.clear();
        core::mem::take(&mut self.out)
    }

    fn before_value(&mut self) {
        match self.frames.last_mut() {
            Some(Frame::Array { empty }) => {
                if !*empty {
                    self.out.push(',');
                }
                *empty = false;
            }
            Some(Frame::Object { awaiting_value, .. }) => {
                debug_assert!(*awaiting_value, "object value without a field name");
                *awaiting_value = false;
            }
            None => {}
        }
    }

    /// Opens an array.
    pub fn begin_array(&mut self) {
        self.before_value();
        self.out.push('[');
        self.frames.push(Frame::Array { empty: true });
    }

    /// Closes the innermost array.
    pub fn end_array(&mut self) {
        let frame = self.frames.pop();
        debug_assert!(matches!(frame, Some(Frame::Array { .. })), "end_array outside an array");
        self.out.push(']');
    }

    /// Opens an object.
    pub fn begin_object(&mut self) {
        self.before_value();
        self.out.push('{');
        self.frames.push(Frame::Object {
            empty: true,
            awaiting_value: false,
        });
    }

    /// Closes the innermost object.
    pub fn end_object(&mut self) {
        let frame = self.frames.pop();
        debug_assert!(
            matches!(
                frame,
                Some(Frame::Object {
                    awaiting_value: false,
                    ..
                })
            ),
            "end_object outside an object or after a dangling field name"
        );
        self.out.push('}');
    }

    /// Writes a field name inside the innermost object.
    pub fn field_name(&mut self, name: &str) {
        let frame = self.frames.last_mut();
        debug_assert!(
            matches!(frame, Some(Frame::Object { .. })),
            "field name outside an object"
        );
        if let Some(Frame::Object {
            empty,
            awaiting_value,
        }) = frame
        {
            debug_assert!(!*awaiting_value, "two field names in a row");
            if !*empty {
                self.out.push(',');
            }
            *empty = false;
            *awaiting_value = true;
        }
        push_escaped(&mut self.out, name);
        self.out.push(':');
    }

    /// Writes `null`.
    pub fn null(&mut self) {
        self.before_value();
        self.out.push_str("null");
    }

    /// Writes `true` or `false`.
    pub fn bool(&mut self, value: bool) {
        self.before_value();
        self.out.push_str(if value { "true" } else { "false" });
    }

    /// Writes an integer.
    pub fn int(&mut self, value: i64) {
        self.before_value();
        let _ = CompactFormatter.write_i64(&mut Sink(&mut self.out), value);
    }

    /// Writes a double; non-finite values become the strings `"NaN"`,
    /// `"Infinity"` and `"-Infinity"`.
    pub fn double(&mut self, value: f64) {
        self.before_value();
        if value.is_finite() {
            push_double(&mut self.out, value);
        } else {
            self.out.push('"');
            push_double(&mut self.out, value);
            self.out.push('"');
        }
    }

    /// Writes pre-validated number text verbatim.
    pub fn raw_number(&mut self, text: &str) {
        self.before_value();
        self.out.push_str(text);
    }

    /// Writes a string literal.
    pub fn string(&mut self, value: &str) {
        self.before_value();
        push_escaped(&mut self.out, value);
    }

    /// Re-serializes a decoded value with the same rendering the transcoder
    /// uses on first sight.
    pub fn value(&mut self, value: &Value) {
        match value {
            Value::Null => self.null(),
            Value::Bool(b) => self.bool(*b),
            Value::Int(n) => self.int(i64::from(*n)),
            Value::Long(n) | Value::Timestamp(n) => self.int(*n),
            Value::Double(n) => self.double(*n),
            Value::String(s) => self.string(s),
            Value::Decimal(s) => self.raw_number(s),
            Value::List(items) => {
                self.begin_array();
                for item in items.iter() {
                    self.value(item);
                }
                self.end_array();
            }
            Value::Map(entries) => {
                self.begin_object();
                for (key, item) in entries.iter() {
                    // Keys that cannot name a field never enter a map.
                    let name = key.key_text().unwrap_or_default();
                    self.field_name(&name);
                    self.value(item);
                }
                self.end_object();
            }
        }
    }
}

/// Shortest round-trip text that keeps a fractional part (`1.0`, `0.001`,
/// `1e300`).
pub(crate) fn push_double(out: &mut String, value: f64) {
    if value.is_nan() {
        out.push_str("NaN");
    } else if value.is_infinite() {
        out.push_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        let _ = CompactFormatter.write_f64(&mut Sink(out), value);
    }
}

/// Writes `src` as a quoted JSON string literal.
fn push_escaped(out: &mut String, src: &str) {
    let _ = serde_json::to_writer(Sink(out), src);
}

/// Byte sink over the output text for `serde_json`'s writers, which only
/// split their output between whole UTF-8 sequences.
struct Sink<'a>(&'a mut String);

impl io::Write for Sink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = core::str::from_utf8(buf)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        self.0.push_str(text);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
