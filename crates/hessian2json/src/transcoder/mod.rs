//! Recursive-descent Hessian 2.0 decoder that emits JSON as it goes.
//!
//! Overview
//! - Every decision starts by peeking one tag byte and classifying it
//!   ([`classify`]). The decoding function for the chosen production then
//!   consumes the tag again and validates it against the exact forms it
//!   accepts, so classification and consumption stay independent.
//! - Each production both returns the decoded [`Value`] and writes JSON to the
//!   session's [`JsonEmitter`]. The returned value feeds the reference table;
//!   JSON is never built from it except when a back-reference is re-emitted.
//! - Lists and maps are registered in the reference table before their
//!   children are decoded, so self-references resolve to the part decoded so
//!   far.
//!
//! Session state
//! - A session is `Idle` between top-level calls, `Decoding` inside one and
//!   `Faulted` forever after any error. The reference and class-definition
//!   tables and the emitter are reset at the start of every top-level call.

mod composite;
mod scalar;
mod string;

use std::{borrow::Cow, io::Read};

use log::{debug, trace};

use crate::{
    byte_source::ByteSource,
    emitter::JsonEmitter,
    error::{DecodeError, Result},
    options::TranscoderOptions,
    refs::{ClassDefTable, RefTable, Shape},
    tag::{Production, classify, code_name},
    value::Value,
};
use string::ChunkState;

/// Lifecycle of a decode session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for the next top-level call.
    Idle,
    /// Inside a top-level call.
    Decoding,
    /// A grammar violation or I/O failure occurred; every further call fails
    /// with [`DecodeError::Faulted`].
    Faulted,
}

/// Where the value being decoded lands in the JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Emit {
    /// Decode only.
    Skip,
    /// Write the textual form as an object field name.
    FieldName,
    /// Write as a JSON value.
    Value,
}

impl Emit {
    /// Mode for the children of a container decoded in this mode.
    fn children(self) -> Self {
        match self {
            Self::Value => Self::Value,
            Self::Skip | Self::FieldName => Self::Skip,
        }
    }

    /// Mode for the keys of a map decoded in this mode.
    fn keys(self) -> Self {
        match self {
            Self::Value => Self::FieldName,
            Self::Skip | Self::FieldName => Self::Skip,
        }
    }
}

/// A top-level value together with its JSON rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The decoded value tree.
    pub value: Value,
    /// JSON text emitted while decoding it.
    pub json: String,
}

/// A Hessian 2.0 to JSON decode session over a blocking reader.
///
/// ```rust
/// use hessian2json::Transcoder;
///
/// // H "id" 0xd5 0x2e 0x1f "tags" 0x7a 0x91 0x92 Z
/// let bytes: &[u8] = &[
///     b'H', 0x02, b'i', b'd', 0xd5, 0x2e, 0x1f,
///     0x04, b't', b'a', b'g', b's', 0x7a, 0x91, 0x92, b'Z',
/// ];
/// let mut transcoder = Transcoder::new(bytes);
/// assert_eq!(transcoder.transcode_map().unwrap(), r#"{"id":77343,"tags":[1,2]}"#);
/// ```
#[derive(Debug)]
pub struct Transcoder<R> {
    source: ByteSource<R>,
    json: JsonEmitter,
    refs: RefTable,
    class_defs: ClassDefTable,
    chunk: ChunkState,
    state: SessionState,
    depth: usize,
    /// Size re-emitted through back-references in this top-level call.
    expanded: usize,
    options: TranscoderOptions,
}

impl<R: Read> Transcoder<R> {
    /// Creates a session with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, TranscoderOptions::default())
    }

    /// Creates a session with the given options.
    pub fn with_options(reader: R, options: TranscoderOptions) -> Self {
        Self {
            source: ByteSource::new(reader, options.effective_buffer_capacity()),
            json: JsonEmitter::new(),
            refs: RefTable::default(),
            class_defs: ClassDefTable::default(),
            chunk: ChunkState::default(),
            state: SessionState::Idle,
            depth: 0,
            expanded: 0,
            options,
        }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Options this session was created with.
    #[must_use]
    pub fn options(&self) -> &TranscoderOptions {
        &self.options
    }

    /// Unwraps the reader. Bytes already buffered are lost.
    pub fn into_inner(self) -> R {
        self.source.into_inner()
    }

    /// Decodes one root map and returns its JSON text.
    ///
    /// # Errors
    ///
    /// Fails with [`DecodeError::UnexpectedProduction`] if the next value is
    /// not a map or contains anything this transcoder does not support, and
    /// faults the session.
    pub fn transcode_map(&mut self) -> Result<String> {
        self.top_level(|this| {
            this.decode_map(Emit::Value)?;
            Ok(this.json.take())
        })
    }

    /// Decodes one root value of any kind and returns its JSON text.
    ///
    /// # Errors
    ///
    /// See [`transcode_map`](Self::transcode_map).
    pub fn transcode_value(&mut self) -> Result<String> {
        self.top_level(|this| {
            this.decode_value(Emit::Value)?;
            Ok(this.json.take())
        })
    }

    /// Decodes one root value and returns both the value tree and its JSON.
    ///
    /// # Errors
    ///
    /// See [`transcode_map`](Self::transcode_map).
    pub fn decode(&mut self) -> Result<Decoded> {
        self.top_level(|this| {
            let (value, _) = this.decode_value(Emit::Value)?;
            Ok(Decoded {
                value,
                json: this.json.take(),
            })
        })
    }

    /// Classifies the next tag without consuming it; `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Fails if the reader fails or the session is faulted.
    pub fn peek_production(&mut self) -> Result<Option<Production>> {
        self.session(|this| Ok(this.peek()?.map(classify)))
    }

    /// Runs `f` as a top-level call that starts from empty tables.
    fn top_level<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.session(|this| {
            this.reset();
            trace!("session: top-level decode");
            let out = f(this)?;
            trace!(
                "session: done, {} refs, {} class definitions",
                this.refs.len(),
                this.class_defs.len()
            );
            Ok(out)
        })
    }

    /// Tracks the session state around `f`.
    fn session<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.state == SessionState::Faulted {
            return Err(DecodeError::Faulted);
        }
        self.state = SessionState::Decoding;
        match f(self) {
            Ok(out) => {
                self.state = SessionState::Idle;
                Ok(out)
            }
            Err(err) => {
                debug!("session faulted: {err}");
                self.state = SessionState::Faulted;
                Err(err)
            }
        }
    }

    fn reset(&mut self) {
        self.json.clear();
        self.refs.clear();
        self.class_defs.clear();
        self.chunk = ChunkState::default();
        self.depth = 0;
        self.expanded = 0;
    }

    // --------------------------------------------------------------------------------------------
    // Byte access
    // --------------------------------------------------------------------------------------------

    fn peek(&mut self) -> Result<Option<u8>> {
        Ok(self.source.peek_byte()?)
    }

    fn tag(&mut self) -> Result<Option<u8>> {
        Ok(self.source.read_byte()?)
    }

    /// Consumes one payload byte; end of stream is a grammar error.
    fn byte(&mut self, expected: &'static str) -> Result<u8> {
        match self.source.read_byte()? {
            Some(b) => Ok(b),
            None => self.unexpected(expected, None),
        }
    }

    /// Consumes `N` payload bytes; a short stream is a grammar error.
    fn bytes<const N: usize>(&mut self, expected: &'static str) -> Result<[u8; N]> {
        match self.source.read_array::<N>()? {
            Some(bytes) => Ok(bytes),
            None => self.unexpected(expected, None),
        }
    }

    fn at_end(&mut self) -> Result<bool> {
        Ok(matches!(self.peek()?, None | Some(b'Z')))
    }

    // --------------------------------------------------------------------------------------------
    // Errors
    // --------------------------------------------------------------------------------------------

    fn unexpected<T>(&self, expected: impl Into<Cow<'static, str>>, code: Option<u8>) -> Result<T> {
        self.unexpected_text(expected, code_name(code))
    }

    fn unexpected_text<T>(
        &self,
        expected: impl Into<Cow<'static, str>>,
        actual: impl Into<String>,
    ) -> Result<T> {
        Err(DecodeError::unexpected(self.json.as_str(), expected, actual))
    }

    // --------------------------------------------------------------------------------------------
    // Emission and nesting
    // --------------------------------------------------------------------------------------------

    /// Writes a decoded scalar or a re-emitted reference.
    fn emit(&mut self, emit: Emit, value: &Value, code: Option<u8>) -> Result<()> {
        match emit {
            Emit::Skip => {}
            Emit::FieldName => match value.key_text() {
                Some(name) => self.json.field_name(&name),
                None => return self.unexpected("field name", code),
            },
            Emit::Value => self.json.value(value),
        }
        Ok(())
    }

    fn enter(&mut self, code: Option<u8>) -> Result<()> {
        self.check_depth(1, code)?;
        self.depth += 1;
        Ok(())
    }

    /// Fails if `levels` more containers would exceed the nesting limit.
    fn check_depth(&self, levels: usize, code: Option<u8>) -> Result<()> {
        if self.depth + levels > self.options.max_depth {
            let expected = format!("value nested at most {} deep", self.options.max_depth);
            return self.unexpected(expected, code);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Counts a back-reference of the given size against the expansion budget.
    fn charge_expansion(&mut self, size: usize, code: Option<u8>) -> Result<()> {
        self.expanded = self.expanded.saturating_add(size);
        let budget = self.options.max_reference_expansion;
        if self.expanded > budget {
            return self.unexpected(format!("references expanding to at most {budget}"), code);
        }
        Ok(())
    }

    // --------------------------------------------------------------------------------------------
    // Dispatch
    // --------------------------------------------------------------------------------------------

    /// ```text
    /// value ::= null | boolean | int | long | double | string | date
    ///       ::= list | map | class-def object | object | ref
    /// ```
    pub(crate) fn decode_value(&mut self, emit: Emit) -> Result<(Value, Shape)> {
        let code = self.peek()?;
        let Some(production) = code.map(classify) else {
            return self.unexpected("value", code);
        };
        if emit == Emit::FieldName
            && matches!(production, Production::Null | Production::List | Production::Map)
        {
            return self.unexpected("field name", code);
        }
        match production {
            Production::Null => self.decode_null(emit).map(|()| scalar(Value::Null)),
            Production::Bool => self.decode_bool(emit).map(|b| scalar(Value::Bool(b))),
            Production::Int => self.decode_int(emit).map(|n| scalar(Value::Int(n))),
            Production::Long => self.decode_long(emit).map(|n| scalar(Value::Long(n))),
            Production::Double => self.decode_double(emit).map(|n| scalar(Value::Double(n))),
            Production::String => self.decode_string(emit).map(|s| scalar(Value::String(s))),
            Production::Date => self.decode_date(emit).map(|n| scalar(Value::Long(n))),
            Production::List => self.decode_list(emit),
            Production::Map => self.decode_map(emit),
            Production::ClassDef => {
                self.decode_class_def()?;
                self.decode_object(emit)
            }
            Production::Object => self.decode_object(emit),
            Production::Ref => self.decode_ref(emit),
            Production::Binary | Production::End | Production::Reserved => {
                self.unexpected("value", code)
            }
        }
    }
}

fn scalar(value: Value) -> (Value, Shape) {
    let shape = Shape::scalar(&value);
    (value, shape)
}
