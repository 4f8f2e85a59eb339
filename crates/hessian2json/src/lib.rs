//! A streaming Hessian 2.0 to JSON transcoder.
//!
//! The transcoder reads one Hessian 2.0 value from a byte stream and writes
//! the equivalent JSON text as it goes, without materializing language
//! objects first. It targets the payload shape of generic RPC invocations: a
//! result map, optionally followed by a string-keyed attachment map.
//!
//! ```rust
//! use hessian2json::Transcoder;
//!
//! // H 0x01 "a" 0x91 Z  =>  {"a": 1}
//! let bytes: &[u8] = &[b'H', 0x01, b'a', 0x91, b'Z'];
//! let mut transcoder = Transcoder::new(bytes);
//! assert_eq!(transcoder.transcode_map().unwrap(), r#"{"a":1}"#);
//! ```
//!
//! Supported productions are null, booleans, ints, longs, doubles, strings,
//! dates, lists, maps, back-references and two reduced object types
//! (`java.math.BigDecimal` and the `java.sql` date/time family). Binary
//! payloads and fully expanded objects are rejected.

mod byte_source;
mod emitter;
mod error;
mod object_input;
mod options;
mod refs;
pub mod routing;
mod tag;
mod transcoder;
mod value;

pub use emitter::JsonEmitter;
pub use error::{DecodeError, Result};
pub use object_input::{Attachments, GenericResponse, ObjectInput};
pub use options::TranscoderOptions;
pub use refs::{ClassDefinition, ReducedKind};
pub use tag::{Production, classify, code_name};
pub use transcoder::{Decoded, SessionState, Transcoder};
pub use value::{List, Map, Value};
