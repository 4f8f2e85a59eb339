//! JSON-mode object input for generic RPC responses.
//!
//! A generic response body is a response flag, a result map and, for flag
//! [`ResponseFlag::ValueWithAttachments`], a string-keyed attachment map.
//! Objects come back as JSON text; attachments are parsed into
//! [`serde_json`] values.

use std::io::Read;

use log::debug;

use crate::{
    error::{DecodeError, Result},
    options::TranscoderOptions,
    routing::ResponseFlag,
    transcoder::Transcoder,
};

/// Attachment map, in wire order.
pub type Attachments = serde_json::Map<String, serde_json::Value>;

/// A fully read generic response.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericResponse {
    /// Response flag the body started with.
    pub flag: ResponseFlag,
    /// The result map as JSON text.
    pub value: String,
    /// Attachments, when the flag announces them.
    pub attachments: Option<Attachments>,
}

/// Reads generic RPC payloads as JSON.
///
/// ```rust
/// use hessian2json::ObjectInput;
///
/// // 0x94 (value with attachments) H "a" 0x91 Z H "k" "v" Z
/// let bytes: &[u8] = &[
///     0x94, b'H', 0x01, b'a', 0x91, b'Z', b'H', 0x01, b'k', 0x01, b'v', b'Z',
/// ];
/// let response = ObjectInput::new(bytes).read_response().unwrap();
/// assert_eq!(response.value, r#"{"a":1}"#);
/// assert_eq!(response.attachments.unwrap()["k"], "v");
/// ```
#[derive(Debug)]
pub struct ObjectInput<R> {
    transcoder: Transcoder<R>,
}

impl<R: Read> ObjectInput<R> {
    /// Wraps a reader with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, TranscoderOptions::default())
    }

    /// Wraps a reader with the given transcoder options.
    pub fn with_options(reader: R, options: TranscoderOptions) -> Self {
        Self {
            transcoder: Transcoder::with_options(reader, options),
        }
    }

    /// Reads the next map and returns it as JSON text.
    ///
    /// # Errors
    ///
    /// See [`Transcoder::transcode_map`].
    pub fn read_object(&mut self) -> Result<String> {
        self.transcoder.transcode_map()
    }

    /// Reads the next map as attachments.
    ///
    /// # Errors
    ///
    /// Fails like [`read_object`](Self::read_object), or with
    /// [`DecodeError::Attachments`] if the JSON text cannot be parsed back
    /// (nesting deeper than `serde_json` accepts).
    pub fn read_attachments(&mut self) -> Result<Attachments> {
        let json = self.read_object()?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Reads a whole generic response: flag, value and optional attachments.
    ///
    /// # Errors
    ///
    /// Fails with [`DecodeError::UnexpectedProduction`] when the flag does not
    /// announce a value; such responses belong to the conventional decoder.
    pub fn read_response(&mut self) -> Result<GenericResponse> {
        let code = self.transcoder.read_int()?;
        let flag = match ResponseFlag::from_code(code) {
            Some(flag) if flag.carries_value() => flag,
            _ => {
                debug!("response flag {code} has no value");
                return Err(DecodeError::unexpected(
                    "",
                    "response flag 1 or 4",
                    code.to_string(),
                ));
            }
        };
        let value = self.read_object()?;
        let attachments = if flag.has_attachments() {
            Some(self.read_attachments()?)
        } else {
            None
        };
        Ok(GenericResponse {
            flag,
            value,
            attachments,
        })
    }

    /// The underlying session, for scalar reads.
    pub fn transcoder_mut(&mut self) -> &mut Transcoder<R> {
        &mut self.transcoder
    }

    /// Unwraps the reader.
    pub fn into_inner(self) -> R {
        self.transcoder.into_inner()
    }
}
