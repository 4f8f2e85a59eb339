use std::{borrow::Cow, io};

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = DecodeError> = core::result::Result<T, E>;

/// Errors raised while transcoding a Hessian 2.0 stream.
///
/// Every grammar violation is reported as [`DecodeError::UnexpectedProduction`];
/// the session that raised it is faulted and the whole message must be
/// discarded.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The next token does not belong to the production being decoded, or
    /// belongs to a construct this transcoder does not support.
    #[error("parse hessian2 error, json: [{json}], expected: [{expected}], actual: [{actual}]")]
    UnexpectedProduction {
        /// JSON text emitted before the fault, for diagnostics.
        json: String,
        /// Name of the production that was being decoded.
        expected: Cow<'static, str>,
        /// Description of what was found instead.
        actual: String,
    },
    /// The underlying reader failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// A previous call faulted this session.
    #[error("decode session is faulted")]
    Faulted,
    /// Transcoded attachment text could not be parsed back as a JSON object.
    #[error("malformed attachment json: {0}")]
    Attachments(#[from] serde_json::Error),
}

impl DecodeError {
    pub(crate) fn unexpected(
        json: &str,
        expected: impl Into<Cow<'static, str>>,
        actual: impl Into<String>,
    ) -> Self {
        Self::UnexpectedProduction {
            json: json.to_owned(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Name of the expected production, for grammar errors.
    #[must_use]
    pub fn expected(&self) -> Option<&str> {
        match self {
            Self::UnexpectedProduction { expected, .. } => Some(expected),
            _ => None,
        }
    }

    /// Description of the token actually found, for grammar errors.
    #[must_use]
    pub fn actual(&self) -> Option<&str> {
        match self {
            Self::UnexpectedProduction { actual, .. } => Some(actual),
            _ => None,
        }
    }

    /// JSON emitted before the fault, for grammar errors.
    #[must_use]
    pub fn partial_json(&self) -> Option<&str> {
        match self {
            Self::UnexpectedProduction { json, .. } => Some(json),
            _ => None,
        }
    }
}
