//! Choosing between JSON transcoding and the conventional object decoder.
//!
//! Only generic invocations on the consumer side get JSON, and only for
//! responses that carry a value. The decision peeks at the response flag
//! without consuming it, so whichever decoder is chosen sees the full body.

use std::io::{self, BufRead};

use log::debug;

/// Serialization id this transcoder registers under.
pub const CONTENT_TYPE_ID: u8 = 2;
/// Content type of the payloads it reads.
pub const CONTENT_TYPE: &str = "x-application/hessian2";

/// Which end of a call this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The calling end.
    Consumer,
    /// The serving end.
    Provider,
}

/// The call parameters the routing decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallMetadata {
    /// The call was made through the generic invocation interface.
    pub generic: bool,
    /// Which end of the call we are, if known.
    pub side: Option<Side>,
}

impl CallMetadata {
    /// Reads `generic=true` and `side=consumer|provider` from call parameters;
    /// anything else leaves the defaults.
    ///
    /// ```rust
    /// use hessian2json::routing::{CallMetadata, Side};
    ///
    /// let meta = CallMetadata::from_parameters([("generic", "true"), ("side", "consumer")]);
    /// assert!(meta.generic);
    /// assert_eq!(meta.side, Some(Side::Consumer));
    /// ```
    pub fn from_parameters<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut meta = Self::default();
        for (key, value) in params {
            match (key, value) {
                ("generic", value) => meta.generic = value == "true",
                ("side", "consumer") => meta.side = Some(Side::Consumer),
                ("side", "provider") => meta.side = Some(Side::Provider),
                _ => {}
            }
        }
        meta
    }

    fn wants_json(self) -> bool {
        self.generic && self.side == Some(Side::Consumer)
    }
}

/// Decoder chosen for a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Transcode to JSON with [`ObjectInput`](crate::ObjectInput).
    Json,
    /// Hand the body to the conventional object decoder.
    Conventional,
}

/// Leading flag of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFlag {
    /// An exception follows.
    Exception,
    /// A value follows.
    Value,
    /// Nothing follows.
    Null,
    /// An exception and attachments follow.
    ExceptionWithAttachments,
    /// A value and attachments follow.
    ValueWithAttachments,
    /// Only attachments follow.
    NullWithAttachments,
}

impl ResponseFlag {
    /// Maps a decoded flag int.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Exception,
            1 => Self::Value,
            2 => Self::Null,
            3 => Self::ExceptionWithAttachments,
            4 => Self::ValueWithAttachments,
            5 => Self::NullWithAttachments,
            _ => return None,
        })
    }

    /// Maps the single-byte compact int a flag is written as.
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::from_code(i32::from(tag) - 0x90)
    }

    /// A result value follows the flag.
    #[must_use]
    pub fn carries_value(self) -> bool {
        matches!(self, Self::Value | Self::ValueWithAttachments)
    }

    /// An attachment map closes the body.
    #[must_use]
    pub fn has_attachments(self) -> bool {
        matches!(
            self,
            Self::ExceptionWithAttachments | Self::ValueWithAttachments | Self::NullWithAttachments
        )
    }
}

/// Picks the decoder for the body buffered in `reader` without consuming any
/// of it.
///
/// # Errors
///
/// Fails only if filling the reader's buffer fails.
pub fn route<R: BufRead + ?Sized>(meta: &CallMetadata, reader: &mut R) -> io::Result<Route> {
    if !meta.wants_json() {
        return Ok(Route::Conventional);
    }
    let flag = reader.fill_buf()?.first().copied().and_then(ResponseFlag::from_tag);
    let route = match flag {
        Some(flag) if flag.carries_value() => Route::Json,
        _ => Route::Conventional,
    };
    debug!("routing {flag:?} response to {route:?}");
    Ok(route)
}
