/// Configuration options for a [`Transcoder`](crate::Transcoder) session.
///
/// # Examples
///
/// ```rust
/// use hessian2json::{Transcoder, TranscoderOptions};
///
/// let options = TranscoderOptions {
///     max_depth: 32,
///     ..Default::default()
/// };
/// let bytes: &[u8] = &[b'H', b'Z'];
/// let mut transcoder = Transcoder::with_options(bytes, options);
/// assert_eq!(transcoder.transcode_map().unwrap(), "{}");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscoderOptions {
    /// Capacity of the refillable read buffer in bytes.
    ///
    /// Values below 16 are raised to 16.
    ///
    /// # Default
    ///
    /// `256`
    pub buffer_capacity: usize,

    /// Maximum nesting of lists and maps.
    ///
    /// A payload nested deeper than this fails with
    /// [`DecodeError::UnexpectedProduction`](crate::DecodeError::UnexpectedProduction)
    /// instead of exhausting the stack.
    ///
    /// # Default
    ///
    /// `512`
    pub max_depth: usize,

    /// Upper bound on what back-references may re-emit during one top-level
    /// call, counted as one unit per value plus one per byte of string text.
    ///
    /// Each back-reference re-emits the whole value it points at, so a short
    /// chain of references can stand for an exponentially large document.
    /// Exceeding the bound fails with
    /// [`DecodeError::UnexpectedProduction`](crate::DecodeError::UnexpectedProduction).
    ///
    /// # Default
    ///
    /// `16 * 1024 * 1024`
    pub max_reference_expansion: usize,
}

pub(crate) const MIN_BUFFER_CAPACITY: usize = 16;

impl Default for TranscoderOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: 256,
            max_depth: 512,
            max_reference_expansion: 16 * 1024 * 1024,
        }
    }
}

impl TranscoderOptions {
    pub(crate) fn effective_buffer_capacity(&self) -> usize {
        self.buffer_capacity.max(MIN_BUFFER_CAPACITY)
    }
}
