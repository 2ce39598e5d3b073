//! Error types for tagwire encoding and decoding operations.

use thiserror::Error;

use crate::value::Kind;

/// Errors that can occur while writing or reading a tagwire stream.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The underlying channel failed: open, write, flush, shutdown, read,
    /// or an out-of-band fault raced against the operation.
    #[error("channel error: {0}")]
    Channel(#[from] std::io::Error),

    /// A foreign value has no tagwire representation (e.g. JSON `null`).
    #[error("unsupported value type: {0}")]
    UnsupportedType(&'static str),

    /// The decoder met a tag byte other than `N`, `S` or `O`.
    #[error("unknown tag byte 0x{0:02x}")]
    UnknownTag(u8),

    /// A number, length or count field could not be parsed, the text payload
    /// was not valid UTF-8, or the input ended early.
    #[error("malformed field: {0}")]
    MalformedField(String),

    /// The field does not fit the configured field mode.
    #[error("field overflow: {0}")]
    FieldOverflow(String),

    /// A mapping key decoded as something other than text.
    #[error("mapping key must be text, found {0}")]
    UnexpectedKeyKind(Kind),

    /// Value nesting went past the configured limit.
    #[error("nesting depth exceeds limit of {0}")]
    DepthExceeded(usize),
}

/// Convenience alias used throughout tagwire-core.
pub type Result<T> = std::result::Result<T, CodecError>;
