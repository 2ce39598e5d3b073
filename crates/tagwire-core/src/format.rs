//! The wire contract shared by the encoder and decoder.
//!
//! ```text
//! value   := 'N' field
//!          | 'S' field chars          ; field = character count
//!          | 'O' field (value value)* ; field = pair count, key then value
//! ```
//!
//! Keys are written as full `S` values, so the decoder dispatches every node,
//! key or not, through the same routine. How a `field` is laid out depends on
//! the [`FieldMode`].

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Terminator of a field in [`FieldMode::Delimited`].
pub const FIELD_DELIMITER: u8 = b';';

/// Longest field accepted in [`FieldMode::Delimited`], delimiter excluded.
pub const MAX_FIELD_LEN: usize = 32;

/// One-byte discriminator written before every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    Number = b'N',
    Text = b'S',
    Mapping = b'O',
}

impl Tag {
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// # Errors
    ///
    /// Returns [`CodecError::UnknownTag`] for any byte other than `N`, `S`, `O`.
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            b'N' => Ok(Self::Number),
            b'S' => Ok(Self::Text),
            b'O' => Ok(Self::Mapping),
            other => Err(CodecError::UnknownTag(other)),
        }
    }
}

/// How numbers, lengths and counts are laid out on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    /// Exactly one character per field.
    ///
    /// Streams written this way are byte-compatible with the historical
    /// format, which only ever read one character back. The encoder refuses
    /// fields that render longer than that instead of writing an undecodable
    /// stream.
    #[default]
    Compact,
    /// Decimal text terminated by [`FIELD_DELIMITER`]. Any value fits.
    Delimited,
}

impl FieldMode {
    /// Lay out a rendered field for the wire.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FieldOverflow`] when `text` does not fit the mode.
    pub fn frame(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Self::Compact => {
                if text.len() != 1 {
                    return Err(CodecError::FieldOverflow(format!(
                        "`{text}` does not fit a single-character field"
                    )));
                }
                Ok(text.as_bytes().to_vec())
            }
            Self::Delimited => {
                if text.len() > MAX_FIELD_LEN {
                    return Err(CodecError::FieldOverflow(format!(
                        "`{text}` is longer than {MAX_FIELD_LEN} characters"
                    )));
                }
                let mut buf = Vec::with_capacity(text.len() + 1);
                buf.extend_from_slice(text.as_bytes());
                buf.push(FIELD_DELIMITER);
                Ok(buf)
            }
        }
    }
}

impl std::str::FromStr for FieldMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "compact" => Ok(Self::Compact),
            "delimited" => Ok(Self::Delimited),
            other => Err(format!(
                "unknown field mode '{other}', expected 'compact' or 'delimited'"
            )),
        }
    }
}

/// Shortest decimal form that parses back to the same `f64`.
///
/// Whole numbers carry no fraction (`2.0` renders as `2`), `-0.0` keeps its
/// sign, and non-finite values render as `NaN`, `inf` and `-inf`. Magnitudes
/// of at least 1e21 or below 1e-6 switch to exponent form (`1e21`,
/// `2.5e-7`), which keeps every finite value well inside [`MAX_FIELD_LEN`].
#[must_use]
pub fn render_number(n: f64) -> String {
    let magnitude = n.abs();
    if n.is_finite() && magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        format!("{n:e}")
    } else {
        format!("{n}")
    }
}

/// # Errors
///
/// Returns [`CodecError::MalformedField`] if `field` is not a decimal number.
pub fn parse_number(field: &str) -> Result<f64> {
    field
        .parse()
        .map_err(|_| CodecError::MalformedField(format!("`{field}` is not a number")))
}

/// Parse a length or count field.
///
/// # Errors
///
/// Returns [`CodecError::MalformedField`] unless `field` is a non-negative
/// decimal integer.
pub fn parse_count(field: &str) -> Result<usize> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::MalformedField(format!(
            "`{field}` is not a non-negative integer"
        )));
    }
    field
        .parse()
        .map_err(|_| CodecError::MalformedField(format!("`{field}` does not fit in usize")))
}
