//! Recursive-descent decoder: tagged byte stream → [`Value`] tree.
//!
//! The decoder reads strictly sequentially with no lookahead beyond the field
//! in hand: one tag byte, then that kind's field, then its payload. Mapping
//! keys are decoded through the same routine as every other node and must
//! come back as text. Children are fully built before being attached, so a
//! failure never yields a partially populated tree.

use std::future::Future;
use std::pin::Pin;

use tokio::io::AsyncRead;
use tracing::trace;

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::flow::FlowReader;
use crate::format::{parse_count, parse_number, FieldMode, Tag, FIELD_DELIMITER, MAX_FIELD_LEN};
use crate::value::{Mapping, Value};

type DecodeFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// Read exactly one top-level value from `reader`.
///
/// Bytes after the value are left unread.
///
/// # Errors
///
/// - [`CodecError::UnknownTag`] on a tag byte other than `N`, `S`, `O`
/// - [`CodecError::MalformedField`] on an unparseable field, invalid UTF-8
///   text or early end of input
/// - [`CodecError::UnexpectedKeyKind`] if a mapping key is not text
/// - [`CodecError::DepthExceeded`] if mappings nest deeper than `config.max_depth`
/// - [`CodecError::Channel`] if the channel fails
pub async fn decode<R>(reader: &mut FlowReader<R>, config: &CodecConfig) -> Result<Value>
where
    R: AsyncRead + Unpin + Send,
{
    decode_value(reader, config, 0).await
}

fn decode_value<'a, R>(
    r: &'a mut FlowReader<R>,
    config: &'a CodecConfig,
    depth: usize,
) -> DecodeFuture<'a>
where
    R: AsyncRead + Unpin + Send,
{
    Box::pin(async move {
        if depth > config.max_depth {
            return Err(CodecError::DepthExceeded(config.max_depth));
        }
        let tag = Tag::from_byte(r.read_u8().await?)?;
        trace!(?tag, depth, "decoding value");
        match tag {
            Tag::Number => {
                let field = read_field(r, config.field_mode).await?;
                Ok(Value::Number(parse_number(&field)?))
            }
            Tag::Text => {
                let len = parse_count(&read_field(r, config.field_mode).await?)?;
                Ok(Value::Text(r.read_chars(len).await?))
            }
            Tag::Mapping => {
                let count = parse_count(&read_field(r, config.field_mode).await?)?;
                // The count is untrusted; let the vector grow as pairs arrive.
                let mut mapping = Mapping::with_capacity(count.min(64));
                for _ in 0..count {
                    let key = match decode_value(r, config, depth + 1).await? {
                        Value::Text(key) => key,
                        other => return Err(CodecError::UnexpectedKeyKind(other.kind())),
                    };
                    let value = decode_value(r, config, depth + 1).await?;
                    mapping.insert(key, value);
                }
                Ok(Value::Mapping(mapping))
            }
        }
    })
}

async fn read_field<R>(r: &mut FlowReader<R>, mode: FieldMode) -> Result<String>
where
    R: AsyncRead + Unpin + Send,
{
    let raw = match mode {
        FieldMode::Compact => r.read(1).await?.to_vec(),
        FieldMode::Delimited => r.read_delimited(FIELD_DELIMITER, MAX_FIELD_LEN).await?,
    };
    String::from_utf8(raw)
        .map_err(|_| CodecError::MalformedField("field is not valid UTF-8".to_string()))
}
