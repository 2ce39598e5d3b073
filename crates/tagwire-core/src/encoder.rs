//! Recursive-descent encoder: [`Value`] tree → tagged byte stream.
//!
//! Nodes are written depth-first, so the byte order on the wire is exactly
//! the traversal order the decoder replays. Each node's field is framed
//! before its tag is written, which means a [`CodecError::FieldOverflow`]
//! never leaves a dangling tag behind; bytes of earlier nodes stay written.
//!
//! # Example
//! ```
//! use tagwire_core::{encode_to_vec, CodecConfig, Mapping, Value};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let value = Value::from(
//!     [("a", Value::from(1.0)), ("b", Value::from("x"))]
//!         .into_iter()
//!         .collect::<Mapping>(),
//! );
//! let bytes = encode_to_vec(&value, &CodecConfig::default()).await.unwrap();
//! assert_eq!(bytes, b"O2S1aN1S1bS1x");
//! # });
//! ```

use std::future::Future;
use std::pin::Pin;

use tokio::io::AsyncWrite;
use tracing::trace;

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::flow::FlowWriter;
use crate::format::{render_number, Tag};
use crate::value::Value;

type EncodeFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Write one complete value to `writer`.
///
/// Does not close the writer.
///
/// # Errors
///
/// - [`CodecError::FieldOverflow`] if a field does not fit `config.field_mode`
/// - [`CodecError::DepthExceeded`] if mappings nest deeper than `config.max_depth`
/// - [`CodecError::Channel`] if the channel fails while draining
pub async fn encode<W>(writer: &mut FlowWriter<W>, value: &Value, config: &CodecConfig) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    encode_value(writer, value, config, 0).await
}

fn encode_value<'a, W>(
    w: &'a mut FlowWriter<W>,
    value: &'a Value,
    config: &'a CodecConfig,
    depth: usize,
) -> EncodeFuture<'a>
where
    W: AsyncWrite + Unpin + Send,
{
    Box::pin(async move {
        if depth > config.max_depth {
            return Err(CodecError::DepthExceeded(config.max_depth));
        }
        trace!(kind = %value.kind(), depth, "encoding value");
        match value {
            Value::Number(n) => {
                let field = config.field_mode.frame(&render_number(*n))?;
                w.write(&[Tag::Number.byte()]).await?;
                w.write(&field).await
            }
            Value::Text(s) => encode_text(w, s, config).await,
            Value::Mapping(m) => {
                let field = config.field_mode.frame(&m.len().to_string())?;
                w.write(&[Tag::Mapping.byte()]).await?;
                w.write(&field).await?;
                for (k, v) in m.iter() {
                    encode_text(w, k, config).await?;
                    encode_value(w, v, config, depth + 1).await?;
                }
                Ok(())
            }
        }
    })
}

/// Keys and text values share this path, so a key is always a full `S` node.
async fn encode_text<W>(w: &mut FlowWriter<W>, s: &str, config: &CodecConfig) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let field = config.field_mode.frame(&s.chars().count().to_string())?;
    w.write(&[Tag::Text.byte()]).await?;
    w.write(&field).await?;
    w.write(s.as_bytes()).await
}
