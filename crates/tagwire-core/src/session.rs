//! Top-level serialize/deserialize calls.
//!
//! Each call owns its channel for its whole duration and races the codec
//! against a *fault* future: whichever finishes first decides the outcome,
//! and the loser is dropped. When the fault wins, the in-flight traversal is
//! abandoned where it stands and the channel is released by drop.
//!
//! File channels report failures from the operations themselves, so the
//! path-based calls race against a fault that never fires. Callers with an
//! out-of-band error source (a connection supervisor, a watchdog) use
//! [`serialize_to`] and [`deserialize_from`] directly.

use std::future::{self, Future};
use std::io;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, instrument};

use crate::config::CodecConfig;
use crate::decoder::decode;
use crate::encoder::encode;
use crate::error::{CodecError, Result};
use crate::flow::{FlowReader, FlowWriter};
use crate::value::Value;

/// Write `value` to a new file at `path` with the default configuration.
///
/// # Errors
///
/// See [`serialize_to`]; failing to create the file is a
/// [`CodecError::Channel`].
pub async fn serialize(path: impl AsRef<Path>, value: &Value) -> Result<()> {
    serialize_with(path, value, &CodecConfig::default()).await
}

/// Write `value` to a new file at `path`.
///
/// # Errors
///
/// See [`serialize`].
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn serialize_with(
    path: impl AsRef<Path>,
    value: &Value,
    config: &CodecConfig,
) -> Result<()> {
    let file = File::create(path.as_ref()).await?;
    debug!("opened output channel");
    serialize_to(file, value, config, future::pending()).await
}

/// Read one value from the file at `path` with the default configuration.
///
/// # Errors
///
/// See [`deserialize_from`]; failing to open the file is a
/// [`CodecError::Channel`].
pub async fn deserialize(path: impl AsRef<Path>) -> Result<Value> {
    deserialize_with(path, &CodecConfig::default()).await
}

/// Read one value from the file at `path`.
///
/// # Errors
///
/// See [`deserialize`].
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn deserialize_with(path: impl AsRef<Path>, config: &CodecConfig) -> Result<Value> {
    let file = File::open(path.as_ref()).await?;
    debug!("opened input channel");
    deserialize_from(file, config, future::pending()).await
}

/// Encode `value` into `writer`, then close it, unless `fault` resolves first.
///
/// The writer is closed exactly once on every path that reaches the end of
/// encoding, including encoder failure; an encoder error takes precedence
/// over a close error.
///
/// # Errors
///
/// The first of: the fault ([`CodecError::Channel`]), a channel failure, or
/// an encoder error (see [`encode`](crate::encoder::encode)).
#[instrument(level = "trace", skip_all)]
pub async fn serialize_to<W, F>(
    writer: W,
    value: &Value,
    config: &CodecConfig,
    fault: F,
) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
    F: Future<Output = io::Error>,
{
    let mut writer = FlowWriter::new(writer, config.high_water_mark);
    race(fault, async {
        let encoded = encode(&mut writer, value, config).await;
        let closed = writer.close().await;
        encoded.and(closed)
    })
    .await
}

/// Decode exactly one value from `reader`, unless `fault` resolves first.
///
/// # Errors
///
/// The first of: the fault ([`CodecError::Channel`]), a channel failure, or
/// a decoder error (see [`decode`](crate::decoder::decode)).
#[instrument(level = "trace", skip_all)]
pub async fn deserialize_from<R, F>(reader: R, config: &CodecConfig, fault: F) -> Result<Value>
where
    R: AsyncRead + Unpin + Send,
    F: Future<Output = io::Error>,
{
    let mut reader = FlowReader::new(reader);
    let value = race(fault, decode(&mut reader, config)).await?;
    debug!(bytes_read = reader.bytes_read(), "decoded value");
    Ok(value)
}

/// Encode `value` into memory.
///
/// # Errors
///
/// See [`encode`](crate::encoder::encode).
pub async fn encode_to_vec(value: &Value, config: &CodecConfig) -> Result<Vec<u8>> {
    let mut writer = FlowWriter::new(Vec::new(), config.high_water_mark);
    encode(&mut writer, value, config).await?;
    writer.close().await?;
    Ok(writer.into_inner())
}

/// Decode one value from the front of `bytes`.
///
/// # Errors
///
/// See [`decode`](crate::decoder::decode).
pub async fn decode_from_slice(bytes: &[u8], config: &CodecConfig) -> Result<Value> {
    decode(&mut FlowReader::new(bytes), config).await
}

async fn race<T>(
    fault: impl Future<Output = io::Error>,
    op: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        err = fault => {
            debug!(%err, "channel fault, abandoning operation");
            Err(CodecError::Channel(err))
        }
        res = op => res,
    }
}
