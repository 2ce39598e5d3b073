//! Flow-controlled wrappers around async byte channels.
//!
//! These are the only places where encoding or decoding suspends:
//!
//! - [`FlowWriter::write`] queues bytes, passes what the channel accepts
//!   without blocking straight through, and, once the unsent remainder
//!   reaches the high-water mark, waits until the whole queue has drained
//!   into the channel. Queued bytes are never submitted twice.
//! - [`FlowReader::read`] keeps a private buffer and loops "take n bytes from
//!   the buffer, otherwise wait for the channel to produce more". One wakeup
//!   is not assumed to deliver enough bytes.
//!
//! Everything above this module is purely structural.

use std::future;
use std::io;
use std::pin::Pin;
use std::task::Poll;

use bytes::{Buf as _, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt as _, AsyncWrite, AsyncWriteExt as _};
use tracing::{debug, trace};

use crate::error::{CodecError, Result};

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug)]
pub struct FlowWriter<W> {
    inner: W,
    queue: BytesMut,
    high_water_mark: usize,
    bytes_written: u64,
    drains: u64,
    closed: bool,
}

impl<W> FlowWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// `high_water_mark` values below 1 are raised to 1.
    pub fn new(inner: W, high_water_mark: usize) -> Self {
        let high_water_mark = high_water_mark.max(1);
        Self {
            inner,
            queue: BytesMut::with_capacity(high_water_mark.min(READ_CHUNK)),
            high_water_mark,
            bytes_written: 0,
            drains: 0,
            closed: false,
        }
    }

    /// Queue `bytes` and hand as much of the queue to the channel as it
    /// accepts without waiting.
    ///
    /// Completes immediately while the unsent remainder stays under the
    /// high-water mark, otherwise suspends until the queue has drained.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Channel`] if the channel fails.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.queue.extend_from_slice(bytes);
        self.bytes_written += bytes.len() as u64;
        self.push_ready().await?;
        if self.queue.len() < self.high_water_mark {
            return Ok(());
        }
        self.drain().await
    }

    /// Write queued bytes until the channel would block, never suspending.
    async fn push_ready(&mut self) -> Result<()> {
        let Self { inner, queue, .. } = self;
        future::poll_fn(|cx| {
            while !queue.is_empty() {
                match Pin::new(&mut *inner).poll_write(cx, &queue[..]) {
                    Poll::Ready(Ok(0)) => {
                        return Poll::Ready(Err(io::Error::from(io::ErrorKind::WriteZero)));
                    }
                    Poll::Ready(Ok(n)) => queue.advance(n),
                    Poll::Ready(Err(err)) => return Poll::Ready(Err(err)),
                    Poll::Pending => return Poll::Ready(Ok(())),
                }
            }
            match Pin::new(&mut *inner).poll_flush(cx) {
                Poll::Ready(res) => Poll::Ready(res),
                Poll::Pending => Poll::Ready(Ok(())),
            }
        })
        .await?;
        Ok(())
    }

    async fn drain(&mut self) -> Result<()> {
        trace!(queued = self.queue.len(), "waiting for drain");
        self.inner.write_all_buf(&mut self.queue).await?;
        self.inner.flush().await?;
        self.drains += 1;
        Ok(())
    }

    /// Drain whatever is still queued and shut the channel down.
    ///
    /// Only the first call does any work.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Channel`] if the final drain or the shutdown fails.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if !self.queue.is_empty() {
            self.drain().await?;
        }
        self.inner.shutdown().await?;
        debug!(
            bytes_written = self.bytes_written,
            drains = self.drains,
            "closed output channel"
        );
        Ok(())
    }

    /// Bytes accepted by [`write`](Self::write) so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Number of times a write had to wait for the queue to drain.
    pub fn drains(&self) -> u64 {
        self.drains
    }

    /// Unwrap the channel. Bytes still queued are discarded; call
    /// [`close`](Self::close) first.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[derive(Debug)]
pub struct FlowReader<R> {
    inner: R,
    buf: BytesMut,
    bytes_read: u64,
    eof: bool,
}

impl<R> FlowReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            bytes_read: 0,
            eof: false,
        }
    }

    /// Read exactly `n` bytes, waiting for the channel as often as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Channel`] if the channel fails, and
    /// [`CodecError::MalformedField`] if it ends before `n` bytes arrive.
    pub async fn read(&mut self, n: usize) -> Result<Bytes> {
        loop {
            if self.buf.len() >= n {
                self.bytes_read += n as u64;
                return Ok(self.buf.split_to(n).freeze());
            }
            if self.eof {
                return Err(CodecError::MalformedField(format!(
                    "unexpected end of input after {} bytes: wanted {n}, {} available",
                    self.bytes_read,
                    self.buf.len()
                )));
            }
            trace!(wanted = n, buffered = self.buf.len(), "waiting for readability");
            self.buf.reserve(READ_CHUNK);
            if self.inner.read_buf(&mut self.buf).await? == 0 {
                self.eof = true;
            }
        }
    }

    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub async fn read_u8(&mut self) -> Result<u8> {
        let b = self.read(1).await?;
        Ok(b[0])
    }

    /// Read exactly `n` characters of UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedField`] on invalid UTF-8 or early end of
    /// input, [`CodecError::Channel`] if the channel fails.
    pub async fn read_chars(&mut self, n: usize) -> Result<String> {
        // n comes off the wire; let the string grow as characters arrive
        let mut out = String::with_capacity(n.min(READ_CHUNK));
        for _ in 0..n {
            let lead = self.read_u8().await?;
            let width = utf8_width(lead).ok_or_else(|| {
                CodecError::MalformedField(format!("invalid UTF-8 lead byte 0x{lead:02x}"))
            })?;
            let mut ch = [lead, 0, 0, 0];
            if width > 1 {
                let rest = self.read(width - 1).await?;
                ch[1..width].copy_from_slice(&rest);
            }
            let s = std::str::from_utf8(&ch[..width])
                .map_err(|err| CodecError::MalformedField(format!("invalid UTF-8 text: {err}")))?;
            out.push_str(s);
        }
        Ok(out)
    }

    /// Read bytes up to `delimiter`, which is consumed but not returned.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedField`] if more than `max` bytes precede
    /// the delimiter or the input ends first.
    pub async fn read_delimited(&mut self, delimiter: u8, max: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let b = self.read_u8().await?;
            if b == delimiter {
                return Ok(out);
            }
            if out.len() == max {
                return Err(CodecError::MalformedField(format!(
                    "no field delimiter within {max} bytes"
                )));
            }
            out.push(b);
        }
    }

    /// Bytes handed out by this reader so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

const fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}
