use std::io;
use std::io::ErrorKind;
use std::time::Duration;

use bytes::{Buf, BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::connection::Watchdog;

/// Default size of a connection's read buffer.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// What happens to a connection once the current message is done.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// close the connection
    #[default]
    Close,
    /// wait for the next message
    KeepAlive,
    /// the next message is already in the read buffer, see [`Connection::load_bookmark`]
    Pipelined,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    read_buffer_size: usize,
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self { read_buffer_size: DEFAULT_READ_BUFFER_SIZE }
    }

    /// Upper bound of bytes taken from the stream by one [`Connection::read_some`].
    #[must_use]
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A byte stream carrying HTTP messages, plus the state shared by the messages on it.
///
/// Each [`read_some`](Connection::read_some) replaces the content of the read buffer.
/// Bytes of a pipelined message left over by the previous receive are recorded as a
/// bookmark into that buffer and consumed before anything new is read.
///
/// Pending reads and writes fail with [`ErrorKind::ConnectionAborted`] once the
/// connection is aborted, either directly or by its [`Watchdog`].
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    read_buffer: BytesMut,
    read_buffer_size: usize,
    lifecycle: Lifecycle,
    bookmark: (usize, usize),
    abort: CancellationToken,
    watchdog: Watchdog,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self::with_config(stream, ConnectionConfig::default())
    }

    pub fn with_config(stream: S, config: ConnectionConfig) -> Self {
        let abort = CancellationToken::new();
        Self {
            stream,
            read_buffer: BytesMut::with_capacity(config.read_buffer_size),
            read_buffer_size: config.read_buffer_size,
            lifecycle: Lifecycle::Close,
            bookmark: (0, 0),
            watchdog: Watchdog::new(abort.clone()),
            abort,
        }
    }

    /// Reads whatever the stream has available into the read buffer.
    ///
    /// Returns the number of bytes read, 0 only at the end of the stream.
    pub async fn read_some(&mut self) -> io::Result<usize> {
        self.read_buffer.clear();
        self.read_buffer.reserve(self.read_buffer_size);
        self.bookmark = (0, 0);

        let mut buffer = (&mut self.read_buffer).limit(self.read_buffer_size);
        let n = select! {
            biased;
            () = self.abort.cancelled() => return Err(aborted()),
            result = self.stream.read_buf(&mut buffer) => result?,
        };
        trace!(bytes = n, "read from stream");
        Ok(n)
    }

    /// Bytes of the last [`read_some`](Connection::read_some).
    pub fn read_buffer(&self) -> &[u8] {
        &self.read_buffer
    }

    /// Writes as much of `buf` as the stream accepts, vectored when the stream supports it.
    pub async fn write<B: Buf>(&mut self, buf: &mut B) -> io::Result<usize> {
        select! {
            biased;
            () = self.abort.cancelled() => Err(aborted()),
            result = self.stream.write_buf(buf) => result,
        }
    }

    /// Writes all of `buf` and flushes the stream.
    pub async fn write_all<B: Buf>(&mut self, buf: &mut B) -> io::Result<usize> {
        let mut written = 0;
        while buf.has_remaining() {
            let n = self.write(buf).await?;
            if n == 0 {
                return Err(ErrorKind::WriteZero.into());
            }
            written += n;
        }

        select! {
            biased;
            () = self.abort.cancelled() => return Err(aborted()),
            result = self.stream.flush() => result?,
        }
        trace!(bytes = written, "wrote to stream");
        Ok(written)
    }

    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    /// Records that `read_buffer()[start..end]` belongs to the next message.
    pub fn save_bookmark(&mut self, start: usize, end: usize) {
        let end = end.min(self.read_buffer.len());
        self.bookmark = (start.min(end), end);
    }

    pub fn load_bookmark(&self) -> (usize, usize) {
        self.bookmark
    }

    /// The bookmarked bytes.
    pub fn bookmarked(&self) -> &[u8] {
        &self.read_buffer[self.bookmark.0..self.bookmark.1]
    }

    /// Makes every pending and future read or write fail.
    pub fn abort(&self) {
        debug!("abort connection");
        self.abort.cancel();
    }

    /// A handle that aborts this connection, for use outside of it.
    pub fn abort_handle(&self) -> CancellationToken {
        self.abort.clone()
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_cancelled()
    }

    /// Aborts the connection unless [`cancel_timer`](Connection::cancel_timer) is called
    /// within `duration`.
    pub fn start_timer(&self, duration: Duration) {
        self.watchdog.start(duration);
    }

    pub fn cancel_timer(&self) {
        self.watchdog.cancel();
    }

    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

fn aborted() -> io::Error {
    io::Error::new(ErrorKind::ConnectionAborted, "connection aborted")
}
