use bytes::{Buf, BytesMut};
use http::HeaderMap;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Encoder;
use tracing::{debug, warn};

use crate::codec::{ChunkItem, ChunkedEncoder, HeaderEncoder, encode_head};
use crate::connection::{Connection, Lifecycle};
use crate::protocol::{HttpError, HttpMessage, SendError};

/// Sends `message` with an explicit `Content-Length`.
///
/// `Connection` is set from the connection's lifecycle: `close` when it is
/// [`Lifecycle::Close`], `Keep-Alive` otherwise. The head and the body are written as
/// two segments in one vectored write where the stream supports it; the body is not
/// copied. With `headers_only` the body is left out whatever its declared length.
///
/// Returns the number of bytes written.
pub async fn send<S>(connection: &mut Connection<S>, message: &mut HttpMessage, headers_only: bool) -> Result<usize, HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let keep_alive = connection.lifecycle() != Lifecycle::Close;

    let mut head = BytesMut::new();
    encode_head(message, keep_alive, &mut head)?;

    let body: &[u8] = if headers_only { &[] } else { message.content() };
    let mut segments = head.freeze().chain(body);

    let written = write_segments(connection, &mut segments).await?;
    debug!(first_line = %message.first_line(), written, keep_alive, "sent message");
    Ok(written)
}

/// Sends `message` with `Transfer-Encoding: chunked`, taking the body from `chunks`.
///
/// Each chunk is framed as `hex-size CRLF data CRLF`, followed by the zero-sized chunk,
/// `footers` and the final CRLF. A peer on HTTP/1.0 cannot read chunks: the pieces are
/// sent as they are and the connection is marked [`Lifecycle::Close`] so the end of the
/// stream ends the body.
pub async fn send_chunked<S, I, B>(
    connection: &mut Connection<S>,
    message: &mut HttpMessage,
    chunks: I,
    footers: &HeaderMap,
) -> Result<usize, HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let using_chunks = message.chunks_supported();
    if !using_chunks {
        connection.set_lifecycle(Lifecycle::Close);
    }
    let keep_alive = connection.lifecycle() != Lifecycle::Close;

    message.prepare_headers_for_send(keep_alive, true);
    let mut buffer = BytesMut::new();
    HeaderEncoder.encode(&*message, &mut buffer)?;

    if using_chunks {
        let mut encoder = ChunkedEncoder::new();
        for chunk in chunks {
            encoder.encode(ChunkItem::Chunk(chunk.as_ref()), &mut buffer)?;
        }
        encoder.encode(ChunkItem::Eof(footers), &mut buffer)?;
    } else {
        for chunk in chunks {
            buffer.extend_from_slice(chunk.as_ref());
        }
    }

    let written = write_segments(connection, &mut buffer.freeze()).await?;
    debug!(first_line = %message.first_line(), written, using_chunks, "sent chunked message");
    Ok(written)
}

async fn write_segments<S, B>(connection: &mut Connection<S>, segments: &mut B) -> Result<usize, HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    B: Buf,
{
    match connection.write_all(segments).await {
        Ok(written) => Ok(written),
        Err(e) => {
            warn!(cause = %e, "failed to send message");
            connection.set_lifecycle(Lifecycle::Close);
            Err(SendError::io(e).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HttpVersion;
    use http::HeaderValue;
    use http::StatusCode;
    use tokio::io::{AsyncReadExt, duplex};

    async fn read_all(mut peer: tokio::io::DuplexStream) -> Vec<u8> {
        let mut received = Vec::new();
        peer.read_to_end(&mut received).await.unwrap();
        received
    }

    #[tokio::test]
    async fn send_with_length() {
        let (client, peer) = duplex(1024);
        let mut connection = Connection::new(client);
        connection.set_lifecycle(Lifecycle::KeepAlive);

        let mut response = HttpMessage::response();
        response.set_status(StatusCode::ACCEPTED);
        response.set_content("queued");

        let written = send(&mut connection, &mut response, false).await.unwrap();
        drop(connection);

        let expected = b"HTTP/1.1 202 Accepted\r\nconnection: Keep-Alive\r\ncontent-length: 6\r\n\r\nqueued";
        assert_eq!(written, expected.len());
        assert_eq!(read_all(peer).await, expected);
    }

    #[tokio::test]
    async fn send_headers_only_on_closing_connection() {
        let (client, peer) = duplex(1024);
        let mut connection = Connection::new(client);

        let mut response = HttpMessage::response();
        response.set_content("not sent");
        send(&mut connection, &mut response, true).await.unwrap();
        drop(connection);

        assert_eq!(read_all(peer).await, b"HTTP/1.1 200 OK\r\nconnection: close\r\ncontent-length: 8\r\n\r\n");
    }

    #[tokio::test]
    async fn send_chunks_and_footers() {
        let (client, peer) = duplex(1024);
        let mut connection = Connection::new(client);
        connection.set_lifecycle(Lifecycle::KeepAlive);

        let mut footers = HeaderMap::new();
        footers.insert("x-checksum", HeaderValue::from_static("9"));

        let mut response = HttpMessage::response();
        send_chunked(&mut connection, &mut response, ["Wiki", "pedia"], &footers).await.unwrap();
        drop(connection);

        assert_eq!(
            read_all(peer).await,
            b"HTTP/1.1 200 OK\r\nconnection: Keep-Alive\r\ntransfer-encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\nx-checksum: 9\r\n\r\n"
        );
    }

    #[tokio::test]
    async fn chunked_body_reads_back() {
        let (client, server) = duplex(1024);
        let mut sender = Connection::new(client);
        sender.set_lifecycle(Lifecycle::KeepAlive);
        let mut receiver = Connection::new(server);

        let mut footers = HeaderMap::new();
        footers.insert("x-sum", HeaderValue::from_static("7"));

        let mut response = HttpMessage::response();
        send_chunked(&mut sender, &mut response, ["ab", "", "cdefg"], &footers).await.unwrap();

        let mut parser = crate::codec::Parser::response();
        let mut received = HttpMessage::response();
        crate::connection::receive(&mut receiver, &mut parser, &mut received).await.unwrap();

        assert_eq!(received.content(), b"abcdefg");
        assert_eq!(received.get_header("x-sum"), Some("7"));
        assert_eq!(received.get_header("content-length"), Some("7"));
        assert!(received.is_chunked());
        assert_eq!(receiver.lifecycle(), Lifecycle::KeepAlive);
    }

    #[tokio::test]
    async fn http_10_peer_gets_raw_body() {
        let (client, peer) = duplex(1024);
        let mut connection = Connection::new(client);
        connection.set_lifecycle(Lifecycle::KeepAlive);

        let mut response = HttpMessage::response();
        response.set_version(HttpVersion::HTTP_10);
        send_chunked(&mut connection, &mut response, ["Wiki", "pedia"], &HeaderMap::new()).await.unwrap();
        assert_eq!(connection.lifecycle(), Lifecycle::Close);
        drop(connection);

        assert_eq!(read_all(peer).await, b"HTTP/1.0 200 OK\r\nconnection: close\r\n\r\nWikipedia");
    }

    #[tokio::test]
    async fn aborted_connection_fails_to_send() {
        let (client, _peer) = duplex(1024);
        let mut connection = Connection::new(client);
        connection.set_lifecycle(Lifecycle::KeepAlive);
        connection.abort();

        let mut response = HttpMessage::response();
        let error = send(&mut connection, &mut response, false).await.unwrap_err();
        assert!(matches!(error, HttpError::Send { source: SendError::Io { .. } }));
        assert_eq!(connection.lifecycle(), Lifecycle::Close);
    }
}
