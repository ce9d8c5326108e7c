use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::codec::{Parser, Status};
use crate::connection::{Connection, Lifecycle};
use crate::protocol::{HttpError, HttpMessage};

/// Receives one message from `connection` into `message`.
///
/// When the connection is [`Lifecycle::Pipelined`] the bookmarked bytes are parsed
/// before anything is read. Once the message is complete the lifecycle is decided:
///
/// - the message asks for the connection to close, or its body ran to the end of the
///   stream: [`Lifecycle::Close`]; in header-only mode the unread bytes are still
///   bookmarked so the caller can read the body
/// - bytes of the next message are already buffered: [`Lifecycle::Pipelined`], with
///   those bytes bookmarked
/// - otherwise [`Lifecycle::KeepAlive`]
///
/// Any error sets [`Lifecycle::Close`]; the parser's counters still tell how much was
/// read. Returns the number of bytes consumed for this message.
pub async fn receive<S>(connection: &mut Connection<S>, parser: &mut Parser, message: &mut HttpMessage) -> Result<u64, HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    message.clear();
    parser.reset();

    let result = receive_message(connection, parser, message).await;
    if let Err(e) = &result {
        warn!(cause = %e, total_bytes = parser.total_bytes_read(), "failed to receive message");
        connection.set_lifecycle(Lifecycle::Close);
    }
    result
}

async fn receive_message<S>(
    connection: &mut Connection<S>,
    parser: &mut Parser,
    message: &mut HttpMessage,
) -> Result<u64, HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // offset of the last parsed view inside the read buffer
    let mut view_start = 0;

    let mut status = if connection.lifecycle() == Lifecycle::Pipelined {
        let (start, _end) = connection.load_bookmark();
        view_start = start;
        debug!(bookmark = ?connection.load_bookmark(), "parse pipelined bytes");
        parser.parse(message, connection.bookmarked())?
    } else {
        Status::Partial
    };

    while status == Status::Partial {
        let n = match connection.read_some().await {
            Ok(0) => return finish_at_eof(connection, parser, message),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::ConnectionAborted => return Err(e.into()),
            Err(e) => {
                return match finish_at_eof(connection, parser, message) {
                    Ok(total) => Ok(total),
                    Err(_) => Err(e.into()),
                };
            }
        };
        view_start = 0;
        status = parser.parse(message, &connection.read_buffer()[..n])?;
    }

    let position = parser.read_position();
    let unread_start = view_start + position.consumed;
    let unread_end = unread_start + position.remaining;

    let keep_alive = message.check_keep_alive() && !parser.is_until_eof();
    let lifecycle = if !keep_alive {
        if parser.headers_only() {
            connection.save_bookmark(unread_start, unread_end);
        }
        Lifecycle::Close
    } else if parser.eof() {
        Lifecycle::KeepAlive
    } else {
        connection.save_bookmark(unread_start, unread_end);
        Lifecycle::Pipelined
    };

    debug!(
        first_line = %message.first_line(),
        total_bytes = parser.total_bytes_read(),
        content_bytes = parser.content_bytes_read(),
        ?lifecycle,
        "received message"
    );
    connection.set_lifecycle(lifecycle);
    Ok(parser.total_bytes_read())
}

/// The stream ended: only a body running to the end of the stream completes here.
fn finish_at_eof<S>(connection: &mut Connection<S>, parser: &mut Parser, message: &mut HttpMessage) -> Result<u64, HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match parser.check_premature_eof(message) {
        Ok(()) => {
            debug!(total_bytes = parser.total_bytes_read(), "message ended with the stream");
            connection.set_lifecycle(Lifecycle::Close);
            Ok(parser.total_bytes_read())
        }
        Err(e) => Err(HttpError::premature_eof(parser.total_bytes_read(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ParserConfig;
    use crate::protocol::ParseError;
    use tokio::io::{AsyncWriteExt, duplex};

    #[tokio::test]
    async fn keep_alive_request() {
        let (client, mut peer) = duplex(1024);
        let mut connection = Connection::new(client);
        peer.write_all(b"GET /status HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();

        let mut parser = Parser::request();
        let mut request = HttpMessage::request();
        let total = receive(&mut connection, &mut parser, &mut request).await.unwrap();

        assert_eq!(total, 41);
        assert_eq!(connection.lifecycle(), Lifecycle::KeepAlive);
        assert_eq!(request.request_line().unwrap().resource(), "/status");
    }

    #[tokio::test]
    async fn connection_close_and_http_10() {
        let (client, mut peer) = duplex(1024);
        let mut connection = Connection::new(client);
        let mut parser = Parser::request();
        let mut request = HttpMessage::request();

        peer.write_all(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n").await.unwrap();
        receive(&mut connection, &mut parser, &mut request).await.unwrap();
        assert_eq!(connection.lifecycle(), Lifecycle::Close);

        peer.write_all(b"GET / HTTP/1.0\r\n\r\n").await.unwrap();
        receive(&mut connection, &mut parser, &mut request).await.unwrap();
        assert_eq!(connection.lifecycle(), Lifecycle::Close);

        peer.write_all(b"GET / HTTP/1.0\r\nConnection: Keep-Alive\r\n\r\n").await.unwrap();
        receive(&mut connection, &mut parser, &mut request).await.unwrap();
        assert_eq!(connection.lifecycle(), Lifecycle::KeepAlive);
    }

    #[tokio::test]
    async fn message_split_across_reads() {
        let (client, mut peer) = duplex(1024);
        let mut connection = Connection::new(client);

        tokio::spawn(async move {
            for piece in ["HTTP/1.1 200 OK\r\nContent-", "Length: 5\r\n\r\nhel", "lo"] {
                peer.write_all(piece.as_bytes()).await.unwrap();
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        });

        let mut parser = Parser::response();
        let mut response = HttpMessage::response();
        receive(&mut connection, &mut parser, &mut response).await.unwrap();
        assert_eq!(response.content(), b"hello");
        assert_eq!(parser.content_bytes_read(), 5);
    }

    #[tokio::test]
    async fn headers_only_close_bookmarks_the_body() {
        let (client, mut peer) = duplex(1024);
        let mut connection = Connection::new(client);
        peer.write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Length: 4\r\n\r\nbody").await.unwrap();

        let mut parser = Parser::new(ParserConfig::response().headers_only(true));
        let mut response = HttpMessage::response();
        receive(&mut connection, &mut parser, &mut response).await.unwrap();

        assert_eq!(connection.lifecycle(), Lifecycle::Close);
        assert_eq!(connection.bookmarked(), b"body");
        assert!(response.content().is_empty());
    }

    #[tokio::test]
    async fn premature_eof_closes() {
        let (client, mut peer) = duplex(1024);
        let mut connection = Connection::new(client);
        connection.set_lifecycle(Lifecycle::KeepAlive);
        peer.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nshort").await.unwrap();
        drop(peer);

        let mut parser = Parser::response();
        let mut response = HttpMessage::response();
        let error = receive(&mut connection, &mut parser, &mut response).await.unwrap_err();

        assert_eq!(error.parse_error(), Some(&ParseError::MissingContentData));
        assert_eq!(connection.lifecycle(), Lifecycle::Close);
        assert_eq!(parser.content_bytes_read(), 5);
        assert_eq!(response.content(), b"short");
    }

    #[tokio::test]
    async fn parse_error_closes() {
        let (client, mut peer) = duplex(1024);
        let mut connection = Connection::new(client);
        peer.write_all(b"GET / HTTP/1.1\r\nBad Header\r\n\r\n").await.unwrap();

        let mut parser = Parser::request();
        let mut request = HttpMessage::request();
        let error = receive(&mut connection, &mut parser, &mut request).await.unwrap_err();

        assert!(matches!(error, HttpError::Parse { source: ParseError::HeaderChar }));
        assert_eq!(connection.lifecycle(), Lifecycle::Close);
    }
}
