//! Blocking read and write of single messages over `std::io` streams.
//!
//! There is no connection lifecycle here: a message is read until it is complete or the
//! stream ends, and written with `Connection: Keep-Alive` and an explicit
//! `Content-Length`.

use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;
use tracing::debug;

use crate::codec::message_encoder::encode_head;
use crate::codec::parser::{Parser, Status};
use crate::protocol::{HttpError, HttpMessage, SendError};

/// Reads one message from `source` into `message`.
///
/// The stream is read one byte at a time so nothing past the end of the message is
/// taken from it. When the stream ends first, a body delimited by the end of the stream
/// completes the message; anything else is a premature EOF. A read error is handled the
/// same way, except that the I/O error is returned when the message is incomplete.
///
/// Returns the number of bytes consumed.
pub fn read_message<R: Read>(source: &mut R, parser: &mut Parser, message: &mut HttpMessage) -> Result<u64, HttpError> {
    message.clear();
    parser.reset();

    let mut byte = [0u8; 1];
    loop {
        match source.read(&mut byte) {
            Ok(0) => {
                return match parser.check_premature_eof(message) {
                    Ok(()) => Ok(parser.total_bytes_read()),
                    Err(e) => {
                        debug!(total_bytes = parser.total_bytes_read(), cause = %e, "stream ended inside a message");
                        Err(HttpError::premature_eof(parser.total_bytes_read(), e))
                    }
                };
            }
            Ok(_) => {
                if parser.parse(message, &byte)? == Status::Complete {
                    return Ok(parser.total_bytes_read());
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                // a failed stream still ends a body delimited by the end of the stream
                return match parser.check_premature_eof(message) {
                    Ok(()) => Ok(parser.total_bytes_read()),
                    Err(_) => {
                        debug!(total_bytes = parser.total_bytes_read(), cause = %e, "stream failed inside a message");
                        Err(e.into())
                    }
                };
            }
        }
    }
}

/// Writes `message` to `sink`, without its body when `headers_only` is set.
pub fn write_message<W: Write>(sink: &mut W, message: &mut HttpMessage, headers_only: bool) -> Result<(), SendError> {
    let mut buffer = BytesMut::new();
    encode_head(message, true, &mut buffer)?;

    sink.write_all(&buffer)?;
    if !headers_only {
        sink.write_all(message.content())?;
    }
    sink.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parser::ParserConfig;
    use crate::protocol::ParseError;
    use http::StatusCode;
    use std::io::Cursor;

    #[test]
    fn read_stops_at_message_end() {
        let mut source = Cursor::new(&b"POST /a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcGET /b HTTP/1.1\r\n\r\n"[..]);
        let mut parser = Parser::request();
        let mut message = HttpMessage::request();

        let read = read_message(&mut source, &mut parser, &mut message).unwrap();
        assert_eq!(read, 42);
        assert_eq!(source.position(), 42);
        assert_eq!(message.content(), b"abc");

        read_message(&mut source, &mut parser, &mut message).unwrap();
        assert_eq!(message.request_line().unwrap().resource(), "/b");
        assert!(message.content().is_empty());
    }

    #[test]
    fn read_until_eof_body() {
        let mut source = Cursor::new(&b"HTTP/1.1 200 OK\r\n\r\nall of it"[..]);
        let mut parser = Parser::response();
        let mut message = HttpMessage::response();

        read_message(&mut source, &mut parser, &mut message).unwrap();
        assert_eq!(message.content(), b"all of it");
    }

    /// Yields its bytes, then fails every read.
    struct FailingReader<'a> {
        data: &'a [u8],
    }

    impl Read for FailingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.data.is_empty() {
                return Err(ErrorKind::ConnectionReset.into());
            }
            let n = buf.len().min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn read_error_ends_until_eof_body() {
        let mut source = FailingReader { data: b"HTTP/1.1 200 OK\r\n\r\npartial" };
        let mut parser = Parser::response();
        let mut message = HttpMessage::response();

        let read = read_message(&mut source, &mut parser, &mut message).unwrap();
        assert_eq!(read, 26);
        assert_eq!(message.content(), b"partial");
    }

    #[test]
    fn read_error_inside_message() {
        let mut source = FailingReader { data: b"HTTP/1.1 200 OK\r\nContent-Length: 9\r\n\r\npartial" };
        let mut parser = Parser::response();
        let mut message = HttpMessage::response();

        let error = read_message(&mut source, &mut parser, &mut message).unwrap_err();
        assert!(matches!(&error, HttpError::Io { source } if source.kind() == ErrorKind::ConnectionReset));
        assert_eq!(message.content(), b"partial");
    }

    #[test]
    fn read_premature_eof() {
        let mut source = Cursor::new(&b"HTTP/1.1 200 OK\r\nContent-Le"[..]);
        let mut parser = Parser::new(ParserConfig::response());
        let mut message = HttpMessage::response();

        let error = read_message(&mut source, &mut parser, &mut message).unwrap_err();
        assert_eq!(error.parse_error(), Some(&ParseError::MissingHeaderData));
        assert!(matches!(error, HttpError::PrematureEof { bytes_read: 27, .. }));
    }

    #[test]
    fn write_sends_keep_alive() {
        let mut message = HttpMessage::response();
        message.set_status(StatusCode::CREATED);
        message.set_content("done");

        let mut sink = Vec::new();
        write_message(&mut sink, &mut message, false).unwrap();
        assert_eq!(sink, b"HTTP/1.1 201 Created\r\nconnection: Keep-Alive\r\ncontent-length: 4\r\n\r\ndone");

        let mut sink = Vec::new();
        write_message(&mut sink, &mut message, true).unwrap();
        assert_eq!(sink, b"HTTP/1.1 201 Created\r\nconnection: Keep-Alive\r\ncontent-length: 4\r\n\r\n");
    }

    #[test]
    fn write_then_read() {
        let mut request = HttpMessage::request();
        request.add_header(http::header::HOST, http::HeaderValue::from_static("example.com"));
        request.set_content("ping");

        let mut wire = Vec::new();
        write_message(&mut wire, &mut request, false).unwrap();

        let mut parser = Parser::request();
        let mut received = HttpMessage::request();
        read_message(&mut Cursor::new(wire), &mut parser, &mut received).unwrap();
        assert_eq!(received.content(), b"ping");
        assert_eq!(received.get_header("Host"), Some("example.com"));
        assert!(received.check_keep_alive());
    }
}
