//! HTTP head encoder for serializing the start line and header fields of a message
//!
//! The encoder writes the request or status line followed by every header field and the
//! blank line closing the block. Framing headers are not touched here; they are set by
//! [`HttpMessage::prepare_headers_for_send`] before the message is encoded.

use crate::protocol::{HttpMessage, MessageHead, SendError};

use bytes::{BufMut, BytesMut};

use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for the head of an [`HttpMessage`] implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<&HttpMessage> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the start line and header fields into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if the request resource or query string contains a space or a control
    /// character, or the response reason phrase contains a line break. Either would
    /// corrupt the start line and the framing of everything that follows.
    fn encode(&mut self, message: &HttpMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        match message.head() {
            MessageHead::Request(line) => {
                if !is_valid_target(line.resource()) || !is_valid_target(line.query_string()) {
                    return Err(SendError::invalid_message("request target contains a space or control character"));
                }
                write!(FastWrite(dst), "{} {}", line.method(), line.resource())?;
                if !line.query_string().is_empty() {
                    write!(FastWrite(dst), "?{}", line.query_string())?;
                }
                write!(FastWrite(dst), " {}\r\n", message.version())?;
            }
            MessageHead::Response(line) => {
                if line.status_message().contains(['\r', '\n']) {
                    return Err(SendError::invalid_message("status message contains a line break"));
                }
                write!(FastWrite(dst), "{} {} {}\r\n", message.version(), line.status_code(), line.status_message())?;
            }
        }

        // Write all headers
        for (header_name, header_value) in message.headers() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

fn is_valid_target(target: &str) -> bool {
    !target.bytes().any(|b| b == b' ' || b.is_ascii_control())
}

/// Fast writer implementation for writing to BytesMut.
///
/// This is an optimization to avoid unnecessary bounds checking when writing
/// to the bytes buffer, since we've already reserved enough space.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
