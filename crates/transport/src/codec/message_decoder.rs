//! [`Parser`] driven through the [`Decoder`] trait
//!
//! Each call feeds whatever is buffered to the parser and advances the buffer by the bytes
//! the parser consumed, so bytes of a pipelined message stay in the buffer for the next
//! call. A complete message is swapped out for a fresh one and the parser is reset.
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use micro_transport::codec::MessageDecoder;
//! use tokio::net::TcpStream;
//! use tokio_util::codec::FramedRead;
//!
//! # async fn read() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = TcpStream::connect("127.0.0.1:8080").await?;
//! let mut responses = FramedRead::new(stream, MessageDecoder::response());
//! while let Some(response) = responses.next().await {
//!     let response = response?;
//!     tracing::info!(first_line = %response.first_line(), "received response");
//! }
//! # Ok(())
//! # }
//! ```

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::parser::{Parser, ParserConfig, Status};
use crate::protocol::{HttpError, HttpMessage};

/// Decoder producing complete [`HttpMessage`]s.
#[derive(Debug)]
pub struct MessageDecoder {
    parser: Parser,
    message: HttpMessage,
}

impl MessageDecoder {
    pub fn new(config: ParserConfig) -> Self {
        let message = if config.is_request() { HttpMessage::request() } else { HttpMessage::response() };
        Self { parser: Parser::new(config), message }
    }

    pub fn request() -> Self {
        Self::new(ParserConfig::request())
    }

    pub fn response() -> Self {
        Self::new(ParserConfig::response())
    }

    /// The parser of the message currently being decoded.
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    fn take_message(&mut self) -> HttpMessage {
        let next = if self.message.is_request() { HttpMessage::request() } else { HttpMessage::response() };
        self.parser.reset();
        std::mem::replace(&mut self.message, next)
    }
}

impl Decoder for MessageDecoder {
    type Item = HttpMessage;
    type Error = HttpError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let status = self.parser.parse(&mut self.message, &src[..])?;
        src.advance(self.parser.bytes_last_read());

        match status {
            Status::Partial => Ok(None),
            Status::Complete => {
                trace!(total_bytes = self.parser.total_bytes_read(), "decoded message");
                Ok(Some(self.take_message()))
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }

        // the stream ended between two messages
        if self.parser.total_bytes_read() == 0 {
            return Ok(None);
        }

        match self.parser.check_premature_eof(&mut self.message) {
            Ok(()) => Ok(Some(self.take_message())),
            Err(e) => Err(HttpError::premature_eof(self.parser.total_bytes_read(), e)),
        }
    }
}
