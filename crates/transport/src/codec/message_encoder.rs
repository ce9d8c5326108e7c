//! Serializer for complete [`HttpMessage`]s
//!
//! The framing headers are rewritten right before the head is encoded: `Connection` from
//! the keep-alive decision and `Content-Length` from the body unless the message opted
//! out. In header-only mode the body is never written, whatever length was declared.

use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::header::HeaderEncoder;
use crate::protocol::{HttpMessage, SendError};

/// Encoder writing a message as head followed by its whole body.
#[derive(Debug, Clone, Copy)]
pub struct MessageEncoder {
    keep_alive: bool,
    headers_only: bool,
}

impl MessageEncoder {
    pub fn new(keep_alive: bool) -> Self {
        Self { keep_alive, headers_only: false }
    }

    #[must_use]
    pub fn headers_only(mut self, headers_only: bool) -> Self {
        self.headers_only = headers_only;
        self
    }
}

impl Default for MessageEncoder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Encoder<HttpMessage> for MessageEncoder {
    type Error = SendError;

    fn encode(&mut self, mut message: HttpMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_head(&mut message, self.keep_alive, dst)?;
        if !self.headers_only {
            dst.extend_from_slice(message.content());
        }
        Ok(())
    }
}

/// Prepares the framing headers of `message` and encodes its head into `dst`.
pub(crate) fn encode_head(message: &mut HttpMessage, keep_alive: bool, dst: &mut BytesMut) -> Result<(), SendError> {
    message.prepare_headers_for_send(keep_alive, false);
    HeaderEncoder.encode(&*message, dst)?;
    trace!(first_line = %message.first_line(), head_bytes = dst.len(), "encoded message head");
    Ok(())
}
