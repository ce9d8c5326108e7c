//! Decoder implementation for HTTP message payloads.
//!
//! This module provides a unified decoder for handling different types of HTTP message bodies:
//! - Content-Length based payloads
//! - Chunked transfer encoding
//! - Responses delimited by the peer closing the connection
//! - Messages with no body

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::protocol::{HttpMessage, ParseError, PayloadSize};

/// A unified decoder for handling HTTP message payloads.
#[derive(Debug, Clone)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

/// Enum representing different payload decoding strategies.
#[derive(Debug, Clone)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Decode payload using chunked transfer encoding
    Chunked(ChunkedDecoder),

    /// Store everything until the connection closes
    UntilEof,

    /// Handle messages with no body
    NoBody,
}

impl PayloadDecoder {
    /// Creates a PayloadDecoder for messages with no body.
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    /// Creates a PayloadDecoder for chunked transfer encoding.
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    /// Creates a PayloadDecoder for a fixed-length payload.
    ///
    /// # Arguments
    /// * `size` - The expected content length in bytes
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Creates a PayloadDecoder for a body that ends when the connection closes.
    pub fn until_eof() -> Self {
        Self { kind: Kind::UntilEof }
    }

    /// The framing this decoder reads.
    pub fn payload_size(&self) -> PayloadSize {
        match &self.kind {
            Kind::Length(length_decoder) => PayloadSize::Length(length_decoder.remaining()),
            Kind::Chunked(_) => PayloadSize::Chunked,
            Kind::UntilEof => PayloadSize::UntilEof,
            Kind::NoBody => PayloadSize::Empty,
        }
    }

    /// Returns whether only the end of the stream terminates this payload.
    pub fn is_until_eof(&self) -> bool {
        matches!(self.kind, Kind::UntilEof)
    }

    /// Consumes payload bytes from the front of `src`, storing at most `limit` bytes of body.
    ///
    /// Returns `Ok(true)` once the payload boundary has been reached.
    pub fn decode(&mut self, src: &mut &[u8], message: &mut HttpMessage, limit: usize) -> Result<bool, ParseError> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src, message, limit),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src, message, limit),
            Kind::UntilEof => {
                let room = limit.saturating_sub(message.content_length());
                message.content_mut().extend_from_slice(&src[..room.min(src.len())]);
                *src = &src[src.len()..];
                Ok(false)
            }
            Kind::NoBody => Ok(true),
        }
    }

    /// Handles the end of the stream while this payload is still being read.
    ///
    /// Keeps whatever body arrived and returns the premature-EOF error for framings that
    /// have their own terminator.
    pub fn finish_at_eof(&mut self, message: &mut HttpMessage) -> Result<(), ParseError> {
        match &mut self.kind {
            Kind::Length(_) => Err(ParseError::MissingContentData),
            Kind::Chunked(chunked_decoder) => {
                chunked_decoder.finish(message);
                Err(ParseError::MissingChunkData)
            }
            Kind::UntilEof | Kind::NoBody => Ok(()),
        }
    }
}
