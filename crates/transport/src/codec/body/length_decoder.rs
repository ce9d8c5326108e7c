//! Decoder implementation for HTTP messages with Content-Length header.
//!
//! This module provides functionality to decode HTTP messages where the payload size
//! is specified by the Content-Length header, as defined in
//! [RFC 7230 Section 3.3.2](https://tools.ietf.org/html/rfc7230#section-3.3.2).

use std::cmp;

use crate::protocol::{HttpMessage, ParseError};

/// A decoder for handling HTTP messages with a known content length.
///
/// The decoder tracks the remaining bytes to be read. Every byte of the payload is
/// consumed from the wire, but only the first `limit` bytes are stored in the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// The number of bytes remaining to be read from the payload
    length: u64,
}

impl LengthDecoder {
    /// Creates a new LengthDecoder instance.
    ///
    /// # Arguments
    /// * `length` - The total content length to decode, specified by Content-Length header
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    pub fn remaining(&self) -> u64 {
        self.length
    }

    /// Consumes payload bytes from the front of `src`.
    ///
    /// Returns `Ok(true)` once the whole declared length has been read.
    pub fn decode(&mut self, src: &mut &[u8], message: &mut HttpMessage, limit: usize) -> Result<bool, ParseError> {
        if self.length == 0 {
            return Ok(true);
        }

        if src.is_empty() {
            return Ok(false);
        }

        // Read the minimum of remaining length and available bytes
        let len = usize::try_from(cmp::min(self.length, src.len() as u64)).unwrap_or(src.len());
        let (bytes, rest) = src.split_at(len);
        *src = rest;
        self.length -= len as u64;

        let room = limit.saturating_sub(message.content_length());
        message.content_mut().extend_from_slice(&bytes[..cmp::min(room, len)]);

        Ok(self.length == 0)
    }
}
