//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! This module provides functionality to decode HTTP messages that use chunked transfer encoding
//! as specified in [RFC 7230 Section 4.1](https://tools.ietf.org/html/rfc7230#section-4.1).
//!
//! Chunk payloads are collected in the message's chunk accumulator. When the last chunk
//! is seen the accumulator becomes the body, and any footer fields that follow are merged
//! into the message headers.

use crate::codec::header::HeaderDecoder;
use crate::protocol::{HttpMessage, ParseError};
use bytes::Buf;
use std::task::Poll;
use tracing::trace;
use ChunkedState::*;

/// A decoder for handling HTTP chunked transfer encoding.
///
/// The decoder processes incoming bytes according to the chunked format:
/// - Each chunk starts with its size in hexadecimal
/// - Followed by optional extensions and CRLF
/// - Then the chunk data and CRLF
/// - A zero-sized chunk, optional footer fields and a final CRLF end the body
#[derive(Debug, Clone)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    remaining_size: u64,
    footers: Option<HeaderDecoder>,
}

impl ChunkedDecoder {
    /// Creates a new ChunkedDecoder instance.
    ///
    /// The decoder starts in the Size state, ready to read the size of the first chunk.
    pub fn new() -> Self {
        Self { state: Size, remaining_size: 0, footers: None }
    }

    /// Whether the zero-sized chunk has been read and the body finalized.
    pub fn is_body_complete(&self) -> bool {
        matches!(self.state, EndCrOrTrailer | EndLf | Trailer | End)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read the chunk size in hex
    Size,
    /// Handle whitespace after size
    SizeLws,
    /// Skip chunk extensions
    Extension,
    /// Read LF after chunk size
    SizeLf,
    /// Read chunk data
    Body,
    /// Read CR after chunk data
    BodyCr,
    /// Read LF after chunk data
    BodyLf,
    /// After the last chunk: the final CR, or the first byte of a footer field
    EndCrOrTrailer,
    /// Read final LF
    EndLf,
    /// Read footer fields
    Trailer,
    /// Final state after reading last chunk
    End,
}

impl ChunkedDecoder {
    /// Decodes chunked transfer encoded data from the front of `src`.
    ///
    /// Chunk payloads beyond `limit` bytes are consumed but not stored.
    ///
    /// # Returns
    /// - `Ok(true)` once the body and its footers have been read
    /// - `Ok(false)` when more data is needed
    /// - `Err(ParseError)` if the chunked encoding is invalid
    pub fn decode(&mut self, src: &mut &[u8], message: &mut HttpMessage, limit: usize) -> Result<bool, ParseError> {
        loop {
            if self.state == End {
                trace!("finished reading chunked data");
                return Ok(true);
            }

            if src.is_empty() {
                // need more data
                return Ok(false);
            }

            if self.state == Trailer {
                let footers = self.footers.get_or_insert_with(HeaderDecoder::footers);
                if !footers.decode(src, message)? {
                    return Ok(false);
                }
                self.state = End;
                continue;
            }

            let mut buf = None;

            self.state = match self.state.step(src, &mut self.remaining_size, &mut buf) {
                Poll::Pending => return Ok(false),
                Poll::Ready(Ok(new_state)) => new_state,
                Poll::Ready(Err(e)) => return Err(e),
            };

            if let Some(bytes) = buf {
                let room = limit.saturating_sub(message.chunk_cache().len());
                trace!(len = bytes.len(), stored = room.min(bytes.len()), "read chunked bytes");
                message.append_content_chunk(&bytes[..room.min(bytes.len())]);
            }

            if self.state == EndCrOrTrailer {
                message.finalize_chunked_content();
            }
        }
    }

    /// Turns whatever chunks arrived so far into the body of a truncated message.
    pub fn finish(&mut self, message: &mut HttpMessage) {
        if !self.is_body_complete() {
            message.finalize_chunked_content();
        }
    }
}

macro_rules! try_next_byte {
    ($src:ident) => {{
        if $src.len() > 0 {
            $src.get_u8()
        } else {
            return Poll::Pending;
        }
    }};
}

impl ChunkedState {
    /// Processes the next step in the chunked decoding state machine.
    ///
    /// # Arguments
    /// * `src` - Source bytes containing the chunked data
    /// * `remaining_size` - Tracks remaining bytes in current chunk
    /// * `buf` - Receives the chunk data read in this step
    fn step<'a>(
        &self,
        src: &mut &'a [u8],
        remaining_size: &mut u64,
        buf: &mut Option<&'a [u8]>,
    ) -> Poll<Result<ChunkedState, ParseError>> {
        match self {
            Size => ChunkedState::read_size(src, remaining_size),
            SizeLws => ChunkedState::read_size_lws(src),
            Extension => ChunkedState::read_extension(src),
            SizeLf => ChunkedState::read_size_lf(src, *remaining_size),
            Body => ChunkedState::read_body(src, remaining_size, buf),
            BodyCr => ChunkedState::read_body_cr(src),
            BodyLf => ChunkedState::read_body_lf(src),
            EndCrOrTrailer => ChunkedState::read_end_cr_or_trailer(src),
            EndLf => ChunkedState::read_end_lf(src),
            Trailer => Poll::Ready(Ok(Trailer)),
            End => Poll::Ready(Ok(End)),
        }
    }

    /// Reads and parses the chunk size in hexadecimal format.
    ///
    /// # State Transitions
    /// - On hex digit (0-9, a-f, A-F): Stay in Size state to read more digits
    /// - On whitespace (tab/space): Transition to SizeLws state
    /// - On semicolon: Transition to Extension state to handle chunk extensions
    /// - On CR: Transition to SizeLf state to finish size line
    /// - On invalid character: Return error
    fn read_size(src: &mut &[u8], size_per_chunk: &mut u64) -> Poll<Result<ChunkedState, ParseError>> {
        macro_rules! or_overflow {
            ($e:expr) => {
                match $e {
                    Some(val) => val,
                    None => return Poll::Ready(Err(ParseError::ChunkSizeOverflow)),
                }
            };
        }

        let radix = 16;
        let digit = match try_next_byte!(src) {
            b @ b'0'..=b'9' => b - b'0',
            b @ b'a'..=b'f' => b + 10 - b'a',
            b @ b'A'..=b'F' => b + 10 - b'A',
            b'\t' | b' ' => return Poll::Ready(Ok(SizeLws)),
            b';' => return Poll::Ready(Ok(Extension)),
            b'\r' => return Poll::Ready(Ok(SizeLf)),
            _ => return Poll::Ready(Err(ParseError::ChunkChar)),
        };

        *size_per_chunk = or_overflow!(size_per_chunk.checked_mul(radix));
        *size_per_chunk = or_overflow!(size_per_chunk.checked_add(u64::from(digit)));
        Poll::Ready(Ok(Size))
    }

    /// Processes linear whitespace (LWS) after the chunk size.
    ///
    /// State transitions:
    /// - On tab/space: Stay in SizeLws state to handle more whitespace
    /// - On semicolon: Move to Extension state to process chunk extensions
    /// - On CR: Move to SizeLf state to finish size line
    /// - On invalid char: Return error
    fn read_size_lws(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            // LWS can follow the chunk size, but no more digits can come
            b'\t' | b' ' => Poll::Ready(Ok(SizeLws)),
            b';' => Poll::Ready(Ok(Extension)),
            b'\r' => Poll::Ready(Ok(SizeLf)),
            _ => Poll::Ready(Err(ParseError::ChunkChar)),
        }
    }

    /// Skips chunk extensions; they are never counted toward the body.
    ///
    /// # State Transitions
    /// - On CR: Move to SizeLf state to finish extension line
    /// - On LF: Return error as extensions must end with CRLF
    /// - On any other byte: Stay in Extension state
    fn read_extension(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(SizeLf)),
            b'\n' => Poll::Ready(Err(ParseError::ChunkChar)),
            _ => Poll::Ready(Ok(Extension)),
        }
    }

    /// Validates the LF byte after the chunk size line.
    ///
    /// # State Transitions
    /// - On LF with size 0: the body is complete, move to EndCrOrTrailer
    /// - On LF with size > 0: Move to Body state to read chunk data
    /// - On any other byte: Return error
    fn read_size_lf(src: &mut &[u8], size_per_chunk: u64) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' if size_per_chunk == 0 => Poll::Ready(Ok(EndCrOrTrailer)),
            b'\n' => Poll::Ready(Ok(Body)),
            _ => Poll::Ready(Err(ParseError::ChunkChar)),
        }
    }

    /// Reads the actual chunk data bytes.
    ///
    /// # State Transitions
    /// - After reading data with remaining size > 0: Stay in Body state
    /// - After reading data with remaining size = 0: Move to BodyCr state
    fn read_body<'a>(
        src: &mut &'a [u8],
        size_per_chunk: &mut u64,
        buf: &mut Option<&'a [u8]>,
    ) -> Poll<Result<ChunkedState, ParseError>> {
        if src.is_empty() {
            return Poll::Ready(Ok(Body));
        }

        if *size_per_chunk == 0 {
            return Poll::Ready(Ok(BodyCr));
        }

        // cap remaining bytes at the max capacity of usize
        let remaining = usize::try_from(*size_per_chunk).unwrap_or(usize::MAX);
        let read_size = std::cmp::min(remaining, src.len());

        *size_per_chunk -= read_size as u64;
        let (bytes, rest) = src.split_at(read_size);
        *buf = Some(bytes);
        *src = rest;

        if *size_per_chunk > 0 { Poll::Ready(Ok(Body)) } else { Poll::Ready(Ok(BodyCr)) }
    }

    /// Validates the CR byte after chunk data.
    fn read_body_cr(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(BodyLf)),
            _ => Poll::Ready(Err(ParseError::ChunkChar)),
        }
    }

    /// Validates the LF byte after chunk data, then goes back to the next chunk size.
    fn read_body_lf(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(Size)),
            _ => Poll::Ready(Err(ParseError::ChunkChar)),
        }
    }

    /// Looks at the byte following the last chunk without consuming a footer byte.
    ///
    /// # State Transitions
    /// - On CR: Move to EndLf state
    /// - On any other byte: leave it in place and read footer fields
    fn read_end_cr_or_trailer(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match src.first() {
            None => Poll::Pending,
            Some(b'\r') => {
                src.advance(1);
                Poll::Ready(Ok(EndLf))
            }
            Some(_) => Poll::Ready(Ok(Trailer)),
        }
    }

    /// Validates the final LF byte of the chunked message.
    fn read_end_lf(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(End)),
            _ => Poll::Ready(Err(ParseError::ChunkChar)),
        }
    }
}
