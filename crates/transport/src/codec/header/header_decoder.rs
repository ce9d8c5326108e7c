//! Byte-level decoder for the head of an HTTP message
//!
//! The decoder consumes one byte at a time and keeps every partially assembled token in
//! its own scratch buffers, so a head split at any byte boundary decodes to the same
//! result as one delivered in a single read.
//!
//! # States
//!
//! - request line: `Start` → `MethodToken` → `UriStem` (→ `UriQuery`) → version
//! - status line: `Start` (the `H` of the version) → version → `StatusCodeStart` →
//!   `StatusCode` → `StatusMessage`
//! - version: `H`, `T`, `T`, `P`, `/`, major, `.`, minor
//! - header fields: `HeaderStart`, `FieldName`, `SpaceBeforeValue`, `FieldValue` and the
//!   newline / whitespace states between them
//!
//! Both `CRLF` and a bare `LF` end a line. A request line without a version is accepted
//! and recorded as version 0.0.
//!
//! The same decoder reads the footer block that may follow the last chunk of a chunked
//! body; in that mode it starts directly at `HeaderStart`.

use bytes::Buf;
use http::{HeaderName, HeaderValue, Method};
use tracing::trace;

use crate::codec::parser::{HEADER_NAME_MAX, HEADER_VALUE_MAX, METHOD_MAX, QUERY_MAX, RESOURCE_MAX, STATUS_MESSAGE_MAX};
use crate::ensure;
use crate::protocol::{HttpMessage, HttpVersion, MessageHead, ParseError, RequestLine, StatusLine};
use HeadState::*;

/// Which kind of block this decoder reads.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Block {
    Request,
    Response,
    Footers,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum HeadState {
    Start,
    MethodToken,
    UriStem,
    UriQuery,
    VersionH,
    VersionT1,
    VersionT2,
    VersionP,
    VersionSlash,
    VersionMajorStart,
    VersionMajor,
    VersionMinorStart,
    VersionMinor,
    StatusCodeStart,
    StatusCode,
    StatusMessage,
    HeaderStart,
    HeaderWhitespace,
    FieldName,
    SpaceBeforeValue,
    FieldValue,
    ExpectingNewline,
    ExpectingCr,
    ExpectingFinalNewline,
    ExpectingFinalCr,
}

/// Outcome of feeding a single byte.
enum Feed {
    Consumed,
    /// the block ended on this byte
    Done,
    /// the block ended before this byte, which belongs to whatever follows
    DoneBefore,
}

/// Decoder for a request head, a response head or a block of chunked-body footers.
#[derive(Debug, Clone)]
pub struct HeaderDecoder {
    block: Block,
    state: HeadState,
    method: Vec<u8>,
    resource: Vec<u8>,
    query: Vec<u8>,
    major: u16,
    minor: u16,
    status_code: u16,
    status_message: Vec<u8>,
    name: Vec<u8>,
    value: Vec<u8>,
}

impl HeaderDecoder {
    fn with_block(block: Block, state: HeadState) -> Self {
        Self {
            block,
            state,
            method: Vec::new(),
            resource: Vec::new(),
            query: Vec::new(),
            major: 0,
            minor: 0,
            status_code: 0,
            status_message: Vec::new(),
            name: Vec::new(),
            value: Vec::new(),
        }
    }

    pub fn request() -> Self {
        Self::with_block(Block::Request, Start)
    }

    pub fn response() -> Self {
        Self::with_block(Block::Response, Start)
    }

    /// Reads the header fields that follow the last chunk of a chunked body.
    pub fn footers() -> Self {
        Self::with_block(Block::Footers, HeaderStart)
    }

    fn is_request(&self) -> bool {
        self.block == Block::Request
    }

    /// Consumes bytes from the front of `src` until the block ends or `src` runs out.
    ///
    /// Returns `Ok(true)` once the blank line closing the block has been read; `src` then
    /// starts at the first byte after it. Header fields are added to `message` as soon
    /// as they are complete. On error `src` starts at the offending byte.
    pub fn decode(&mut self, src: &mut &[u8], message: &mut HttpMessage) -> Result<bool, ParseError> {
        while let Some(&byte) = src.first() {
            match self.feed(byte, message)? {
                Feed::Consumed => src.advance(1),
                Feed::Done => {
                    src.advance(1);
                    self.apply_start_line(message)?;
                    return Ok(true);
                }
                Feed::DoneBefore => {
                    self.apply_start_line(message)?;
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn feed(&mut self, byte: u8, message: &mut HttpMessage) -> Result<Feed, ParseError> {
        let state = self.state;
        self.state = match state {
            Start if self.is_request() => {
                ensure!(is_token(byte), ParseError::MethodChar);
                self.method.push(byte);
                MethodToken
            }
            Start => {
                ensure!(byte == b'H', ParseError::VersionChar);
                VersionT1
            }

            MethodToken => match byte {
                b' ' => UriStem,
                b if !is_token(b) => return Err(ParseError::MethodChar),
                b => {
                    ensure!(self.method.len() < METHOD_MAX, ParseError::MethodSize);
                    self.method.push(b);
                    MethodToken
                }
            },

            UriStem => match byte {
                b' ' => VersionH,
                b'?' => UriQuery,
                b'\r' => self.missing_version(ExpectingNewline),
                b'\n' => self.missing_version(ExpectingCr),
                b if is_control(b) => return Err(ParseError::UriChar),
                b => {
                    ensure!(self.resource.len() < RESOURCE_MAX, ParseError::UriSize);
                    self.resource.push(b);
                    UriStem
                }
            },

            UriQuery => match byte {
                b' ' => VersionH,
                b'\r' => self.missing_version(ExpectingNewline),
                b'\n' => self.missing_version(ExpectingCr),
                b if is_control(b) => return Err(ParseError::QueryChar),
                b => {
                    ensure!(self.query.len() < QUERY_MAX, ParseError::QuerySize);
                    self.query.push(b);
                    UriQuery
                }
            },

            VersionH => match byte {
                b'\r' if self.is_request() => self.missing_version(ExpectingNewline),
                b'\n' if self.is_request() => self.missing_version(ExpectingCr),
                b'\r' | b'\n' => return Err(ParseError::VersionEmpty),
                b'H' => VersionT1,
                _ => return Err(ParseError::VersionChar),
            },
            VersionT1 => expect(byte, b'T', VersionT2)?,
            VersionT2 => expect(byte, b'T', VersionP)?,
            VersionP => expect(byte, b'P', VersionSlash)?,
            VersionSlash => expect(byte, b'/', VersionMajorStart)?,

            VersionMajorStart => {
                self.major = digit(byte, ParseError::VersionChar)?;
                VersionMajor
            }
            VersionMajor => match byte {
                b'.' => VersionMinorStart,
                b => {
                    self.major = push_digit(self.major, b, ParseError::VersionChar)?;
                    VersionMajor
                }
            },
            VersionMinorStart => {
                self.minor = digit(byte, ParseError::VersionChar)?;
                VersionMinor
            }
            VersionMinor => match byte {
                b'\r' if self.is_request() => ExpectingNewline,
                b'\n' if self.is_request() => ExpectingCr,
                b' ' if !self.is_request() => StatusCodeStart,
                b => {
                    self.minor = push_digit(self.minor, b, ParseError::VersionChar)?;
                    VersionMinor
                }
            },

            StatusCodeStart => {
                self.status_code = digit(byte, ParseError::StatusEmpty)?;
                StatusCode
            }
            StatusCode => match byte {
                b' ' => StatusMessage,
                b'\r' => ExpectingNewline,
                b'\n' => ExpectingCr,
                b => {
                    self.status_code = push_digit(self.status_code, b, ParseError::StatusChar)?;
                    StatusCode
                }
            },
            StatusMessage => match byte {
                b'\r' => ExpectingNewline,
                b'\n' => ExpectingCr,
                b if is_control(b) && b != b'\t' => return Err(ParseError::StatusChar),
                b => {
                    ensure!(self.status_message.len() < STATUS_MESSAGE_MAX, ParseError::StatusChar);
                    self.status_message.push(b);
                    StatusMessage
                }
            },

            HeaderStart => match byte {
                b' ' | b'\t' => HeaderWhitespace,
                b'\r' => ExpectingFinalNewline,
                b'\n' => ExpectingFinalCr,
                b => self.start_name(b)?,
            },
            HeaderWhitespace => match byte {
                b'\r' => ExpectingNewline,
                b'\n' => ExpectingCr,
                b' ' | b'\t' => HeaderWhitespace,
                b => self.start_name(b)?,
            },
            FieldName => match byte {
                b':' => {
                    self.value.clear();
                    SpaceBeforeValue
                }
                b if !is_token(b) => return Err(ParseError::HeaderChar),
                b => {
                    ensure!(self.name.len() < HEADER_NAME_MAX, ParseError::HeaderNameSize);
                    self.name.push(b);
                    FieldName
                }
            },
            SpaceBeforeValue => match byte {
                b' ' | b'\t' => SpaceBeforeValue,
                b'\r' => {
                    self.add_header(message)?;
                    ExpectingNewline
                }
                b'\n' => {
                    self.add_header(message)?;
                    ExpectingCr
                }
                b if is_control(b) => return Err(ParseError::HeaderChar),
                b => {
                    self.value.push(b);
                    FieldValue
                }
            },
            FieldValue => match byte {
                b'\r' => {
                    self.add_header(message)?;
                    ExpectingNewline
                }
                b'\n' => {
                    self.add_header(message)?;
                    ExpectingCr
                }
                b if is_control(b) && b != b'\t' => return Err(ParseError::HeaderChar),
                b => {
                    ensure!(self.value.len() < HEADER_VALUE_MAX, ParseError::HeaderValueSize);
                    self.value.push(b);
                    FieldValue
                }
            },

            ExpectingNewline => match byte {
                b'\n' => HeaderStart,
                b'\r' => return Ok(Feed::Done),
                b' ' | b'\t' => HeaderWhitespace,
                b => self.start_name(b)?,
            },
            ExpectingCr => match byte {
                b'\r' => HeaderStart,
                b'\n' => return Ok(Feed::Done),
                b' ' | b'\t' => HeaderWhitespace,
                b => self.start_name(b)?,
            },
            ExpectingFinalNewline => {
                return Ok(if byte == b'\n' { Feed::Done } else { Feed::DoneBefore });
            }
            ExpectingFinalCr => {
                return Ok(if byte == b'\r' { Feed::Done } else { Feed::DoneBefore });
            }
        };
        Ok(Feed::Consumed)
    }

    /// HTTP/0.9 style request line: no version follows the target.
    fn missing_version(&mut self, next: HeadState) -> HeadState {
        self.major = 0;
        self.minor = 0;
        next
    }

    fn start_name(&mut self, byte: u8) -> Result<HeadState, ParseError> {
        ensure!(is_token(byte), ParseError::HeaderChar);
        self.name.clear();
        self.name.push(byte);
        Ok(FieldName)
    }

    fn add_header(&mut self, message: &mut HttpMessage) -> Result<(), ParseError> {
        let name = HeaderName::from_bytes(&self.name).map_err(|_| ParseError::HeaderChar)?;
        let end = self.value.iter().rposition(|b| !matches!(b, b' ' | b'\t')).map_or(0, |i| i + 1);
        let value = HeaderValue::from_bytes(&self.value[..end]).map_err(|_| ParseError::HeaderChar)?;
        trace!(header_name = %name, "decoded header field");
        message.add_header(name, value);
        self.name.clear();
        self.value.clear();
        Ok(())
    }

    fn apply_start_line(&mut self, message: &mut HttpMessage) -> Result<(), ParseError> {
        match self.block {
            Block::Request => {
                let method = Method::from_bytes(&self.method).map_err(|_| ParseError::MethodChar)?;
                let mut line = RequestLine::new(method, String::from_utf8_lossy(&self.resource));
                line.set_query_string(String::from_utf8_lossy(&self.query));
                message.set_head(MessageHead::Request(line));
            }
            Block::Response => {
                let head_request = message.status_line().is_some_and(StatusLine::is_head_request);
                let mut line = StatusLine::default();
                line.set_status_code(self.status_code);
                line.set_status_message(String::from_utf8_lossy(&self.status_message));
                line.set_head_request(head_request);
                message.set_head(MessageHead::Response(line));
            }
            Block::Footers => return Ok(()),
        }
        message.set_version(HttpVersion::new(self.major, self.minor));
        Ok(())
    }
}

fn expect(byte: u8, expected: u8, next: HeadState) -> Result<HeadState, ParseError> {
    ensure!(byte == expected, ParseError::VersionChar);
    Ok(next)
}

fn digit(byte: u8, error: ParseError) -> Result<u16, ParseError> {
    ensure!(byte.is_ascii_digit(), error);
    Ok(u16::from(byte - b'0'))
}

fn push_digit(acc: u16, byte: u8, error: ParseError) -> Result<u16, ParseError> {
    let d = digit(byte, error.clone())?;
    acc.checked_mul(10).and_then(|v| v.checked_add(d)).ok_or(error)
}

#[inline]
fn is_control(b: u8) -> bool {
    b <= 31 || b == 127
}

#[inline]
fn is_special(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"' | b'/' | b'[' | b']' | b'?' | b'=' | b'{'
            | b'}' | b' ' | b'\t'
    )
}

/// Characters allowed in methods and header names.
#[inline]
fn is_token(b: u8) -> bool {
    b.is_ascii() && !is_control(b) && !is_special(b)
}
