//! Incremental HTTP/1.x message parser
//!
//! [`Parser`] consumes bytes from a borrowed view of a read buffer and builds an
//! [`HttpMessage`] in place. It never keeps the view: every partially assembled token lives
//! in the parser's own scratch storage, so the next call may hand it a different buffer
//! and parsing resumes exactly where it stopped.
//!
//! # Phases
//!
//! 1. Head: request line or status line plus header fields, see [`HeaderDecoder`]
//! 2. Body: chosen from the framing headers once the head is complete
//!    - `Transfer-Encoding: chunked`: chunks, then footers merged into the headers
//!    - `Content-Length`: exactly that many bytes
//!    - a response with neither: everything until the peer closes the stream
//!    - bodiless messages: nothing
//! 3. End: query string, cookies and form fields are decoded into the message
//!
//! An error moves the parser into a failed state it never leaves.
//!
//! # Example
//!
//! ```
//! use micro_transport::codec::{Parser, ParserConfig, Status};
//! use micro_transport::protocol::HttpMessage;
//!
//! let mut parser = Parser::new(ParserConfig::request());
//! let mut request = HttpMessage::request();
//!
//! assert_eq!(parser.parse(&mut request, b"GET /index.html?page=2 HT").unwrap(), Status::Partial);
//! assert_eq!(parser.parse(&mut request, b"TP/1.1\r\nHost: localhost\r\n\r\n").unwrap(), Status::Complete);
//! assert_eq!(request.params().get("page"), Some("2"));
//! ```

use std::net::Ipv4Addr;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use mime::Mime;
use tracing::{debug, trace};

use crate::codec::body::PayloadDecoder;
use crate::codec::cookie::parse_cookie_header;
use crate::codec::header::HeaderDecoder;
use crate::codec::multipart::parse_multipart_form_data;
use crate::codec::uri::{self, UriParts};
use crate::codec::url::parse_url_encoded;
use crate::protocol::{FieldError, HttpMessage, ParseError, PayloadSize};

/// Maximum size of a request method.
pub const METHOD_MAX: usize = 1024;

/// Maximum size of a request resource (the path part of the request target).
pub const RESOURCE_MAX: usize = 256 * 1024;

/// Maximum size of a request query string.
pub const QUERY_MAX: usize = 1024 * 1024;

/// Maximum size of a header field name.
pub const HEADER_NAME_MAX: usize = 1024;

/// Maximum size of a header field value.
pub const HEADER_VALUE_MAX: usize = 1024 * 1024;

/// Maximum size of a response reason phrase.
pub const STATUS_MESSAGE_MAX: usize = 1024;

/// Default number of body bytes kept in the message.
pub const DEFAULT_CONTENT_MAX: usize = 1024 * 1024;

/// Result of feeding a view to the parser.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    /// The message (or, in header-only mode, its head) has been read.
    Complete,
    /// The view ran out before the message ended.
    Partial,
}

/// How the last view passed to [`Parser::parse`] was split.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ReadPosition {
    pub consumed: usize,
    pub remaining: usize,
}

/// Parser settings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    is_request: bool,
    max_content_length: usize,
    headers_only: bool,
}

impl ParserConfig {
    pub fn request() -> Self {
        Self { is_request: true, max_content_length: DEFAULT_CONTENT_MAX, headers_only: false }
    }

    pub fn response() -> Self {
        Self { is_request: false, ..Self::request() }
    }

    /// Request or response mode, matching the kind of `message`.
    pub fn for_message(message: &HttpMessage) -> Self {
        if message.is_request() { Self::request() } else { Self::response() }
    }

    /// Body bytes beyond `max` are read off the wire but not stored.
    #[must_use]
    pub fn max_content_length(mut self, max: usize) -> Self {
        self.max_content_length = max;
        self
    }

    /// Report completion as soon as the head has been read.
    #[must_use]
    pub fn headers_only(mut self, headers_only: bool) -> Self {
        self.headers_only = headers_only;
        self
    }

    pub fn is_request(&self) -> bool {
        self.is_request
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::request()
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Head,
    Body,
    End,
    Failed(ParseError),
}

/// Incremental parser for a single HTTP message.
#[derive(Debug)]
pub struct Parser {
    config: ParserConfig,
    phase: Phase,
    header_decoder: HeaderDecoder,
    payload_decoder: PayloadDecoder,
    total_bytes_read: u64,
    content_bytes_read: u64,
    last_read: ReadPosition,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        let header_decoder = if config.is_request { HeaderDecoder::request() } else { HeaderDecoder::response() };
        Self {
            config,
            phase: Phase::Head,
            header_decoder,
            payload_decoder: PayloadDecoder::empty(),
            total_bytes_read: 0,
            content_bytes_read: 0,
            last_read: ReadPosition::default(),
        }
    }

    pub fn request() -> Self {
        Self::new(ParserConfig::request())
    }

    pub fn response() -> Self {
        Self::new(ParserConfig::response())
    }

    /// Consumes bytes from `view` into `message`.
    ///
    /// Returns [`Status::Partial`] once `view` is exhausted without reaching the end of
    /// the message, [`Status::Complete`] once the message boundary has been read. Bytes
    /// after the boundary are left alone, see [`Parser::read_position`].
    ///
    /// After an error every later call returns the same error.
    pub fn parse(&mut self, message: &mut HttpMessage, view: &[u8]) -> Result<Status, ParseError> {
        if let Phase::Failed(e) = &self.phase {
            self.last_read = ReadPosition { consumed: 0, remaining: view.len() };
            return Err(e.clone());
        }

        let mut src = view;
        let result = self.parse_view(&mut src, message);

        let consumed = view.len() - src.len();
        self.last_read = ReadPosition { consumed, remaining: src.len() };
        self.total_bytes_read += consumed as u64;
        trace!(consumed, remaining = src.len(), total = self.total_bytes_read, "parsed view");

        result.inspect_err(|e| self.fail(e.clone()))
    }

    fn parse_view(&mut self, src: &mut &[u8], message: &mut HttpMessage) -> Result<Status, ParseError> {
        loop {
            match &self.phase {
                Phase::Head => {
                    if !self.header_decoder.decode(src, message)? {
                        return Ok(Status::Partial);
                    }
                    self.finish_headers(message)?;
                    self.phase = Phase::Body;
                    if self.config.headers_only {
                        return Ok(Status::Complete);
                    }
                }
                Phase::Body => {
                    let before = src.len();
                    let result = self.payload_decoder.decode(src, message, self.config.max_content_length);
                    self.content_bytes_read += (before - src.len()) as u64;
                    if !result? {
                        return Ok(Status::Partial);
                    }
                    self.phase = Phase::End;
                    self.finish(message);
                    return Ok(Status::Complete);
                }
                Phase::End => return Ok(Status::Complete),
                Phase::Failed(e) => return Err(e.clone()),
            }
        }
    }

    /// Picks the body framing from the head and decodes the head's fields.
    fn finish_headers(&mut self, message: &mut HttpMessage) -> Result<(), ParseError> {
        message.update_transfer_encoding();
        message.content_mut().clear();

        self.payload_decoder = if message.is_chunked() {
            PayloadDecoder::chunked()
        } else if message.is_content_length_implied() {
            PayloadDecoder::empty()
        } else if let Some(length) = content_length(message)? {
            if length == 0 { PayloadDecoder::empty() } else { PayloadDecoder::fix_length(length) }
        } else if self.config.is_request {
            PayloadDecoder::empty()
        } else {
            PayloadDecoder::until_eof()
        };

        debug!(
            first_line = %message.first_line(),
            payload_size = ?self.payload_decoder.payload_size(),
            "finished reading headers"
        );

        if let Some(query) = message.request_line().map(|line| line.query_string().to_string())
            && !query.is_empty()
        {
            log_field_error("query string", parse_url_encoded(message.params_mut(), &query));
        }

        let is_set_cookie = message.is_response();
        let cookie_headers: Vec<String> = message
            .headers()
            .get_all(message.cookie_header_name())
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();
        for header in cookie_headers {
            log_field_error("cookie header", parse_cookie_header(message.cookies_mut(), &header, is_set_cookie));
        }

        Ok(())
    }

    /// Decodes form fields out of a complete request body.
    fn finish(&mut self, message: &mut HttpMessage) {
        trace!(content_length = message.content_length(), content_bytes = self.content_bytes_read, "finished message");
        if !self.config.is_request || message.content().is_empty() {
            return;
        }

        let Some(content_type) = message.get_header(CONTENT_TYPE.as_str()).map(str::to_string) else {
            return;
        };
        let Ok(mime) = content_type.parse::<Mime>() else {
            debug!(content_type, "unparsable content type");
            return;
        };

        if mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
            let body = String::from_utf8_lossy(message.content()).into_owned();
            log_field_error("form body", parse_url_encoded(message.params_mut(), &body));
        } else if mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA {
            let body = message.content().to_vec();
            log_field_error("multipart body", parse_multipart_form_data(message.params_mut(), &content_type, &body));
        }
    }

    fn fail(&mut self, error: ParseError) {
        debug!(cause = %error, total_bytes = self.total_bytes_read, "parse failed");
        self.phase = Phase::Failed(error);
    }

    /// Handles the end of the input stream.
    ///
    /// A response whose body is delimited by the end of the stream is complete: the bytes
    /// received so far are its body. Anywhere else the stream ended too early and the
    /// parser fails with [`ParseError::MissingHeaderData`],
    /// [`ParseError::MissingChunkData`] or [`ParseError::MissingContentData`]; whatever
    /// body arrived is still kept in `message`.
    pub fn check_premature_eof(&mut self, message: &mut HttpMessage) -> Result<(), ParseError> {
        let result = match &self.phase {
            Phase::End => return Ok(()),
            Phase::Failed(e) => return Err(e.clone()),
            Phase::Head => Err(ParseError::MissingHeaderData),
            Phase::Body => self.payload_decoder.finish_at_eof(message),
        };

        match result {
            Ok(()) => {
                self.phase = Phase::End;
                self.finish(message);
                Ok(())
            }
            Err(e) => {
                self.fail(e.clone());
                Err(e)
            }
        }
    }

    /// Consumed and unconsumed byte counts of the last view.
    pub fn read_position(&self) -> ReadPosition {
        self.last_read
    }

    /// True when the last view was consumed completely.
    pub fn eof(&self) -> bool {
        self.last_read.remaining == 0
    }

    pub fn bytes_last_read(&self) -> usize {
        self.last_read.consumed
    }

    /// Every byte consumed since the parser was created or reset.
    pub fn total_bytes_read(&self) -> u64 {
        self.total_bytes_read
    }

    /// Every byte consumed after the header block, chunk framing and footers included.
    pub fn content_bytes_read(&self) -> u64 {
        self.content_bytes_read
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::End)
    }

    /// True once the head has been read.
    pub fn is_headers_complete(&self) -> bool {
        matches!(self.phase, Phase::Body | Phase::End)
    }

    pub fn is_request(&self) -> bool {
        self.config.is_request
    }

    pub fn headers_only(&self) -> bool {
        self.config.headers_only
    }

    pub fn max_content_length(&self) -> usize {
        self.config.max_content_length
    }

    /// Body framing chosen from the head, [`PayloadSize::Empty`] until the head is read.
    pub fn payload_size(&self) -> PayloadSize {
        self.payload_decoder.payload_size()
    }

    /// Whether only the end of the stream terminates the body being read.
    pub fn is_until_eof(&self) -> bool {
        self.payload_decoder.is_until_eof()
    }

    /// Makes the parser ready for the next message, keeping its configuration.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Splits an absolute URI into its components.
    pub fn parse_uri(uri: &str) -> Option<UriParts> {
        uri::parse_uri(uri)
    }

    /// First public IPv4 address of an `X-Forwarded-For` header.
    pub fn parse_forwarded_for(header: &str) -> Option<Ipv4Addr> {
        uri::parse_forwarded_for(header)
    }
}

/// The `Content-Length` of `message`; repeated fields must agree.
fn content_length(message: &HttpMessage) -> Result<Option<u64>, ParseError> {
    let mut length = None;
    for value in message.headers().get_all(CONTENT_LENGTH) {
        let parsed = value
            .to_str()
            .map_err(ParseError::invalid_content_length)?
            .trim()
            .parse::<u64>()
            .map_err(ParseError::invalid_content_length)?;

        match length {
            Some(previous) if previous != parsed => {
                return Err(ParseError::invalid_content_length(format!("conflicting values {previous} and {parsed}")));
            }
            _ => length = Some(parsed),
        }
    }
    Ok(length)
}

fn log_field_error(field: &str, result: Result<(), FieldError>) {
    if let Err(e) = result {
        debug!(field, cause = %e, "failed to decode message fields");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn crlf(str: &str) -> String {
        str.replace('\n', "\r\n")
    }

    #[test]
    fn simple_request() {
        let str = crlf(indoc! {"
            GET /index.html?a=b&c=d HTTP/1.1
            Host: 127.0.0.1:8080
            Cookie: session=42; theme=dark

        "});

        let mut parser = Parser::request();
        let mut request = HttpMessage::request();
        assert_eq!(parser.parse(&mut request, str.as_bytes()).unwrap(), Status::Complete);

        assert!(parser.eof());
        assert!(parser.is_complete());
        assert_eq!(parser.total_bytes_read(), str.len() as u64);
        assert_eq!(parser.content_bytes_read(), 0);
        assert_eq!(parser.payload_size(), PayloadSize::Empty);

        assert_eq!(request.request_line().unwrap().resource(), "/index.html");
        assert_eq!(request.params().get("a"), Some("b"));
        assert_eq!(request.params().get("c"), Some("d"));
        assert_eq!(request.cookies().get("session"), Some("42"));
        assert_eq!(request.cookies().get("theme"), Some("dark"));
        assert!(request.content().is_empty());
    }

    #[test]
    fn response_with_length() {
        let str = "HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n0123456789";
        let mut parser = Parser::response();
        let mut response = HttpMessage::response();

        assert_eq!(parser.parse(&mut response, str.as_bytes()).unwrap(), Status::Complete);
        assert_eq!(response.status_code(), Some(200));
        assert_eq!(response.content(), b"0123456789");
        assert_eq!(parser.content_bytes_read(), 10);
        assert_eq!(parser.total_bytes_read(), str.len() as u64);
    }

    #[test]
    fn body_beyond_max_content_length_is_dropped() {
        let str = "HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n0123456789";

        let mut parser = Parser::new(ParserConfig::response().max_content_length(4));
        let mut response = HttpMessage::response();
        assert_eq!(parser.parse(&mut response, str.as_bytes()).unwrap(), Status::Complete);
        assert_eq!(response.content(), b"0123");
        assert_eq!(parser.content_bytes_read(), 10);
        assert!(parser.eof());

        let mut parser = Parser::new(ParserConfig::response().max_content_length(0));
        let mut response = HttpMessage::response();
        assert_eq!(parser.parse(&mut response, str.as_bytes()).unwrap(), Status::Complete);
        assert!(response.content().is_empty());
        assert_eq!(parser.content_bytes_read(), 10);
    }

    #[test]
    fn any_split_gives_the_same_message() {
        let str = "POST /submit HTTP/1.1\r\nContent-Type: text/plain\r\nContent-Length: 12\r\n\r\nhello world!";

        let mut whole = HttpMessage::request();
        Parser::request().parse(&mut whole, str.as_bytes()).unwrap();

        for split in 1..str.len() {
            let mut parser = Parser::request();
            let mut request = HttpMessage::request();
            assert_eq!(parser.parse(&mut request, &str.as_bytes()[..split]).unwrap(), Status::Partial, "split {split}");
            assert_eq!(parser.parse(&mut request, &str.as_bytes()[split..]).unwrap(), Status::Complete, "split {split}");
            assert_eq!(request, whole, "split {split}");
            assert_eq!(parser.total_bytes_read(), str.len() as u64);
        }

        let mut parser = Parser::request();
        let mut request = HttpMessage::request();
        let (last, init) = str.as_bytes().split_last().unwrap();
        for byte in init {
            assert_eq!(parser.parse(&mut request, std::slice::from_ref(byte)).unwrap(), Status::Partial);
        }
        assert_eq!(parser.parse(&mut request, std::slice::from_ref(last)).unwrap(), Status::Complete);
        assert_eq!(request, whole);
    }

    #[test]
    fn empty_view_is_partial() {
        let mut parser = Parser::request();
        let mut request = HttpMessage::request();
        assert_eq!(parser.parse(&mut request, b"").unwrap(), Status::Partial);
        assert!(parser.eof());
        assert_eq!(parser.total_bytes_read(), 0);
    }

    #[test]
    fn chunked_with_extensions_and_footers() {
        let head = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n";
        let body = "4;name=value\r\nWiki\r\n5\r\npedia\r\nE\r\n in\r\n\r\nchunks.\r\n0\r\nX-Checksum: abc\r\nX-Trace: 1\r\n\r\n";
        let str = format!("{head}{body}");

        let mut parser = Parser::response();
        let mut response = HttpMessage::response();
        assert_eq!(parser.parse(&mut response, str.as_bytes()).unwrap(), Status::Complete);

        assert!(response.is_chunked());
        assert_eq!(response.content(), b"Wikipedia in\r\n\r\nchunks.");
        assert_eq!(response.get_header("content-length"), Some("23"));
        assert_eq!(response.get_header("x-checksum"), Some("abc"));
        assert_eq!(response.get_header("x-trace"), Some("1"));
        assert_eq!(parser.content_bytes_read(), body.len() as u64);
        assert_eq!(parser.total_bytes_read(), str.len() as u64);
        assert!(parser.eof());
    }

    #[test]
    fn chunked_body_is_truncated_to_max_content_length() {
        let str = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n";
        let mut parser = Parser::new(ParserConfig::response().max_content_length(7));
        let mut response = HttpMessage::response();
        assert_eq!(parser.parse(&mut response, str.as_bytes()).unwrap(), Status::Complete);
        assert_eq!(response.content(), b"hello w");
    }

    #[test]
    fn footer_error_is_sticky() {
        let str = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nF\r\n0123456789abcde\r\n0\r\nGood: yes\r\nBad\r\n\r\n";
        let mut parser = Parser::response();
        let mut response = HttpMessage::response();

        assert_eq!(parser.parse(&mut response, str.as_bytes()), Err(ParseError::HeaderChar));
        assert_eq!(response.content_length(), 15);
        assert_eq!(response.get_header("good"), Some("yes"));
        assert!(!parser.eof());

        assert_eq!(parser.parse(&mut response, b"more"), Err(ParseError::HeaderChar));
        assert_eq!(parser.check_premature_eof(&mut response), Err(ParseError::HeaderChar));
    }

    #[test]
    fn bad_version() {
        let mut parser = Parser::request();
        let mut request = HttpMessage::request();
        assert_eq!(parser.parse(&mut request, b"GET / HTTP/1.x\r\n\r\n"), Err(ParseError::VersionChar));
        assert_eq!(ParseError::VersionChar.to_string(), "invalid version character");
    }

    #[test]
    fn conflicting_content_length() {
        let str = "POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 4\r\n\r\nabcd";
        let mut parser = Parser::request();
        let mut request = HttpMessage::request();
        assert!(matches!(parser.parse(&mut request, str.as_bytes()), Err(ParseError::InvalidContentLength { .. })));

        let str = "POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 3\r\n\r\nabc";
        let mut parser = Parser::request();
        let mut request = HttpMessage::request();
        assert_eq!(parser.parse(&mut request, str.as_bytes()).unwrap(), Status::Complete);
        assert_eq!(request.content(), b"abc");
    }

    #[test]
    fn pipelined_requests() {
        let first = "GET /first HTTP/1.1\r\nHost: a\r\n\r\n";
        let second = "POST /second HTTP/1.1\r\nContent-Length: 2\r\n\r\nok";
        let str = format!("{first}{second}");

        let mut parser = Parser::request();
        let mut request = HttpMessage::request();
        assert_eq!(parser.parse(&mut request, str.as_bytes()).unwrap(), Status::Complete);
        assert_eq!(request.request_line().unwrap().resource(), "/first");
        assert_eq!(parser.read_position(), ReadPosition { consumed: first.len(), remaining: second.len() });
        assert!(!parser.eof());

        let rest = &str.as_bytes()[parser.bytes_last_read()..];
        parser.reset();
        let mut request = HttpMessage::request();
        assert_eq!(parser.parse(&mut request, rest).unwrap(), Status::Complete);
        assert_eq!(request.request_line().unwrap().resource(), "/second");
        assert_eq!(request.content(), b"ok");
        assert_eq!(parser.total_bytes_read(), second.len() as u64);
        assert!(parser.eof());
    }

    #[test]
    fn bodiless_messages_complete_after_head() {
        let mut parser = Parser::response();
        let mut response = HttpMessage::response();
        assert_eq!(parser.parse(&mut response, b"HTTP/1.1 204 No Content\r\n\r\n").unwrap(), Status::Complete);
        assert_eq!(parser.payload_size(), PayloadSize::Empty);

        let mut parser = Parser::response();
        let mut response = HttpMessage::response();
        response.status_line_mut().unwrap().set_head_request(true);
        let str = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n";
        assert_eq!(parser.parse(&mut response, str.as_bytes()).unwrap(), Status::Complete);
        assert!(response.content().is_empty());
    }

    #[test]
    fn response_until_eof() {
        let mut parser = Parser::response();
        let mut response = HttpMessage::response();
        let str = "HTTP/1.0 200 OK\r\nServer: test\r\n\r\nsome body";
        assert_eq!(parser.parse(&mut response, str.as_bytes()).unwrap(), Status::Partial);
        assert!(parser.is_until_eof());
        assert_eq!(parser.parse(&mut response, b" and more").unwrap(), Status::Partial);

        assert_eq!(parser.check_premature_eof(&mut response), Ok(()));
        assert!(parser.is_complete());
        assert_eq!(response.content(), b"some body and more");
        assert_eq!(parser.content_bytes_read(), 18);
    }

    #[test]
    fn premature_eof() {
        let mut parser = Parser::response();
        let mut response = HttpMessage::response();
        parser.parse(&mut response, b"HTTP/1.1 200 OK\r\nContent-Le").unwrap();
        assert_eq!(parser.check_premature_eof(&mut response), Err(ParseError::MissingHeaderData));

        let mut parser = Parser::response();
        let mut response = HttpMessage::response();
        parser.parse(&mut response, b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n01234").unwrap();
        assert_eq!(parser.check_premature_eof(&mut response), Err(ParseError::MissingContentData));
        assert_eq!(response.content(), b"01234");

        let mut parser = Parser::response();
        let mut response = HttpMessage::response();
        parser.parse(&mut response, b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n").unwrap();
        assert_eq!(parser.check_premature_eof(&mut response), Err(ParseError::MissingChunkData));
        assert_eq!(response.content(), b"abc");
    }

    #[test]
    fn headers_only_then_body() {
        let head = "HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n";
        let str = format!("{head}hello");

        let mut parser = Parser::new(ParserConfig::response().headers_only(true));
        let mut response = HttpMessage::response();
        assert_eq!(parser.parse(&mut response, str.as_bytes()).unwrap(), Status::Complete);
        assert!(parser.is_headers_complete());
        assert!(!parser.is_complete());
        assert_eq!(parser.read_position(), ReadPosition { consumed: head.len(), remaining: 5 });
        assert!(response.content().is_empty());

        assert_eq!(parser.parse(&mut response, b"hello").unwrap(), Status::Complete);
        assert!(parser.is_complete());
        assert_eq!(response.content(), b"hello");
        assert_eq!(parser.content_bytes_read(), 5);
    }

    #[test]
    fn urlencoded_form_fields() {
        let body = "test=2&three=%20four%20with%20spaces&five=sixty+two";
        let str = format!(
            "POST /form?page=1 HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded; charset=utf-8\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );

        let mut parser = Parser::request();
        let mut request = HttpMessage::request();
        assert_eq!(parser.parse(&mut request, str.as_bytes()).unwrap(), Status::Complete);

        assert_eq!(request.params().len(), 4);
        assert_eq!(request.params().get("page"), Some("1"));
        assert_eq!(request.params().get("test"), Some("2"));
        assert_eq!(request.params().get("three"), Some(" four with spaces"));
        assert_eq!(request.params().get("five"), Some("sixty two"));
    }

    #[test]
    fn multipart_form_fields() {
        let body = "--xyz\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nreport\r\n--xyz\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n\x01\x02\r\n--xyz--\r\n";
        let str = format!(
            "POST /upload HTTP/1.1\r\nContent-Type: multipart/form-data; boundary=xyz\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );

        let mut parser = Parser::request();
        let mut request = HttpMessage::request();
        assert_eq!(parser.parse(&mut request, str.as_bytes()).unwrap(), Status::Complete);
        assert_eq!(request.params().len(), 1);
        assert_eq!(request.params().get("title"), Some("report"));
    }

    #[test]
    fn set_cookie_headers_of_responses() {
        let str = "HTTP/1.1 200 OK\r\nSet-Cookie: a=1; Path=/\r\nSet-Cookie: b=\"2\"; Version=\"1\"\r\nContent-Length: 0\r\n\r\n";
        let mut parser = Parser::response();
        let mut response = HttpMessage::response();
        assert_eq!(parser.parse(&mut response, str.as_bytes()).unwrap(), Status::Complete);
        assert_eq!(response.cookies().len(), 2);
        assert_eq!(response.cookies().get("a"), Some("1"));
        assert_eq!(response.cookies().get("b"), Some("2"));
    }

    #[test]
    fn static_helpers() {
        let parts = Parser::parse_uri("http://127.0.0.1/folder/file.ext?q=uery").unwrap();
        assert_eq!(parts.port, 80);
        assert_eq!(parts.query, "q=uery");
        assert_eq!(Parser::parse_forwarded_for("10.0.0.1, 8.8.8.8"), Some(Ipv4Addr::new(8, 8, 8, 8)));
    }
}
