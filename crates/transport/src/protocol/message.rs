use bytes::BytesMut;
use http::header::{CONNECTION, CONTENT_LENGTH, COOKIE, SET_COOKIE, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

use crate::codec::cookie::make_set_cookie_header;
use crate::protocol::{HttpVersion, ParamMap, RequestLine, StatusLine};

/// The first line of a message, which also decides how it is parsed and framed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageHead {
    Request(RequestLine),
    Response(StatusLine),
}

/// How the body of a message is delimited on the wire.
///
/// Decided by the parser once the header block is complete, and by the sender from the
/// message it is about to write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Payload using chunked transfer encoding
    Chunked,
    /// Payload runs until the peer closes the connection
    UntilEof,
    /// Empty payload (no body)
    Empty,
}

impl PayloadSize {
    /// Returns true if the payload uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    /// Returns true if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }

    /// Returns true if only the peer closing the connection ends the payload
    #[inline]
    pub fn is_until_eof(&self) -> bool {
        matches!(self, PayloadSize::UntilEof)
    }
}

/// One HTTP request or response held entirely in memory.
///
/// A message is filled either by the parser while it is received, or by the caller
/// before it is sent. It can be [`clear`](HttpMessage::clear)ed and reused for the next
/// message on a keep-alive connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMessage {
    head: MessageHead,
    version: HttpVersion,
    headers: HeaderMap,
    content: BytesMut,
    chunk_cache: BytesMut,
    chunked: bool,
    do_not_send_content_length: bool,
    params: ParamMap,
    cookies: ParamMap,
}

impl HttpMessage {
    fn with_head(head: MessageHead) -> Self {
        Self {
            head,
            version: HttpVersion::default(),
            headers: HeaderMap::new(),
            content: BytesMut::new(),
            chunk_cache: BytesMut::new(),
            chunked: false,
            do_not_send_content_length: false,
            params: ParamMap::new(),
            cookies: ParamMap::new(),
        }
    }

    /// An empty `GET /` request.
    pub fn request() -> Self {
        Self::with_head(MessageHead::Request(RequestLine::default()))
    }

    /// An empty `200 OK` response.
    pub fn response() -> Self {
        Self::with_head(MessageHead::Response(StatusLine::default()))
    }

    /// A response to `request`: same version, and no body expected if it was a HEAD.
    pub fn response_for(request: &HttpMessage) -> Self {
        let mut response = Self::response();
        response.version = request.version;
        if let (Some(line), Some(request_line)) = (response.status_line_mut(), request.request_line()) {
            line.set_head_request(request_line.method() == Method::HEAD);
        }
        response
    }

    #[inline]
    pub fn is_request(&self) -> bool {
        matches!(self.head, MessageHead::Request(_))
    }

    #[inline]
    pub fn is_response(&self) -> bool {
        matches!(self.head, MessageHead::Response(_))
    }

    pub fn head(&self) -> &MessageHead {
        &self.head
    }

    pub fn set_head(&mut self, head: MessageHead) {
        self.head = head;
    }

    pub fn request_line(&self) -> Option<&RequestLine> {
        match &self.head {
            MessageHead::Request(line) => Some(line),
            MessageHead::Response(_) => None,
        }
    }

    pub fn request_line_mut(&mut self) -> Option<&mut RequestLine> {
        match &mut self.head {
            MessageHead::Request(line) => Some(line),
            MessageHead::Response(_) => None,
        }
    }

    pub fn status_line(&self) -> Option<&StatusLine> {
        match &self.head {
            MessageHead::Request(_) => None,
            MessageHead::Response(line) => Some(line),
        }
    }

    pub fn status_line_mut(&mut self) -> Option<&mut StatusLine> {
        match &mut self.head {
            MessageHead::Request(_) => None,
            MessageHead::Response(line) => Some(line),
        }
    }

    /// Request method, `None` for responses.
    pub fn method(&self) -> Option<&Method> {
        self.request_line().map(RequestLine::method)
    }

    /// Response status code, `None` for requests.
    pub fn status_code(&self) -> Option<u16> {
        self.status_line().map(StatusLine::status_code)
    }

    /// Sets the status code of a response; ignored for requests.
    pub fn set_status(&mut self, status: StatusCode) {
        if let Some(line) = self.status_line_mut() {
            *line = StatusLine::new(status);
        }
    }

    #[inline]
    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn set_version(&mut self, version: HttpVersion) {
        self.version = version;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Replaces every value of `name` with `value`.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Appends a value, keeping the ones already present under `name`.
    pub fn add_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    pub fn remove_header(&mut self, name: &HeaderName) {
        self.headers.remove(name);
    }

    /// First value of `name`, looked up without regard to case.
    ///
    /// A present but empty header yields `Some("")`. Values are returned when they are
    /// valid UTF-8, including non-ASCII text; `None` otherwise means the header is absent
    /// or not UTF-8, which [`HttpMessage::has_header`] tells apart and
    /// [`HttpMessage::header`] still returns as raw bytes.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.header(name).and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// The stored body.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut BytesMut {
        &mut self.content
    }

    pub fn set_content<B: AsRef<[u8]>>(&mut self, content: B) {
        self.content.clear();
        self.content.extend_from_slice(content.as_ref());
    }

    /// Number of bytes in the stored body.
    #[inline]
    pub fn content_length(&self) -> usize {
        self.content.len()
    }

    /// Adds one decoded chunk payload to the accumulator.
    pub fn append_content_chunk(&mut self, chunk: &[u8]) {
        self.chunk_cache.extend_from_slice(chunk);
    }

    /// Bytes accumulated from chunks that have not been finalized yet.
    pub fn chunk_cache(&self) -> &[u8] {
        &self.chunk_cache
    }

    /// Moves the accumulated chunks into the body and records its length.
    ///
    /// The accumulator is already contiguous, so this is one linear copy.
    pub fn finalize_chunked_content(&mut self) {
        self.content.clear();
        self.content.extend_from_slice(&self.chunk_cache);
        self.chunk_cache.clear();
        self.headers.insert(CONTENT_LENGTH, HeaderValue::from(self.content.len()));
    }

    #[inline]
    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    pub fn set_chunked(&mut self, chunked: bool) {
        self.chunked = chunked;
    }

    /// Chunked transfer coding only exists for HTTP/1.1 and later.
    #[inline]
    pub fn chunks_supported(&self) -> bool {
        self.version.is_at_least_11()
    }

    /// Recomputes the chunked flag from the `Transfer-Encoding` header.
    pub fn update_transfer_encoding(&mut self) {
        self.chunked = self.chunks_supported() && is_chunked(self.headers.get(TRANSFER_ENCODING));
    }

    /// Whether the peer expects the connection to stay open after this message.
    ///
    /// HTTP/1.1 connections persist unless `Connection: close` is present; older
    /// versions persist only with an explicit `Connection: keep-alive`.
    pub fn check_keep_alive(&self) -> bool {
        let connection = self.get_header(CONNECTION.as_str());
        if connection.is_some_and(|value| has_token(value, "close")) {
            return false;
        }
        self.version.is_at_least_11() || connection.is_some_and(|value| has_token(value, "keep-alive"))
    }

    /// True when the framing rules say this message has no body at all.
    pub fn is_content_length_implied(&self) -> bool {
        match &self.head {
            MessageHead::Request(_) => false,
            MessageHead::Response(line) => line.is_head_request() || line.is_bodyless_status(),
        }
    }

    pub fn do_not_send_content_length(&self) -> bool {
        self.do_not_send_content_length
    }

    /// Stops the sender from writing a `Content-Length` header.
    pub fn set_do_not_send_content_length(&mut self, value: bool) {
        self.do_not_send_content_length = value;
    }

    /// Decoded query string and form fields of a request.
    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamMap {
        &mut self.params
    }

    /// Cookies from `Cookie` (requests) or `Set-Cookie` (responses) headers.
    pub fn cookies(&self) -> &ParamMap {
        &self.cookies
    }

    pub fn cookies_mut(&mut self) -> &mut ParamMap {
        &mut self.cookies
    }

    /// Name of the header carrying cookies for this kind of message.
    pub fn cookie_header_name(&self) -> HeaderName {
        if self.is_request() { COOKIE } else { SET_COOKIE }
    }

    /// Appends a `Set-Cookie` header and records the cookie.
    pub fn add_set_cookie(&mut self, name: &str, value: &str, path: &str, max_age: Option<u64>) {
        let header = make_set_cookie_header(name, value, path, max_age);
        match HeaderValue::from_str(&header) {
            Ok(header_value) => {
                self.headers.append(SET_COOKIE, header_value);
                self.cookies.insert(name, value);
            }
            Err(e) => tracing::warn!(cookie = name, cause = %e, "skip cookie which is not a valid header value"),
        }
    }

    /// Renders the request or status line, without the trailing CRLF.
    pub fn first_line(&self) -> String {
        match &self.head {
            MessageHead::Request(line) => format!("{} {} {}", line.method(), line.target(), self.version),
            MessageHead::Response(line) => {
                format!("{} {} {}", self.version, line.status_code(), line.status_message())
            }
        }
    }

    /// Rewrites the framing headers right before the message is serialized.
    pub fn prepare_headers_for_send(&mut self, keep_alive: bool, using_chunks: bool) {
        let connection = if keep_alive { "Keep-Alive" } else { "close" };
        self.headers.insert(CONNECTION, HeaderValue::from_static(connection));

        if using_chunks {
            if self.chunks_supported() {
                self.headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
                self.headers.remove(CONTENT_LENGTH);
            }
        } else if !self.do_not_send_content_length {
            self.headers.insert(CONTENT_LENGTH, HeaderValue::from(self.content.len()));
        }
    }

    /// Resets to an empty message of the same kind.
    ///
    /// A response keeps knowing whether it answers a HEAD request.
    pub fn clear(&mut self) {
        self.head = match &self.head {
            MessageHead::Request(_) => MessageHead::Request(RequestLine::default()),
            MessageHead::Response(line) => {
                let mut cleared = StatusLine::default();
                cleared.set_head_request(line.is_head_request());
                MessageHead::Response(cleared)
            }
        };
        self.version = HttpVersion::default();
        self.headers.clear();
        self.content.clear();
        self.chunk_cache.clear();
        self.chunked = false;
        self.do_not_send_content_length = false;
        self.params.clear();
        self.cookies.clear();
    }
}

/// Checks if the Transfer-Encoding header names the chunked coding.
fn is_chunked(header_value: Option<&HeaderValue>) -> bool {
    header_value.and_then(|value| value.to_str().ok()).is_some_and(|value| has_token(value, "chunked"))
}

/// Comma separated token lookup, ignoring case and surrounding whitespace.
fn has_token(value: &str, token: &str) -> bool {
    value.split(',').any(|t| t.trim().eq_ignore_ascii_case(token))
}
