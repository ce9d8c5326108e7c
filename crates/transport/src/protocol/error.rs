use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("send error: {source}")]
    Send {
        #[from]
        source: SendError,
    },

    #[error("premature eof after {bytes_read} bytes: {source}")]
    PrematureEof { bytes_read: u64, source: ParseError },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl HttpError {
    pub fn premature_eof(bytes_read: u64, source: ParseError) -> Self {
        Self::PrematureEof { bytes_read, source }
    }

    /// Returns the structural parse error behind this failure, if there is one.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            HttpError::Parse { source } | HttpError::PrematureEof { source, .. } => Some(source),
            HttpError::Send { .. } | HttpError::Io { .. } => None,
        }
    }
}

/// Structural errors raised by the incremental parser.
///
/// Once a parser reports one of these it stays in its error state; the message it was
/// building must be discarded and the connection closed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid method character")]
    MethodChar,

    #[error("method exceeds maximum size")]
    MethodSize,

    #[error("invalid uri character")]
    UriChar,

    #[error("uri exceeds maximum size")]
    UriSize,

    #[error("invalid query string character")]
    QueryChar,

    #[error("query string exceeds maximum size")]
    QuerySize,

    #[error("http version undefined")]
    VersionEmpty,

    #[error("invalid version character")]
    VersionChar,

    #[error("received an invalid status code")]
    StatusEmpty,

    #[error("invalid status code character")]
    StatusChar,

    #[error("invalid header character")]
    HeaderChar,

    #[error("header name exceeds maximum size")]
    HeaderNameSize,

    #[error("header value exceeds maximum size")]
    HeaderValueSize,

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid chunk character")]
    ChunkChar,

    #[error("chunk size overflows the length counter")]
    ChunkSizeOverflow,

    #[error("missing chunk data")]
    MissingChunkData,

    #[error("missing header data")]
    MissingHeaderData,

    #[error("missing content data")]
    MissingContentData,
}

impl ParseError {
    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    /// True for the errors produced when the stream ends before a framing boundary.
    pub fn is_premature_eof(&self) -> bool {
        matches!(self, ParseError::MissingHeaderData | ParseError::MissingChunkData | ParseError::MissingContentData)
    }

    /// True for errors raised while reading the request or status line.
    pub fn is_start_line_error(&self) -> bool {
        matches!(
            self,
            ParseError::MethodChar
                | ParseError::MethodSize
                | ParseError::UriChar
                | ParseError::UriSize
                | ParseError::QueryChar
                | ParseError::QuerySize
                | ParseError::StatusEmpty
                | ParseError::StatusChar
        )
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid message: {reason}")]
    InvalidMessage { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_message<S: ToString>(str: S) -> Self {
        Self::InvalidMessage { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors raised while decoding fields out of a message that was already framed:
/// query strings, form bodies and cookie headers.
///
/// The parser logs these and keeps the message; callers of the codec functions get them
/// directly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} exceeds maximum size of {max} bytes")]
    TooLarge { field: &'static str, max: usize },

    #[error("control character in {field}")]
    ControlChar { field: &'static str },

    #[error("invalid content type: {reason}")]
    InvalidContentType { reason: String },

    #[error("multipart body has no boundary")]
    MissingBoundary,

    #[error("malformed multipart part: {reason}")]
    MalformedPart { reason: String },
}

impl FieldError {
    pub fn too_large(field: &'static str, max: usize) -> Self {
        Self::TooLarge { field, max }
    }

    pub fn control_char(field: &'static str) -> Self {
        Self::ControlChar { field }
    }

    pub fn invalid_content_type<S: ToString>(str: S) -> Self {
        Self::InvalidContentType { reason: str.to_string() }
    }

    pub fn malformed_part<S: ToString>(str: S) -> Self {
        Self::MalformedPart { reason: str.to_string() }
    }
}
