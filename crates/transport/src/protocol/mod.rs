//! Core HTTP message types shared by the parser, the serializer and the connection layer.
//!
//! # Architecture
//!
//! - **Message** ([`message`]): [`HttpMessage`] holds one request or response in memory
//!   - [`MessageHead`]: tagged request line / status line
//!   - [`PayloadSize`]: how the body is delimited on the wire
//!
//! - **Start lines** ([`request`], [`response`]): [`RequestLine`] and [`StatusLine`]
//!
//! - **Version** ([`version`]): [`HttpVersion`], any `major.minor` pair
//!
//! - **Parameters** ([`params`]): [`ParamMap`], the case-insensitive multimap used for
//!   query fields, form fields and cookies
//!
//! - **Error Handling** ([`error`]):
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: Structural errors raised by the parser
//!   - [`SendError`]: Errors raised while serializing or writing a message
//!   - [`FieldError`]: Errors raised while decoding query, form and cookie fields

mod message;
pub use message::HttpMessage;
pub use message::MessageHead;
pub use message::PayloadSize;

mod request;
pub use request::RequestLine;

mod response;
pub use response::StatusLine;

mod version;
pub use version::HttpVersion;

mod params;
pub use params::ParamMap;

mod error;
pub use error::HttpError;
pub use error::FieldError;
pub use error::ParseError;
pub use error::SendError;
