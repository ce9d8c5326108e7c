//! HTTP codec module for parsing and serializing HTTP messages
//!
//! # Architecture
//!
//! - Parsing:
//!   - [`Parser`]: incremental, resumable parser filling an [`HttpMessage`](crate::protocol::HttpMessage)
//!   - Head decoding via the `header` module, body decoding via the `body` module
//!   - [`MessageDecoder`]: the parser behind the `tokio_util` [`Decoder`](tokio_util::codec::Decoder) trait
//!
//! - Serializing:
//!   - [`MessageEncoder`]: head plus body behind the `tokio_util` [`Encoder`](tokio_util::codec::Encoder) trait
//!   - [`ChunkedEncoder`]: chunked transfer framing for bodies sent piece by piece
//!
//! - Blocking streams: [`read_message`] and [`write_message`] over `std::io`
//!
//! - Field codecs used by the parser and available on their own:
//!   - [`url`]: percent-encoding and `application/x-www-form-urlencoded` fields
//!   - [`cookie`]: `Cookie` / `Set-Cookie` tokenizing
//!   - [`multipart`]: `multipart/form-data` field extraction
//!   - [`base64`], [`date`], [`uri`]
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_transport::codec::{MessageDecoder, MessageEncoder};
//! use micro_transport::protocol::HttpMessage;
//! use tokio_util::codec::{Decoder, Encoder};
//!
//! let mut response = HttpMessage::response();
//! response.set_content("Hello World!");
//!
//! let mut buffer = BytesMut::new();
//! MessageEncoder::new(true).encode(response, &mut buffer).unwrap();
//!
//! let decoded = MessageDecoder::response().decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(decoded.content(), b"Hello World!");
//! ```

mod body;
mod header;
mod message_decoder;
mod message_encoder;
mod parser;
mod stream;

pub mod base64;
pub mod cookie;
pub mod date;
pub mod multipart;
pub mod uri;
pub mod url;

pub use body::{ChunkItem, ChunkedEncoder};
pub use header::{HeaderDecoder, HeaderEncoder};
pub use message_decoder::MessageDecoder;
pub use message_encoder::MessageEncoder;
pub(crate) use message_encoder::encode_head;
pub use parser::{
    DEFAULT_CONTENT_MAX, HEADER_NAME_MAX, HEADER_VALUE_MAX, METHOD_MAX, Parser, ParserConfig, QUERY_MAX,
    RESOURCE_MAX, ReadPosition, STATUS_MESSAGE_MAX, Status,
};
pub use stream::{read_message, write_message};
