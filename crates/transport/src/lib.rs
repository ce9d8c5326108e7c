//! An incremental HTTP/1.x message transport built on tokio
//!
//! This crate turns a raw, possibly fragmented byte stream into structured HTTP requests
//! and responses, and turns messages back into correctly framed bytes. Messages may
//! arrive in arbitrarily small pieces, several of them back-to-back on one connection,
//! with bodies delimited by a length, by chunked framing, or by the end of the stream.
//!
//! # Features
//!
//! - Resumable parsing: a message split at any byte boundary parses the same
//! - Pipelining: bytes of the next message are bookmarked, never read twice or lost
//! - Keep-alive and close decisions after each message
//! - Content-Length, chunked (with footers) and read-until-close bodies
//! - Premature end-of-stream detection
//! - Query string, form body, multipart and cookie field decoding
//! - Watchdog timers aborting stalled connections
//! - `tokio_util` codec adapters
//!
//! # Example
//!
//! ```no_run
//! use micro_transport::codec::Parser;
//! use micro_transport::connection::{Connection, Lifecycle, receive, send};
//! use micro_transport::protocol::HttpMessage;
//! use tokio::net::TcpListener;
//! use tracing::{Level, error, info, warn};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         tokio::spawn(async move {
//!             let mut connection = Connection::new(tcp_stream);
//!             let mut parser = Parser::request();
//!             let mut request = HttpMessage::request();
//!             loop {
//!                 if let Err(e) = receive(&mut connection, &mut parser, &mut request).await {
//!                     info!(cause = %e, "connection shutdown");
//!                     return;
//!                 }
//!
//!                 let mut response = HttpMessage::response_for(&request);
//!                 response.set_content("Hello World!\r\n");
//!                 if send(&mut connection, &mut response, false).await.is_err()
//!                     || connection.lifecycle() == Lifecycle::Close
//!                 {
//!                     return;
//!                 }
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: the in-memory message and the error types
//! - [`codec`]: the parser, the serializer and the field codecs
//! - [`connection`]: the transport wrapper, lifecycle handling and watchdog timers
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: Top-level error type
//! - [`protocol::ParseError`]: Malformed input and premature end of stream
//! - [`protocol::SendError`]: Serialization and write errors
//!
//! # Limitations
//!
//! - HTTP/1.x only
//! - No TLS support
//! - Multipart bodies are reduced to their text fields

pub mod codec;
pub mod connection;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
