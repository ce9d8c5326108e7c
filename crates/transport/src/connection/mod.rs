//! Connection handling: moving messages over a persistent byte stream
//!
//! # Components
//!
//! - [`Connection`]: wraps any tokio `AsyncRead + AsyncWrite` stream with:
//!   - a read buffer refilled by each partial read
//!   - vectored writes of several buffer segments
//!   - the [`Lifecycle`] decided after each message
//!   - a bookmark of buffered bytes that belong to the next, pipelined message
//!   - an abort handle failing every pending read and write
//!
//! - [`Watchdog`]: per-connection deadline aborting a stalled send or receive
//!
//! - [`receive`], [`send`] and [`send_chunked`]: drive the parser and the serializer over
//!   a connection
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use micro_transport::codec::Parser;
//! use micro_transport::connection::{Connection, Lifecycle, receive, send};
//! use micro_transport::protocol::HttpMessage;
//! use tokio::net::TcpStream;
//!
//! # async fn serve(stream: TcpStream) -> Result<(), micro_transport::protocol::HttpError> {
//! let mut connection = Connection::new(stream);
//! let mut parser = Parser::request();
//! let mut request = HttpMessage::request();
//!
//! loop {
//!     connection.start_timer(Duration::from_secs(30));
//!     receive(&mut connection, &mut parser, &mut request).await?;
//!     connection.cancel_timer();
//!
//!     let mut response = HttpMessage::response_for(&request);
//!     response.set_content("Hello World!\r\n");
//!     send(&mut connection, &mut response, false).await?;
//!
//!     if connection.lifecycle() == Lifecycle::Close {
//!         return Ok(());
//!     }
//! }
//! # }
//! ```

mod receive;
mod send;
mod timer;
mod transport;

pub use receive::receive;
pub use send::{send, send_chunked};
pub use timer::Watchdog;
pub use transport::{Connection, ConnectionConfig, DEFAULT_READ_BUFFER_SIZE, Lifecycle};
