//! HTTP body handling module for processing request and response payloads
//!
//! # Components
//!
//! ## Decoders
//! - [`ChunkedDecoder`]: Handles chunked transfer encoded payloads and their footers
//! - [`LengthDecoder`]: Processes fixed-length payloads
//! - [`PayloadDecoder`]: Main decoder that coordinates different decoding strategies,
//!   including bodies that run until the connection closes
//!
//! ## Encoders
//! - [`ChunkedEncoder`]: Implements chunked transfer encoding
//!
//! Decoders read from a borrowed view of the connection's buffer and never keep it;
//! body bytes are copied into the message, at most up to the configured limit.

mod chunked_decoder;
mod chunked_encoder;
mod length_decoder;
mod payload_decoder;

pub use chunked_encoder::ChunkItem;
pub use chunked_encoder::ChunkedEncoder;
pub use payload_decoder::PayloadDecoder;
