//! HTTP header processing module for encoding and decoding message heads
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes a request line, a status line or a footer block, plus the
//!   header fields that follow, one byte at a time
//!   - Resumes at any byte boundary
//!   - Enforces the method, URI, query and header size limits
//!
//! - [`HeaderEncoder`]: Encodes the start line and header fields of a message

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
