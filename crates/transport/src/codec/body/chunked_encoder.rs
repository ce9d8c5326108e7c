use crate::protocol::SendError;
use bytes::BytesMut;
use http::HeaderMap;
use std::io::Write;

use tokio_util::codec::Encoder;

/// One piece of a chunked body handed to [`ChunkedEncoder`].
#[derive(Debug, Clone, Copy)]
pub enum ChunkItem<'a> {
    Chunk(&'a [u8]),
    /// the terminating zero-sized chunk, followed by footer fields
    Eof(&'a HeaderMap),
}

/// Frames body pieces as `hex-size CRLF data CRLF`, terminated by `0 CRLF [footers] CRLF`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkedEncoder {
    eof: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false }
    }
}

impl Encoder<ChunkItem<'_>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: ChunkItem<'_>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            // an empty chunk would read as the end of the body
            ChunkItem::Chunk(bytes) if bytes.is_empty() => Ok(()),
            ChunkItem::Chunk(bytes) => {
                write!(helper::Writer(dst), "{:X}\r\n", bytes.len())?;
                dst.reserve(bytes.len() + 2);
                dst.extend_from_slice(bytes);
                dst.extend_from_slice(b"\r\n");
                Ok(())
            }
            ChunkItem::Eof(footers) => {
                self.eof = true;
                dst.extend_from_slice(b"0\r\n");
                for (name, value) in footers {
                    dst.extend_from_slice(name.as_ref());
                    dst.extend_from_slice(b": ");
                    dst.extend_from_slice(value.as_ref());
                    dst.extend_from_slice(b"\r\n");
                }
                dst.extend_from_slice(b"\r\n");
                Ok(())
            }
        }
    }
}

mod helper {
    use bytes::{BufMut, BytesMut};
    use std::io;

    pub struct Writer<'a>(pub &'a mut BytesMut);

    impl io::Write for Writer<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.put_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
