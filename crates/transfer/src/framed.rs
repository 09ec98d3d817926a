//! Chunk streams over a plain byte stream.
//!
//! # Wire format
//!
//! ```text
//! PER FRAME:
//!   [4 bytes BE: frame_len]
//!   [frame_len bytes: protobuf-encoded FileDataChunk]
//! ```
//!
//! End of the byte stream at a frame boundary ends the chunk stream.

use bytes::Bytes;
use dataplane_protocol::FileDataChunk;
use futures_util::{SinkExt, StreamExt};
use prost::Message;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

use crate::{ChunkSink, ChunkStream, TransportError};

/// Largest encoded frame accepted by default (8 MiB).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

fn codec(max_frame_length: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .max_frame_length(max_frame_length)
        .new_codec()
}

/// Writes length-prefixed frames to an [`AsyncWrite`].
pub struct FramedSink<W> {
    inner: FramedWrite<W, LengthDelimitedCodec>,
}

impl<W: AsyncWrite + Unpin> FramedSink<W> {
    pub fn new(writer: W) -> Self {
        Self::with_max_frame_length(writer, DEFAULT_MAX_FRAME_LENGTH)
    }

    pub fn with_max_frame_length(writer: W, max_frame_length: usize) -> Self {
        Self {
            inner: FramedWrite::new(writer, codec(max_frame_length)),
        }
    }

    /// Flushes and shuts down the writer, signalling end of stream to the peer.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        SinkExt::<Bytes>::close(&mut self.inner).await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl<W: AsyncWrite + Unpin + Send> ChunkSink for FramedSink<W> {
    async fn send(&mut self, chunk: FileDataChunk) -> Result<(), TransportError> {
        let encoded = Bytes::from(chunk.encode_to_vec());
        self.inner.send(encoded).await?;
        Ok(())
    }
}

/// Reads length-prefixed frames from an [`AsyncRead`].
pub struct FramedStream<R> {
    inner: FramedRead<R, LengthDelimitedCodec>,
}

impl<R: AsyncRead + Unpin> FramedStream<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_frame_length(reader, DEFAULT_MAX_FRAME_LENGTH)
    }

    pub fn with_max_frame_length(reader: R, max_frame_length: usize) -> Self {
        Self {
            inner: FramedRead::new(reader, codec(max_frame_length)),
        }
    }
}

impl<R: AsyncRead + Unpin + Send> ChunkStream for FramedStream<R> {
    async fn recv(&mut self) -> Result<Option<FileDataChunk>, TransportError> {
        match self.inner.next().await {
            Some(frame) => Ok(Some(FileDataChunk::decode(frame?)?)),
            None => Ok(None),
        }
    }
}
