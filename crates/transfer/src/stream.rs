//! Minimal stream capabilities the transfer core needs from a transport.
//!
//! A gRPC server/client stream, an in-memory channel and a length-delimited
//! byte stream all fit behind these two traits.

use std::future::Future;

use dataplane_protocol::FileDataChunk;

use crate::TransportError;

/// Outbound half of a chunk stream.
pub trait ChunkSink {
    /// Sends one frame, waiting until the transport has accepted it.
    fn send(
        &mut self,
        chunk: FileDataChunk,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Inbound half of a chunk stream.
pub trait ChunkStream {
    /// Receives the next frame. `Ok(None)` means the peer finished the stream.
    fn recv(&mut self) -> impl Future<Output = Result<Option<FileDataChunk>, TransportError>> + Send;
}
