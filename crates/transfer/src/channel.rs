//! In-process chunk streams over a bounded tokio channel.

use dataplane_protocol::FileDataChunk;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{ChunkSink, ChunkStream, TransportError};

/// Sending half returned by [`chunk_channel`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<FileDataChunk>,
    cancel: CancellationToken,
}

/// Receiving half returned by [`chunk_channel`].
#[derive(Debug)]
pub struct ChannelStream {
    rx: mpsc::Receiver<FileDataChunk>,
    cancel: CancellationToken,
}

/// Creates a connected sink/stream pair buffering up to `capacity` frames.
///
/// Dropping the sink ends the stream; dropping the stream makes further
/// sends fail with [`TransportError::Closed`].
pub fn chunk_channel(capacity: usize) -> (ChannelSink, ChannelStream) {
    let (tx, rx) = mpsc::channel(capacity);
    let cancel = CancellationToken::new();
    (
        ChannelSink {
            tx,
            cancel: cancel.clone(),
        },
        ChannelStream { rx, cancel },
    )
}

impl ChannelSink {
    /// Replaces the cancellation token. Once `cancel` fires, pending and
    /// future sends fail with [`TransportError::Cancelled`].
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl ChannelStream {
    /// Replaces the cancellation token. Once `cancel` fires, pending and
    /// future receives fail with [`TransportError::Cancelled`].
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl ChunkSink for ChannelSink {
    async fn send(&mut self, chunk: FileDataChunk) -> Result<(), TransportError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.tx.send(chunk) => result.map_err(|_| TransportError::Closed),
        }
    }
}

impl ChunkStream for ChannelStream {
    async fn recv(&mut self) -> Result<Option<FileDataChunk>, TransportError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(TransportError::Cancelled),
            chunk = self.rx.recv() => Ok(chunk),
        }
    }
}
