//! Chunked file transfer over header/content frame streams.
//!
//! A transfer is one [`FileDataChunkHeader`](dataplane_protocol::FileDataChunkHeader)
//! frame followed by `chunks` content frames numbered from 0. Every content
//! frame carries exactly `chunk_size` bytes except the last, and the content
//! lengths add up to the declared file size.
//!
//! The core ([`send_chunked_file`], [`recv_chunked_file`]) only needs the
//! [`ChunkSink`] / [`ChunkStream`] capabilities, so it runs unchanged over a
//! gRPC stream, the in-memory [`chunk_channel`] or a length-delimited byte
//! stream ([`FramedSink`], [`FramedStream`]).

mod channel;
mod chunked;
mod error;
mod framed;
mod stream;

pub use channel::{ChannelSink, ChannelStream, chunk_channel};
pub use chunked::{recv_chunked_file, send_chunked_file};
pub use error::{ContentError, ErrorKind, FrameKind, TransferError, TransportError};
pub use framed::{DEFAULT_MAX_FRAME_LENGTH, FramedSink, FramedStream};
pub use stream::{ChunkSink, ChunkStream};
