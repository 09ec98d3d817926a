//! Wire types for chunked file streams between the agent and the management plane.
//!
//! The messages are hand-maintained prost types mirroring `proto/files.proto`,
//! so they encode bit-for-bit like the management plane's generated code.

pub mod envelope;
pub mod file;

pub use envelope::{MessageMeta, generate_message_id};
pub use file::{FileDataChunk, FileDataChunkContent, FileDataChunkHeader, FileMeta, file_data_chunk};

/// Errors produced when building protocol messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("file size must be greater than zero, got {0}")]
    InvalidFileSize(i64),

    #[error("{size} bytes in chunks of {chunk_size} exceeds the maximum chunk count")]
    ChunkCountOverflow { size: u64, chunk_size: u32 },
}
