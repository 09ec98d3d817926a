//! Error types for chunked file streams.

use std::fmt;

use dataplane_protocol::FileDataChunkHeader;

/// Which frame of a stream an operation was handling when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Header,
    Content,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Header => f.write_str("header"),
            FrameKind::Content => f.write_str("content"),
        }
    }
}

/// Failure reported by a [`ChunkSink`](crate::ChunkSink) or [`ChunkStream`](crate::ChunkStream).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("stream closed")]
    Closed,

    #[error("cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("{0}")]
    Other(String),
}

/// A structural or accounting violation in received content frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("no content")]
    NoContent,

    #[error("unexpected chunk id {actual}, expected {expected}")]
    ChunkId { actual: u32, expected: u32 },

    #[error("content chunk size {actual}, expected {expected}")]
    ChunkSize { actual: usize, expected: u32 },

    #[error("{0} more data than expected")]
    Overrun(u64),

    #[error("unexpected end of content, {0} left")]
    Shortfall(u64),
}

/// Coarse classification of a [`TransferError`], for mapping onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidHeader,
    Send,
    FailedRead,
    Write,
    UnexpectedContent,
}

/// Errors produced by [`send_chunked_file`](crate::send_chunked_file) and
/// [`recv_chunked_file`](crate::recv_chunked_file).
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// `None` means no header frame arrived at all.
    #[error("invalid header: {}", describe_header(.0.as_deref()))]
    InvalidHeader(Option<Box<FileDataChunkHeader>>),

    #[error("send error: {source} ({frame})")]
    Send {
        frame: FrameKind,
        #[source]
        source: TransportError,
    },

    /// The byte source ended or failed before the declared size was read.
    #[error("failed to read: {0}")]
    FailedRead(#[source] std::io::Error),

    #[error("failed to read: {frame} error {source}")]
    Recv {
        frame: FrameKind,
        #[source]
        source: TransportError,
    },

    #[error("write error: {0}")]
    Write(#[source] std::io::Error),

    #[error("unexpected content: {0}")]
    UnexpectedContent(#[from] ContentError),
}

impl TransferError {
    pub(crate) fn invalid_header(header: &FileDataChunkHeader) -> Self {
        TransferError::InvalidHeader(Some(Box::new(header.clone())))
    }

    /// Returns the kind of failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::InvalidHeader(_) => ErrorKind::InvalidHeader,
            TransferError::Send { .. } => ErrorKind::Send,
            TransferError::FailedRead(_) | TransferError::Recv { .. } => ErrorKind::FailedRead,
            TransferError::Write(_) => ErrorKind::Write,
            TransferError::UnexpectedContent(_) => ErrorKind::UnexpectedContent,
        }
    }
}

fn describe_header(header: Option<&FileDataChunkHeader>) -> String {
    match header {
        None => "no header chunk".to_string(),
        Some(h) => {
            let name = h.file_meta.as_ref().map_or("", |m| m.name.as_str());
            format!(
                "name={name:?} size={} chunks={} chunk_size={}",
                h.file_size(),
                h.chunks,
                h.chunk_size
            )
        }
    }
}
