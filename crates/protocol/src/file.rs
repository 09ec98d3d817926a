use prost_types::Timestamp;

use crate::{MessageMeta, ProtocolError};

/// Name, hash and attributes of a file on the data plane.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileMeta {
    /// Full path of the file.
    #[prost(string, tag = "1")]
    pub name: String,
    /// Base64 SHA-256 of the file contents.
    #[prost(string, tag = "2")]
    pub hash: String,
    #[prost(message, optional, tag = "3")]
    pub modified_time: Option<Timestamp>,
    /// Octal permission string, e.g. `0644`.
    #[prost(string, tag = "4")]
    pub permissions: String,
    /// Size in bytes. Authoritative for chunked transfers.
    #[prost(int64, tag = "5")]
    pub size: i64,
}

/// One frame of a chunked file stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileDataChunk {
    #[prost(message, optional, tag = "1")]
    pub meta: Option<MessageMeta>,
    #[prost(oneof = "file_data_chunk::Chunk", tags = "2, 3")]
    pub chunk: Option<file_data_chunk::Chunk>,
}

/// Nested types for [`FileDataChunk`].
pub mod file_data_chunk {
    /// Payload of a frame: the stream header or one content chunk.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Chunk {
        #[prost(message, tag = "2")]
        Header(super::FileDataChunkHeader),
        #[prost(message, tag = "3")]
        Content(super::FileDataChunkContent),
    }
}

/// First frame of a stream: what is being sent and how it is cut up.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileDataChunkHeader {
    #[prost(message, optional, tag = "1")]
    pub file_meta: Option<FileMeta>,
    /// Number of content frames that follow.
    #[prost(uint32, tag = "2")]
    pub chunks: u32,
    /// Payload length of every content frame except the last.
    #[prost(uint32, tag = "3")]
    pub chunk_size: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileDataChunkContent {
    /// Zero-based sequence number.
    #[prost(uint32, tag = "1")]
    pub chunk_id: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

impl FileDataChunkHeader {
    /// Builds the header for sending `file_meta` in `chunk_size` pieces.
    ///
    /// The chunk count is `ceil(size / chunk_size)`.
    pub fn for_file(file_meta: FileMeta, chunk_size: u32) -> Result<Self, ProtocolError> {
        if chunk_size == 0 {
            return Err(ProtocolError::ZeroChunkSize);
        }
        if file_meta.size <= 0 {
            return Err(ProtocolError::InvalidFileSize(file_meta.size));
        }

        let size = file_meta.size as u64;
        let chunks = size.div_ceil(u64::from(chunk_size));
        let chunks = u32::try_from(chunks)
            .map_err(|_| ProtocolError::ChunkCountOverflow { size, chunk_size })?;

        Ok(Self {
            file_meta: Some(file_meta),
            chunks,
            chunk_size,
        })
    }

    /// Declared file size, or 0 when the header carries no file metadata.
    pub fn file_size(&self) -> i64 {
        self.file_meta.as_ref().map_or(0, |m| m.size)
    }
}

impl FileDataChunk {
    /// Wraps a header in a frame.
    pub fn header(meta: MessageMeta, header: FileDataChunkHeader) -> Self {
        Self {
            meta: Some(meta),
            chunk: Some(file_data_chunk::Chunk::Header(header)),
        }
    }

    /// Wraps one content chunk in a frame.
    pub fn content(meta: MessageMeta, chunk_id: u32, data: Vec<u8>) -> Self {
        Self {
            meta: Some(meta),
            chunk: Some(file_data_chunk::Chunk::Content(FileDataChunkContent {
                chunk_id,
                data,
            })),
        }
    }

    /// Returns the header payload, if this is a header frame.
    pub fn as_header(&self) -> Option<&FileDataChunkHeader> {
        match &self.chunk {
            Some(file_data_chunk::Chunk::Header(h)) => Some(h),
            Some(file_data_chunk::Chunk::Content(_)) | None => None,
        }
    }

    /// Returns the content payload, if this is a content frame.
    pub fn as_content(&self) -> Option<&FileDataChunkContent> {
        match &self.chunk {
            Some(file_data_chunk::Chunk::Content(c)) => Some(c),
            Some(file_data_chunk::Chunk::Header(_)) | None => None,
        }
    }
}
