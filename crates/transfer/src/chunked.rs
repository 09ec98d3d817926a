use std::io::ErrorKind;

use dataplane_protocol::file_data_chunk::Chunk;
use dataplane_protocol::{FileDataChunk, FileDataChunkContent, FileDataChunkHeader, FileMeta, MessageMeta};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::{ChunkSink, ChunkStream, ContentError, FrameKind, TransferError};

// ---------------------------------------------------------------------------
// Sending
// ---------------------------------------------------------------------------

/// Reads `src` into content chunks and sends a valid frame sequence to `dst`:
/// the header first, then `header.chunks` content frames numbered from 0.
///
/// At most `file_meta.size` bytes are read from `src`; any trailing data is
/// left unread. A source that ends before `size` bytes fails with
/// [`TransferError::FailedRead`]. Every frame carries a copy of `meta`.
pub async fn send_chunked_file<R, S>(
    meta: &MessageMeta,
    header: FileDataChunkHeader,
    src: &mut R,
    dst: &mut S,
) -> Result<(), TransferError>
where
    R: AsyncRead + Unpin,
    S: ChunkSink,
{
    let total = validate_header(&header)?;
    let chunk_count = header.chunks;
    let chunk_size = header.chunk_size;

    dst.send(FileDataChunk::header(meta.clone(), header))
        .await
        .map_err(|source| TransferError::Send {
            frame: FrameKind::Header,
            source,
        })?;
    debug!(chunks = chunk_count, chunk_size, size = total, "chunked file header sent");

    // One buffer for the whole transfer, never larger than the file itself.
    let mut buf = vec![0u8; total.min(u64::from(chunk_size)) as usize];
    let mut remaining = total;

    for chunk_id in 0..chunk_count {
        let want = remaining.min(u64::from(chunk_size)) as usize;
        let n = read_full(src, &mut buf[..want])
            .await
            .map_err(TransferError::FailedRead)?;
        remaining -= n as u64;
        if n < want {
            return Err(TransferError::FailedRead(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("source ended with {remaining} of {total} bytes unread"),
            )));
        }

        dst.send(FileDataChunk::content(meta.clone(), chunk_id, buf[..n].to_vec()))
            .await
            .map_err(|source| TransferError::Send {
                frame: FrameKind::Content,
                source,
            })?;
        trace!(chunk_id, len = n, "content chunk sent");
    }

    Ok(())
}

/// Reads until `buf` is full or `src` is exhausted. Returns the bytes read.
async fn read_full<R>(src: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ---------------------------------------------------------------------------
// Receiving
// ---------------------------------------------------------------------------

/// Receives a chunked file from `src` and writes its contents to `dst`.
///
/// Returns the [`FileMeta`] from the header once exactly `file_meta.size`
/// bytes have been written. Chunks must arrive in order; only the last may
/// be shorter than the declared chunk size.
pub async fn recv_chunked_file<S, W>(src: &mut S, dst: &mut W) -> Result<FileMeta, TransferError>
where
    S: ChunkStream,
    W: AsyncWrite + Unpin,
{
    let frame = src.recv().await.map_err(|source| TransferError::Recv {
        frame: FrameKind::Header,
        source,
    })?;

    let header = match frame.and_then(|f| f.chunk) {
        Some(Chunk::Header(header)) => header,
        Some(Chunk::Content(_)) | None => return Err(TransferError::InvalidHeader(None)),
    };

    let total = validate_header(&header)?;
    debug!(
        chunks = header.chunks,
        chunk_size = header.chunk_size,
        size = total,
        "chunked file header received"
    );

    recv_contents(src, dst, header.chunks, header.chunk_size, total).await?;

    Ok(header.file_meta.unwrap_or_default())
}

async fn recv_contents<S, W>(
    src: &mut S,
    dst: &mut W,
    chunk_count: u32,
    chunk_size: u32,
    total: u64,
) -> Result<(), TransferError>
where
    S: ChunkStream,
    W: AsyncWrite + Unpin,
{
    let last_chunk_id = chunk_count - 1;
    let mut remaining = total as i64;

    for chunk_id in 0..chunk_count {
        let frame = src.recv().await.map_err(|source| TransferError::Recv {
            frame: FrameKind::Content,
            source,
        })?;

        let Some(frame) = frame else {
            return Err(ContentError::Shortfall(remaining as u64).into());
        };
        let content = validate_chunk(frame, chunk_size, last_chunk_id, chunk_id)?;
        dst.write_all(&content.data)
            .await
            .map_err(TransferError::Write)?;

        remaining -= content.data.len() as i64;
        if remaining < 0 {
            return Err(ContentError::Overrun(remaining.unsigned_abs()).into());
        }
        trace!(chunk_id, len = content.data.len(), "content chunk written");
    }

    if remaining > 0 {
        return Err(ContentError::Shortfall(remaining as u64).into());
    }

    dst.flush().await.map_err(TransferError::Write)?;
    Ok(())
}

fn validate_chunk(
    frame: FileDataChunk,
    chunk_size: u32,
    last_chunk_id: u32,
    expected: u32,
) -> Result<FileDataChunkContent, ContentError> {
    let content = match frame.chunk {
        Some(Chunk::Content(content)) => content,
        Some(Chunk::Header(_)) | None => return Err(ContentError::NoContent),
    };

    if content.chunk_id != expected {
        return Err(ContentError::ChunkId {
            actual: content.chunk_id,
            expected,
        });
    }
    if content.data.len() != chunk_size as usize && expected != last_chunk_id {
        return Err(ContentError::ChunkSize {
            actual: content.data.len(),
            expected: chunk_size,
        });
    }

    Ok(content)
}

/// Checks the fields every transfer needs and returns the declared size.
fn validate_header(header: &FileDataChunkHeader) -> Result<u64, TransferError> {
    let size = header.file_size();
    if header.chunk_size == 0 || header.chunks == 0 || size <= 0 {
        return Err(TransferError::invalid_header(header));
    }
    Ok(size as u64)
}
