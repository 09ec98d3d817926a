//! Streams whole files between disk and a chunk stream.

use std::path::{Path, PathBuf};

use dataplane_protocol::{FileDataChunkHeader, FileMeta, MessageMeta};
use dataplane_transfer::{ChunkSink, ChunkStream, recv_chunked_file, send_chunked_file};
use tokio::io::{BufReader, BufWriter};
use tracing::{debug, info, warn};

use crate::config::TransferConfig;
use crate::meta::{apply_permissions, file_meta, generate_file_hash};
use crate::{FileOpsError, policy};

/// Sends files from disk and receives them into place, using one
/// [`TransferConfig`] for chunk size and destination policy.
#[derive(Debug, Clone)]
pub struct FileStreamer {
    config: TransferConfig,
}

impl FileStreamer {
    pub fn new(config: TransferConfig) -> Result<Self, FileOpsError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Streams the file at `path` to `sink`: one header frame, then content
    /// frames of the configured chunk size.
    ///
    /// Returns the metadata announced in the header.
    pub async fn send_file<S: ChunkSink>(
        &self,
        meta: &MessageMeta,
        path: &Path,
        sink: &mut S,
    ) -> Result<FileMeta, FileOpsError> {
        let file_meta = file_meta(path).await?;
        let header = FileDataChunkHeader::for_file(file_meta.clone(), self.config.file_chunk_size)?;

        info!(
            path = %path.display(),
            size = file_meta.size,
            chunks = header.chunks,
            correlation_id = %meta.correlation_id,
            "sending file"
        );

        let file = tokio::fs::File::open(path).await?;
        let mut reader = BufReader::new(file);
        send_chunked_file(meta, header, &mut reader, sink).await?;

        debug!(path = %path.display(), "file sent");
        Ok(file_meta)
    }

    /// Receives a chunked file from `stream` and installs it at `dest`.
    ///
    /// The content lands in a hidden sibling of `dest` first; `dest` is only
    /// replaced once every chunk arrived and the declared hash (if any)
    /// matches. On failure `dest` is left untouched.
    pub async fn recv_file<S: ChunkStream>(
        &self,
        stream: &mut S,
        dest: &Path,
    ) -> Result<FileMeta, FileOpsError> {
        policy::check_allowed(dest, &self.config.allowed_directories)?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = temp_path(dest);
        let result = match receive_into(stream, &tmp).await {
            Ok(meta) => tokio::fs::rename(&tmp, dest)
                .await
                .map(|()| meta)
                .map_err(FileOpsError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(meta) => {
                info!(
                    path = %dest.display(),
                    size = meta.size,
                    "file received"
                );
                Ok(meta)
            }
            Err(e) => {
                remove_temp(&tmp).await;
                Err(e)
            }
        }
    }
}

async fn receive_into<S: ChunkStream>(stream: &mut S, tmp: &Path) -> Result<FileMeta, FileOpsError> {
    let file = tokio::fs::File::create(tmp).await?;
    let mut writer = BufWriter::new(file);
    let meta = recv_chunked_file(stream, &mut writer).await?;
    writer.into_inner().sync_all().await?;

    if !meta.hash.is_empty() {
        let actual = generate_file_hash(tmp).await?;
        if actual != meta.hash {
            return Err(FileOpsError::HashMismatch {
                expected: meta.hash,
                actual,
            });
        }
    }

    if !meta.permissions.is_empty() {
        apply_permissions(tmp, &meta.permissions).await?;
    }

    Ok(meta)
}

async fn remove_temp(tmp: &Path) {
    match tokio::fs::remove_file(tmp).await {
        Ok(()) => debug!(path = %tmp.display(), "removed partial file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %tmp.display(), error = %e, "failed to remove partial file"),
    }
}

fn temp_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.{}.part", uuid::Uuid::new_v4().simple()))
}
