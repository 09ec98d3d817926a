//! Whole-file operations on top of the chunked transfer core.
//!
//! Computes file metadata the way the management plane expects it (base64
//! SHA-256 hashes, octal permission strings), enforces the allowed-directory
//! policy, and moves files between disk and chunk streams.

mod config;
mod meta;
mod policy;
mod streamer;

pub use config::{
    ConfigError, DEFAULT_FILE_CHUNK_SIZE, DEFAULT_MAX_FILE_SIZE, MAX_FILE_CHUNK_SIZE, TransferConfig,
};
pub use meta::{
    DEFAULT_FILE_MODE, apply_permissions, file_meta, file_mode, generate_file_hash, generate_hash,
    permissions_string,
};
pub use policy::check_allowed;
pub use streamer::FileStreamer;

use dataplane_protocol::ProtocolError;
use dataplane_transfer::TransferError;

/// Errors produced by file-level operations.
#[derive(Debug, thiserror::Error)]
pub enum FileOpsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    NotAllowed(String),

    #[error("not a regular file: {0}")]
    NotAFile(String),

    #[error("file hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}
