//! Transfer settings.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! ```toml
//! file_chunk_size = 524288
//! max_file_size = 1048576
//! allowed_directories = ["/etc/nginx"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::policy;

/// Default bytes per content frame (512 KiB).
pub const DEFAULT_FILE_CHUNK_SIZE: u32 = 512 * 1024;

/// Default largest file sent in a single unary request (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Largest accepted chunk size (4 MiB). A full content frame plus its
/// envelope stays under [`DEFAULT_MAX_FRAME_LENGTH`](dataplane_transfer::DEFAULT_MAX_FRAME_LENGTH).
pub const MAX_FILE_CHUNK_SIZE: u32 = 4 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {path}: {1}", path = display_path(.0))]
    ParseFailed(Option<PathBuf>, toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<inline>".into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Bytes carried by each content frame.
    #[serde(default = "default_file_chunk_size")]
    pub file_chunk_size: u32,
    /// Files larger than this are streamed in chunks.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Directories files may be written under. Empty = unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_directories: Vec<PathBuf>,
}

fn default_file_chunk_size() -> u32 {
    DEFAULT_FILE_CHUNK_SIZE
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            file_chunk_size: default_file_chunk_size(),
            max_file_size: default_max_file_size(),
            allowed_directories: Vec::new(),
        }
    }
}

impl TransferConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::ParseFailed(None, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists (defaults otherwise), then applies
    /// `DATAPLANE_*` environment overrides and validates the result.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
            toml::from_str(&text)
                .map_err(|e| ConfigError::ParseFailed(Some(path.to_path_buf()), e))?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies `DATAPLANE_FILE_CHUNK_SIZE` / `DATAPLANE_MAX_FILE_SIZE` as
    /// returned by `get`. Values that do not parse are ignored.
    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = parse_override(&get, "DATAPLANE_FILE_CHUNK_SIZE") {
            self.file_chunk_size = v;
        }
        if let Some(v) = parse_override(&get, "DATAPLANE_MAX_FILE_SIZE") {
            self.max_file_size = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_chunk_size == 0 {
            return Err(ConfigError::Invalid("file_chunk_size must be positive".into()));
        }
        if self.file_chunk_size > MAX_FILE_CHUNK_SIZE {
            return Err(ConfigError::Invalid(format!(
                "file_chunk_size {} exceeds maximum {MAX_FILE_CHUNK_SIZE}",
                self.file_chunk_size
            )));
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::Invalid("max_file_size must be positive".into()));
        }
        for dir in &self.allowed_directories {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "allowed directory must be absolute: {}",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Whether a file of `size` bytes must be streamed rather than sent whole.
    pub fn requires_streaming(&self, size: u64) -> bool {
        size > self.max_file_size
    }

    pub fn is_allowed(&self, path: &Path) -> bool {
        policy::check_allowed(path, &self.allowed_directories).is_ok()
    }
}

fn parse_override<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    get(key)?.trim().parse().ok()
}
