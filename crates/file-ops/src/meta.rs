//! File metadata as the management plane expects it.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use dataplane_protocol::FileMeta;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::FileOpsError;

/// Permission bits applied when a permission string cannot be parsed.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Returns the base64 (standard alphabet) SHA-256 digest of `content`.
pub fn generate_hash(content: &[u8]) -> String {
    BASE64.encode(Sha256::digest(content))
}

/// Returns the base64 SHA-256 digest of a file, read in fixed-size blocks.
pub async fn generate_file_hash(path: &Path) -> Result<String, FileOpsError> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(BASE64.encode(hasher.finalize()))
}

/// Formats permission bits as an octal string with a leading zero (`0644`).
pub fn permissions_string(mode: u32) -> String {
    let perm = mode & 0o777;
    if perm == 0 {
        "0".to_string()
    } else {
        format!("0{perm:o}")
    }
}

/// Parses an octal permission string, falling back to [`DEFAULT_FILE_MODE`].
pub fn file_mode(permissions: &str) -> u32 {
    u32::from_str_radix(permissions, 8)
        .map(|mode| mode & 0o7777)
        .unwrap_or(DEFAULT_FILE_MODE)
}

/// Collects name, hash, modification time, permissions and size of a file.
pub async fn file_meta(path: &Path) -> Result<FileMeta, FileOpsError> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(FileOpsError::NotAFile(path.display().to_string()));
    }

    let hash = generate_file_hash(path).await?;
    let modified_time = metadata.modified().ok().map(prost_types::Timestamp::from);

    Ok(FileMeta {
        name: path.to_string_lossy().into_owned(),
        hash,
        modified_time,
        permissions: permissions_string(mode_of(&metadata)),
        size: metadata.len() as i64,
    })
}

#[cfg(unix)]
fn mode_of(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn mode_of(metadata: &std::fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        DEFAULT_FILE_MODE
    }
}

/// Applies an octal permission string to `path`. No-op off Unix.
pub async fn apply_permissions(path: &Path, permissions: &str) -> Result<(), FileOpsError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = file_mode(permissions);
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    }
    #[cfg(not(unix))]
    {
        let _ = (path, permissions);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn hash_of_known_content() {
        // sha256("hello world"), base64.
        assert_eq!(
            generate_hash(b"hello world"),
            "uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek="
        );
    }

    #[test]
    fn hash_of_empty_content() {
        assert_eq!(
            generate_hash(b""),
            "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }

    #[tokio::test]
    async fn file_hash_matches_content_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nginx.conf");
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 253) as u8).collect();
        std::fs::File::create(&path).unwrap().write_all(&data).unwrap();

        assert_eq!(generate_file_hash(&path).await.unwrap(), generate_hash(&data));
    }

    #[test]
    fn permissions_round_trip_through_strings() {
        assert_eq!(permissions_string(0o644), "0644");
        assert_eq!(permissions_string(0o100755), "0755");
        assert_eq!(permissions_string(0), "0");
        assert_eq!(file_mode("0644"), 0o644);
        assert_eq!(file_mode("600"), 0o600);
    }

    #[test]
    fn unparsable_permissions_use_default() {
        assert_eq!(file_mode(""), DEFAULT_FILE_MODE);
        assert_eq!(file_mode("-rw-r--r--"), DEFAULT_FILE_MODE);
        assert_eq!(file_mode("0999"), DEFAULT_FILE_MODE);
    }

    #[tokio::test]
    async fn file_meta_describes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mime.types");
        std::fs::write(&path, b"types { text/html html; }").unwrap();

        let meta = file_meta(&path).await.unwrap();
        assert_eq!(meta.name, path.to_string_lossy());
        assert_eq!(meta.size, 25);
        assert_eq!(meta.hash, generate_hash(b"types { text/html html; }"));
        assert!(meta.modified_time.is_some());
        assert!(meta.permissions.starts_with('0'));
    }

    #[tokio::test]
    async fn file_meta_rejects_directories() {
        let dir = TempDir::new().unwrap();
        let err = file_meta(dir.path()).await.unwrap_err();
        assert!(matches!(err, FileOpsError::NotAFile(_)));
    }

    #[tokio::test]
    async fn file_meta_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = file_meta(&dir.path().join("missing")).await.unwrap_err();
        assert!(matches!(err, FileOpsError::Io(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn apply_permissions_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.pem");
        std::fs::write(&path, b"secret").unwrap();

        apply_permissions(&path, "0600").await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
