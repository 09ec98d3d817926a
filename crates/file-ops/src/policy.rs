use std::path::{Component, Path, PathBuf};

use crate::FileOpsError;

/// Checks that `path` is an absolute file path inside one of `allowed`.
///
/// Rejects:
/// - Relative paths
/// - Parent directory traversal (`..`)
/// - Paths with no file name component
/// - Paths outside every allowed directory (when any are configured)
///
/// Matching is lexical; symlinks are not resolved.
pub fn check_allowed(path: &Path, allowed: &[PathBuf]) -> Result<(), FileOpsError> {
    if !path.is_absolute() {
        return Err(FileOpsError::NotAllowed(format!(
            "relative path not allowed: {}",
            path.display()
        )));
    }

    for component in path.components() {
        if let Component::ParentDir = component {
            return Err(FileOpsError::NotAllowed(format!(
                "parent directory traversal not allowed: {}",
                path.display()
            )));
        }
    }

    if path.file_name().is_none() {
        return Err(FileOpsError::NotAllowed(format!(
            "not a file path: {}",
            path.display()
        )));
    }

    if allowed.is_empty() || allowed.iter().any(|dir| path.starts_with(dir)) {
        return Ok(());
    }

    Err(FileOpsError::NotAllowed(format!(
        "outside allowed directories: {}",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nginx() -> Vec<PathBuf> {
        vec![PathBuf::from("/etc/nginx"), PathBuf::from("/var/www")]
    }

    #[test]
    fn accepts_paths_under_allowed_directory() {
        assert!(check_allowed(Path::new("/etc/nginx/nginx.conf"), &nginx()).is_ok());
        assert!(check_allowed(Path::new("/var/www/html/index.html"), &nginx()).is_ok());
    }

    #[test]
    fn rejects_sibling_with_common_prefix() {
        // Component-wise match: /etc/nginx-old is not under /etc/nginx.
        assert!(check_allowed(Path::new("/etc/nginx-old/nginx.conf"), &nginx()).is_err());
    }

    #[test]
    fn rejects_paths_outside() {
        let err = check_allowed(Path::new("/etc/shadow"), &nginx()).unwrap_err();
        assert!(err.to_string().contains("outside allowed directories"));
    }

    #[test]
    fn rejects_parent_dir_traversal() {
        let err = check_allowed(Path::new("/etc/nginx/../shadow"), &nginx()).unwrap_err();
        assert!(err.to_string().contains("traversal"));
    }

    #[test]
    fn rejects_relative_path() {
        assert!(check_allowed(Path::new("nginx.conf"), &[]).is_err());
    }

    #[test]
    fn rejects_root() {
        assert!(check_allowed(Path::new("/"), &[]).is_err());
    }

    #[test]
    fn empty_allow_list_is_unrestricted() {
        assert!(check_allowed(Path::new("/opt/app/config.yaml"), &[]).is_ok());
    }
}
