//! Error types for `lsrepo-core`.
//!
//! All fallible operations in the library return [`RepoResult<T>`],
//! which is an alias for `Result<T, RepoError>`.

use std::path::PathBuf;

/// Unified error type for repository, parsing and configuration operations.
///
/// Each variant carries the path, name or token that caused it so the
/// caller can show a meaningful message without extra context.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A requested file (or a listing record with that name) does not exist.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// A source or target directory does not exist.
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The configuration has no connection with this name.
    #[error("connection not found: {0}")]
    ConnectionNotFound(String),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A listing line had the right shape but an unusable date.
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),

    /// A configuration file could not be parsed or lacks required keys.
    #[error("invalid configuration file: {0}")]
    InvalidConfiguration(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RepoError {
    /// Returns `true` for the "not found" family of errors.
    ///
    /// These are caller errors: the repository stays usable afterwards.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RepoError::FileNotFound(_)
                | RepoError::DirectoryNotFound(_)
                | RepoError::ConnectionNotFound(_)
        )
    }
}

/// Convenience alias used throughout `lsrepo-core`.
pub type RepoResult<T> = Result<T, RepoError>;

/// Maps an I/O error on `path` to the most specific [`RepoError`].
pub(crate) fn io_error_at(err: std::io::Error, path: &std::path::Path) -> RepoError {
    match err.kind() {
        std::io::ErrorKind::NotFound => RepoError::FileNotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => RepoError::PermissionDenied(path.to_path_buf()),
        _ => RepoError::Io(err),
    }
}
