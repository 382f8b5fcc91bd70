//! File repositories: one query contract over two physical back-ends.
//!
//! - [`DirectoryFilesRepository`] queries a live directory.
//! - [`DumpFilesRepository`] queries a text file holding an `ls -la`
//!   capture of a directory.
//!
//! Callers that only need the contract should hold a
//! `Box<dyn FilesRepository>` from [`open_repository`].

pub mod directory;
pub mod dump;

use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::{io_error_at, RepoError, RepoResult};
use crate::fs::{FileCollection, FileRecord};

pub use directory::DirectoryFilesRepository;
pub use dump::DumpFilesRepository;

/// Query contract shared by every back-end.
pub trait FilesRepository {
    /// Returns the record whose base name is `name`.
    ///
    /// # Errors
    ///
    /// [`RepoError::FileNotFound`] when no entry matches.
    fn get(&self, name: &str) -> RepoResult<FileRecord>;

    /// Lists every entry the back-end knows about.
    fn list_all(&self) -> RepoResult<FileCollection>;

    /// Lists entries modified strictly after `timestamp`, optionally only
    /// those with exactly `extension` (case-sensitive, no wildcards).
    /// `Some("")` behaves like `None`.
    fn list_modified_after(
        &self,
        timestamp: NaiveDateTime,
        extension: Option<&str>,
    ) -> RepoResult<FileCollection>;

    /// Writes a listing snapshot of the back-end to `target`.
    ///
    /// # Errors
    ///
    /// [`RepoError::DirectoryNotFound`] if the parent directory of `target`
    /// does not exist. Nothing is written in that case.
    fn dump_to_file(&self, target: &Path) -> RepoResult<()>;
}

impl<R: FilesRepository + ?Sized> FilesRepository for Box<R> {
    fn get(&self, name: &str) -> RepoResult<FileRecord> {
        (**self).get(name)
    }

    fn list_all(&self) -> RepoResult<FileCollection> {
        (**self).list_all()
    }

    fn list_modified_after(
        &self,
        timestamp: NaiveDateTime,
        extension: Option<&str>,
    ) -> RepoResult<FileCollection> {
        (**self).list_modified_after(timestamp, extension)
    }

    fn dump_to_file(&self, target: &Path) -> RepoResult<()> {
        (**self).dump_to_file(target)
    }
}

/// Opens a repository over a live directory.
pub fn open_directory(path: impl AsRef<Path>) -> RepoResult<DirectoryFilesRepository> {
    DirectoryFilesRepository::new(path)
}

/// Opens a repository over a listing dump file.
pub fn open_dump(path: impl AsRef<Path>) -> RepoResult<DumpFilesRepository> {
    DumpFilesRepository::new(path)
}

/// Opens the back-end matching what `path` is: a directory or a dump file.
///
/// # Errors
///
/// - [`RepoError::FileNotFound`] if nothing exists at `path`.
/// - [`RepoError::PermissionDenied`] if it cannot be stat-ed.
pub fn open_repository(path: impl AsRef<Path>) -> RepoResult<Box<dyn FilesRepository>> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|e| io_error_at(e, path))?;
    if metadata.is_dir() {
        Ok(Box::new(DirectoryFilesRepository::new(path)?))
    } else {
        Ok(Box::new(DumpFilesRepository::new(path)?))
    }
}

/// Normalises the optional extension filter.
fn extension_filter(extension: Option<&str>) -> Option<&str> {
    extension.filter(|e| !e.is_empty())
}

/// Fails with `DirectoryNotFound` unless `target`'s parent directory exists.
fn ensure_parent_exists(target: &Path) -> RepoResult<()> {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(RepoError::DirectoryNotFound(parent.to_path_buf()))
        }
        _ => Ok(()),
    }
}
