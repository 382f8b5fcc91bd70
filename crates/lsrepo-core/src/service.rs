//! Application service over a files repository.

use std::path::Path;

use crate::error::RepoResult;
use crate::repository::FilesRepository;

/// Exposes repository operations to application code.
///
/// The repository is injected at construction and owned by the service;
/// any back-end works, including a `Box<dyn FilesRepository>`.
#[derive(Debug, Clone)]
pub struct FilesService<R> {
    files: R,
}

impl<R: FilesRepository> FilesService<R> {
    pub fn new(files: R) -> Self {
        Self { files }
    }

    /// Writes a listing snapshot of the underlying source to `target`.
    pub fn dump_to_file(&self, target: &Path) -> RepoResult<()> {
        self.files.dump_to_file(target)
    }

    /// The wrapped repository.
    pub fn repository(&self) -> &R {
        &self.files
    }

    pub fn into_inner(self) -> R {
        self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{open_directory, open_repository, DumpFilesRepository};
    use crate::RepoError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn dump_to_file_delegates_to_directory_backend() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        let out = TempDir::new().unwrap();
        let target = out.path().join("dump.txt");

        let service = FilesService::new(open_directory(tmp.path()).unwrap());
        service.dump_to_file(&target).unwrap();

        assert!(fs::read_to_string(&target).unwrap().contains(" a.txt"));
    }

    #[test]
    fn dump_to_file_delegates_to_dump_backend() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.txt");
        fs::write(&source, "total 0\n").unwrap();
        let target = tmp.path().join("copy.txt");

        let service = FilesService::new(DumpFilesRepository::new(&source).unwrap());
        service.dump_to_file(&target).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "total 0\n");
        assert_eq!(service.repository().source(), source.as_path());
    }

    #[test]
    fn dump_to_file_propagates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let service = FilesService::new(open_repository(tmp.path()).unwrap());

        let err = service
            .dump_to_file(&tmp.path().join("missing").join("dump.txt"))
            .unwrap_err();
        assert!(matches!(err, RepoError::DirectoryNotFound(_)));
    }

    #[test]
    fn into_inner_returns_repository() {
        let tmp = TempDir::new().unwrap();
        let service = FilesService::new(open_directory(tmp.path()).unwrap());
        let repo = service.into_inner();
        assert_eq!(repo.directory(), tmp.path());
    }
}
