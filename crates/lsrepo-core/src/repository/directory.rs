//! Repository over a live directory.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};

use super::{ensure_parent_exists, extension_filter, FilesRepository};
use crate::clock::{Clock, SystemClock};
use crate::error::{io_error_at, RepoError, RepoResult};
use crate::fs::listing::ListingEntry;
use crate::fs::record::{local_naive, nfc};
use crate::fs::{FileCollection, FileRecord};

/// Maximum recursion depth for modification-time searches, guarding against symlink loops.
const MAX_WALK_DEPTH: usize = 64;

/// Answers repository queries by reading a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryFilesRepository<C: Clock = SystemClock> {
    directory: PathBuf,
    clock: C,
}

impl DirectoryFilesRepository {
    /// Opens `directory` using the system clock.
    ///
    /// # Errors
    ///
    /// [`RepoError::DirectoryNotFound`] if `directory` does not exist or
    /// is not a directory.
    pub fn new(directory: impl AsRef<Path>) -> RepoResult<Self> {
        Self::with_clock(directory, SystemClock)
    }
}

impl<C: Clock> DirectoryFilesRepository<C> {
    /// Opens `directory`, taking "now" from `clock`.
    pub fn with_clock(directory: impl AsRef<Path>, clock: C) -> RepoResult<Self> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(RepoError::DirectoryNotFound(directory.to_path_buf()));
        }
        Ok(Self {
            directory: directory.to_path_buf(),
            clock,
        })
    }

    /// The backing directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn read_dir(&self) -> RepoResult<std::fs::ReadDir> {
        std::fs::read_dir(&self.directory).map_err(|e| match io_error_at(e, &self.directory) {
            RepoError::FileNotFound(p) => RepoError::DirectoryNotFound(p),
            other => other,
        })
    }

    /// Captures every child of the directory as `ls -la` would show it, sorted by name.
    fn listing_entries(&self) -> RepoResult<Vec<ListingEntry>> {
        let mut entries = Vec::new();
        for dir_entry in self.read_dir()? {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let path = dir_entry.path();
            let metadata = match std::fs::symlink_metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            entries.push(ListingEntry::from_metadata(&path, &name, &metadata));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

impl<C: Clock> FilesRepository for DirectoryFilesRepository<C> {
    /// Looks `name` up as given, then in NFC form if the two differ.
    fn get(&self, name: &str) -> RepoResult<FileRecord> {
        let normalized = nfc(name);
        let mut candidates = vec![name];
        if normalized != name {
            candidates.push(&normalized);
        }

        for candidate in candidates {
            let path = self.directory.join(candidate);
            match std::fs::metadata(&path) {
                Ok(metadata) => return Ok(FileRecord::from_metadata(path, &metadata)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(io_error_at(e, &path)),
            }
        }
        Err(RepoError::FileNotFound(PathBuf::from(name)))
    }

    /// Lists the immediate children, files and directories alike, skipping
    /// dot-files the way a shell `*` glob does. Sorted by name.
    fn list_all(&self) -> RepoResult<FileCollection> {
        let mut records = Vec::new();
        for dir_entry in self.read_dir()? {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            if dir_entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = dir_entry.path();
            match std::fs::metadata(&path) {
                Ok(metadata) => records.push(FileRecord::from_metadata(path, &metadata)),
                Err(e) => tracing::warn!("skipping {}: {}", path.display(), e),
            }
        }
        records.sort_by(|a, b| a.base_name().cmp(b.base_name()));

        tracing::debug!(
            directory = %self.directory.display(),
            count = records.len(),
            "listed directory"
        );
        Ok(records.into())
    }

    /// Walks the tree below the directory, hidden entries included.
    ///
    /// The threshold has minute granularity: the gap between `timestamp`
    /// and now is truncated to whole minutes, and entries modified after
    /// `now` minus that gap are kept. Results are sorted by path.
    fn list_modified_after(
        &self,
        timestamp: NaiveDateTime,
        extension: Option<&str>,
    ) -> RepoResult<FileCollection> {
        let now = self.clock.now();
        let cutoff = now - Duration::minutes((now - timestamp).num_minutes());
        let extension = extension_filter(extension);

        let mut records = Vec::new();
        collect_modified_recursive(
            &self.directory,
            MAX_WALK_DEPTH,
            &|record: &FileRecord| {
                record.modified().is_some_and(|m| m > cutoff)
                    && extension.map_or(true, |ext| record.extension() == ext)
            },
            &mut records,
        );
        records.sort_by_key(FileRecord::full_path);

        tracing::debug!(
            directory = %self.directory.display(),
            %cutoff,
            count = records.len(),
            "searched directory for modified entries"
        );
        Ok(records.into())
    }

    /// Writes an `ls -la` style snapshot of the directory to `target`.
    fn dump_to_file(&self, target: &Path) -> RepoResult<()> {
        ensure_parent_exists(target)?;

        let now = self.clock.now();
        let mut entries = Vec::new();
        for (name, path) in [(".", self.directory.clone()), ("..", self.directory.join(".."))] {
            if let Ok(metadata) = std::fs::metadata(&path) {
                entries.push(ListingEntry::from_metadata(&path, name, &metadata));
            }
        }
        entries.extend(self.listing_entries()?);

        let blocks: u64 = entries.iter().map(|e| e.size.div_ceil(1024)).sum();
        let width = entries
            .iter()
            .map(|e| e.size.to_string().len())
            .max()
            .unwrap_or(1);

        let mut out = format!("total {blocks}\n");
        for entry in &entries {
            out.push_str(&entry.render(now, width));
            out.push('\n');
        }

        std::fs::write(target, out).map_err(|e| io_error_at(e, target))?;
        tracing::debug!(
            "wrote listing of {} ({} entries) to {}",
            self.directory.display(),
            entries.len(),
            target.display()
        );
        Ok(())
    }
}

/// Collects matching entries (files and directories) below `dir`.
///
/// Unreadable directories and entries are skipped.
fn collect_modified_recursive(
    dir: &Path,
    depth_remaining: usize,
    keep: &dyn Fn(&FileRecord) -> bool,
    out: &mut Vec<FileRecord>,
) {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::warn!("cannot read {}: {}", dir.display(), e);
            return;
        }
    };

    for dir_entry in read_dir {
        let dir_entry = match dir_entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let metadata = match dir_entry.metadata() {
            Ok(m) => m,
            Err(_) => continue,
        };

        let entry_path = dir_entry.path();
        let modified = metadata.modified().ok().map(local_naive);
        let record = FileRecord::new(&entry_path, modified);
        if keep(&record) {
            out.push(record);
        }

        if metadata.is_dir() && depth_remaining > 0 {
            collect_modified_recursive(&entry_path, depth_remaining - 1, keep, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::fs::listing::{parse_line, ParsedLine};
    use std::fs;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn names(collection: &FileCollection) -> Vec<&str> {
        collection.iter().map(FileRecord::base_name).collect()
    }

    /// Directory with two visible files, one hidden file and a nested file.
    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file1.txt"), "one").unwrap();
        fs::write(tmp.path().join("file2.csv"), "two").unwrap();
        fs::write(tmp.path().join(".hidden.txt"), "h").unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested").join("deep.txt"), "d").unwrap();
        tmp
    }

    fn hour_ago() -> NaiveDateTime {
        local_naive(SystemTime::now()) - Duration::hours(1)
    }

    #[test]
    fn new_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("NonExistingDir");
        let err = DirectoryFilesRepository::new(&missing).unwrap_err();
        assert!(matches!(err, RepoError::DirectoryNotFound(p) if p == missing));
    }

    #[test]
    fn new_rejects_regular_file() {
        let tmp = fixture();
        let err = DirectoryFilesRepository::new(tmp.path().join("file1.txt")).unwrap_err();
        assert!(matches!(err, RepoError::DirectoryNotFound(_)));
    }

    #[test]
    fn get_existing_file() {
        let tmp = fixture();
        let repo = DirectoryFilesRepository::new(tmp.path()).unwrap();

        let record = repo.get("file1.txt").unwrap();
        assert_eq!(record.base_name(), "file1.txt");
        assert_eq!(record.directory(), tmp.path());
        assert!(record.modified().is_some());
    }

    #[test]
    fn get_nested_relative_name() {
        let tmp = fixture();
        let repo = DirectoryFilesRepository::new(tmp.path()).unwrap();
        let record = repo.get("nested/deep.txt").unwrap();
        assert_eq!(record.directory(), tmp.path().join("nested"));
    }

    #[test]
    fn get_missing_file_fails() {
        let tmp = fixture();
        let repo = DirectoryFilesRepository::new(tmp.path()).unwrap();

        let err = repo.get("non-existing-file.txt").unwrap_err();
        assert!(matches!(err, RepoError::FileNotFound(ref p) if p == Path::new("non-existing-file.txt")));
        assert!(repo.get("file1.txt").is_ok());
    }

    #[test]
    fn get_matches_decomposed_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("caf\u{e9}.txt"), "c").unwrap();
        let repo = DirectoryFilesRepository::new(tmp.path()).unwrap();

        let record = repo.get("cafe\u{301}.txt").unwrap();
        assert_eq!(record.base_name(), "caf\u{e9}.txt");
        assert!(matches!(
            repo.get("nai\u{308}ve.txt"),
            Err(RepoError::FileNotFound(ref p)) if p == Path::new("nai\u{308}ve.txt")
        ));
    }

    #[test]
    fn list_all_empty_directory() {
        let tmp = TempDir::new().unwrap();
        let repo = DirectoryFilesRepository::new(tmp.path()).unwrap();
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn list_all_skips_hidden_and_sorts() {
        let tmp = fixture();
        let repo = DirectoryFilesRepository::new(tmp.path()).unwrap();

        let files = repo.list_all().unwrap();
        assert_eq!(names(&files), vec!["file1.txt", "file2.csv", "nested"]);
        assert!(files.iter().all(|f| f.modified().is_some()));
    }

    #[test]
    fn list_modified_after_walks_tree() {
        let tmp = fixture();
        let repo = DirectoryFilesRepository::new(tmp.path()).unwrap();

        let files = repo.list_modified_after(hour_ago(), None).unwrap();
        let mut found = names(&files);
        found.sort_unstable();
        assert_eq!(
            found,
            vec![".hidden.txt", "deep.txt", "file1.txt", "file2.csv", "nested"]
        );
    }

    #[test]
    fn list_modified_after_with_extension() {
        let tmp = fixture();
        let repo = DirectoryFilesRepository::new(tmp.path()).unwrap();

        let files = repo.list_modified_after(hour_ago(), Some("txt")).unwrap();
        let mut found = names(&files);
        found.sort_unstable();
        assert_eq!(found, vec![".hidden.txt", "deep.txt", "file1.txt"]);
        assert!(files.first().unwrap().modified().is_some());

        let csv = repo.list_modified_after(hour_ago(), Some("csv")).unwrap();
        assert_eq!(names(&csv), vec!["file2.csv"]);
    }

    #[test]
    fn list_modified_after_future_timestamp_is_empty() {
        let tmp = fixture();
        let repo = DirectoryFilesRepository::new(tmp.path()).unwrap();
        let tomorrow = local_naive(SystemTime::now()) + Duration::days(1);
        assert!(repo.list_modified_after(tomorrow, None).unwrap().is_empty());
    }

    #[test]
    fn list_modified_after_uses_injected_clock() {
        let tmp = fixture();
        let far_future = local_naive(SystemTime::now()) + Duration::days(365);
        let repo = DirectoryFilesRepository::with_clock(tmp.path(), FixedClock(far_future)).unwrap();

        // Ten minutes before "now" on the frozen clock: nothing on disk is that recent.
        let files = repo
            .list_modified_after(far_future - Duration::minutes(10), None)
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn dump_to_file_missing_directory_writes_nothing() {
        let tmp = fixture();
        let repo = DirectoryFilesRepository::new(tmp.path()).unwrap();
        let target = tmp.path().join("NonExistingDirectory").join("dump.txt");

        let err = repo.dump_to_file(&target).unwrap_err();
        assert!(matches!(err, RepoError::DirectoryNotFound(_)));
        assert!(!target.exists());
    }

    #[test]
    fn dump_to_file_writes_ls_style_snapshot() {
        let tmp = fixture();
        let out = TempDir::new().unwrap();
        let target = out.path().join("dump.txt");
        let repo = DirectoryFilesRepository::new(tmp.path()).unwrap();

        repo.dump_to_file(&target).unwrap();

        let text = fs::read_to_string(&target).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("total "));
        assert!(text.ends_with('\n'));
        assert!(lines[1].ends_with(" ."));
        assert!(lines[2].ends_with(" .."));
        assert!(lines.iter().any(|l| l.starts_with('d') && l.ends_with(" nested")));
        assert!(lines.iter().any(|l| l.ends_with(" .hidden.txt")));

        let now = local_naive(SystemTime::now());
        let parsed: Vec<String> = lines
            .iter()
            .filter_map(|l| match parse_line(l, now).unwrap() {
                ParsedLine::Record(r) => Some(r.base_name().to_string()),
                ParsedLine::Skip => None,
            })
            .collect();
        assert!(parsed.contains(&"file1.txt".to_string()));
        assert!(parsed.contains(&"file2.csv".to_string()));
        assert!(parsed.contains(&".hidden.txt".to_string()));
    }
}
