//! Repository over a captured `ls -la` listing.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use super::{ensure_parent_exists, extension_filter, FilesRepository};
use crate::clock::{Clock, SystemClock};
use crate::error::{io_error_at, RepoError, RepoResult};
use crate::fs::listing::{parse_line, ParsedLine};
use crate::fs::record::nfc;
use crate::fs::{FileCollection, FileRecord};

/// Answers repository queries from a text file with one listing line per entry.
///
/// Every query re-reads the source. Lines that are not file entries
/// (headers such as `total 42`, `.`/`..`, blank lines) are dropped
/// silently; a line with an unknown month aborts the whole query.
#[derive(Debug, Clone)]
pub struct DumpFilesRepository<C: Clock = SystemClock> {
    source: PathBuf,
    clock: C,
}

impl DumpFilesRepository {
    /// Opens `source` using the system clock for year inference.
    ///
    /// # Errors
    ///
    /// [`RepoError::FileNotFound`] if `source` is not an existing file.
    pub fn new(source: impl AsRef<Path>) -> RepoResult<Self> {
        Self::with_clock(source, SystemClock)
    }
}

impl<C: Clock> DumpFilesRepository<C> {
    /// Opens `source`, taking "now" from `clock`.
    pub fn with_clock(source: impl AsRef<Path>, clock: C) -> RepoResult<Self> {
        let source = source.as_ref();
        if !source.is_file() {
            return Err(RepoError::FileNotFound(source.to_path_buf()));
        }
        Ok(Self {
            source: source.to_path_buf(),
            clock,
        })
    }

    /// Path of the listing file.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Parses every line and keeps the records accepted by `keep`, in file order.
    fn scan<F>(&self, keep: F) -> RepoResult<FileCollection>
    where
        F: Fn(&FileRecord) -> bool,
    {
        let file = File::open(&self.source).map_err(|e| io_error_at(e, &self.source))?;
        let now = self.clock.now();
        tracing::debug!(source = %self.source.display(), %now, "scanning listing dump");

        let mut collection = FileCollection::new();
        let mut skipped = 0usize;

        for line in BufReader::new(file).split(b'\n') {
            let line = line?;
            match parse_line(&String::from_utf8_lossy(&line), now)? {
                ParsedLine::Record(record) => {
                    if keep(&record) {
                        collection.add(record);
                    }
                }
                ParsedLine::Skip => skipped += 1,
            }
        }

        tracing::debug!(
            source = %self.source.display(),
            kept = collection.len(),
            skipped,
            "scanned listing dump"
        );
        Ok(collection)
    }
}

impl<C: Clock> FilesRepository for DumpFilesRepository<C> {
    fn get(&self, name: &str) -> RepoResult<FileRecord> {
        let wanted = nfc(name);
        self.scan(|record| record.base_name() == wanted)?
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::FileNotFound(PathBuf::from(name)))
    }

    fn list_all(&self) -> RepoResult<FileCollection> {
        self.scan(|_| true)
    }

    fn list_modified_after(
        &self,
        timestamp: NaiveDateTime,
        extension: Option<&str>,
    ) -> RepoResult<FileCollection> {
        let extension = extension_filter(extension);
        self.scan(|record| {
            record.modified().is_some_and(|m| m > timestamp)
                && extension.map_or(true, |ext| record.extension() == ext)
        })
    }

    /// Copies the listing file itself to `target`.
    ///
    /// Dumping onto the source file itself leaves it untouched.
    fn dump_to_file(&self, target: &Path) -> RepoResult<()> {
        ensure_parent_exists(target)?;
        if is_same_file(&self.source, target) {
            tracing::debug!("dump target {} is the listing itself", target.display());
            return Ok(());
        }

        let mut reader = File::open(&self.source).map_err(|e| io_error_at(e, &self.source))?;
        let mut writer = File::create(target).map_err(|e| io_error_at(e, target))?;
        std::io::copy(&mut reader, &mut writer).map_err(|e| io_error_at(e, target))?;

        tracing::debug!("copied listing {} to {}", self.source.display(), target.display());
        Ok(())
    }
}

/// Whether both paths resolve to the same existing file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
