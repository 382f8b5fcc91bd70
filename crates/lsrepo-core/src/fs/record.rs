//! File record representation.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

/// One file entry, either stat-ed from disk or parsed from a listing line.
///
/// `FileRecord` is immutable. `base_name` is always `name` plus, when the
/// extension is non-empty, `"."` and `extension`.
///
/// # Examples
///
/// ```
/// use lsrepo_core::FileRecord;
///
/// let record = FileRecord::new("reports/summary.csv", None);
/// assert_eq!(record.name(), "summary");
/// assert_eq!(record.extension(), "csv");
/// assert_eq!(record.base_name(), "summary.csv");
/// assert_eq!(record.directory().to_str(), Some("reports"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    name: String,
    directory: PathBuf,
    extension: String,
    base_name: String,
    #[serde(rename = "modifiedDateTime")]
    modified: Option<NaiveDateTime>,
}

impl FileRecord {
    /// Creates a record by splitting `path` into directory, name and extension.
    ///
    /// A bare file name gets `.` as its directory. The file name is
    /// normalised to NFC so names read on macOS compare equal to typed ones.
    pub fn new(path: impl AsRef<Path>, modified: Option<NaiveDateTime>) -> Self {
        let path = path.as_ref();
        let base_name: String = path
            .file_name()
            .map(|n| nfc(&n.to_string_lossy()))
            .unwrap_or_default();
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let (name, extension) = split_base_name(&base_name);

        Self {
            name,
            directory,
            extension,
            base_name,
            modified,
        }
    }

    /// Creates a record from a path and its metadata, taking the mtime in local time.
    pub fn from_metadata(path: impl AsRef<Path>, metadata: &std::fs::Metadata) -> Self {
        let modified = metadata.modified().ok().map(local_naive);
        Self::new(path, modified)
    }

    /// File name without the extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Extension without the leading dot; empty when there is none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Last path component: `name` and `extension` together.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Last-modified time, if known.
    pub fn modified(&self) -> Option<NaiveDateTime> {
        self.modified
    }

    /// `directory` joined with `base_name`. No existence guarantee.
    pub fn full_path(&self) -> PathBuf {
        self.directory.join(&self.base_name)
    }

    /// Returns `true` if something exists at [`full_path`](Self::full_path).
    pub fn exists(&self) -> bool {
        self.full_path().exists()
    }
}

/// Splits a base name into stem and extension.
///
/// Follows `Path::file_stem`/`Path::extension`, except that a trailing dot
/// stays in the name so the pair always recombines into the base name.
fn split_base_name(base_name: &str) -> (String, String) {
    let path = Path::new(base_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) if !ext.is_empty() => (
            stem.to_string_lossy().into_owned(),
            ext.to_string_lossy().into_owned(),
        ),
        _ => (base_name.to_string(), String::new()),
    }
}

/// Normalises a file name to Unicode NFC, the form every record stores.
pub(crate) fn nfc(name: &str) -> String {
    name.nfc().collect()
}

/// Converts a filesystem timestamp to local wall-clock time.
pub(crate) fn local_naive(time: std::time::SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}
