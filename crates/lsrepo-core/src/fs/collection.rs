//! Ordered collections of [`FileRecord`]s.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::fs::record::FileRecord;

/// An ordered list of file records produced by one repository query.
///
/// Insertion order is preserved and duplicates are allowed: several
/// records may share a name or a timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FileCollection {
    records: Vec<FileRecord>,
}

impl FileCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record, returning `self` for chaining.
    pub fn add(&mut self, record: FileRecord) -> &mut Self {
        self.records.push(record);
        self
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first record in insertion order.
    #[must_use]
    pub fn first(&self) -> Option<&FileRecord> {
        self.records.first()
    }

    /// The record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FileRecord> {
        self.records.get(index)
    }

    /// Iterates over the records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[FileRecord] {
        &self.records
    }

    /// The latest modification time among the records.
    ///
    /// Records without a timestamp are ignored; returns `None` when no
    /// record has one (including the empty collection).
    #[must_use]
    pub fn max_modified_time(&self) -> Option<NaiveDateTime> {
        self.records.iter().filter_map(FileRecord::modified).max()
    }
}

impl From<Vec<FileRecord>> for FileCollection {
    fn from(records: Vec<FileRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<FileRecord> for FileCollection {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<FileRecord> for FileCollection {
    fn extend<I: IntoIterator<Item = FileRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl IntoIterator for FileCollection {
    type Item = FileRecord;
    type IntoIter = std::vec::IntoIter<FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileCollection {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
