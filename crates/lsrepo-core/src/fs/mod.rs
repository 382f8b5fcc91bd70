//! File value types and the listing-line grammar.
//!
//! [`record::FileRecord`] describes one file, [`collection::FileCollection`]
//! holds the result of a query, and [`listing`] converts between records
//! and `ls -la` text.

pub mod collection;
pub mod listing;
pub mod record;

pub use collection::FileCollection;
pub use listing::{parse_line, ListingEntry, ParsedLine};
pub use record::FileRecord;
