//! lsrepo core library: file repositories over live directories and `ls -la` dumps.
//!
//! A [`FilesRepository`] answers the same four queries whether it is backed
//! by a real directory ([`DirectoryFilesRepository`]) or by a text capture
//! of one ([`DumpFilesRepository`]), so callers never care which they hold.
//!
//! # Modules
//!
//! - [`fs`]: [`FileRecord`], [`FileCollection`] and the listing-line grammar.
//! - [`repository`]: the [`FilesRepository`] contract, both back-ends and factory functions.
//! - [`service`]: [`FilesService`], a thin application service over a repository.
//! - [`config`]: the main configuration file ([`MainConfiguration`]).
//! - [`clock`]: the [`Clock`] used for year inference and time thresholds.
//! - [`error`]: unified error type ([`RepoError`]) and result alias ([`RepoResult`]).
//!
//! # Examples
//!
//! ```no_run
//! use lsrepo_core::{open_repository, FilesRepository};
//!
//! let repo = open_repository("/var/spool/incoming.txt")?;
//! for record in &repo.list_all()? {
//!     println!("{} {:?}", record.base_name(), record.modified());
//! }
//! # Ok::<(), lsrepo_core::RepoError>(())
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod fs;
pub mod repository;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::settings::{Connection, MainConfiguration};
pub use error::{RepoError, RepoResult};
pub use fs::{parse_line, FileCollection, FileRecord, ListingEntry, ParsedLine};
pub use repository::{
    open_directory, open_dump, open_repository, DirectoryFilesRepository, DumpFilesRepository,
    FilesRepository,
};
pub use service::FilesService;
