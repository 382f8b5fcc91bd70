//! Unix long-format listing lines (`ls -la`, FTP `LIST`).
//!
//! [`parse_line`] turns one listing line into a [`FileRecord`]. Two date
//! layouts are recognised, tried in this order:
//!
//! ```text
//! drwxr-xr-x 1 root root   672 Jan  1 00:01 file1.txt    time variant
//! -rw-r--r-- 1 root root   672 Jan  1  2018 file2.txt    year variant
//! ```
//!
//! `ls` prints a time for recent files and a year for older ones, so the
//! time variant takes the current year, and any stamp that would land in
//! the future is moved back one year.
//!
//! [`ListingEntry`] goes the other way and renders a directory entry the
//! way `ls -la` prints it.

use std::path::Path;
use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};

use crate::error::{RepoError, RepoResult};
use crate::fs::record::{local_naive, FileRecord};

/// Month abbreviations as `ls` prints them, in calendar order.
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Files older than this (or dated in the future) are rendered with a year.
const RECENT_WINDOW_DAYS: i64 = 183;

const PREFIX: &str = concat!(
    r"^(?P<kind>[d-])(?:[r-][w-][x-]){3} +1 +",
    r"(?P<user>[A-Za-z0-9_-]+) +(?P<group>[A-Za-z0-9_-]+) +(?P<size>[0-9]+) +",
    r"(?P<month>[A-Za-z]{3}) +(?P<day>[0-9]{1,2}) +",
);

fn time_variant() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"{PREFIX}(?P<hour>[0-9]|[01][0-9]|2[0-3]):(?P<minute>[0-5][0-9]) +(?P<name>.+)$"
        ))
        .expect("time variant pattern is valid")
    })
}

fn year_variant() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"{PREFIX}(?P<year>[0-9]{{4}}) +(?P<name>.+)$"))
            .expect("year variant pattern is valid")
    })
}

/// Outcome of parsing one listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// The line describes a file or directory.
    Record(FileRecord),
    /// Not a file line: blank, a `total` header, `.`/`..`, or unrecognised text.
    Skip,
}

impl ParsedLine {
    /// Returns the record, if any.
    pub fn into_record(self) -> Option<FileRecord> {
        match self {
            ParsedLine::Record(record) => Some(record),
            ParsedLine::Skip => None,
        }
    }
}

/// Parses one listing line relative to `now`.
///
/// Lines matching neither layout are skipped, never reported. A line with
/// the right shape but an unknown month token fails with
/// [`RepoError::InvalidDateFormat`]. Days that do not exist in the inferred
/// year are resolved rather than rejected: `Feb 29` goes back to the last
/// leap year, other overflowing days roll into the next month.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use lsrepo_core::fs::listing::{parse_line, ParsedLine};
///
/// let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let parsed = parse_line("-rw-r--r-- 1 root root 10 Mar  3 09:15 notes.txt", now).unwrap();
/// let record = parsed.into_record().unwrap();
/// assert_eq!(record.base_name(), "notes.txt");
/// assert_eq!(record.modified().unwrap().to_string(), "2024-03-03 09:15:00");
/// ```
pub fn parse_line(line: &str, now: NaiveDateTime) -> RepoResult<ParsedLine> {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(caps) = time_variant().captures(line) {
        let hour = capture_number(&caps, "hour")?;
        let minute = capture_number(&caps, "minute")?;
        return build_record(&caps, now.year(), hour, minute, now);
    }
    if let Some(caps) = year_variant().captures(line) {
        let year = capture_number(&caps, "year")?;
        return build_record(&caps, year as i32, 0, 0, now);
    }

    Ok(ParsedLine::Skip)
}

/// Resolves a three-letter month abbreviation (`Jan`..`Dec`, case-sensitive) to `1..=12`.
pub fn month_from_abbrev(token: &str) -> RepoResult<u32> {
    MONTHS
        .iter()
        .position(|m| *m == token)
        .map(|i| i as u32 + 1)
        .ok_or_else(|| RepoError::InvalidDateFormat(format!("unknown month `{token}`")))
}

fn build_record(
    caps: &Captures<'_>,
    year: i32,
    hour: u32,
    minute: u32,
    now: NaiveDateTime,
) -> RepoResult<ParsedLine> {
    let month = month_from_abbrev(&caps["month"])?;
    let day = capture_number(caps, "day")?;

    let name = &caps["name"];
    if matches!(name.trim_end(), "." | "..") {
        return Ok(ParsedLine::Skip);
    }

    let mut stamp = resolve_date(year, month, day)?
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| RepoError::InvalidDateFormat(format!("bad time {hour:02}:{minute:02}")))?;

    if stamp > now {
        stamp = resolve_date(year - 1, month, day)?
            .and_hms_opt(hour, minute, 0)
            .ok_or_else(|| {
                RepoError::InvalidDateFormat(format!("bad time {hour:02}:{minute:02}"))
            })?;
    }

    Ok(ParsedLine::Record(FileRecord::new(name, Some(stamp))))
}

/// Builds the calendar date for a listing stamp without rejecting odd days.
///
/// `Feb 29` outside a leap year resolves to the latest leap year before
/// `year`. Any other day past the end of the month rolls over into the
/// next month, and day 0 is the last day of the previous one.
fn resolve_date(year: i32, month: u32, day: u32) -> RepoResult<NaiveDate> {
    let resolved = match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => Some(date),
        None if month == 2 && day == 29 => {
            (1..=8).find_map(|back| NaiveDate::from_ymd_opt(year - back, 2, 29))
        }
        None => NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|first| first.checked_add_signed(Duration::days(i64::from(day) - 1))),
    };
    resolved.ok_or_else(|| {
        RepoError::InvalidDateFormat(format!("{year}-{month:02}-{day:02} is out of range"))
    })
}

fn capture_number(caps: &Captures<'_>, group: &str) -> RepoResult<u32> {
    caps[group]
        .parse()
        .map_err(|_| RepoError::InvalidDateFormat(format!("bad {group} `{}`", &caps[group])))
}

/// Kind of entry, as shown in the first column of `ls -l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

impl EntryKind {
    fn flag(self) -> char {
        match self {
            EntryKind::File => '-',
            EntryKind::Directory => 'd',
            EntryKind::Symlink => 'l',
        }
    }
}

/// A directory entry captured with everything `ls -la` prints for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub kind: EntryKind,
    /// Lower nine permission bits.
    pub mode: u32,
    pub links: u64,
    pub owner: String,
    pub group: String,
    pub size: u64,
    pub modified: NaiveDateTime,
    pub name: String,
    /// Link target for symlinks.
    pub target: Option<String>,
}

impl ListingEntry {
    /// Captures `path` from its (non-followed) metadata, listed under `name`.
    pub fn from_metadata(path: &Path, name: &str, metadata: &std::fs::Metadata) -> Self {
        let kind = if metadata.is_symlink() {
            EntryKind::Symlink
        } else if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let target = match kind {
            EntryKind::Symlink => std::fs::read_link(path)
                .ok()
                .map(|t| t.to_string_lossy().into_owned()),
            _ => None,
        };
        let (mode, links, owner, group) = ownership(metadata);

        Self {
            kind,
            mode,
            links,
            owner,
            group,
            size: metadata.len(),
            modified: local_naive(metadata.modified().unwrap_or(std::time::UNIX_EPOCH)),
            name: name.to_string(),
            target,
        }
    }

    /// Type flag followed by the nine `rwx` characters, e.g. `drwxr-xr-x`.
    pub fn permissions(&self) -> String {
        let mut out = String::with_capacity(10);
        out.push(self.kind.flag());
        for shift in [6, 3, 0] {
            let bits = (self.mode >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        out
    }

    /// Renders the entry as one `ls -la` line, right-aligning the size to `size_width`.
    pub fn render(&self, now: NaiveDateTime, size_width: usize) -> String {
        let age = now - self.modified;
        let stamp = if age >= Duration::zero() && age <= Duration::days(RECENT_WINDOW_DAYS) {
            self.modified.format("%b %e %H:%M")
        } else {
            self.modified.format("%b %e  %Y")
        };
        let mut line = format!(
            "{} {} {} {} {:>width$} {} {}",
            self.permissions(),
            self.links,
            self.owner,
            self.group,
            self.size,
            stamp,
            self.name,
            width = size_width,
        );
        if let Some(target) = &self.target {
            line.push_str(" -> ");
            line.push_str(target);
        }
        line
    }
}

#[cfg(unix)]
fn ownership(metadata: &std::fs::Metadata) -> (u32, u64, String, String) {
    use std::os::unix::fs::MetadataExt;
    (
        metadata.mode() & 0o777,
        metadata.nlink(),
        metadata.uid().to_string(),
        metadata.gid().to_string(),
    )
}

#[cfg(not(unix))]
fn ownership(metadata: &std::fs::Metadata) -> (u32, u64, String, String) {
    let mut mode = if metadata.permissions().readonly() { 0o444 } else { 0o644 };
    if metadata.is_dir() {
        mode |= 0o111;
    }
    (mode, 1, "owner".to_string(), "group".to_string())
}
