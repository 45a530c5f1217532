//! Capture timestamp resolution.
//!
//! Every photo gets a timestamp; the gallery is ordered by it. The value
//! comes from the first source that has one:
//!
//! 1. EXIF `DateTimeOriginal` in the top-level directory (IFD0)
//! 2. EXIF `DateTimeDigitized` in IFD0
//! 3. `DateTimeOriginal` in the EXIF sub-directory
//! 4. `DateTimeDigitized` in the EXIF sub-directory
//! 5. The file's modification time, as local time
//!
//! Most cameras write 3 and 4; some older tools put the dates in IFD0, which
//! is why it is consulted first.
//!
//! EXIF dates use the fixed form `YYYY:MM:DD HH:MM:SS`. Only the first
//! present value is parsed: if it does not match, the photo is treated as
//! having no EXIF date and falls through to the modification time, even if
//! a later tag would have parsed.
//!
//! [`resolve_timestamp`] never fails. When the modification time cannot be
//! read either, the Unix epoch is used so the photo sorts last.

use crate::imaging::{BackendError, ExifTags, ImageBackend};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use std::path::Path;
use thiserror::Error;

/// `strftime` form of EXIF date strings.
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum TimestampError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("no capture date tag")]
    Missing,
    #[error("unparseable capture date {0:?}")]
    Malformed(String),
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value (trimmed).
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// The raw capture date string, in tag priority order.
pub fn capture_date(tags: &ExifTags) -> Option<String> {
    resolve(&[
        tags.primary.date_time_original.as_deref(),
        tags.primary.date_time_digitized.as_deref(),
        tags.exif_ifd.date_time_original.as_deref(),
        tags.exif_ifd.date_time_digitized.as_deref(),
    ])
}

pub fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, EXIF_DATE_FORMAT).ok()
}

/// The capture date from EXIF, or why there is none.
pub fn exif_timestamp(
    backend: &impl ImageBackend,
    path: &Path,
) -> Result<NaiveDateTime, TimestampError> {
    let tags = backend.read_exif(path)?;
    let value = capture_date(&tags).ok_or(TimestampError::Missing)?;
    parse_exif_datetime(&value).ok_or(TimestampError::Malformed(value))
}

/// File modification time as local wall-clock time.
pub fn modified_time(path: &Path) -> std::io::Result<NaiveDateTime> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}

/// Resolve a photo's timestamp. Always returns a value.
pub fn resolve_timestamp(backend: &impl ImageBackend, path: &Path) -> NaiveDateTime {
    match exif_timestamp(backend, path) {
        Ok(ts) => return ts,
        Err(TimestampError::Malformed(value)) => {
            log::warn!(
                "Ignoring malformed capture date {:?} in {}",
                value,
                path.display()
            );
        }
        Err(e) => log::debug!("No EXIF capture date for {}: {}", path.display(), e),
    }

    modified_time(path).unwrap_or_else(|e| {
        log::warn!(
            "Cannot read modification time of {}: {}; using the epoch",
            path.display(),
            e
        );
        DateTime::<Utc>::UNIX_EPOCH.naive_utc()
    })
}
